pub mod auth;
pub mod events;
pub mod member;
pub mod playback;
pub mod registry;
pub mod room_code;
pub mod session;

pub use auth::{Claims, IdentityProvider, JwtIdentityProvider};
pub use events::RoomEventHub;
pub use member::MembershipTracker;
pub use playback::{PlaybackBroadcaster, PlaybackCoordinator};
pub use registry::RoomRegistry;
pub use room_code::RoomCodeGenerator;
pub use session::RoomSessionService;
