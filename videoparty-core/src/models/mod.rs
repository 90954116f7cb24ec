pub mod id;
pub mod playback;
pub mod room;
pub mod room_member;

pub use id::{generate_id, RoomId, UserId};
pub use playback::{PlaybackEvent, PlaybackState, PlaybackUpdate};
pub use room::{CreateRoomRequest, NewRoom, Room, MAX_ROOM_NAME_LEN};
pub use room_member::RoomMember;
