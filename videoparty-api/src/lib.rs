// VideoParty API Library
//
// HTTP/JSON surface over the room session service

pub mod http;

// Re-export commonly used types
pub use http::{create_router, AppState};
