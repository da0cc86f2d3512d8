// Service exports
pub mod sessions;

pub use sessions::{SessionError, SessionStats, SessionStore};
