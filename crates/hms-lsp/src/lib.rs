pub mod config;
pub mod document;
pub mod handlers;
pub mod publisher;
pub mod server;
mod test_utils;

// Re-export commonly used types
pub use hms_core::error::{HmsError, Result};
pub use server::Backend;
