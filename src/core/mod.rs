//! Session-scoped services used by the presentation layer.

pub mod services;
pub mod session;
pub mod utils;

pub use session::Session;
