//! Configuration
//!
//! Settings for logging and fixture preloading, layered from defaults, an
//! optional file and `DBMOCK__*` environment variables.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{LogSettings, MockConfig};
