//! Settings file loading.

mod error;
mod settings;

pub use error::ConfigError;
pub use settings::Settings;
