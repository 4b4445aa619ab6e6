//! Infrastructure configuration modules.

pub mod api;
pub mod logging;
pub mod reconnection;
pub mod refresh;
pub mod settings;

pub use api::ApiConfig;
pub use logging::LoggingConfig;
pub use reconnection::ReconnectionConfig;
pub use refresh::RefreshConfig;
pub use settings::Config;
