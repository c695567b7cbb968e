mod app_state;
pub mod config;
pub mod error_log;
pub mod persist;
pub mod settings;

pub use app_state::AppState;
pub use config::{AppConfig, AppConfigEntry};
pub use error_log::{ErrorLog, ErrorLogEntry};
pub use settings::{LauncherSettings, WindowMode};
