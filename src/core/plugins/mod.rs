//! Plugin discovery and initialization.
//!
//! A plugin is a folder under `plugins/` holding an entry file whose stem is
//! `base` (`base.toml`, `base.rs`, ...). The entry module is resolved through
//! a [`PluginRegistry`] the embedding binary fills at build time, keyed by
//! folder name. Each plugin gets `init_plugin` called once with full access
//! to the [`AppState`]; there is no sandbox.
//!
//! ```text
//! PluginHost
//! ├── registry: folder name -> factory
//! └── attempted: folders already loaded (or failed) this process
//! ```

mod discovery;
mod host;

pub use discovery::{discover, DiscoveredPlugin, ENTRY_STEM};
pub use host::{PluginHost, PluginRegistry, PluginReport};

use crate::core::error::LauncherResult;
use crate::core::state::AppState;

/// An extension module. `init_plugin` runs once per process.
pub trait Plugin: Send {
    fn init_plugin(&mut self, host: &mut AppState) -> LauncherResult<()>;
}

/// Builds a fresh plugin instance for a discovered folder.
pub type PluginFactory = Box<dyn Fn() -> Box<dyn Plugin> + Send + Sync>;
