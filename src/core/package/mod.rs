pub mod installer;
pub mod locator;
pub mod manager;
pub mod model;

pub use installer::{ExtractProgress, PackageInstaller};
pub use locator::locate;
pub use manager::PackageManager;
pub use model::{ExecutableCandidate, InstalledPackage, PackageKind};
