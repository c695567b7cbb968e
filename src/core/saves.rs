use std::path::Path;

use tracing::info;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::paths::{validate_package_name, LauncherPaths};

/// Copy the contents of `location` into `saves/<package_name>/`. Existing
/// files are overwritten; files only present in the mirror are kept.
pub fn sync_cloud_save(
    paths: &LauncherPaths,
    package_name: &str,
    location: &Path,
) -> LauncherResult<()> {
    validate_package_name(package_name)?;
    if !location.is_dir() {
        return Err(LauncherError::Other(format!(
            "Cloud save location {:?} is not a directory",
            location
        )));
    }

    let mirror = paths.cloud_save_mirror(package_name);
    std::fs::create_dir_all(&mirror).map_err(|source| LauncherError::io(&mirror, source))?;
    copy_dir_recursive(location, &mirror)?;

    info!("Synced saves for {} from {:?}", package_name, location);
    Ok(())
}

fn copy_dir_recursive(source: &Path, destination: &Path) -> LauncherResult<()> {
    let entries = std::fs::read_dir(source).map_err(|e| LauncherError::io(source, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| LauncherError::io(source, e))?;
        let src_path = entry.path();
        let dst_path = destination.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| LauncherError::io(&src_path, e))?;

        if file_type.is_dir() {
            std::fs::create_dir_all(&dst_path).map_err(|e| LauncherError::io(&dst_path, e))?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else if file_type.is_file() {
            if dst_path.exists() {
                std::fs::remove_file(&dst_path).map_err(|e| LauncherError::io(&dst_path, e))?;
            }
            std::fs::copy(&src_path, &dst_path).map_err(|e| LauncherError::io(&src_path, e))?;
        }
    }

    Ok(())
}
