// ─── Package Installer ───
// Turns a downloaded payload into a library entry: zip archives are
// extracted and their single wrapping folder collapsed, everything else is
// kept as-is.

use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};
use zip::ZipArchive;

use super::model::{InstalledPackage, PackageKind};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::paths::validate_package_name;

/// One event per extracted archive entry; `index` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtractProgress {
    pub index: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Archive,
    Document,
    Artifact,
}

/// Classify a downloaded file. Zip detection reads the central directory,
/// so the extension is irrelevant for archives.
pub fn classify(path: &Path) -> LauncherResult<PayloadKind> {
    let file = File::open(path).map_err(|source| LauncherError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if ZipArchive::new(file).is_ok() {
        return Ok(PayloadKind::Archive);
    }

    let is_html = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("html"))
        .unwrap_or(false);
    if is_html {
        Ok(PayloadKind::Document)
    } else {
        Ok(PayloadKind::Artifact)
    }
}

pub struct PackageInstaller {
    applications_dir: PathBuf,
}

impl PackageInstaller {
    pub fn new(applications_dir: PathBuf) -> Self {
        Self { applications_dir }
    }

    /// Install `local_path` as `applications/<package_name>/`.
    ///
    /// Blocking; async callers run it through `spawn_blocking`. A failed
    /// extraction leaves whatever was already written on disk.
    pub fn install<F>(
        &self,
        local_path: &Path,
        package_name: &str,
        on_progress: F,
    ) -> LauncherResult<InstalledPackage>
    where
        F: FnMut(ExtractProgress),
    {
        validate_package_name(package_name)?;
        let install_root = self.applications_dir.join(package_name);

        let kind = match classify(local_path)? {
            PayloadKind::Archive => {
                extract_archive(local_path, &install_root, on_progress)?;
                std::fs::remove_file(local_path).map_err(|source| LauncherError::Io {
                    path: local_path.to_path_buf(),
                    source,
                })?;
                if unwrap_single_nesting(&install_root)? {
                    debug!("Collapsed wrapping folder in {:?}", install_root);
                }
                PackageKind::Extracted
            }
            PayloadKind::Document => PackageKind::Document {
                path: place_in_root(local_path, &install_root)?,
            },
            PayloadKind::Artifact => PackageKind::Artifact {
                path: place_in_root(local_path, &install_root)?,
            },
        };

        info!("Installed {} into {:?}", package_name, install_root);
        Ok(InstalledPackage {
            name: package_name.to_string(),
            install_root,
            kind,
        })
    }
}

/// Extract every entry of `zip_path` under `dest`, preserving relative paths.
pub fn extract_archive<F>(zip_path: &Path, dest: &Path, mut on_progress: F) -> LauncherResult<()>
where
    F: FnMut(ExtractProgress),
{
    let corrupt = |reason: String| LauncherError::ArchiveCorrupt {
        path: zip_path.to_path_buf(),
        reason,
    };

    let zip_file = File::open(zip_path).map_err(|source| LauncherError::Io {
        path: zip_path.to_path_buf(),
        source,
    })?;
    let mut archive = ZipArchive::new(zip_file).map_err(|e| corrupt(e.to_string()))?;

    std::fs::create_dir_all(dest).map_err(|source| LauncherError::Io {
        path: dest.to_path_buf(),
        source,
    })?;

    let total = archive.len();
    for index in 0..total {
        let mut zipped = archive.by_index(index).map_err(|e| corrupt(e.to_string()))?;
        let rel_path = zipped
            .enclosed_name()
            .ok_or_else(|| corrupt(format!("unsafe entry path {:?}", zipped.name())))?;

        if !rel_path.as_os_str().is_empty() {
            let out_path = dest.join(&rel_path);
            if zipped.is_dir() {
                std::fs::create_dir_all(&out_path).map_err(|source| LauncherError::Io {
                    path: out_path.clone(),
                    source,
                })?;
            } else {
                if let Some(parent) = out_path.parent() {
                    std::fs::create_dir_all(parent).map_err(|source| LauncherError::Io {
                        path: parent.to_path_buf(),
                        source,
                    })?;
                }

                let mut out = File::create(&out_path).map_err(|source| LauncherError::Io {
                    path: out_path.clone(),
                    source,
                })?;
                std::io::copy(&mut zipped, &mut out).map_err(|source| {
                    match source.kind() {
                        ErrorKind::InvalidData | ErrorKind::UnexpectedEof => {
                            corrupt(format!("{}: {source}", zipped.name()))
                        }
                        _ => LauncherError::Io {
                            path: out_path.clone(),
                            source,
                        },
                    }
                })?;

                #[cfg(unix)]
                if let Some(mode) = zipped.unix_mode() {
                    use std::os::unix::fs::PermissionsExt;
                    let permissions = std::fs::Permissions::from_mode(mode & 0o777);
                    std::fs::set_permissions(&out_path, permissions).map_err(|source| {
                        LauncherError::Io {
                            path: out_path.clone(),
                            source,
                        }
                    })?;
                }
            }
        }

        on_progress(ExtractProgress {
            index: index + 1,
            total,
        });
    }

    Ok(())
}

/// When `root` holds exactly one directory and no files, move that
/// directory's items up into `root` and remove it. One level only.
pub fn unwrap_single_nesting(root: &Path) -> LauncherResult<bool> {
    let read_err = |source: std::io::Error| LauncherError::Io {
        path: root.to_path_buf(),
        source,
    };

    let mut dirs = Vec::new();
    let mut has_files = false;
    for entry in std::fs::read_dir(root).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        if entry.file_type().map_err(read_err)?.is_dir() {
            dirs.push(entry);
        } else {
            has_files = true;
        }
    }

    if has_files || dirs.len() != 1 {
        return Ok(false);
    }

    let nested = dirs.remove(0);
    // Moved aside first: an inner item may share the wrapper's name.
    let staging = root.join(format!(".{}.unwrap", nested.file_name().to_string_lossy()));
    rename(&nested.path(), &staging)?;

    for entry in std::fs::read_dir(&staging).map_err(|source| LauncherError::Io {
        path: staging.clone(),
        source,
    })? {
        let entry = entry.map_err(|source| LauncherError::Io {
            path: staging.clone(),
            source,
        })?;
        rename(&entry.path(), &root.join(entry.file_name()))?;
    }

    std::fs::remove_dir(&staging).map_err(|source| LauncherError::Io {
        path: staging.clone(),
        source,
    })?;
    Ok(true)
}

fn rename(from: &Path, to: &Path) -> LauncherResult<()> {
    std::fs::rename(from, to).map_err(|source| LauncherError::Io {
        path: from.to_path_buf(),
        source,
    })
}

/// Non-archive payloads live directly in the install root.
fn place_in_root(local_path: &Path, install_root: &Path) -> LauncherResult<PathBuf> {
    std::fs::create_dir_all(install_root).map_err(|source| LauncherError::Io {
        path: install_root.to_path_buf(),
        source,
    })?;

    let file_name = local_path
        .file_name()
        .ok_or_else(|| LauncherError::Other(format!("No file name in {:?}", local_path)))?;
    let target = install_root.join(file_name);
    if local_path.parent() != Some(install_root) {
        std::fs::copy(local_path, &target).map_err(|source| LauncherError::Io {
            path: local_path.to_path_buf(),
            source,
        })?;
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    use super::*;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, body) in entries {
            if name.ends_with('/') {
                writer
                    .add_directory(name.trim_end_matches('/'), SimpleFileOptions::default())
                    .unwrap();
            } else {
                writer.start_file(*name, SimpleFileOptions::default()).unwrap();
                writer.write_all(body.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap();
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn classify_detects_zip_html_and_other() {
        let tmp = TempDir::new().unwrap();
        let zip_path = tmp.path().join("payload.bin");
        write_zip(&zip_path, &[("a.txt", "a")]);
        let html = tmp.path().join("index.html");
        std::fs::write(&html, "<html></html>").unwrap();
        let exe = tmp.path().join("game.exe");
        std::fs::write(&exe, b"MZ").unwrap();

        assert_eq!(classify(&zip_path).unwrap(), PayloadKind::Archive);
        assert_eq!(classify(&html).unwrap(), PayloadKind::Document);
        assert_eq!(classify(&exe).unwrap(), PayloadKind::Artifact);
    }

    #[test]
    fn extracts_all_entries_and_removes_archive() {
        let tmp = TempDir::new().unwrap();
        let apps = tmp.path().join("applications");
        let pkg = apps.join("thing");
        std::fs::create_dir_all(&pkg).unwrap();
        let zip_path = pkg.join("thing.zip");
        write_zip(
            &zip_path,
            &[
                ("readme.txt", "hi"),
                ("bin/", ""),
                ("bin/game.exe", "MZ"),
            ],
        );

        let mut events = Vec::new();
        let installer = PackageInstaller::new(apps);
        let package = installer
            .install(&zip_path, "thing", |p| events.push(p))
            .unwrap();

        assert_eq!(package.kind, PackageKind::Extracted);
        assert!(!zip_path.exists());
        assert_eq!(names(&pkg), vec!["bin", "readme.txt"]);
        assert!(pkg.join("bin/game.exe").is_file());
        assert_eq!(events.len(), 3);
        assert_eq!(events.last(), Some(&ExtractProgress { index: 3, total: 3 }));
    }

    #[test]
    fn single_wrapping_folder_is_collapsed_once() {
        let tmp = TempDir::new().unwrap();
        let apps = tmp.path().join("applications");
        let zip_path = tmp.path().join("thing.zip");
        write_zip(
            &zip_path,
            &[
                ("Thing-1.0/", ""),
                ("Thing-1.0/inner/", ""),
                ("Thing-1.0/inner/deep/", ""),
                ("Thing-1.0/inner/deep/run.sh", "#!/bin/sh"),
            ],
        );

        let package = PackageInstaller::new(apps.clone())
            .install(&zip_path, "thing", |_| {})
            .unwrap();

        // Only the outer wrapper goes away; `inner` is itself a lone
        // directory but is not flattened further.
        assert_eq!(names(&package.install_root), vec!["inner"]);
        assert!(package.install_root.join("inner/deep/run.sh").is_file());
        assert!(!package.install_root.join("Thing-1.0").exists());
    }

    #[test]
    fn multiple_top_level_items_are_left_alone() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("thing");
        std::fs::create_dir_all(root.join("a")).unwrap();
        std::fs::create_dir_all(root.join("b")).unwrap();
        assert!(!unwrap_single_nesting(&root).unwrap());

        std::fs::remove_dir(root.join("b")).unwrap();
        std::fs::write(root.join("notes.txt"), "x").unwrap();
        assert!(!unwrap_single_nesting(&root).unwrap());
        assert_eq!(names(&root), vec!["a", "notes.txt"]);
    }

    #[test]
    fn wrapper_containing_same_named_item_is_collapsed() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("thing");
        std::fs::create_dir_all(root.join("Game/Game")).unwrap();
        std::fs::write(root.join("Game/Game/data.pak"), "x").unwrap();
        std::fs::write(root.join("Game/start.bat"), "x").unwrap();

        assert!(unwrap_single_nesting(&root).unwrap());
        assert_eq!(names(&root), vec!["Game", "start.bat"]);
        assert!(root.join("Game/data.pak").is_file());
    }

    #[test]
    fn truncated_archive_is_reported_as_corrupt() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("good.zip");
        write_zip(&good, &[("a.txt", "aaaaaaaaaaaaaaaa")]);

        let mut bytes = std::fs::read(&good).unwrap();
        // Scribble over the local header signature; the central directory
        // still parses so the file classifies as a zip.
        bytes[0] = 0;
        bytes[1] = 0;
        let bad = tmp.path().join("bad.zip");
        std::fs::write(&bad, &bytes).unwrap();

        let err = extract_archive(&bad, &tmp.path().join("out"), |_| {}).unwrap_err();
        assert!(matches!(err, LauncherError::ArchiveCorrupt { .. }));
    }

    #[test]
    fn html_payload_is_a_document() {
        let tmp = TempDir::new().unwrap();
        let apps = tmp.path().join("applications");
        let pkg = apps.join("site");
        std::fs::create_dir_all(&pkg).unwrap();
        let html = pkg.join("index.html");
        std::fs::write(&html, "<html></html>").unwrap();

        let package = PackageInstaller::new(apps)
            .install(&html, "site", |_| {})
            .unwrap();
        assert!(package.is_document());
        assert!(html.exists());
    }

    #[test]
    fn artifact_outside_root_is_copied_in() {
        let tmp = TempDir::new().unwrap();
        let apps = tmp.path().join("applications");
        let exe = tmp.path().join("tool.AppImage");
        std::fs::write(&exe, b"\x7fELF").unwrap();

        let package = PackageInstaller::new(apps.clone())
            .install(&exe, "tool", |_| {})
            .unwrap();
        assert_eq!(
            package.kind,
            PackageKind::Artifact {
                path: apps.join("tool").join("tool.AppImage")
            }
        );
        assert!(apps.join("tool/tool.AppImage").is_file());
    }
}
