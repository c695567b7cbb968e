use std::path::Path;

use ttf_parser::{name_id, Face};

use crate::core::error::{LauncherError, LauncherResult};

/// Registers a font file with the rendering layer and returns its family
/// name. Front ends that own a real font database provide their own.
pub trait FontLoader: Send + Sync {
    fn load_font(&self, path: &Path) -> LauncherResult<String>;
}

const ENGLISH_US: u16 = 0x0409;

/// Parses the font on disk (TrueType, OpenType, first face of a collection)
/// and reads the family from its `name` table. The file stem before the
/// first `-` is used only when the table carries no usable family.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileFontLoader;

impl FontLoader for FileFontLoader {
    fn load_font(&self, path: &Path) -> LauncherResult<String> {
        let data = std::fs::read(path).map_err(|source| LauncherError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let face = Face::parse(&data, 0)
            .map_err(|e| LauncherError::Other(format!("{:?} is not a usable font: {e}", path)))?;

        family_from_face(&face)
            .or_else(|| family_from_file_name(path))
            .ok_or_else(|| LauncherError::Other(format!("No family name in {:?}", path)))
    }
}

/// Family name (name ID 1), US English record first, else the first
/// decodable one.
fn family_from_face(face: &Face<'_>) -> Option<String> {
    let families: Vec<(u16, String)> = face
        .names()
        .into_iter()
        .filter(|name| name.name_id == name_id::FAMILY)
        .filter_map(|name| {
            let family = name.to_string()?;
            let family = family.trim();
            (!family.is_empty()).then(|| (name.language_id, family.to_string()))
        })
        .collect();

    families
        .iter()
        .find(|(language, _)| *language == ENGLISH_US)
        .or_else(|| families.first())
        .map(|(_, family)| family.clone())
}

fn family_from_file_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let family = stem.split('-').next().unwrap_or(stem).trim();
    if family.is_empty() {
        let stem = stem.trim();
        (!stem.is_empty()).then(|| stem.to_string())
    } else {
        Some(family.to_string())
    }
}
