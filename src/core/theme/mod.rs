// ─── Themes ───
// theme.yaml -> ThemeDescriptor -> (font step) -> Stylesheet.

pub mod applier;
pub mod descriptor;
pub mod font;
pub mod stylesheet;

pub use applier::{ActiveTheme, ThemeApplier};
pub use descriptor::{ThemeDescriptor, ThemeProperty, THEME_FILE};
pub use font::{FileFontLoader, FontLoader};
pub use stylesheet::{build_stylesheet, RuleScope, StyleRule, Stylesheet};

/// Name of the built-in theme, which has no folder on disk.
pub const DEFAULT_THEME: &str = "Default Dark";
