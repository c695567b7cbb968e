use std::fmt;

use serde::Serialize;

use super::descriptor::{ThemeDescriptor, ThemeProperty};

/// Which widgets a rule targets. The rendering layer maps these onto its
/// own widget classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleScope {
    /// Generic panels and container widgets.
    Panel,
    /// The top-level window.
    MainWindow,
    /// Every text-bearing control: labels, inputs, buttons, lists, menus.
    TextControls,
    Button,
    ButtonHover,
    /// Every widget.
    Global,
}

impl RuleScope {
    pub fn selector(&self) -> &'static str {
        match self {
            RuleScope::Panel => "panel",
            RuleScope::MainWindow => "window",
            RuleScope::TextControls => "text",
            RuleScope::Button => "button",
            RuleScope::ButtonHover => "button:hover",
            RuleScope::Global => "*",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleRule {
    pub scope: RuleScope,
    pub property: String,
    pub value: String,
}

impl StyleRule {
    fn new(scope: RuleScope, property: &str, value: &str) -> Self {
        Self {
            scope,
            property: property.to_string(),
            value: value.to_string(),
        }
    }
}

impl fmt::Display for StyleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {{ {}: {}; }}",
            self.scope.selector(),
            self.property,
            self.value
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stylesheet {
    pub rules: Vec<StyleRule>,
}

impl Stylesheet {
    pub fn to_css(&self) -> String {
        self.rules
            .iter()
            .map(|rule| format!("{rule}\n"))
            .collect()
    }
}

/// Translate a descriptor into rules. Pure: the font family, if any, was
/// resolved beforehand and is emitted first so it applies globally ahead of
/// every scoped rule.
pub fn build_stylesheet(descriptor: &ThemeDescriptor, font_family: Option<&str>) -> Stylesheet {
    let mut rules = Vec::with_capacity(descriptor.entries.len() + 1);

    if let Some(family) = font_family {
        rules.push(StyleRule::new(
            RuleScope::Global,
            "font-family",
            &format!("'{family}'"),
        ));
    }

    for (property, value) in &descriptor.entries {
        let rule = match property {
            ThemeProperty::FontFamily => continue,
            ThemeProperty::PanelBackground => {
                StyleRule::new(RuleScope::Panel, "background-color", value)
            }
            ThemeProperty::MainBackground => {
                StyleRule::new(RuleScope::MainWindow, "background-color", value)
            }
            ThemeProperty::TextColor => StyleRule::new(RuleScope::TextControls, "color", value),
            ThemeProperty::ButtonColor => {
                StyleRule::new(RuleScope::Button, "background-color", value)
            }
            ThemeProperty::ButtonHoverColor => {
                StyleRule::new(RuleScope::ButtonHover, "background-color", value)
            }
            ThemeProperty::Passthrough(key) => StyleRule::new(RuleScope::Global, key, value),
        };
        rules.push(rule);
    }

    Stylesheet { rules }
}

/// The built-in "Default Dark" look.
pub fn default_dark() -> Stylesheet {
    Stylesheet {
        rules: vec![
            StyleRule::new(RuleScope::MainWindow, "background-color", "#19232d"),
            StyleRule::new(RuleScope::Panel, "background-color", "#0d0d0d"),
            StyleRule::new(RuleScope::TextControls, "color", "#dfe1e2"),
            StyleRule::new(RuleScope::Button, "background-color", "#2e2e2e"),
            StyleRule::new(RuleScope::ButtonHover, "background-color", "#3e3e3e"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn descriptor(entries: &[(&str, &str)]) -> ThemeDescriptor {
        ThemeDescriptor {
            name: "Test".into(),
            folder: PathBuf::from("themes/Test"),
            entries: entries
                .iter()
                .map(|(k, v)| (ThemeProperty::from_key(k), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn recognized_keys_map_to_fixed_scopes() {
        let theme = descriptor(&[
            ("panel-background", "#111"),
            ("main-background", "#222"),
            ("text-color", "#eee"),
            ("button-color", "#333"),
            ("button-hover-color", "#444"),
            ("border-radius", "6px"),
        ]);
        let css = build_stylesheet(&theme, None).to_css();
        assert_eq!(
            css,
            "panel { background-color: #111; }\n\
             window { background-color: #222; }\n\
             text { color: #eee; }\n\
             button { background-color: #333; }\n\
             button:hover { background-color: #444; }\n\
             * { border-radius: 6px; }\n"
        );
    }

    #[test]
    fn font_rule_comes_first_regardless_of_position() {
        let theme = descriptor(&[("text-color", "#eee"), ("font-family", "f/Pixel.ttf")]);
        let sheet = build_stylesheet(&theme, Some("Pixel"));
        assert_eq!(sheet.rules.len(), 2);
        assert_eq!(sheet.rules[0].to_string(), "* { font-family: 'Pixel'; }");
        assert_eq!(sheet.rules[1].scope, RuleScope::TextControls);
    }

    #[test]
    fn unresolved_font_key_emits_nothing() {
        let theme = descriptor(&[("font-family", "f/Pixel.ttf")]);
        assert!(build_stylesheet(&theme, None).rules.is_empty());
    }
}
