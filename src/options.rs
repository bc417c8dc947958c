use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_BREAKPOINT: &str = "480px";
pub const DEFAULT_SOCIAL_ICON_BASE_URL: &str =
    "https://www.mailjet.com/images/theme/v1/icons/ico-social/";

const DEFAULT_FONTS: &[(&str, &str)] = &[
    (
        "Open Sans",
        "https://fonts.googleapis.com/css?family=Open+Sans:300,400,500,700",
    ),
    (
        "Droid Sans",
        "https://fonts.googleapis.com/css?family=Droid+Sans:300,400,500,700",
    ),
    (
        "Lato",
        "https://fonts.googleapis.com/css?family=Lato:300,400,500,700",
    ),
    (
        "Roboto",
        "https://fonts.googleapis.com/css?family=Roboto:300,400,500,700",
    ),
    (
        "Ubuntu",
        "https://fonts.googleapis.com/css?family=Ubuntu:300,400,500,700",
    ),
];

/// Compiler settings that documents can't express themselves.
///
/// Every field has a default, so a partial YAML file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Column media query breakpoint, overridden by `mj-breakpoint`.
    pub breakpoint: String,
    /// Web font name to stylesheet URL.
    pub fonts: BTreeMap<String, String>,
    pub social_icon_base_url: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            breakpoint: DEFAULT_BREAKPOINT.to_string(),
            fonts: DEFAULT_FONTS
                .iter()
                .map(|(name, href)| (name.to_string(), href.to_string()))
                .collect(),
            social_icon_base_url: DEFAULT_SOCIAL_ICON_BASE_URL.to_string(),
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}
