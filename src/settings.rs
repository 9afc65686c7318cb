use std::{fs, io::ErrorKind, path::Path};

use anyhow::{bail, Context, Result};
use serde::Serialize;

pub const DEVELOPMENT_VERSION: &str = "development";

/// Subtitle languages offered in the form, first one preselected.
pub fn default_languages() -> Vec<String> {
    ["fr", "en", "es", "de", "it"].iter().map(|s| s.to_string()).collect()
}

/// What the page needs to render the form and footer.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub version: String,
    pub languages: Vec<String>,
    pub default_language: String,
}

impl Settings {
    pub fn new(version: String, languages: Vec<String>, default_language: Option<String>) -> Result<Self> {
        let languages: Vec<String> = languages
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        if languages.is_empty() {
            bail!("at least one subtitle language is required");
        }

        let default_language = match default_language {
            Some(lang) if languages.contains(&lang) => lang,
            Some(lang) => bail!("default language '{lang}' is not in {languages:?}"),
            None => languages[0].clone(),
        };

        Ok(Self {
            version,
            languages,
            default_language,
        })
    }
}

/// Contents of the version file, or "development" when there is none.
pub fn load_version(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        Ok(_) => Ok(DEVELOPMENT_VERSION.to_string()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(DEVELOPMENT_VERSION.to_string()),
        Err(e) => Err(e).with_context(|| format!("Failed reading version file: {}", path.display())),
    }
}
