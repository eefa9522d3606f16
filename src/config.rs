// SPDX-License-Identifier: MIT
//
// Configuration — `~/.config/revu/config.toml`.
//
// Small on purpose: the theme name and a couple of view preferences.
// A missing file means defaults; a malformed file is an error the
// caller reports and then ignores (start with defaults rather than
// refuse to start).

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// User preferences persisted between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Built-in theme name (`dark` or `light`).
    pub theme: String,
    /// Expand comment blocks when a review opens.
    pub expand_comments: bool,
    /// Status filter the list screen starts with (`all`, `open`, `closed`).
    pub list_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            expand_comments: false,
            list_filter: "all".to_string(),
        }
    }
}

impl Config {
    /// Path of the config file, or `None` when the platform has no
    /// config directory.
    #[must_use]
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("revu").join("config.toml"))
    }

    /// Load the config file, falling back to defaults when it does not
    /// exist. A file that exists but fails to parse is an error.
    pub fn load() -> Result<Self> {
        let Some(path) = Self::path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Parse config TOML. Unknown keys are ignored; missing keys take
    /// their defaults.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Write the config file, creating the directory if needed.
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::path() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let text = toml::to_string_pretty(self)?;
        fs::write(&path, text).with_context(|| format!("writing {}", path.display()))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.theme, "dark");
        assert!(!cfg.expand_comments);
        assert_eq!(cfg.list_filter, "all");
    }

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg = Config::parse("theme = \"light\"\n").unwrap();
        assert_eq!(cfg.theme, "light");
        assert_eq!(cfg.list_filter, "all");
    }

    #[test]
    fn full_round_trip() {
        let cfg = Config {
            theme: "light".into(),
            expand_comments: true,
            list_filter: "open".into(),
        };
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(Config::parse(&text).unwrap(), cfg);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(Config::parse("theme = [not toml").is_err());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let cfg = Config::parse("theme = \"dark\"\nfuture_knob = 3\n").unwrap();
        assert_eq!(cfg.theme, "dark");
    }
}
