use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::error::MuppetError;

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

// ── Final (merged) config types ──

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub builtins: Builtins,
    #[serde(default)]
    pub env: EnvConfig,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub log_level: String,
    /// Evaluation history file; `~` is expanded. Empty disables it.
    #[serde(default)]
    pub results_log: String,
    #[serde(default)]
    pub unavailable_is_error: bool,
}

/// Which builtin providers to register, in order.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Builtins {
    #[serde(default)]
    pub builders: Vec<String>,
    #[serde(default)]
    pub evaluators: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct EnvConfig {
    /// Variables `env:` rules may reference. Empty allows all.
    #[serde(default)]
    pub allow: Vec<String>,
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    settings: SettingsOverlay,
    #[serde(default)]
    builtins: BuiltinsOverlay,
    #[serde(default)]
    env: EnvOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct SettingsOverlay {
    log_level: Option<String>,
    results_log: Option<String>,
    unavailable_is_error: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct BuiltinsOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    builders: Vec<String>,
    #[serde(default)]
    evaluators: Vec<String>,
    #[serde(default)]
    remove_builders: Vec<String>,
    #[serde(default)]
    remove_evaluators: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct EnvOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    allow: Vec<String>,
    #[serde(default)]
    remove_allow: Vec<String>,
}

// ── Merge logic ──

/// Merge a user list into a default list.
/// In replace mode: user list replaces default entirely.
/// In merge mode: remove items first, then extend with additions (deduped).
fn merge_list(base: &mut Vec<String>, add: Vec<String>, remove: &[String], replace: bool) {
    if replace {
        *base = add;
    } else {
        base.retain(|item| !remove.contains(item));
        for item in add {
            if !base.contains(&item) {
                base.push(item);
            }
        }
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge user overlay from ~/.config/muppet/config.toml (if exists)
    ///
    /// A broken overlay is logged and ignored.
    pub fn load() -> Self {
        let mut config = Self::default_config();
        if let Some(overlay) = Self::load_overlay() {
            config.apply_overlay(overlay);
        }
        config
    }

    /// Defaults merged with the overlay at `path`. Parse errors are returned.
    pub fn load_from(path: &Path) -> Result<Self, MuppetError> {
        let content = std::fs::read_to_string(path).map_err(crate::error::ParseError::Io)?;
        let overlay: ConfigOverlay = toml::from_str(&content)?;
        let mut config = Self::default_config();
        config.apply_overlay(overlay);
        Ok(config)
    }

    /// Try to load user overlay from ~/.config/muppet/config.toml.
    fn load_overlay() -> Option<ConfigOverlay> {
        let home = std::env::var_os("HOME")?;
        let path = Path::new(&home).join(".config/muppet/config.toml");
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                log::warn!("muppet: config parse error: {e}");
                None
            }
        }
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        let s = overlay.settings;
        if let Some(v) = s.log_level {
            self.settings.log_level = v;
        }
        if let Some(v) = s.results_log {
            self.settings.results_log = v;
        }
        if let Some(v) = s.unavailable_is_error {
            self.settings.unavailable_is_error = v;
        }

        let b = overlay.builtins;
        merge_list(
            &mut self.builtins.builders,
            b.builders,
            &b.remove_builders,
            b.replace,
        );
        merge_list(
            &mut self.builtins.evaluators,
            b.evaluators,
            &b.remove_evaluators,
            b.replace,
        );

        let e = overlay.env;
        merge_list(&mut self.env.allow, e.allow, &e.remove_allow, e.replace);
    }

    /// Configured log level; unknown names fall back to `Warn`.
    pub fn log_level(&self) -> LevelFilter {
        self.settings.log_level.parse().unwrap_or(LevelFilter::Warn)
    }

    /// Expanded path of the evaluation history file, if enabled.
    pub fn results_log_path(&self) -> Option<PathBuf> {
        let raw = self.settings.results_log.trim();
        if raw.is_empty() {
            return None;
        }
        Some(PathBuf::from(shellexpand::tilde(raw).into_owned()))
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses() {
        let config = Config::default_config();
        assert_eq!(config.builtins.builders, vec!["muppet", "env", "sys"]);
        assert_eq!(config.builtins.evaluators, vec!["numeric", "regex"]);
        assert!(config.env.allow.is_empty());
    }

    #[test]
    fn default_settings() {
        let config = Config::default_config();
        assert!(!config.settings.unavailable_is_error);
        assert_eq!(config.log_level(), LevelFilter::Warn);
        assert!(config.results_log_path().is_some());
    }

    #[test]
    fn results_log_tilde_expanded() {
        let config = Config::default_config();
        let path = config.results_log_path().unwrap();
        assert!(!path.to_string_lossy().starts_with('~'));
        assert!(path.ends_with(".local/share/muppet/evaluations.log"));
    }

    #[test]
    fn empty_results_log_disables_history() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [settings]
            results_log = ""
        "#,
        );
        assert!(config.results_log_path().is_none());
    }

    #[test]
    fn unknown_log_level_falls_back() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [settings]
            log_level = "chatty"
        "#,
        );
        assert_eq!(config.log_level(), LevelFilter::Warn);
        config.apply_overlay_str(
            r#"
            [settings]
            log_level = "debug"
        "#,
        );
        assert_eq!(config.log_level(), LevelFilter::Debug);
    }

    // ── Merge semantics ──

    #[test]
    fn overlay_removes_builtin() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [builtins]
            remove_builders = ["env"]
        "#,
        );
        assert_eq!(config.builtins.builders, vec!["muppet", "sys"]);
        assert_eq!(config.builtins.evaluators, vec!["numeric", "regex"]);
    }

    #[test]
    fn overlay_replace_evaluators() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [builtins]
            replace = true
            builders = ["muppet"]
        "#,
        );
        assert_eq!(config.builtins.builders, vec!["muppet"]);
        assert!(config.builtins.evaluators.is_empty());
    }

    #[test]
    fn overlay_env_allow_no_duplicates() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [env]
            allow = ["HOME", "PATH", "HOME"]
        "#,
        );
        assert_eq!(config.env.allow, vec!["HOME", "PATH"]);
    }

    #[test]
    fn overlay_strict_unavailable() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [settings]
            unavailable_is_error = true
        "#,
        );
        assert!(config.settings.unavailable_is_error);
    }

    #[test]
    fn empty_overlay_changes_nothing() {
        let original = Config::default_config();
        let mut config = Config::default_config();
        config.apply_overlay_str("");
        assert_eq!(config.builtins.builders, original.builtins.builders);
        assert_eq!(config.settings.log_level, original.settings.log_level);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[env]\nallow = [\"HOME\"]\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.env.allow, vec!["HOME"]);
    }

    #[test]
    fn load_from_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[env\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(MuppetError::Config(_))
        ));
    }
}
