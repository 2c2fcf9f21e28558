use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use monsetup_common::error::ConfigError;
use monsetup_common::model::FALLBACK_RESOLUTION;
use monsetup_common::{
    DesktopToken, MonitorMode, MonsetupError, Position, Resolution, Result, Rotation,
};

/// Application name -> placement rule.
pub type RuleSet = BTreeMap<String, RuleConfig>;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub monitors: BTreeMap<String, MonitorConfig>,
    #[serde(default)]
    pub bspc_rules_single_monitor: Option<RuleSet>,
    #[serde(default)]
    pub bspc_rules_dual_monitor: Option<RuleSet>,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Explicit settings for one output. Every field is optional; the accessors
/// below supply the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub resolution: Option<Resolution>,
    #[serde(default, alias = "rotate")]
    pub rotation: Option<Rotation>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub main: Option<bool>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub workspaces: Option<Vec<DesktopToken>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleConfig {
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub desktop: Option<String>,
    #[serde(default, deserialize_with = "deserialize_follow")]
    pub follow: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    #[serde(default = "default_hidpi_scale")]
    pub hidpi_scale: f64,
    #[serde(default = "default_panel_prefixes")]
    pub panel_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub launcher: Option<PathBuf>,
    #[serde(default = "default_shell")]
    pub shell: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Str(String),
}

// `main = 1` and `main = true` both appear in existing configs
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Scalar::deserialize(deserializer)? {
        Scalar::Bool(b) => Ok(Some(b)),
        Scalar::Int(0) => Ok(Some(false)),
        Scalar::Int(1) => Ok(Some(true)),
        Scalar::Int(n) => Err(serde::de::Error::custom(format!("invalid main flag: {}", n))),
        Scalar::Str(s) => Err(serde::de::Error::custom(format!("invalid main flag: {:?}", s))),
    }
}

fn deserialize_scalar<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Scalar::deserialize(deserializer)? {
        Scalar::Int(n) => Ok(Some(n.to_string())),
        Scalar::Str(s) => Ok(Some(s)),
        Scalar::Bool(b) => Err(serde::de::Error::custom(format!("invalid desktop: {}", b))),
    }
}

fn deserialize_follow<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Scalar::deserialize(deserializer)? {
        Scalar::Bool(true) => Ok(Some("on".to_string())),
        Scalar::Bool(false) => Ok(Some("off".to_string())),
        Scalar::Str(s) => Ok(Some(s)),
        Scalar::Int(n) => Err(serde::de::Error::custom(format!("invalid follow value: {}", n))),
    }
}

// Default values
fn default_hidpi_scale() -> f64 {
    0.5
}

fn default_panel_prefixes() -> Vec<String> {
    vec!["eDP".to_string(), "LVDS".to_string()]
}

fn default_shell() -> String {
    "bash".to_string()
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            hidpi_scale: default_hidpi_scale(),
            panel_prefixes: default_panel_prefixes(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            launcher: None,
            shell: default_shell(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(MonsetupError::Config(ConfigError::NoConfigDir))?
            .join("monsetup");

        Ok(config_dir.join("config.toml"))
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MonsetupError::Config(ConfigError::FileRead {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "File not found"),
            }));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| MonsetupError::Config(ConfigError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }))?;

        let config = Self::from_toml_str(&content)?;
        log::info!(
            "Loaded configuration from {:?} ({} monitor entries)",
            path,
            config.monitors.len()
        );
        Ok(config)
    }

    /// Parse and validate a configuration document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| MonsetupError::Config(ConfigError::TomlParse {
                message: e.to_string(),
            }))?;

        config.validate()?;
        Ok(config)
    }

    pub fn monitor(&self, id: &str) -> Option<&MonitorConfig> {
        self.monitors.get(id)
    }

    /// Rules for `mode`; `None` when the section is absent.
    pub fn rules(&self, mode: MonitorMode) -> Option<&RuleSet> {
        match mode {
            MonitorMode::Single => self.bspc_rules_single_monitor.as_ref(),
            MonitorMode::Dual => self.bspc_rules_dual_monitor.as_ref(),
        }
    }

    /// Every application named in either rule set.
    pub fn rule_apps(&self) -> BTreeSet<&str> {
        [&self.bspc_rules_single_monitor, &self.bspc_rules_dual_monitor]
            .into_iter()
            .flatten()
            .flat_map(|rules| rules.keys().map(String::as_str))
            .collect()
    }

    fn validate(&self) -> Result<()> {
        self.detection.validate()?;
        self.session.validate()?;

        for (monitor_name, monitor_config) in &self.monitors {
            monitor_config.validate()
                .map_err(|e| MonsetupError::Config(ConfigError::Validation {
                    message: format!("Monitor '{}': {}", monitor_name, e),
                }))?;
        }

        let rule_sets = [
            ("bspc_rules_single_monitor", &self.bspc_rules_single_monitor),
            ("bspc_rules_dual_monitor", &self.bspc_rules_dual_monitor),
        ];
        for (section, rules) in rule_sets {
            for (app, rule) in rules.iter().flatten() {
                if app.trim().is_empty() {
                    return Err(MonsetupError::Config(ConfigError::Validation {
                        message: format!("{}: application name cannot be empty", section),
                    }));
                }
                if rule.desktop.as_deref().is_some_and(|d| d.trim().is_empty()) {
                    return Err(MonsetupError::Config(ConfigError::InvalidValue {
                        field: format!("{}.{}.desktop", section, app),
                        value: String::new(),
                    }));
                }
            }
        }

        let claimed: Vec<&String> = self.monitors.iter()
            .filter(|(_, m)| m.is_main())
            .map(|(name, _)| name)
            .collect();
        if claimed.len() > 1 {
            // Only a problem when both are connected; the planner picks the first.
            log::warn!("Several monitors claim main = true: {:?}", claimed);
        }

        Ok(())
    }
}

impl MonitorConfig {
    /// Configured resolution, or 1920x1080.
    pub fn resolution(&self) -> Resolution {
        self.resolution.unwrap_or(FALLBACK_RESOLUTION)
    }

    /// Configured rotation, or `normal`.
    pub fn rotation(&self) -> Rotation {
        self.rotation.unwrap_or_default()
    }

    pub fn is_main(&self) -> bool {
        self.main.unwrap_or(false)
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn workspaces(&self) -> Option<&[DesktopToken]> {
        self.workspaces.as_deref()
    }

    fn validate(&self) -> Result<()> {
        if let Some(workspaces) = &self.workspaces {
            if workspaces.is_empty() {
                return Err(MonsetupError::Config(ConfigError::InvalidValue {
                    field: "workspaces".to_string(),
                    value: "[]".to_string(),
                }));
            }

            let mut seen = HashSet::new();
            for desktop in workspaces {
                if !seen.insert(desktop) {
                    return Err(MonsetupError::Config(ConfigError::InvalidValue {
                        field: "workspaces".to_string(),
                        value: format!("duplicate desktop {}", desktop),
                    }));
                }
            }
        }

        Ok(())
    }
}

impl DetectionConfig {
    /// Built-in laptop panels are recognised by connector name prefix.
    pub fn is_internal_panel(&self, id: &str) -> bool {
        self.panel_prefixes.iter().any(|prefix| id.starts_with(prefix.as_str()))
    }

    fn validate(&self) -> Result<()> {
        if !self.hidpi_scale.is_finite() || self.hidpi_scale <= 0.0 || self.hidpi_scale > 1.0 {
            return Err(MonsetupError::Config(ConfigError::InvalidValue {
                field: "detection.hidpi_scale".to_string(),
                value: self.hidpi_scale.to_string(),
            }));
        }

        if self.panel_prefixes.iter().any(|p| p.is_empty()) {
            return Err(MonsetupError::Config(ConfigError::InvalidValue {
                field: "detection.panel_prefixes".to_string(),
                value: "\"\"".to_string(),
            }));
        }

        Ok(())
    }
}

impl SessionConfig {
    /// Configured launcher, or `polybar/launch.sh` under the user config dir.
    pub fn launcher_path(&self) -> Result<PathBuf> {
        match &self.launcher {
            Some(path) => Ok(path.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join("polybar").join("launch.sh"))
                .ok_or(MonsetupError::Config(ConfigError::NoConfigDir)),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.shell.trim().is_empty() {
            return Err(MonsetupError::Config(ConfigError::InvalidValue {
                field: "session.shell".to_string(),
                value: self.shell.clone(),
            }));
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use std::fs;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert!(config.monitors.is_empty());
        assert!(config.rules(MonitorMode::Single).is_none());
        assert_eq!(config.detection.hidpi_scale, 0.5);
        assert_eq!(config.session.shell, "bash");
    }

    #[test]
    fn test_rules_parse() {
        let config = Config::from_toml_str(r#"
            [bspc_rules_single_monitor.Firefox]
            desktop = 2
            follow = true

            [bspc_rules_single_monitor.mpv]
            follow = "off"

            [bspc_rules_dual_monitor.Spotify]
            desktop = "9"
        "#).unwrap();

        let single = config.rules(MonitorMode::Single).unwrap();
        assert_eq!(single["Firefox"].desktop.as_deref(), Some("2"));
        assert_eq!(single["Firefox"].follow.as_deref(), Some("on"));
        assert_eq!(single["mpv"].desktop, None);
        assert_eq!(single["mpv"].follow.as_deref(), Some("off"));

        let dual = config.rules(MonitorMode::Dual).unwrap();
        assert_eq!(dual["Spotify"].desktop.as_deref(), Some("9"));
        assert_eq!(dual["Spotify"].follow, None);

        let apps: Vec<&str> = config.rule_apps().into_iter().collect();
        assert_eq!(apps, vec!["Firefox", "Spotify", "mpv"]);
    }

    #[test]
    fn test_detection_validation() {
        let result = Config::from_toml_str("[detection]\nhidpi_scale = 0.0");
        match result {
            Err(MonsetupError::Config(ConfigError::InvalidValue { field, .. })) => {
                assert_eq!(field, "detection.hidpi_scale");
            }
            _ => panic!("Expected ConfigError::InvalidValue"),
        }

        assert!(Config::from_toml_str("[detection]\nhidpi_scale = 1.5").is_err());
        assert!(Config::from_toml_str("[detection]\npanel_prefixes = [\"\"]").is_err());
    }

    #[test]
    fn test_internal_panel_prefixes() {
        let detection = DetectionConfig::default();
        assert!(detection.is_internal_panel("eDP-1"));
        assert!(detection.is_internal_panel("eDP1"));
        assert!(detection.is_internal_panel("LVDS-1"));
        assert!(!detection.is_internal_panel("HDMI-1"));
        assert!(!detection.is_internal_panel("DP-1"));
    }

    #[test]
    fn test_session_launcher() {
        let config = Config::from_toml_str(r#"
            [session]
            launcher = "/opt/bar/start.sh"
            shell = "sh"
        "#).unwrap();
        assert_eq!(config.session.launcher_path().unwrap(), PathBuf::from("/opt/bar/start.sh"));
        assert_eq!(config.session.shell, "sh");

        assert!(Config::from_toml_str("[session]\nshell = \"\"").is_err());
    }

    #[test]
    fn test_config_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let config_content = r#"
            [monitors.eDP-1]
            resolution = "1920x1200"
            rotation = "normal"
            workspaces = [6, 7, 8, 9, 0]

            [monitors.HDMI-1]
            resolution = "2560x1440"
            main = true
            position = "left"
            workspaces = [1, 2, 3, 4, 5]
        "#;

        fs::write(&config_path, config_content).unwrap();

        let config = Config::load_from_path(&config_path).unwrap();
        let hdmi = config.monitor("HDMI-1").unwrap();
        assert!(hdmi.is_main());
        assert_eq!(hdmi.resolution(), Resolution::new(2560, 1440));
        assert_eq!(hdmi.position(), Some(Position::Left));
        assert!(!config.monitor("eDP-1").unwrap().is_main());
    }

    #[test]
    fn test_config_load_nonexistent_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&config_path);
        assert!(result.is_err());

        match result.unwrap_err() {
            MonsetupError::Config(ConfigError::FileRead { .. }) => {},
            _ => panic!("Expected ConfigError::FileRead"),
        }
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("invalid.toml");

        let invalid_content = r#"
            [monitors.eDP-1
            resolution = "1920x1080"
        "#;

        fs::write(&config_path, invalid_content).unwrap();

        let result = Config::load_from_path(&config_path);
        assert!(result.is_err());

        match result.unwrap_err() {
            MonsetupError::Config(ConfigError::TomlParse { .. }) => {},
            _ => panic!("Expected ConfigError::TomlParse"),
        }
    }
}
