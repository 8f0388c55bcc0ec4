//! Configuration management for the templed daemon.
//!
//! Handles loading and parsing of YAML configuration files that define
//! the thermal zone, polling period, LED colors and temperature thresholds.
//! Every field has a built-in default, so running without any file is valid.

use anyhow::{Context, Result, bail};
use log::info;
use serde::Deserialize;
use std::{
    collections::{BTreeMap, HashMap},
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// Threshold key reserved for the fallback color.
pub const FALLBACK_TEMP: i32 = 0;

/// Single LED channel assignment inside a color.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Led {
    /// LED class device name under `/sys/class/leds` (e.g. `surround:red`).
    pub dev: String,

    /// Raw brightness value written to the device.
    pub brightness: u32,
}

impl Led {
    pub fn new(dev: impl Into<String>, brightness: u32) -> Self {
        Self {
            dev: dev.into(),
            brightness,
        }
    }
}

/// Main configuration structure for the templed daemon.
///
/// # Example
///
/// ```yaml
/// thermal_zone: 0
/// period_seconds: 30
///
/// colors:
///   fallback:
///     - dev: "surround:red"
///       brightness: 0
///   hot:
///     - dev: "surround:red"
///       brightness: 1
///
/// temps:
///   0: fallback
///   1000: hot
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Index of the thermal zone to sample.
    pub thermal_zone: u32,

    /// Polling interval in whole seconds.
    ///
    /// Files may spell it `period`. Only an integer is accepted, so
    /// `period: 10s` is rejected as invalid config.
    pub period_seconds: u64,

    /// Named colors, each an ordered list of LED assignments.
    pub colors: HashMap<String, Vec<Led>>,

    /// Upper temperature bound (°C) to color name. The `0` key names the fallback color.
    pub temps: BTreeMap<i32, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thermal_zone: defaults::thermal_zone(),
            period_seconds: defaults::period_seconds(),
            colors: defaults::colors(),
            temps: defaults::temps(),
        }
    }
}

/// Partial configuration read from a single file.
///
/// Scalars replace the current value, maps are merged key by key, so a file
/// may redefine one color without repeating the others.
#[derive(Debug, Default, Deserialize)]
struct ConfigOverlay {
    thermal_zone: Option<u32>,
    #[serde(alias = "period")]
    period_seconds: Option<u64>,
    colors: Option<HashMap<String, Vec<Led>>>,
    temps: Option<BTreeMap<i32, String>>,
}

impl Config {
    /// Loads configuration by overlaying each file onto the defaults in order.
    ///
    /// When no path is given, the standard locations are searched and the
    /// built-in defaults are used if none exists.
    pub fn load(paths: &[PathBuf]) -> Result<Self> {
        let located;
        let paths = if paths.is_empty() {
            located = locate_config().into_iter().collect::<Vec<_>>();
            &located[..]
        } else {
            paths
        };

        let mut config = Self::default();
        for path in paths {
            config
                .overlay_file(path)
                .with_context(|| format!("unable to load config {:?}", path.display()))?;
        }

        if paths.is_empty() {
            info!("No config file found, using built-in defaults");
        }

        config.validate()?;
        Ok(config)
    }

    /// Polling interval as a [`Duration`].
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_seconds)
    }

    /// Validates scalar settings. Color and threshold consistency is checked
    /// when the threshold table is built.
    pub fn validate(&self) -> Result<()> {
        if self.period_seconds == 0 {
            bail!("period_seconds must be greater than zero");
        }
        Ok(())
    }

    fn overlay_file(&mut self, path: &Path) -> Result<()> {
        info!("Loading config from: {}", path.display());
        let content = fs::read_to_string(path).context("unable to open config file")?;
        self.overlay_str(&content)
    }

    fn overlay_str(&mut self, content: &str) -> Result<()> {
        // An empty document deserializes to unit, not to an empty mapping.
        if content.trim().is_empty() {
            return Ok(());
        }

        let overlay: ConfigOverlay = serde_yaml::from_str(content).context("invalid config")?;

        if let Some(zone) = overlay.thermal_zone {
            self.thermal_zone = zone;
        }
        if let Some(period) = overlay.period_seconds {
            self.period_seconds = period;
        }
        if let Some(colors) = overlay.colors {
            self.colors.extend(colors);
        }
        if let Some(temps) = overlay.temps {
            self.temps.extend(temps);
        }
        Ok(())
    }
}

fn locate_config() -> Option<PathBuf> {
    if let Ok(env_path) = env::var("TEMPLED_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    let etc = Path::new("/etc/templed/config.yml");
    etc.exists().then(|| etc.to_path_buf())
}

mod defaults {
    use super::Led;
    use std::collections::{BTreeMap, HashMap};

    const BLUE: &str = "surround:blue";
    const GREEN: &str = "surround:green";
    const RED: &str = "surround:red";

    pub fn thermal_zone() -> u32 {
        0
    }

    /// Default polling interval in seconds.
    pub fn period_seconds() -> u64 {
        30
    }

    fn rgb(blue: u32, green: u32, red: u32) -> Vec<Led> {
        vec![Led::new(BLUE, blue), Led::new(GREEN, green), Led::new(RED, red)]
    }

    pub fn colors() -> HashMap<String, Vec<Led>> {
        HashMap::from([
            ("fallback".to_string(), rgb(0, 0, 0)),
            ("cool".to_string(), rgb(0, 1, 1)),
            ("warm".to_string(), rgb(1, 0, 1)),
            ("hot".to_string(), rgb(0, 0, 1)),
        ])
    }

    pub fn temps() -> BTreeMap<i32, String> {
        BTreeMap::from([
            (super::FALLBACK_TEMP, "fallback".to_string()),
            (50, "cool".to_string()),
            (60, "warm".to_string()),
            (1000, "hot".to_string()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // Helper function to create temporary config file
    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn default_config_matches_builtin_values() {
        let config = Config::default();

        assert_eq!(config.thermal_zone, 0);
        assert_eq!(config.period(), Duration::from_secs(30));
        assert_eq!(
            config.temps.values().cloned().collect::<Vec<_>>(),
            vec!["fallback", "cool", "warm", "hot"]
        );
        assert_eq!(
            config.temps.keys().copied().collect::<Vec<_>>(),
            vec![0, 50, 60, 1000]
        );
        assert_eq!(
            config.colors["warm"],
            vec![
                Led::new("surround:blue", 1),
                Led::new("surround:green", 0),
                Led::new("surround:red", 1),
            ]
        );
        assert!(config.colors["fallback"].iter().all(|l| l.brightness == 0));
    }

    #[test]
    fn config_load_valid_yaml() {
        let yaml_content = r#"
thermal_zone: 2
period_seconds: 5
colors:
  cool:
    - dev: "status:green"
      brightness: 255
temps:
  40: cool
"#;
        let temp_file = create_temp_config(yaml_content);

        let config = Config::load(&[temp_file.path().to_path_buf()]).unwrap();

        assert_eq!(config.thermal_zone, 2);
        assert_eq!(config.period_seconds, 5);
        assert_eq!(config.colors["cool"], vec![Led::new("status:green", 255)]);
        // Untouched defaults survive the overlay.
        assert!(config.colors.contains_key("hot"));
        assert_eq!(config.temps[&40], "cool");
        assert_eq!(config.temps[&1000], "hot");
    }

    #[test]
    fn config_files_overlay_in_order() {
        let first = create_temp_config("thermal_zone: 1\nperiod_seconds: 10\n");
        let second = create_temp_config("period: 15\ntemps:\n  1000: warm\n");

        let config = Config::load(&[
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ])
        .unwrap();

        assert_eq!(config.thermal_zone, 1);
        assert_eq!(config.period_seconds, 15);
        assert_eq!(config.temps[&1000], "warm");
    }

    #[test]
    fn empty_config_file_keeps_defaults() {
        let temp_file = create_temp_config("");

        let config = Config::load(&[temp_file.path().to_path_buf()]).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn missing_config_file_is_reported_with_path() {
        let err = Config::load(&[PathBuf::from("/nonexistent/templed.yml")]).unwrap_err();

        assert!(format!("{err:#}").contains("/nonexistent/templed.yml"));
    }

    #[test]
    fn invalid_yaml_is_rejected() {
        let temp_file = create_temp_config("temps: [not, a, map]\n");

        let err = Config::load(&[temp_file.path().to_path_buf()]).unwrap_err();

        assert!(format!("{err:#}").contains("invalid config"));
    }

    #[test]
    fn period_accepts_whole_seconds_only() {
        let seconds = create_temp_config("period: 45\n");
        let config = Config::load(&[seconds.path().to_path_buf()]).unwrap();
        assert_eq!(config.period(), Duration::from_secs(45));

        let suffixed = create_temp_config("period: 10s\n");
        let err = Config::load(&[suffixed.path().to_path_buf()]).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("invalid config"));
        assert!(message.contains("period"));
    }

    #[test]
    fn zero_period_is_rejected() {
        let config = Config {
            period_seconds: 0,
            ..Default::default()
        };

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("period_seconds"));
    }
}
