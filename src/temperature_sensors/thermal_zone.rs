use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::sensors::TemperatureSensor;

const THERMAL_ROOT: &str = "/sys/class/thermal";

/// Kernel thermal zone exposed through sysfs.
///
/// The `temp` attribute holds an unsigned integer in millidegrees Celsius.
#[derive(Debug, Clone)]
pub struct ThermalZoneSensor {
    zone: u32,
    path: PathBuf,
}

impl ThermalZoneSensor {
    pub fn new(zone: u32) -> Self {
        Self::with_root(THERMAL_ROOT, zone)
    }

    /// Reads `<root>/thermal_zone<zone>/temp` instead of the sysfs default.
    pub fn with_root(root: impl AsRef<Path>, zone: u32) -> Self {
        Self {
            zone,
            path: root
                .as_ref()
                .join(format!("thermal_zone{zone}"))
                .join("temp"),
        }
    }
}

#[async_trait]
impl TemperatureSensor for ThermalZoneSensor {
    fn key(&self) -> String {
        format!("thermal_zone{}", self.zone)
    }

    async fn read_temperature(&self) -> Result<f32> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("unable to read sys temp {}", self.path.display()))?;

        parse_millidegrees(&raw)
    }
}

fn parse_millidegrees(raw: &str) -> Result<f32> {
    let raw = raw.trim();
    let millis: u32 = raw
        .parse()
        .with_context(|| format!("invalid temp returned {raw:?}"))?;

    Ok(millis as f32 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn zone_fixture(zone: u32, content: &str) -> TempDir {
        let root = TempDir::new().unwrap();
        let dir = root.path().join(format!("thermal_zone{zone}"));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("temp"), content).unwrap();
        root
    }

    #[test]
    fn parses_millidegrees_with_newline() {
        assert_eq!(parse_millidegrees("48250\n").unwrap(), 48.25);
        assert_eq!(parse_millidegrees("0").unwrap(), 0.0);
    }

    #[test]
    fn rejects_negative_and_garbage_values() {
        assert!(parse_millidegrees("-1000").is_err());
        assert!(parse_millidegrees("hot").is_err());
        assert!(parse_millidegrees("").is_err());
    }

    #[tokio::test]
    async fn reads_zone_from_sysfs_root() {
        let root = zone_fixture(3, "61000\n");
        let sensor = ThermalZoneSensor::with_root(root.path(), 3);

        assert_eq!(sensor.key(), "thermal_zone3");
        assert_eq!(sensor.read_temperature().await.unwrap(), 61.0);
    }

    #[tokio::test]
    async fn missing_zone_is_an_error() {
        let root = zone_fixture(0, "40000");
        let sensor = ThermalZoneSensor::with_root(root.path(), 7);

        let err = sensor.read_temperature().await.unwrap_err();
        assert!(err.to_string().contains("unable to read sys temp"));
    }

    #[tokio::test]
    async fn malformed_content_is_an_error() {
        let root = zone_fixture(0, "n/a\n");
        let sensor = ThermalZoneSensor::with_root(root.path(), 0);

        let err = sensor.read_temperature().await.unwrap_err();
        assert!(err.to_string().contains("invalid temp returned \"n/a\""));
    }
}
