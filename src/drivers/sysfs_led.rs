use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

use crate::{config::Led, led_controller::LedController};

pub const LEDS_ROOT: &str = "/sys/class/leds";

/// LED class devices driven through their `brightness` attribute.
#[derive(Debug, Clone)]
pub struct SysfsLeds {
    root: PathBuf,
}

impl SysfsLeds {
    pub fn new() -> Self {
        Self::with_root(LEDS_ROOT)
    }

    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn brightness_path(&self, dev: &str) -> PathBuf {
        self.root.join(dev).join("brightness")
    }
}

impl Default for SysfsLeds {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedController for SysfsLeds {
    async fn set_led(&self, led: &Led) -> Result<()> {
        let path = self.brightness_path(&led.dev);

        // The attribute must already exist; never create it.
        let mut file = OpenOptions::new()
            .write(true)
            .open(&path)
            .await
            .context("unable to open brightness control")?;

        file.write_all(led.brightness.to_string().as_bytes())
            .await
            .with_context(|| {
                format!("write to brightness control {:?} failed", path.display())
            })?;
        file.flush().await?;

        Ok(())
    }
}
