//! LED controller abstraction.

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::Led;

/// Trait for LED hardware implementations.
///
/// Implementors only provide [`set_led`](LedController::set_led);
/// [`apply_color`](LedController::apply_color) writes a whole color in order.
///
/// # Example
///
/// ```no_run
/// use templed::config::Led;
/// use templed::led_controller::LedController;
/// use anyhow::Result;
///
/// #[derive(Debug)]
/// struct Console;
///
/// #[async_trait::async_trait]
/// impl LedController for Console {
///     async fn set_led(&self, led: &Led) -> Result<()> {
///         println!("{} <- {}", led.dev, led.brightness);
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait LedController: Send + Sync + core::fmt::Debug {
    /// Writes one brightness value to one device.
    async fn set_led(&self, led: &Led) -> Result<()>;

    /// Applies every LED of a color in order.
    ///
    /// Stops at the first failing device. Devices already written are left
    /// as they are.
    async fn apply_color(&self, leds: &[Led]) -> Result<()> {
        for led in leds {
            self.set_led(led)
                .await
                .with_context(|| format!("unable to change led {:?}", led.dev))?;
        }
        Ok(())
    }
}
