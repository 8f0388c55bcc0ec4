//! # templed
//!
//! A Linux daemon that reflects a thermal zone temperature on LED class
//! devices.
//!
//! ## Features
//!
//! - **Threshold Colors**: Temperature buckets mapped to named LED colors
//! - **Change Detection**: LEDs are written only when the color changes
//! - **Sensor Fallback**: Unreadable sensors switch to a fallback color
//! - **Graceful Shutdown**: Fallback color restored on exit, with a bounded wait
//! - **Layered Config**: Built-in defaults overlaid by YAML files
//!
//! ## Architecture
//!
//! - [`Watcher`](watcher::Watcher) - Periodic sync loop and state tracking
//! - [`ThresholdTable`](thresholds::ThresholdTable) - Temperature to color resolution
//! - [`TemperatureSensor`](sensors::TemperatureSensor) and
//!   [`LedController`](led_controller::LedController) - Hardware seams
//! - [`Application`](application::Application) - Signal handling and lifecycle
//!
//! ## Example
//!
//! ```no_run
//! use templed::{application::Application, config::Config};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(&[])?;
//!     Application::builder()
//!         .with_config(config)
//!         .build()?
//!         .run()
//!         .await
//! }
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod drivers;
pub mod led_controller;
pub mod sensors;
pub mod temperature_report;
pub mod temperature_sensors;
pub mod thresholds;
pub mod watcher;
