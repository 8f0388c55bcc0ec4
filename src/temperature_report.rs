//! One-shot and periodic temperature printing for the `temp` command.

use std::{io::Write, time::Duration};

use anyhow::Result;
use chrono::Local;
use log::{error, info};
use tokio::time::{Instant, interval_at};
use tokio_util::sync::CancellationToken;

use crate::sensors::TemperatureSensor;

/// Prints one reading as `HH:MM:SS\t<temp>℃`.
pub async fn print_temperature<W: Write>(
    sensor: &dyn TemperatureSensor,
    out: &mut W,
) -> Result<()> {
    let temp = sensor.read_temperature().await?;
    writeln!(out, "{}\t{temp:.2}\u{2103}", Local::now().format("%H:%M:%S"))?;
    Ok(())
}

/// Prints a reading now and then every `period` until cancelled.
///
/// Only the first read is fatal. Later failures are logged and skipped.
pub async fn monitor_temperature<W: Write>(
    sensor: &dyn TemperatureSensor,
    period: Duration,
    out: &mut W,
    cancel_token: CancellationToken,
) -> Result<()> {
    print_temperature(sensor, out).await?;

    let mut ticker = interval_at(Instant::now() + period, period);
    loop {
        tokio::select! {
            biased;
            () = cancel_token.cancelled() => {
                info!("Temperature monitor cancelled");
                break;
            }
            _instant = ticker.tick() => {
                if let Err(e) = print_temperature(sensor, out).await {
                    error!("Unable to read temp: {e:#}");
                }
            }
        }
    }
    Ok(())
}
