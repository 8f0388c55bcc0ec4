//! Periodic temperature watcher driving the LED color.
//!
//! The watcher samples its sensor on a fixed period, resolves the reading to
//! a [`ColorState`] and writes the LEDs only when the resolved color differs
//! from the one already applied. On shutdown the fallback color is written
//! unconditionally so the LEDs are left in a known state.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use log::{debug, error, info, warn};
use tokio::{
    sync::watch,
    time::{Instant, MissedTickBehavior, interval_at, timeout},
};
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    drivers::SysfsLeds,
    led_controller::LedController,
    sensors::TemperatureSensor,
    temperature_sensors::ThermalZoneSensor,
    thresholds::{ColorState, ThresholdTable},
};

/// Lifecycle of a [`Watcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherPhase {
    /// Constructed, run loop not started.
    Idle,
    /// Initial sync done, syncing on every tick.
    Running,
    /// Cancellation observed, fallback color being restored.
    Stopping,
    /// Run loop finished, successfully or not.
    Stopped,
}

/// Snapshot of the watcher published after every state change.
#[derive(Debug, Clone, PartialEq)]
pub struct WatcherStatus {
    pub phase: WatcherPhase,
    /// Name of the color currently applied, empty before the first write.
    pub color: String,
    /// Last successful reading, `None` if the last read failed.
    pub temperature: Option<f32>,
    /// Total number of failed sensor reads.
    pub sensor_failures: u64,
}

impl Default for WatcherStatus {
    fn default() -> Self {
        Self {
            phase: WatcherPhase::Idle,
            color: String::new(),
            temperature: None,
            sensor_failures: 0,
        }
    }
}

/// Temperature to LED color synchronizer.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use templed::{config::Config, watcher::Watcher};
///
/// # async fn example() -> anyhow::Result<()> {
/// let watcher = Watcher::from_config(&Config::default())?;
/// let handle = watcher.handle();
///
/// let task = tokio::spawn(watcher.run());
/// // ...
/// handle.shutdown(Duration::from_secs(60)).await;
/// task.await??;
/// # Ok(())
/// # }
/// ```
pub struct Watcher {
    current: String,
    table: ThresholdTable,
    sensor: Box<dyn TemperatureSensor>,
    leds: Box<dyn LedController>,
    period: Duration,
    cancel_token: CancellationToken,
    status: watch::Sender<WatcherStatus>,
}

impl Watcher {
    /// Creates a watcher using the sysfs thermal zone and LED class devices.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config,
            Box::new(ThermalZoneSensor::new(config.thermal_zone)),
            Box::new(SysfsLeds::new()),
        )
    }

    /// Creates a watcher with explicit sensor and LED backends.
    ///
    /// Fails if a threshold references an unknown color, if no threshold
    /// other than the fallback is configured, or if the period is zero.
    pub fn new(
        config: &Config,
        sensor: Box<dyn TemperatureSensor>,
        leds: Box<dyn LedController>,
    ) -> Result<Self> {
        let table = ThresholdTable::build(&config.temps, &config.colors)?;

        let period = config.period();
        if period.is_zero() {
            bail!("watch period must be greater than zero");
        }

        let (status, _) = watch::channel(WatcherStatus::default());

        Ok(Self {
            current: String::new(),
            table,
            sensor,
            leds,
            period,
            cancel_token: CancellationToken::new(),
            status,
        })
    }

    /// Returns a handle for shutdown and status observation.
    pub fn handle(&self) -> WatcherHandle {
        WatcherHandle {
            cancel_token: self.cancel_token.clone(),
            status: self.status.subscribe(),
        }
    }

    /// Name of the color last applied.
    pub fn current_color(&self) -> &str {
        &self.current
    }

    /// Runs until cancelled through a [`WatcherHandle`].
    ///
    /// Returns an error only if the initial sync fails. Failures on later
    /// ticks are logged and retried on the next tick.
    pub async fn run(mut self) -> Result<()> {
        let result = self.watch().await;
        self.status
            .send_modify(|status| status.phase = WatcherPhase::Stopped);
        result
    }

    async fn watch(&mut self) -> Result<()> {
        info!("Starting initial LED sync");
        self.sync_temp().await.context("initial sync failed")?;

        info!(
            "Starting periodic watcher on {} every {:?}",
            self.sensor.key(),
            self.period
        );
        self.status
            .send_modify(|status| status.phase = WatcherPhase::Running);

        let cancel_token = self.cancel_token.clone();
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel_token.cancelled() => {
                    info!("Watcher cancelled");
                    break;
                }
                _instant = ticker.tick() => {
                    if let Err(e) = self.sync_temp().await {
                        error!("Sync failed: {e:#}");
                    }
                }
            }
        }

        self.status
            .send_modify(|status| status.phase = WatcherPhase::Stopping);

        let fallback = self.table.fallback().clone();
        if let Err(e) = self.apply(&fallback, 0.0).await {
            error!("Failed to restore fallback color: {e:#}");
        }

        Ok(())
    }

    /// Performs one read, resolve, compare and apply cycle.
    ///
    /// Does nothing if the resolved color is already applied.
    pub async fn sync_temp(&mut self) -> Result<()> {
        let (target, temp) = self.target_state().await;
        if target.name == self.current {
            debug!("Nothing changed at {temp:.2}°C");
            return Ok(());
        }

        let target = target.clone();
        self.apply(&target, temp).await
    }

    async fn target_state(&self) -> (&ColorState, f32) {
        match self.sensor.read_temperature().await {
            Ok(temp) => {
                self.status
                    .send_modify(|status| status.temperature = Some(temp));
                (self.table.resolve(temp), temp)
            }
            Err(e) => {
                error!("Unable to get temp, fallback color will be used: {e:#}");
                self.status.send_modify(|status| {
                    status.temperature = None;
                    status.sensor_failures += 1;
                });
                (self.table.fallback(), 0.0)
            }
        }
    }

    async fn apply(&mut self, state: &ColorState, temp: f32) -> Result<()> {
        if state.is_unset() {
            return Ok(());
        }

        self.leds.apply_color(&state.leds).await?;

        info!(
            "LED changed to {:?} (temp: {temp:.2}°C, max_temp: {})",
            state.name, state.max_temp
        );
        self.current.clone_from(&state.name);
        self.status
            .send_modify(|status| status.color.clone_from(&state.name));
        Ok(())
    }
}

/// Cancellation and observation side of a running [`Watcher`].
#[derive(Debug, Clone)]
pub struct WatcherHandle {
    cancel_token: CancellationToken,
    status: watch::Receiver<WatcherStatus>,
}

impl WatcherHandle {
    /// Latest published status.
    pub fn status(&self) -> WatcherStatus {
        self.status.borrow().clone()
    }

    /// Receiver notified on every status change.
    pub fn subscribe(&self) -> watch::Receiver<WatcherStatus> {
        self.status.clone()
    }

    /// Requests cancellation without waiting.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Requests cancellation and waits up to `wait` for the run loop to stop.
    ///
    /// Returns `false` if the watcher was still running when `wait` elapsed.
    pub async fn shutdown(&self, wait: Duration) -> bool {
        self.cancel();

        let mut status = self.status.clone();
        // A closed channel means the watcher was dropped, which also ends it.
        let stopped = timeout(
            wait,
            status.wait_for(|status| status.phase == WatcherPhase::Stopped),
        )
        .await
        .is_ok();

        if !stopped {
            warn!("Watcher did not stop within {wait:?}");
        }
        stopped
    }
}
