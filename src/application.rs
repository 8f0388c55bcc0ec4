//! Application entry point and builder pattern implementation.

use std::{future::Future, time::Duration};

use anyhow::{Context, Result};
use log::{error, info, warn};
use tokio::signal::unix::{SignalKind, signal};

use crate::{config::Config, watcher::Watcher};

/// How long a signal-triggered shutdown waits for the fallback color.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(60);

/// Runs the watcher in the background until a termination signal arrives
/// or the watcher fails.
///
/// # Example
///
/// ```no_run
/// use templed::application::Application;
/// use templed::config::Config;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::load(&[])?;
/// Application::builder()
///     .with_config(config)
///     .build()?
///     .run()
///     .await
/// # }
/// ```
pub struct Application {
    config: Config,
    shutdown_timeout: Duration,
}

impl Application {
    /// Creates a new ApplicationBuilder for constructing Application instances.
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    /// Builds the sysfs watcher and runs it until SIGINT or SIGTERM.
    pub async fn run(&self) -> Result<()> {
        let watcher = Watcher::from_config(&self.config).context("unable to create watcher")?;
        self.run_watcher(watcher, shutdown_signal()).await
    }

    /// Runs `watcher` until `shutdown` resolves or the watcher stops by itself.
    ///
    /// A watcher error (a failed initial sync) is returned as is. On shutdown
    /// the watcher is given [`Application`]'s shutdown timeout to restore the
    /// fallback color.
    pub async fn run_watcher<F>(&self, watcher: Watcher, shutdown: F) -> Result<()>
    where
        F: Future<Output = Result<()>>,
    {
        let handle = watcher.handle();
        let mut task = tokio::spawn(watcher.run());

        tokio::select! {
            result = shutdown => {
                if let Err(e) = result {
                    if !handle.shutdown(self.shutdown_timeout).await {
                        task.abort();
                    }
                    return Err(e).context("failed to listen for shutdown signal");
                }
                info!("Shutting down gracefully by signal");

                if handle.shutdown(self.shutdown_timeout).await {
                    match task.await {
                        Ok(Ok(())) => info!("Watcher stopped"),
                        Ok(Err(e)) => error!("Watcher failed during shutdown: {e:#}"),
                        Err(e) => error!("Watcher task panicked: {e}"),
                    }
                } else {
                    warn!("Shutdown timeout exceeded, leaving watcher behind");
                    task.abort();
                }
                Ok(())
            }
            joined = &mut task => {
                joined
                    .context("watcher task panicked")?
                    .context("start failed")
            }
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

async fn shutdown_signal() -> Result<()> {
    let mut terminate = signal(SignalKind::terminate())?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        _ = terminate.recv() => {}
    }
    Ok(())
}

/// Builder pattern for creating Application instances.
pub struct ApplicationBuilder {
    config: Option<Config>,
    shutdown_timeout: Duration,
}

impl ApplicationBuilder {
    fn new() -> Self {
        Self {
            config: None,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Sets the configuration for the application.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides how long shutdown waits for the watcher.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Builds the Application instance with the provided configuration.
    pub fn build(self) -> Result<Application> {
        let config = self
            .config
            .ok_or_else(|| anyhow::anyhow!("Configuration is required"))?;
        config.validate()?;

        Ok(Application {
            config,
            shutdown_timeout: self.shutdown_timeout,
        })
    }
}
