use std::{fs::File, io, process::ExitCode, time::Duration};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use daemonize::Daemonize;
use log::{LevelFilter, info};
use syslog::{BasicLogger, Facility, Formatter3164};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use templed::{
    application::Application,
    cli::{Cli, Command, StartArgs, TempArgs},
    config::Config,
    temperature_report,
    temperature_sensors::ThermalZoneSensor,
};

const DAEMON_LOG: &str = "/var/tmp/templed.log";

fn init_log() -> Result<()> {
    syslog::unix(Formatter3164 {
        facility: Facility::LOG_USER,
        hostname: None,
        process: "templed".into(),
        pid: 0,
    })
    .map_err(|e| anyhow!("{e}"))
    .and_then(|logger| {
        log::set_boxed_logger(Box::new(BasicLogger::new(logger)))
            .map(|_| log::set_max_level(LevelFilter::Info))
            .map_err(|e| anyhow!("{e}"))
    })
}

fn into_daemon() -> Result<()> {
    File::create(DAEMON_LOG)
        .and_then(|out| Ok((out.try_clone()?, out)))
        .map_err(|e| anyhow!("{e}"))
        .and_then(|(stderr, stdout)| {
            Daemonize::new()
                .stdout(stdout)
                .stderr(stderr)
                .start()
                .map_err(|e| anyhow!("{e}"))
        })
}

// Single-threaded: the watcher is the only long-lived task.
fn runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("unable to start async runtime")
}

fn start(args: StartArgs) -> Result<()> {
    let config = Config::load(&args.configs).context("unable to read config")?;
    let app = Application::builder().with_config(config).build()?;

    // Fork before any runtime thread exists.
    if args.daemonize {
        into_daemon().context("unable to daemonize")?;
    }

    info!("Starting templed");
    runtime()?.block_on(app.run())
}

fn temp(args: TempArgs) -> Result<()> {
    let sensor = ThermalZoneSensor::new(args.zone);
    let mut stdout = io::stdout();

    runtime()?.block_on(async {
        if !args.monitor {
            return temperature_report::print_temperature(&sensor, &mut stdout).await;
        }

        let cancel_token = CancellationToken::new();
        tokio::spawn({
            let cancel_token = cancel_token.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel_token.cancel();
                }
            }
        });

        temperature_report::monitor_temperature(
            &sensor,
            Duration::from_secs(args.period),
            &mut stdout,
            cancel_token,
        )
        .await
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_log() {
        eprintln!("templed: syslog unavailable, logging disabled: {e}");
    }

    let result = match cli.command {
        Command::Start(args) => start(args),
        Command::Temp(args) => temp(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("templed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
