use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// templed — daemon to adjust LEDs with temperature
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Starts daemon
    Start(StartArgs),
    /// Shows temp
    Temp(TempArgs),
}

#[derive(Args, Debug)]
pub struct StartArgs {
    /// YAML config file path, may be repeated; later files override earlier ones
    #[arg(long = "cfg", value_delimiter = ',')]
    pub configs: Vec<PathBuf>,

    /// Detach from the terminal and run in background
    #[arg(short = 'd', long = "daemonize", default_value = "false")]
    pub daemonize: bool,
}

#[derive(Args, Debug)]
pub struct TempArgs {
    /// Thermal zone
    #[arg(long, default_value_t = 0)]
    pub zone: u32,

    /// Monitor temp
    #[arg(long, default_value = "false")]
    pub monitor: bool,

    /// Monitor period in seconds
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub period: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn start_accepts_repeated_and_comma_separated_configs() {
        let cli = Cli::parse_from([
            "templed", "start", "--cfg", "a.yml,b.yml", "--cfg", "c.yml",
        ]);

        match cli.command {
            Command::Start(args) => {
                assert_eq!(
                    args.configs,
                    vec![
                        PathBuf::from("a.yml"),
                        PathBuf::from("b.yml"),
                        PathBuf::from("c.yml"),
                    ]
                );
                assert!(!args.daemonize);
            }
            other => panic!("Expected start command, got {other:?}"),
        }
    }

    #[test]
    fn temp_defaults() {
        let cli = Cli::parse_from(["templed", "temp"]);

        match cli.command {
            Command::Temp(args) => {
                assert_eq!(args.zone, 0);
                assert!(!args.monitor);
                assert_eq!(args.period, 60);
            }
            other => panic!("Expected temp command, got {other:?}"),
        }
    }

    #[test]
    fn temp_rejects_zero_period() {
        assert!(Cli::try_parse_from(["templed", "temp", "--period", "0"]).is_err());
    }

    #[test]
    fn command_is_required() {
        assert!(Cli::try_parse_from(["templed"]).is_err());
    }
}
