use clap::{Parser, Subcommand};

use crate::commands;
use crate::models::ScannerConfig;

#[derive(Parser)]
#[command(name = "ihsg-scanner")]
#[command(about = "IHSG Supertrend scanner with Telegram alerts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one scan cycle
    Scan {
        /// Scan even outside trading hours
        #[arg(short, long)]
        force: bool,
    },
    /// Run the scheduler until Ctrl+C
    Run,
    /// Send the end-of-day recap now
    Recap,
    /// Send the morning current-state recap now
    Morning,
    /// Show persisted symbol states and today's alerts
    Status,
    /// Send a test message to the configured chat
    TestTelegram,
}

pub async fn run() {
    let cli = Cli::parse();
    let config = ScannerConfig::from_env();

    match cli.command {
        Commands::Scan { force } => {
            commands::scan::run(config, force).await;
        }
        Commands::Run => {
            commands::run::run(config).await;
        }
        Commands::Recap => {
            commands::recap::run(config).await;
        }
        Commands::Morning => {
            commands::morning::run(config).await;
        }
        Commands::Status => {
            commands::status::run(config);
        }
        Commands::TestTelegram => {
            commands::test_telegram::run(config).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan_force() {
        let cli = Cli::try_parse_from(["ihsg-scanner", "scan", "--force"]).unwrap();
        assert!(matches!(cli.command, Commands::Scan { force: true }));

        let cli = Cli::try_parse_from(["ihsg-scanner", "scan"]).unwrap();
        assert!(matches!(cli.command, Commands::Scan { force: false }));
    }

    #[test]
    fn test_parse_test_telegram() {
        let cli = Cli::try_parse_from(["ihsg-scanner", "test-telegram"]).unwrap();
        assert!(matches!(cli.command, Commands::TestTelegram));
        assert!(Cli::try_parse_from(["ihsg-scanner", "serve"]).is_err());
    }
}
