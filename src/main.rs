use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use trail_audit_alerts::commands;
use trail_audit_alerts::commands::scan::ScanArgs;
use trail_audit_alerts::config::ScanOptions;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "trail-audit")]
#[command(about = "CloudTrail security alerting", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan recent trail log objects and publish alerts
    ///
    /// Settings not given on the command line are read from S3_BUCKET,
    /// SNS_TOPIC_ARN, ACCESS_KEY_MAX_AGE_DAYS, FAILED_LOGIN_THRESHOLD and
    /// SCAN_WINDOW_HOURS.
    Scan {
        /// Directory containing one subdirectory per bucket
        #[arg(long)]
        log_dir: PathBuf,

        /// Bucket holding the trail's log objects (default: $S3_BUCKET)
        #[arg(long)]
        bucket: Option<String>,

        /// Notification topic for alerts (default: $SNS_TOPIC_ARN)
        #[arg(long)]
        topic: Option<String>,

        /// Scan objects modified in the last N hours (default: 2)
        #[arg(long)]
        window_hours: Option<u32>,

        /// Flag access keys at least this many days old (default: 90)
        #[arg(long)]
        max_key_age_days: Option<i64>,

        /// Alert when a user has at least this many failed console logins (default: 5)
        #[arg(long)]
        failed_login_threshold: Option<usize>,

        /// Access key inventory JSON (ListAccessKeys shape)
        #[arg(long)]
        credentials: Option<PathBuf>,

        /// Deliver alerts by POSTing JSON to this URL instead of logging them
        #[arg(long)]
        webhook_url: Option<String>,

        /// Trigger payload to log with the invocation
        #[arg(long)]
        trigger: Option<String>,

        /// Request identifier to log with the invocation
        #[arg(long)]
        request_id: Option<String>,

        /// Write a CSV report of dispatched alerts
        #[arg(long)]
        export: Option<PathBuf>,

        /// Show a progress bar while decoding
        #[arg(long)]
        progress: bool,
    },

    /// Generate shell completion scripts
    GenerateCompletion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            log_dir,
            bucket,
            topic,
            window_hours,
            max_key_age_days,
            failed_login_threshold,
            credentials,
            webhook_url,
            trigger,
            request_id,
            export,
            progress,
        } => {
            commands::scan::run(ScanArgs {
                log_dir,
                options: ScanOptions {
                    bucket,
                    topic,
                    access_key_max_age_days: max_key_age_days,
                    failed_login_threshold,
                    window_hours,
                },
                credentials,
                webhook_url,
                trigger,
                request_id,
                export,
                progress,
            })
            .await
        }
        Commands::GenerateCompletion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "trail-audit", &mut std::io::stdout());
            Ok(())
        }
    }
}
