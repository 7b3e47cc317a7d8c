use anyhow::Result;
use clap::Parser;
use core_logic::{
    setup_logger, setup_quiet_logger, BatchScheduler, RunStatistics, RESULT_TARGET,
};
use dotenv::dotenv;
use smashx::config::{BatchModeKind, SmashConfig};
use smashx::display;
use smashx::{bootstrap, ClaimExecutor, Session, SmashApi, SmashClient};
use std::process;
use std::sync::Arc;
use tokio::signal;
use tokio::time::{interval, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "games/smashx/config.toml")]
    config: String,
    /// Override the batch strategy from the config file
    #[arg(short, long, value_enum)]
    mode: Option<BatchModeKind>,
    /// Override the number of claims per cycle
    #[arg(short, long)]
    batch_size: Option<usize>,
    /// Write a JSON stats snapshot to this path periodically and on exit
    #[arg(short, long)]
    export_stats: Option<String>,
    #[arg(long, default_value = "30")]
    stats_interval: u64,
    /// Errors only, no banner and no log files
    #[arg(short, long)]
    quiet: bool,
}

fn fatal(msg: impl std::fmt::Display) -> ! {
    error!("{}", msg);
    process::exit(1);
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    if args.quiet {
        setup_quiet_logger();
    } else {
        let _log_guard = setup_logger("smashx");
        // Keep guard alive for file logging
        std::mem::forget(_log_guard);
    }

    let mut config = SmashConfig::load(&args.config)
        .unwrap_or_else(|e| fatal(format!("Failed to load config: {}", e)));
    if let Some(mode) = args.mode {
        config.batch_mode = mode;
    }
    if let Some(batch_size) = args.batch_size {
        config.parallel_requests = batch_size;
    }
    if let Err(e) = config.validate() {
        fatal(format!("Invalid configuration: {}", e));
    }

    let session = Session::from_env().unwrap_or_else(|e| fatal(e));
    let client = SmashClient::new(&config, &session).unwrap_or_else(|e| fatal(e));
    drop(session);
    let api: Arc<dyn SmashApi> = Arc::new(client);

    let startup = match bootstrap(api.as_ref(), config.retry_config()).await {
        Ok(startup) => startup,
        Err(e) => fatal(format!(
            "{}. Please update your session token and CSRF token.",
            e
        )),
    };
    info!(target: RESULT_TARGET, "Session validated against {}", config.base_url());
    if let Some(profile) = startup.profile.as_ref().filter(|_| !args.quiet) {
        println!("{}", display::banner(profile));
    }

    let stats = Arc::new(RunStatistics::new());
    let executor = ClaimExecutor::new(api.clone(), stats.clone(), &config)
        .map(Arc::new)
        .unwrap_or_else(|e| fatal(e));
    let scheduler = BatchScheduler::new(executor, config.batch_config());

    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!(target: RESULT_TARGET, "🛑 Received Ctrl+C. Finishing in-flight claims...");
                ctrl_c_token.cancel();
            }
            Err(err) => {
                error!("Unable to listen for shutdown signal: {}", err);
            }
        }
    });

    let export_task = args.export_stats.clone().map(|path| {
        let stats = stats.clone();
        let interval_secs = args.stats_interval.max(1);
        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(interval_secs));
            loop {
                interval.tick().await;
                if let Err(e) = stats.export_to_file(&path).await {
                    error!("Stats export failed: {}", e);
                }
            }
        })
    });

    info!(
        target: RESULT_TARGET,
        "Claims per cycle: {} | Mode: {:?} | Attempts per claim: {}",
        config.parallel_requests, config.batch_mode, config.max_retries
    );

    let summary = scheduler
        .run(token, |report| {
            info!(target: RESULT_TARGET, "{}", display::cycle_line(report, &stats.snapshot()));
        })
        .await;

    if let Some(task) = export_task {
        task.abort();
    }

    let snapshot = stats.snapshot();
    info!(
        target: RESULT_TARGET,
        "🛑 Shutdown Complete. Cycles: {} | Claims: {} | Success Rate: {:.2}% | {}",
        summary.cycles,
        snapshot.total_claims,
        snapshot.success_rate,
        display::status_line(&snapshot)
    );

    if let Some(path) = args.export_stats {
        match stats.export_to_file(&path).await {
            Ok(_) => info!(target: RESULT_TARGET, "Final stats exported to {}", path),
            Err(e) => error!("Failed to export final stats: {}", e),
        }
    }

    Ok(())
}
