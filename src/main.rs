use rebalancebot::arguments::{ get_arg_value, is_help_requested };
use rebalancebot::config::BotConfig;
use rebalancebot::logger::{ self, LogTag };
use rebalancebot::notifications::{ Notification, NotificationType };
use rebalancebot::rebalance::Rebalancer;
use rebalancebot::utils::check_shutdown_or_delay;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_help() {
    println!("rebalancebot {}", VERSION);
    println!();
    println!("Usage: rebalancebot [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <path>      Config file path (default: config.json)");
    println!("  --debug              Enable debug logging for all modules");
    println!("  --debug-<module>     Enable debug logging for one module");
    println!("  --help, -h           Show this help");
}

#[tokio::main]
async fn main() {
    if is_help_requested() {
        print_help();
        std::process::exit(0);
    }

    logger::info(LogTag::System, &format!("Rebalancer {} starting up...", VERSION));

    let config_path = get_arg_value("--config").unwrap_or_else(|| "config.json".to_string());
    let config = match BotConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            logger::error(LogTag::Config, &format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let loop_delay = Duration::from_secs(config.loop_delay_secs);
    let rebalancer = match Rebalancer::new(config) {
        Ok(rebalancer) => rebalancer,
        Err(e) => {
            logger::error(LogTag::System, &format!("Startup failed: {:#}", e));
            std::process::exit(1);
        }
    };

    // Graceful shutdown on Ctrl+C; the running cycle finishes first
    let shutdown = Arc::new(Notify::new());
    {
        let shutdown = shutdown.clone();
        if let Err(e) = ctrlc::set_handler(move || shutdown.notify_one()) {
            logger::warn(LogTag::System, &format!("Failed to set Ctrl+C handler: {}", e));
        }
    }

    if let Some(notifier) = rebalancer.notifier() {
        let started = Notification::new(NotificationType::BotStarted {
            version: VERSION.to_string(),
            pools: rebalancer.pool_count(),
        });
        if let Err(e) = notifier.send(&started).await {
            logger::warn(LogTag::Telegram, &format!("Startup notification failed: {}", e));
        }
    }

    logger::info(LogTag::System, "Bot has been started ✅");

    // Strictly sequential cycles: the next one never starts before the
    // previous cycle's action and notification have completed or failed
    loop {
        if let Err(e) = rebalancer.run_cycle().await {
            logger::error(LogTag::Rebalance, &format!("Cycle failed: {}", e));
        }

        if check_shutdown_or_delay(&shutdown, loop_delay).await {
            logger::info(LogTag::System, "Shutting down...");
            break;
        }
    }
}
