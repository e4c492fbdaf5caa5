//! orgctl - Main entry point

use clap::Parser;
use log::{debug, info, warn};

use orgctl::{
    run_config_command, run_feishu_command, run_wechat_command, CancelToken, Cli, Command,
    Session, SessionStore,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    info!("Starting orgctl v{}", env!("CARGO_PKG_VERSION"));

    let cancel = CancelToken::new();
    spawn_interrupt_handler(cancel.clone());

    if let Err(e) = run(cli, cancel).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, cancel: CancelToken) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open(
        SessionStore::new(),
        cli.credential_flags(),
        cli.settings(),
        cancel,
    )?;
    debug!("Settings: {:?}", session.settings());

    match &cli.command {
        Command::Config { action } => run_config_command(&mut session, action),
        Command::Feishu { command } => run_feishu_command(&session, command).await,
        Command::Wechat { command } => run_wechat_command(&session, command).await,
    }
}

/// First Ctrl-C cancels in-flight requests, a second one exits immediately
fn spawn_interrupt_handler(cancel: CancelToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("Interrupted, cancelling requests (press Ctrl-C again to exit)");
        cancel.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Aborted");
            std::process::exit(130);
        }
    });
}
