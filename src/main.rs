use std::time::Duration;

use broadside::{
    cli::run_cli, init_logging, PeerSession, Role, SessionConfig, TcpTransport,
    DEFAULT_CONNECT_ADDR, DEFAULT_LISTEN_ADDR,
};
use clap::{Args, Parser, Subcommand};
use log::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Debug)]
struct GameOpts {
    #[arg(long, help = "Fix RNG seed for reproducible auto-placement (e.g., --seed 12345)")]
    seed: Option<u64>,
    #[arg(
        long,
        value_name = "SECS",
        help = "End the game if the opponent leaves a hand-off pending this long"
    )]
    hand_off_timeout: Option<u64>,
}

impl GameOpts {
    fn config(&self) -> SessionConfig {
        SessionConfig {
            hand_off_timeout: self.hand_off_timeout.map(Duration::from_secs),
            seed: self.seed,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Host a game and wait for the opponent to connect. The host fires first.
    Host {
        #[arg(long, default_value = DEFAULT_LISTEN_ADDR)]
        bind: String,
        #[command(flatten)]
        opts: GameOpts,
    },
    /// Connect to a hosted game.
    Join {
        #[arg(long, default_value = DEFAULT_CONNECT_ADDR)]
        connect: String,
        #[command(flatten)]
        opts: GameOpts,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let (role, transport, opts) = match cli.command {
        Commands::Host { bind, opts } => {
            println!("Waiting for a player to connect on {}...", bind);
            (Role::Host, TcpTransport::listen_once(&bind).await?, opts)
        }
        Commands::Join { connect, opts } => {
            println!("Connecting to {}...", connect);
            (Role::Guest, TcpTransport::connect(&connect).await?, opts)
        }
    };
    if let Some(seed) = opts.seed {
        println!("Using fixed seed: {} (auto-placement will be reproducible)", seed);
    }

    let config = opts.config();
    let stall_check = config.hand_off_timeout.map(|t| (t / 4).max(Duration::from_millis(100)));
    let machine = config.machine(role);
    let (session, handle) = PeerSession::start_with_stall_check(machine, transport, stall_check);

    let game = tokio::spawn(session.run());
    let ui_result = run_cli(handle).await;
    let last = game.await?;
    info!("session ended in {:?}", last.phase);

    if let Err(e) = ui_result {
        error!("input loop failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}
