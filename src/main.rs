//! Coin Toss CLI
//!
//! Prints the odds table or plays a single game against the engine,
//! echoing every emitted event as JSON.

use clap::{Parser, Subcommand};
use cointoss::{CoinSide, CoinTossEngine, CoinTossResult, EngineConfig, GameEvent};
use std::path::PathBuf;

/// Coin Toss game engine
#[derive(Parser)]
#[command(name = "cointoss")]
#[command(about = "Bet on how many of N tossed coins land on your side")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print probability and multiplier for every bet up to N coins
    Odds {
        /// Number of coins (defaults to the configured maximum)
        #[arg(short = 'n', long)]
        coins: Option<u32>,
    },

    /// Place one bet and wait for it to settle
    Play {
        /// User placing the bet
        #[arg(short, long, default_value = "1234")]
        user: u64,

        /// Amount wagered
        #[arg(short, long, default_value = "10")]
        wager: f64,

        /// heads or tails
        #[arg(short, long, default_value = "heads")]
        side: CoinSide,

        /// Number of coins tossed
        #[arg(short = 'n', long, default_value = "1")]
        coins: u32,

        /// Minimum coins that must land on the chosen side
        #[arg(short = 'k', long, default_value = "1")]
        correct: u32,
    },
}

#[tokio::main]
async fn main() -> CoinTossResult<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "cointoss=debug" } else { "cointoss=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let config = match &cli.config {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::default(),
    };
    let engine = CoinTossEngine::new(config)?;

    match cli.command {
        Commands::Odds { coins } => {
            print_odds(&engine, coins.unwrap_or(engine.max_number_of_coins()));
            Ok(())
        }
        Commands::Play { user, wager, side, coins, correct } => {
            play(&engine, user, wager, side, coins, correct).await
        }
    }
}

fn print_odds(engine: &CoinTossEngine, coins: u32) {
    println!("{} (house margin {:.2}%)", engine.name(), engine.house_margin() * 100.0);
    println!("{:>6} {:>8} {:>12} {:>12}", "coins", "correct", "probability", "multiplier");
    for n in 1..=coins {
        for k in 1..=n {
            println!(
                "{:>6} {:>8} {:>12.6} {:>12.4}",
                n,
                k,
                engine.probability(n, k),
                engine.multiplier(n, k)
            );
        }
    }
}

async fn play(
    engine: &CoinTossEngine,
    user: u64,
    wager: f64,
    side: CoinSide,
    coins: u32,
    correct: u32,
) -> CoinTossResult<()> {
    engine.subscribe(|event: &GameEvent| match serde_json::to_string(event) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::warn!("Could not serialize event: {}", e),
    });

    let quote = engine.quote(wager, coins, correct)?;
    println!(
        "Betting {} on {} ({} of {} coins): probability {:.4}, multiplier {:.4}, payout if won {}",
        wager, side, correct, coins, quote.probability, quote.multiplier, quote.flat_payout
    );

    let placed = engine.place_bet(user, wager, side, coins, correct)?;
    let settled = placed.settlement.wait().await?;

    let paid: f64 = settled.bet_results.iter().map(|bet| bet.payout).sum();
    if paid > 0.0 {
        println!("Won {}", paid);
    } else {
        println!("Lost {}", wager);
    }
    Ok(())
}
