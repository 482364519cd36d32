//! Coin Toss - betting engine for a repeated game of chance
//!
//! A player wagers that at least `k` of `n` tossed coins land on their side.
//! The engine quotes fair odds, accepts one game at a time, tosses the coins
//! after a simulated oracle delay, settles every open bet and notifies
//! observers.
//!
//! ```no_run
//! use cointoss::{CoinSide, CoinTossEngine, EngineConfig, GameEvent};
//!
//! # async fn run() -> cointoss::CoinTossResult<()> {
//! let engine = CoinTossEngine::new(EngineConfig::default())?;
//! engine.subscribe(|event| match event {
//!     GameEvent::GameResult(game) => println!("game {} tossed", game.game_id),
//!     GameEvent::BetResult(bet) => println!("bet {} paid {}", bet.bet_id, bet.payout),
//! });
//!
//! let placed = engine.place_bet(1234, 10.0, CoinSide::Heads, 3, 2)?;
//! placed.settlement.wait().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod games;

pub use config::{EngineConfig, SimulationConfig};
pub use errors::{BetRejection, CoinTossError, CoinTossResult, ConfigurationError, InvariantViolation};
pub use games::{
    Bet, BetQuote, BetResultEvent, CoinSide, CoinTossEngine, Game, GameEvent, GameResultEvent,
    OddsCalculator, OutcomeOracle, PlacedBet, RandomOracle, ScriptedOracle, SettledGame,
    SettlementHandle, SimulationOutcome,
};
