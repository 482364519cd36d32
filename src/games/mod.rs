pub mod types;
pub mod odds;
pub mod oracle;
pub mod settlement;
pub mod events;
pub mod engine;

pub use types::*;
pub use odds::OddsCalculator;
pub use oracle::{OutcomeOracle, RandomOracle, ScriptedOracle};
pub use events::EventBus;
pub use engine::{CoinTossEngine, PlacedBet, SettlementHandle};
