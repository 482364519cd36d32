use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of a coin. Serialized as `0` (heads) / `1` (tails).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(into = "u8", try_from = "u8")]
pub enum CoinSide {
    Heads,
    Tails,
}

impl CoinSide {
    pub fn as_bit(self) -> u8 {
        match self {
            CoinSide::Heads => 0,
            CoinSide::Tails => 1,
        }
    }
}

impl From<CoinSide> for u8 {
    fn from(side: CoinSide) -> u8 {
        side.as_bit()
    }
}

impl TryFrom<u8> for CoinSide {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CoinSide::Heads),
            1 => Ok(CoinSide::Tails),
            other => Err(format!("Invalid coin side {}, expected 0 (heads) or 1 (tails)", other)),
        }
    }
}

impl fmt::Display for CoinSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoinSide::Heads => write!(f, "heads"),
            CoinSide::Tails => write!(f, "tails"),
        }
    }
}

impl std::str::FromStr for CoinSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "heads" | "h" | "0" => Ok(CoinSide::Heads),
            "tails" | "t" | "1" => Ok(CoinSide::Tails),
            other => Err(format!("Unknown coin side '{}'", other)),
        }
    }
}

/// The single in-flight game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub game_id: u64,
    pub number_of_coins: u32,
}

/// An open bet waiting for its game to resolve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bet {
    pub bet_id: u64,
    pub game_id: u64,
    pub user_id: u64,
    pub wager: f64,
    pub side: CoinSide,
    pub number_correct: u32,
    pub potential_payout: f64,
}

/// Result of tossing every coin of a game, in toss order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimulationOutcome(Vec<CoinSide>);

impl SimulationOutcome {
    pub fn new(sides: Vec<CoinSide>) -> Self {
        Self(sides)
    }

    /// Build from raw bits, heads = 0 and tails = anything else
    pub fn from_bits(bits: &[u8]) -> Self {
        Self(
            bits.iter()
                .map(|&b| if b == 0 { CoinSide::Heads } else { CoinSide::Tails })
                .collect(),
        )
    }

    pub fn sides(&self) -> &[CoinSide] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tails_count(&self) -> u32 {
        self.0.iter().map(|side| side.as_bit() as u32).sum()
    }

    pub fn heads_count(&self) -> u32 {
        self.0.len() as u32 - self.tails_count()
    }
}

/// Emitted once per game, before any of its bet results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResultEvent {
    pub game_id: u64,
    pub number_of_coins: u32,
    pub simulation_result: SimulationOutcome,
    /// Unix milliseconds
    pub timestamp: u64,
}

/// Emitted once per settled bet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetResultEvent {
    pub bet_id: u64,
    pub game_id: u64,
    pub user_id: u64,
    pub wager: f64,
    pub side: CoinSide,
    pub number_of_coins: u32,
    pub number_correct: u32,
    /// Zero when the bet lost
    pub payout: f64,
    /// Unix milliseconds
    pub timestamp: u64,
}

impl BetResultEvent {
    pub fn is_win(&self) -> bool {
        self.payout > 0.0
    }
}

/// Everything observers can receive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType", content = "eventObject")]
pub enum GameEvent {
    GameResult(GameResultEvent),
    BetResult(BetResultEvent),
}

impl GameEvent {
    pub fn game_id(&self) -> u64 {
        match self {
            GameEvent::GameResult(event) => event.game_id,
            GameEvent::BetResult(event) => event.game_id,
        }
    }
}

/// Read-only preview of a prospective bet.
///
/// `flat_payout` is what placement actually records; `multiplier_payout`
/// is what the combinatorial odds would pay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetQuote {
    pub wager: f64,
    pub number_of_coins: u32,
    pub number_correct: u32,
    pub probability: f64,
    pub multiplier: f64,
    pub multiplier_payout: f64,
    pub flat_payout: f64,
}

/// Full record of a resolved game, returned by the settlement task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettledGame {
    pub game_result: GameResultEvent,
    pub bet_results: Vec<BetResultEvent>,
}

/// Current time as Unix milliseconds
pub(crate) fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
