//! Outcome oracles
//!
//! An oracle stands in for a slow external randomness source: it waits, then
//! reports how each coin of the active game landed.

use crate::config::SimulationConfig;
use crate::games::types::{CoinSide, Game, SimulationOutcome};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Source of toss outcomes for the active game
#[async_trait]
pub trait OutcomeOracle: Send + Sync {
    /// Wait for and return the outcome of tossing `game.number_of_coins` coins
    async fn toss(&self, game: &Game) -> SimulationOutcome;
}

/// Fair coins from a general-purpose PRNG, after a uniformly random delay
pub struct RandomOracle {
    min_delay_ms: u64,
    max_delay_ms: u64,
    rng: Mutex<StdRng>,
}

impl RandomOracle {
    pub fn new(config: &SimulationConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            min_delay_ms: config.min_delay_ms,
            max_delay_ms: config.max_delay_ms.max(config.min_delay_ms),
            rng: Mutex::new(rng),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        // A poisoned RNG is still a usable RNG
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }

    /// Draw the pretend-oracle latency
    pub fn draw_delay(&self) -> Duration {
        let ms = self.with_rng(|rng| rng.gen_range(self.min_delay_ms..=self.max_delay_ms));
        Duration::from_millis(ms)
    }

    /// Toss `number_of_coins` fair coins
    pub fn draw_outcome(&self, number_of_coins: u32) -> SimulationOutcome {
        let sides: Vec<CoinSide> = self.with_rng(|rng| {
            (0..number_of_coins)
                .map(|_| if rng.gen_bool(0.5) { CoinSide::Tails } else { CoinSide::Heads })
                .collect()
        });
        SimulationOutcome::new(sides)
    }
}

#[async_trait]
impl OutcomeOracle for RandomOracle {
    async fn toss(&self, game: &Game) -> SimulationOutcome {
        let delay = self.draw_delay();
        tracing::info!(
            "...pretend oracle response for game {}, waiting {:.2} seconds",
            game.game_id,
            delay.as_secs_f64()
        );
        tokio::time::sleep(delay).await;
        self.draw_outcome(game.number_of_coins)
    }
}

/// Replays predetermined outcomes in order.
///
/// Once the script is exhausted the last outcome keeps being returned.
pub struct ScriptedOracle {
    delay: Duration,
    script: Mutex<VecDeque<SimulationOutcome>>,
    last: Mutex<SimulationOutcome>,
}

impl ScriptedOracle {
    pub fn new(first: SimulationOutcome) -> Self {
        Self {
            delay: Duration::ZERO,
            script: Mutex::new(VecDeque::from([first.clone()])),
            last: Mutex::new(first),
        }
    }

    /// Queue another outcome after the ones already scripted
    pub fn then(self, outcome: SimulationOutcome) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(outcome);
        self
    }

    /// Wait this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn next_outcome(&self) -> SimulationOutcome {
        let next = self
            .script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();
        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(outcome) = next {
            *last = outcome;
        }
        last.clone()
    }
}

#[async_trait]
impl OutcomeOracle for ScriptedOracle {
    async fn toss(&self, _game: &Game) -> SimulationOutcome {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.next_outcome()
    }
}
