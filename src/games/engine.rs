//! Coin Toss engine
//!
//! State machine for one repeated game of chance. At most one game is active
//! at a time: placing a bet opens it, a spawned task waits on the oracle,
//! publishes the toss, settles every open bet and clears the slot.
//!
//! All mutable state sits behind a single mutex that is never held across an
//! `.await` or while observers run.

use crate::config::EngineConfig;
use crate::errors::{BetRejection, CoinTossError, CoinTossResult, ConfigurationError, InvariantViolation};
use crate::games::events::EventBus;
use crate::games::odds::OddsCalculator;
use crate::games::oracle::{OutcomeOracle, RandomOracle};
use crate::games::settlement::settle_bet;
use crate::games::types::{
    now_millis, Bet, BetQuote, BetResultEvent, CoinSide, Game, GameEvent, GameResultEvent,
    SettledGame,
};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct EngineState {
    game_nonce: u64,
    bet_nonce: u64,
    active_game: Option<Game>,
    open_bets: Vec<Bet>,
}

struct EngineInner {
    config: EngineConfig,
    odds: OddsCalculator,
    oracle: Arc<dyn OutcomeOracle>,
    state: Mutex<EngineState>,
    events: EventBus,
}

/// Cloneable handle to one engine; clones share state
#[derive(Clone)]
pub struct CoinTossEngine {
    inner: Arc<EngineInner>,
}

/// Receipt for an accepted bet
#[derive(Debug)]
pub struct PlacedBet {
    pub bet: Bet,
    pub settlement: SettlementHandle,
}

/// Handle on the background simulation for one game.
///
/// Dropping it does not stop the simulation.
#[derive(Debug)]
pub struct SettlementHandle {
    handle: JoinHandle<CoinTossResult<SettledGame>>,
}

impl SettlementHandle {
    /// Wait for the game to be tossed and settled
    pub async fn wait(self) -> CoinTossResult<SettledGame> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(CoinTossError::TaskFailed(e.to_string())),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl CoinTossEngine {
    /// Engine backed by the fair random oracle described in `config`
    pub fn new(config: EngineConfig) -> CoinTossResult<Self> {
        let oracle = Arc::new(RandomOracle::new(&config.simulation));
        Self::with_oracle(config, oracle)
    }

    /// Engine backed by a caller-supplied oracle
    pub fn with_oracle(config: EngineConfig, oracle: Arc<dyn OutcomeOracle>) -> CoinTossResult<Self> {
        config
            .validate()
            .map_err(|e| ConfigurationError::ValidationFailed(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(EngineInner {
                odds: OddsCalculator::new(config.house_margin),
                events: EventBus::new(config.event_channel_capacity),
                config,
                oracle,
                state: Mutex::new(EngineState::default()),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    pub fn max_number_of_coins(&self) -> u32 {
        self.inner.config.max_number_of_coins
    }

    pub fn max_wager(&self) -> f64 {
        self.inner.config.max_wager
    }

    pub fn house_margin(&self) -> f64 {
        self.inner.config.house_margin
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Probability of at least `number_correct` of `number_of_coins` matching
    pub fn probability(&self, number_of_coins: u32, number_correct: u32) -> f64 {
        self.inner.odds.probability(number_of_coins, number_correct)
    }

    /// Payout multiplier after the house margin; infinite for impossible bets
    pub fn multiplier(&self, number_of_coins: u32, number_correct: u32) -> f64 {
        self.inner.odds.multiplier(number_of_coins, number_correct)
    }

    /// Preview a bet against the configured limits without placing it
    pub fn quote(&self, wager: f64, number_of_coins: u32, number_correct: u32) -> Result<BetQuote, BetRejection> {
        self.check_limits(wager, number_of_coins, number_correct)?;

        let multiplier = self.multiplier(number_of_coins, number_correct);
        Ok(BetQuote {
            wager,
            number_of_coins,
            number_correct,
            probability: self.probability(number_of_coins, number_correct),
            multiplier,
            multiplier_payout: wager * multiplier,
            flat_payout: self.inner.odds.flat_payout(wager),
        })
    }

    /// Currently active game, if any
    pub fn active_game(&self) -> Option<Game> {
        self.state().active_game.clone()
    }

    pub fn open_bet_count(&self) -> usize {
        self.state().open_bets.len()
    }

    /// Register an observer called synchronously for every event
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&GameEvent) + Send + Sync + 'static,
    {
        self.inner.events.subscribe(callback);
    }

    /// Receive every future event on a broadcast channel
    pub fn subscribe_channel(&self) -> broadcast::Receiver<GameEvent> {
        self.inner.events.subscribe_channel()
    }

    /// Accept a bet and start simulating its game in the background.
    ///
    /// Returns as soon as the bet is recorded; results arrive as events and
    /// through the returned `SettlementHandle`.
    pub fn place_bet(
        &self,
        user_id: u64,
        wager: f64,
        side: CoinSide,
        number_of_coins: u32,
        number_correct: u32,
    ) -> CoinTossResult<PlacedBet> {
        self.check_limits(wager, number_of_coins, number_correct)?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| CoinTossError::NoRuntime)?;

        let potential_payout = self.inner.odds.flat_payout(wager);

        let (game, bet) = {
            let mut state = self.state();
            if let Some(active) = &state.active_game {
                return Err(BetRejection::ActiveGameInProgress { game_id: active.game_id }.into());
            }

            let game = Game {
                game_id: state.game_nonce,
                number_of_coins,
            };
            let bet = Bet {
                bet_id: state.bet_nonce,
                game_id: game.game_id,
                user_id,
                wager,
                side,
                number_correct,
                potential_payout,
            };

            state.active_game = Some(game.clone());
            state.open_bets.push(bet.clone());
            state.bet_nonce += 1;
            state.game_nonce += 1;
            (game, bet)
        };

        tracing::info!(
            "Bet {} placed: user {} wagered {} on {} ({} of {} coins), potential payout {}",
            bet.bet_id,
            bet.user_id,
            bet.wager,
            bet.side,
            bet.number_correct,
            game.number_of_coins,
            bet.potential_payout
        );
        tracing::debug!("Requesting simulation for game {}", game.game_id);

        let engine = self.clone();
        let handle = runtime.spawn(async move {
            let result = engine.request_game_simulation().await;
            if let Err(e) = &result {
                tracing::error!("Simulation for game {} failed: {}", game.game_id, e);
            }
            result
        });

        Ok(PlacedBet {
            bet,
            settlement: SettlementHandle { handle },
        })
    }

    /// Toss the active game's coins, publish the result and settle its bets
    pub(crate) async fn request_game_simulation(&self) -> CoinTossResult<SettledGame> {
        let game = self
            .active_game()
            .ok_or(InvariantViolation::NoActiveGame)?;

        let outcome = self.inner.oracle.toss(&game).await;
        if outcome.len() != game.number_of_coins as usize {
            return Err(InvariantViolation::OutcomeLength {
                game_id: game.game_id,
                expected: game.number_of_coins,
                actual: outcome.len(),
            }
            .into());
        }

        let heads_count = outcome.heads_count();
        let tails_count = outcome.tails_count();
        tracing::info!(
            "Game {} tossed {:?}: {} heads, {} tails",
            game.game_id,
            outcome.sides().iter().map(|side| side.as_bit()).collect::<Vec<_>>(),
            heads_count,
            tails_count
        );

        let game_result = GameResultEvent {
            game_id: game.game_id,
            number_of_coins: game.number_of_coins,
            simulation_result: outcome,
            timestamp: now_millis(),
        };
        self.inner.events.emit(GameEvent::GameResult(game_result.clone()));

        let bet_results = self.settle_all_bets(heads_count, tails_count)?;
        Ok(SettledGame {
            game_result,
            bet_results,
        })
    }

    /// Resolve every open bet and free the active-game slot
    pub(crate) fn settle_all_bets(&self, heads_count: u32, tails_count: u32) -> CoinTossResult<Vec<BetResultEvent>> {
        let results: Vec<BetResultEvent> = {
            let mut state = self.state();
            let number_of_coins = state
                .active_game
                .as_ref()
                .ok_or(InvariantViolation::NoActiveGame)?
                .number_of_coins;

            let timestamp = now_millis();
            let results: Vec<BetResultEvent> = state
                .open_bets
                .drain(..)
                .map(|bet| settle_bet(&bet, number_of_coins, heads_count, tails_count, timestamp))
                .collect();
            state.active_game = None;
            results
        };

        for result in &results {
            tracing::debug!(
                "Bet {} on game {} settled, payout {}",
                result.bet_id,
                result.game_id,
                result.payout
            );
            self.inner.events.emit(GameEvent::BetResult(result.clone()));
        }

        Ok(results)
    }

    fn check_limits(&self, wager: f64, number_of_coins: u32, number_correct: u32) -> Result<(), BetRejection> {
        let config = &self.inner.config;

        if number_of_coins > config.max_number_of_coins {
            return Err(BetRejection::TooManyCoins {
                requested: number_of_coins,
                max: config.max_number_of_coins,
            });
        }
        if number_of_coins == 0 {
            return Err(BetRejection::NoCoins);
        }
        if number_correct > number_of_coins {
            return Err(BetRejection::CorrectExceedsCoins {
                number_correct,
                number_of_coins,
            });
        }
        if wager > config.max_wager {
            return Err(BetRejection::WagerTooLarge {
                wager,
                max: config.max_wager,
            });
        }
        if !wager.is_finite() || wager <= 0.0 {
            return Err(BetRejection::InvalidWager(wager));
        }
        Ok(())
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        // State is only mutated in short non-panicking sections
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::oracle::ScriptedOracle;
    use crate::games::types::SimulationOutcome;

    fn scripted_engine(bits: &[u8]) -> CoinTossEngine {
        let oracle = Arc::new(ScriptedOracle::new(SimulationOutcome::from_bits(bits)));
        CoinTossEngine::with_oracle(EngineConfig::instant(0), oracle).expect("engine")
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.house_margin = 2.0;
        match CoinTossEngine::new(config) {
            Err(CoinTossError::Configuration(_)) => {}
            Err(other) => panic!("Expected configuration error, got {:?}", other),
            Ok(_) => panic!("Expected configuration error"),
        }
    }

    #[test]
    fn test_accessors() {
        let engine = CoinTossEngine::new(EngineConfig::default()).expect("engine");
        assert_eq!(engine.name(), "Coin Toss");
        assert_eq!(engine.max_number_of_coins(), 10);
        assert_eq!(engine.max_wager(), 1000.0);
        assert_eq!(engine.house_margin(), 0.02);
        assert_eq!(engine.probability(1, 1), 0.5);
        assert!(engine.active_game().is_none());
    }

    #[test]
    fn test_settle_without_active_game_is_invariant_violation() {
        let engine = scripted_engine(&[0]);
        match engine.settle_all_bets(1, 0) {
            Err(CoinTossError::Invariant(InvariantViolation::NoActiveGame)) => {}
            other => panic!("Expected invariant violation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_simulation_without_active_game_is_invariant_violation() {
        let engine = scripted_engine(&[0]);
        let err = engine.request_game_simulation().await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_place_bet_outside_runtime() {
        let engine = scripted_engine(&[0]);
        match engine.place_bet(1, 10.0, CoinSide::Heads, 1, 1) {
            Err(CoinTossError::NoRuntime) => {}
            other => panic!("Expected NoRuntime, got {:?}", other),
        }
        assert!(engine.active_game().is_none());
        assert_eq!(engine.open_bet_count(), 0);
    }

    #[test]
    fn test_validation_order() {
        let engine = scripted_engine(&[0]);

        // Coin limit is checked before the ordering rule
        assert!(matches!(
            engine.quote(5000.0, 11, 12),
            Err(BetRejection::TooManyCoins { requested: 11, max: 10 })
        ));
        // Ordering rule is checked before the wager limit
        assert!(matches!(
            engine.quote(5000.0, 3, 5),
            Err(BetRejection::CorrectExceedsCoins { .. })
        ));
        assert!(matches!(
            engine.quote(5000.0, 3, 2),
            Err(BetRejection::WagerTooLarge { .. })
        ));
        assert!(matches!(engine.quote(0.0, 3, 2), Err(BetRejection::InvalidWager(_))));
        assert!(matches!(engine.quote(f64::NAN, 3, 2), Err(BetRejection::InvalidWager(_))));
        assert!(matches!(engine.quote(10.0, 0, 0), Err(BetRejection::NoCoins)));
    }

    #[test]
    fn test_quote_exposes_both_payouts() {
        let engine = scripted_engine(&[0]);
        let quote = engine.quote(10.0, 3, 3).expect("quote");

        assert_eq!(quote.probability, 0.125);
        assert!((quote.multiplier - 8.0 * 0.98).abs() < 1e-9);
        assert!((quote.multiplier_payout - 78.4).abs() < 1e-9);
        assert!((quote.flat_payout - 19.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_rejection_does_not_mutate_state() {
        let engine = scripted_engine(&[0]);

        assert!(engine.place_bet(1, 10.0, CoinSide::Heads, 11, 1).is_err());
        assert!(engine.place_bet(1, 10.0, CoinSide::Heads, 3, 5).is_err());
        assert!(engine.active_game().is_none());
        assert_eq!(engine.open_bet_count(), 0);

        // Nonces were not consumed by the rejected bets
        let placed = engine.place_bet(1, 10.0, CoinSide::Heads, 1, 1).expect("bet");
        assert_eq!(placed.bet.bet_id, 0);
        assert_eq!(placed.bet.game_id, 0);
        placed.settlement.wait().await.expect("settled");
    }

    #[tokio::test]
    async fn test_outcome_length_mismatch_is_invariant_violation() {
        let engine = scripted_engine(&[0, 1]);
        let placed = engine.place_bet(1, 10.0, CoinSide::Heads, 1, 1).expect("bet");

        match placed.settlement.wait().await {
            Err(CoinTossError::Invariant(InvariantViolation::OutcomeLength { expected: 1, actual: 2, .. })) => {}
            other => panic!("Expected outcome length violation, got {:?}", other),
        }
    }
}
