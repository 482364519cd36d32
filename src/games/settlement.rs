//! Settlement rule
//!
//! A bet wins when at least `number_correct` coins landed on its side. A win
//! pays the payout fixed at placement, a loss pays nothing.

use crate::games::types::{Bet, BetResultEvent, CoinSide};

/// Whether a bet on `side` needing `number_correct` matches wins
pub fn bet_wins(side: CoinSide, number_correct: u32, heads_count: u32, tails_count: u32) -> bool {
    match side {
        CoinSide::Heads => heads_count >= number_correct,
        CoinSide::Tails => tails_count >= number_correct,
    }
}

/// Resolve one bet against the toss counts of its game
pub fn settle_bet(
    bet: &Bet,
    number_of_coins: u32,
    heads_count: u32,
    tails_count: u32,
    timestamp: u64,
) -> BetResultEvent {
    let payout = if bet_wins(bet.side, bet.number_correct, heads_count, tails_count) {
        bet.potential_payout
    } else {
        0.0
    };

    BetResultEvent {
        bet_id: bet.bet_id,
        game_id: bet.game_id,
        user_id: bet.user_id,
        wager: bet.wager,
        side: bet.side,
        number_of_coins,
        number_correct: bet.number_correct,
        payout,
        timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bet(side: CoinSide, number_correct: u32) -> Bet {
        Bet {
            bet_id: 7,
            game_id: 3,
            user_id: 1234,
            wager: 10.0,
            side,
            number_correct,
            potential_payout: 19.6,
        }
    }

    #[test]
    fn test_heads_bet() {
        let result = settle_bet(&bet(CoinSide::Heads, 2), 3, 2, 1, 99);
        assert_eq!(result.payout, 19.6);
        assert_eq!(result.number_of_coins, 3);
        assert_eq!(result.timestamp, 99);
        assert!(result.is_win());

        let result = settle_bet(&bet(CoinSide::Heads, 2), 3, 1, 2, 99);
        assert_eq!(result.payout, 0.0);
        assert!(!result.is_win());
    }

    #[test]
    fn test_tails_bet() {
        assert!(bet_wins(CoinSide::Tails, 3, 0, 3));
        assert!(!bet_wins(CoinSide::Tails, 3, 1, 2));
    }

    #[test]
    fn test_zero_correct_always_wins() {
        assert!(bet_wins(CoinSide::Heads, 0, 0, 5));
        assert!(bet_wins(CoinSide::Tails, 0, 5, 0));
    }

    #[test]
    fn test_result_copies_bet_fields() {
        let result = settle_bet(&bet(CoinSide::Tails, 1), 1, 0, 1, 0);
        assert_eq!(result.bet_id, 7);
        assert_eq!(result.game_id, 3);
        assert_eq!(result.user_id, 1234);
        assert_eq!(result.wager, 10.0);
        assert_eq!(result.side, CoinSide::Tails);
        assert_eq!(result.number_correct, 1);
    }
}
