//! Fair-coin odds
//!
//! Binomial probabilities for "at least k of n coins land on my side" and the
//! payout multiplier after the house margin.

/// Probability of a single coin landing on the chosen side
const P_CORRECT: f64 = 0.5;

/// Binomial coefficient via C(n,k) = n·C(n-1,k-1)/k, C(n,0) = 1.
///
/// Computed in floating point, so intermediate values may be fractional.
pub fn combinations(n: u32, k: u32) -> f64 {
    if k == 0 {
        return 1.0;
    }
    if n == 0 {
        return 0.0;
    }
    n as f64 * combinations(n - 1, k - 1) / k as f64
}

/// Probability that exactly `number_correct` of `number_of_coins` coins match
pub fn probability_exactly(number_of_coins: u32, number_correct: u32) -> f64 {
    if number_correct > number_of_coins {
        return 0.0;
    }
    let p_k = P_CORRECT.powi(number_correct as i32);
    let p_rest = (1.0 - P_CORRECT).powi((number_of_coins - number_correct) as i32);
    p_k * p_rest * combinations(number_of_coins, number_correct)
}

/// Probability that at least `number_correct` of `number_of_coins` coins match
pub fn probability_at_least(number_of_coins: u32, number_correct: u32) -> f64 {
    (number_correct..=number_of_coins)
        .rev()
        .map(|k| probability_exactly(number_of_coins, k))
        .sum()
}

/// Payout multiplier: inverse probability less the house margin.
///
/// Infinite when `number_correct > number_of_coins`; validate first.
pub fn multiplier(number_of_coins: u32, number_correct: u32, house_margin: f64) -> f64 {
    (1.0 / probability_at_least(number_of_coins, number_correct)) * (1.0 - house_margin)
}

/// Flat even-odds payout recorded on every placed bet
pub fn flat_payout(wager: f64, house_margin: f64) -> f64 {
    wager * (2.0 * (1.0 - house_margin))
}

/// Odds bound to one house margin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OddsCalculator {
    house_margin: f64,
}

impl OddsCalculator {
    pub fn new(house_margin: f64) -> Self {
        Self { house_margin }
    }

    pub fn house_margin(&self) -> f64 {
        self.house_margin
    }

    pub fn probability(&self, number_of_coins: u32, number_correct: u32) -> f64 {
        probability_at_least(number_of_coins, number_correct)
    }

    pub fn multiplier(&self, number_of_coins: u32, number_correct: u32) -> f64 {
        multiplier(number_of_coins, number_correct, self.house_margin)
    }

    pub fn flat_payout(&self, wager: f64) -> f64 {
        flat_payout(wager, self.house_margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn factorial(n: u32) -> f64 {
        (1..=n).map(|i| i as f64).product()
    }

    #[test]
    fn test_combinations_match_closed_form() {
        for n in 0..=10 {
            for k in 0..=n {
                let expected = factorial(n) / (factorial(k) * factorial(n - k));
                let actual = combinations(n, k);
                assert!(
                    (actual - expected).abs() < TOLERANCE,
                    "C({}, {}) = {}, expected {}",
                    n,
                    k,
                    actual,
                    expected
                );
            }
        }
    }

    #[test]
    fn test_probability_of_zero_correct_is_certain() {
        for n in 0..=10 {
            assert_eq!(probability_at_least(n, 0), 1.0);
        }
    }

    #[test]
    fn test_probability_all_correct() {
        for n in 0..=10 {
            assert!((probability_at_least(n, n) - 0.5f64.powi(n as i32)).abs() < TOLERANCE);
        }
    }

    #[test]
    fn test_exact_probabilities_sum_to_one() {
        for n in 1..=10 {
            let total: f64 = (0..=n).map(|k| probability_exactly(n, k)).sum();
            assert!((total - 1.0).abs() < TOLERANCE, "n = {} sums to {}", n, total);
        }
    }

    #[test]
    fn test_impossible_bet_has_zero_probability() {
        assert_eq!(probability_at_least(3, 5), 0.0);
        assert!(multiplier(3, 5, 0.02).is_infinite());
    }

    #[test]
    fn test_multiplier_is_reproducible() {
        let odds = OddsCalculator::new(0.02);
        for n in 1..=10 {
            for k in 0..=n {
                let expected = (1.0 / probability_at_least(n, k)) * (1.0 - 0.02);
                assert_eq!(odds.multiplier(n, k), expected);
            }
        }
        // One coin, one correct: fair 2x less 2%
        assert!((odds.multiplier(1, 1) - 1.96).abs() < TOLERANCE);
    }

    #[test]
    fn test_flat_payout() {
        assert!((flat_payout(10.0, 0.02) - 19.6).abs() < TOLERANCE);
        assert_eq!(OddsCalculator::new(0.0).flat_payout(5.0), 10.0);
    }
}
