//! Staking math: fractional Kelly sizing and expected value.
//!
//! Pure functions over decimal odds. Every argument is validated and
//! an out-of-domain value fails the whole calculation; callers must not
//! continue with a derived value when these return an error.
//!
//! Lay is not a mirror of back: for a lay, `stake` is the backer's
//! stake received and the layer's maximum loss is the liability
//! `stake * (odds - 1)`.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use thiserror::Error;

use super::bet::Side;

/// Staking math failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StakingError {
    /// An argument lies outside its allowed domain.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

fn check_probability(probability: f64) -> Result<(), StakingError> {
    if !(0.0..=1.0).contains(&probability) {
        return Err(StakingError::InvalidInput(format!(
            "event probability must be in between 0 and 1, got {probability}"
        )));
    }
    Ok(())
}

fn check_odds(odds: f64) -> Result<(), StakingError> {
    // Written as a negation so NaN fails too.
    if !(odds > 1.0) {
        return Err(StakingError::InvalidInput(format!(
            "odds must be greater than 1, got {odds}"
        )));
    }
    Ok(())
}

fn check_unit_interval(name: &str, value: f64) -> Result<(), StakingError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(StakingError::InvalidInput(format!(
            "{name} must be in between 0 and 1, got {value}"
        )));
    }
    Ok(())
}

/// Fraction of bankroll to bet according to fractional Kelly.
///
/// Kelly formula over decimal odds `o`:
///   f = cap * (o * p - (1 - p)) / o
///
/// `fraction_cap` scales the full Kelly result (0.25 = quarter-Kelly).
/// A negative result means the bet has no edge; clamp to zero before
/// turning it into a stake.
pub fn kelly_fraction(
    probability: f64,
    odds: f64,
    fraction_cap: f64,
) -> Result<f64, StakingError> {
    check_probability(probability)?;
    check_odds(odds)?;
    check_unit_interval("Kelly fraction", fraction_cap)?;

    Ok(fraction_cap * (odds * probability - (1.0 - probability)) / odds)
}

/// Basic expected value: win `profit` with `probability`, else lose `loss`.
pub(crate) fn ev(probability: f64, profit: f64, loss: f64) -> Result<f64, StakingError> {
    check_probability(probability)?;
    Ok(probability * profit - (1.0 - probability) * loss)
}

fn ev_back(stake: f64, probability: f64, odds: f64, rate: f64) -> Result<f64, StakingError> {
    ev(
        probability,
        // Winnings net of commission, stake excluded.
        stake * (odds - 1.0) * (1.0 - rate),
        // A backer can lose at most the stake.
        stake,
    )
}

fn ev_lay(stake: f64, probability: f64, odds: f64, rate: f64) -> Result<f64, StakingError> {
    ev(
        probability,
        // The backer's stake, net of commission.
        stake * (1.0 - rate),
        // Liability.
        stake * (odds - 1.0),
    )
}

/// Expected value of a back or lay bet, net of commission.
///
/// `probability` is the probability of *this bet* winning: the event
/// happening for a back, the event failing for a lay.
pub fn expected_value(
    stake: f64,
    probability: f64,
    odds: f64,
    commission_rate: f64,
    side: Side,
) -> Result<f64, StakingError> {
    check_odds(odds)?;
    check_unit_interval("commission rate", commission_rate)?;

    match side {
        Side::Back => ev_back(stake, probability, odds, commission_rate),
        Side::Lay => ev_lay(stake, probability, odds, commission_rate),
    }
}

/// Round a monetary amount to cents (banker's rounding on the midpoint).
///
/// Non-finite input is returned unchanged.
pub fn round_cents(amount: f64) -> f64 {
    Decimal::from_f64(amount)
        .and_then(|d| d.round_dp(2).to_f64())
        .unwrap_or(amount)
}
