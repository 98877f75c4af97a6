//! # Oracle Adapter
//!
//! Turns the latest round of a price feed into a trusted positive price,
//! or into the specific reason it cannot be trusted. There is no fallback:
//! a quote either passes every check or the caller gets the failure.

use issuance_primitives::{FeedId, OracleBinding, RoundFeeds, GRACE_PERIOD_SECS};

/// Why a quote was rejected.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OracleError {
    /// The asset has no feed bound
    NotConfigured,
    /// The feed (or its liveness guard) returned nothing
    Unavailable,
    /// Zero or negative answer
    InvalidPrice,
    /// Round id is zero or the answer comes from an older round
    IncompleteRound,
    /// Round carries no update time
    MissingTimestamp,
    /// Quote older than the binding's staleness threshold
    StalePrice,
    /// Liveness guard reports the upstream as down
    GuardTripped,
    /// Upstream came back up less than `GRACE_PERIOD_SECS` ago
    GracePeriodNotOver,
}

/// A quote that passed validation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ValidatedPrice {
    /// Strictly positive price scaled by `decimals`
    pub price: u128,
    pub decimals: u8,
}

/// Validate the latest quote of `binding`'s feed at time `now` (unix seconds).
///
/// Checks run in a fixed order: binding, availability, sign, round
/// completeness, timestamp, staleness, liveness guard. An unset clock
/// (`now == 0`) counts as unavailable, since no age can be judged. The staleness
/// boundary is inclusive, so a quote exactly `staleness_threshold` seconds
/// old is accepted.
pub fn validated_price<F: RoundFeeds>(
    binding: &OracleBinding,
    now: u64,
) -> Result<ValidatedPrice, OracleError> {
    let feed = binding.feed.ok_or(OracleError::NotConfigured)?;
    if now == 0 {
        return Err(OracleError::Unavailable);
    }
    let round = F::latest_round_data(feed).ok_or(OracleError::Unavailable)?;
    let decimals = F::decimals(feed).ok_or(OracleError::Unavailable)?;

    if round.answer <= 0 {
        return Err(OracleError::InvalidPrice);
    }
    if round.round_id == 0 || round.answered_in_round < round.round_id {
        return Err(OracleError::IncompleteRound);
    }
    if round.updated_at == 0 {
        return Err(OracleError::MissingTimestamp);
    }
    if binding.staleness_threshold > 0
        && now.saturating_sub(round.updated_at) > binding.staleness_threshold
    {
        return Err(OracleError::StalePrice);
    }
    if let Some(guard) = binding.liveness_guard {
        ensure_upstream_live::<F>(guard, now)?;
    }

    Ok(ValidatedPrice { price: round.answer as u128, decimals })
}

/// A guard answer of 0 means up, anything positive means down. Even an
/// "up" answer is only trusted once it has held for the grace period.
fn ensure_upstream_live<F: RoundFeeds>(guard: FeedId, now: u64) -> Result<(), OracleError> {
    let state = F::latest_round_data(guard).ok_or(OracleError::Unavailable)?;
    if state.answer > 0 {
        return Err(OracleError::GuardTripped);
    }
    if now.saturating_sub(state.started_at) < GRACE_PERIOD_SECS {
        return Err(OracleError::GracePeriodNotOver);
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
