//! Oscillation threshold evaluation.
//!
//! A side has oscillated when the absolute move from the tracked value
//! reaches `osc_percentage` percent of that tracked value:
//!
//! ```text
//! diff      = current - previous
//! threshold = osc_percentage * previous / 100
//! changed   = |diff| >= threshold
//! ```
//!
//! The comparison runs on unrounded values; only the stored `Diff` is
//! rounded to 4 decimal places.

use crate::error::{FeedError, FeedResult};
use ratewatch_core::{Diff, PriceSide, Rate, Settings};

/// Per-side outcome of comparing a fresh rate against the tracked one.
///
/// `Some` means the side changed; sides not covered by the price mode
/// are always `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Evaluation {
    pub ask: Option<Diff>,
    pub bid: Option<Diff>,
}

impl Evaluation {
    pub fn ask_changed(&self) -> bool {
        self.ask.is_some()
    }

    pub fn bid_changed(&self) -> bool {
        self.bid.is_some()
    }

    pub fn side(&self, side: PriceSide) -> Option<Diff> {
        match side {
            PriceSide::Ask => self.ask,
            PriceSide::Bid => self.bid,
        }
    }
}

/// Compare one side.
///
/// Returns `Ok(None)` when the move stays under the threshold. A zero
/// `previous` value always qualifies (the threshold is zero) and cannot
/// yield a percentage, so it is reported as `FeedError::ZeroBaseline`.
pub fn evaluate_side(
    side: PriceSide,
    previous: f64,
    current: f64,
    osc_percentage: f64,
) -> FeedResult<Option<Diff>> {
    let diff = current - previous;
    let threshold = osc_percentage * previous / 100.0;

    if diff.abs() < threshold {
        return Ok(None);
    }
    if previous == 0.0 {
        return Err(FeedError::ZeroBaseline { side });
    }

    Ok(Some(Diff::rounded(diff, diff * 100.0 / previous)))
}

/// Compare every side selected by `settings.price_mode()`.
pub fn evaluate(previous: &Rate, current: &Rate, settings: &Settings) -> FeedResult<Evaluation> {
    let mut evaluation = Evaluation::default();

    for side in PriceSide::ALL {
        if !settings.price_mode().tracks(side) {
            continue;
        }

        let diff = evaluate_side(
            side,
            previous.side_as_f64(side)?,
            current.side_as_f64(side)?,
            settings.osc_percentage(),
        )?;

        match side {
            PriceSide::Ask => evaluation.ask = diff,
            PriceSide::Bid => evaluation.bid = diff,
        }
    }

    Ok(evaluation)
}
