//! Ticker rate observation.
//!
//! A `Rate` keeps the ask and bid exactly as the ticker reported them.
//! Numeric conversion happens on demand so that a malformed side is
//! reported to the caller instead of being read as zero.

use crate::error::{CoreError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// One side of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSide {
    Ask,
    Bid,
}

impl PriceSide {
    /// Both sides, in evaluation order.
    pub const ALL: [PriceSide; 2] = [PriceSide::Ask, PriceSide::Bid];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ask => "ask",
            Self::Bid => "bid",
        }
    }
}

impl fmt::Display for PriceSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ask/bid snapshot for one pair at one observation.
///
/// Accepts both JSON strings and JSON numbers on the wire; the decimal
/// text is kept verbatim so that untouched sides compare byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rate {
    #[serde(deserialize_with = "decimal_text")]
    pub ask: String,
    #[serde(deserialize_with = "decimal_text")]
    pub bid: String,
}

impl Rate {
    pub fn new(ask: impl Into<String>, bid: impl Into<String>) -> Self {
        Self {
            ask: ask.into(),
            bid: bid.into(),
        }
    }

    /// Ask price as `f64`.
    pub fn ask_as_f64(&self) -> Result<f64> {
        parse_side(PriceSide::Ask, &self.ask)
    }

    /// Bid price as `f64`.
    pub fn bid_as_f64(&self) -> Result<f64> {
        parse_side(PriceSide::Bid, &self.bid)
    }

    /// Raw decimal text of one side.
    pub fn side(&self, side: PriceSide) -> &str {
        match side {
            PriceSide::Ask => &self.ask,
            PriceSide::Bid => &self.bid,
        }
    }

    pub fn side_as_f64(&self, side: PriceSide) -> Result<f64> {
        match side {
            PriceSide::Ask => self.ask_as_f64(),
            PriceSide::Bid => self.bid_as_f64(),
        }
    }

    /// Copy of this rate with one side replaced; the other side is kept as is.
    #[must_use]
    pub fn with_side(&self, side: PriceSide, value: impl Into<String>) -> Self {
        let mut rate = self.clone();
        match side {
            PriceSide::Ask => rate.ask = value.into(),
            PriceSide::Bid => rate.bid = value.into(),
        }
        rate
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ask={} bid={}", self.ask, self.bid)
    }
}

fn parse_side(side: PriceSide, value: &str) -> Result<f64> {
    let invalid = || CoreError::NumericParse {
        side,
        value: value.to_string(),
    };

    let value = value.trim();
    match Decimal::from_str(value).or_else(|_| Decimal::from_scientific(value)) {
        Ok(decimal) => decimal.to_f64().ok_or_else(invalid),
        // Finite numbers outside Decimal's range
        Err(_) => value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(invalid),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DecimalText {
    Text(String),
    Number(serde_json::Number),
}

fn decimal_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match DecimalText::deserialize(deserializer)? {
        DecimalText::Text(text) => text,
        DecimalText::Number(number) => number.to_string(),
    })
}
