use std::fmt;
use std::num::NonZeroU32;

use crate::utils::constants::CUSTOM_AMOUNT_FALLBACK;

/// Number of issuances a generated link may grant. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShareAmount(NonZeroU32);

impl ShareAmount {
    pub const ONE: ShareAmount = ShareAmount(NonZeroU32::MIN);

    pub fn new(amount: u32) -> Option<Self> {
        NonZeroU32::new(amount).map(Self)
    }

    /// Strict parse: a positive decimal integer, surrounding whitespace allowed.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<u32>().ok().and_then(Self::new)
    }

    /// Parse user input, falling back to 5 when empty, non-numeric or zero.
    pub fn coerce(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_else(Self::fallback)
    }

    pub fn fallback() -> Self {
        Self::new(CUSTOM_AMOUNT_FALLBACK).unwrap_or(Self::ONE)
    }

    pub fn get(&self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for ShareAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
