//! Order-finding strategies behind one interface.
//!
//! The controller only ever sees [`OrderOracle`]; whether the order comes
//! from direct iteration or from phase-estimation sampling is a
//! construction-time choice.

use crate::error::ShorError;
use crate::histogram::filter_histogram;
use crate::recovery::{recover_order, PhaseEstimate};
use crate::sampler::{PhaseSampler, DEFAULT_SHOTS};
use factoring_core::multiplicative_order;
use num_bigint::BigUint;
use num_traits::Zero;

/// Fraction of the shot count a histogram entry must exceed to be
/// considered, unless it is the most probable pattern.
pub const DEFAULT_THRESHOLD_FRACTION: f64 = 0.1;

/// One attempt at finding the multiplicative order of `a` mod `n`.
///
/// `Ok(None)` is the recoverable no-signal outcome; the controller folds
/// it into a retry. `Err` is reserved for configuration problems that
/// retrying cannot fix.
pub trait OrderOracle {
    fn find_order(&self, a: &BigUint, n: &BigUint) -> Result<Option<BigUint>, ShorError>;
}

impl<O: OrderOracle + ?Sized> OrderOracle for &O {
    fn find_order(&self, a: &BigUint, n: &BigUint) -> Result<Option<BigUint>, ShorError> {
        (**self).find_order(a, n)
    }
}

/// Deterministic order finding by iterated modular multiplication.
///
/// Always terminates with the exact order for coprime input; cost grows
/// linearly with the order itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicalOrderOracle;

impl OrderOracle for ClassicalOrderOracle {
    fn find_order(&self, a: &BigUint, n: &BigUint) -> Result<Option<BigUint>, ShorError> {
        Ok(Some(multiplicative_order(a, n)))
    }
}

/// Order finding through an external phase sampler.
///
/// Per call: draw one histogram of `shots` trials, filter it against the
/// all-zero pattern with threshold `shots * threshold_fraction`, and run
/// continued-fraction recovery on each surviving pattern until one yields
/// an order. A pair the sampler has no circuit for is rejected before any
/// sampling happens.
pub struct QuantumOrderOracle<S> {
    sampler: S,
    shots: u32,
    threshold_fraction: f64,
}

impl<S: PhaseSampler> QuantumOrderOracle<S> {
    /// Default settings: 15,000 shots, 10% relative threshold.
    pub fn new(sampler: S) -> Self {
        Self::with_settings(sampler, DEFAULT_SHOTS, DEFAULT_THRESHOLD_FRACTION)
    }

    pub fn with_settings(sampler: S, shots: u32, threshold_fraction: f64) -> Self {
        QuantumOrderOracle {
            sampler,
            shots,
            threshold_fraction,
        }
    }
}

impl<S: PhaseSampler> OrderOracle for QuantumOrderOracle<S> {
    fn find_order(&self, a: &BigUint, n: &BigUint) -> Result<Option<BigUint>, ShorError> {
        if self.sampler.circuit_for(a, n).is_none() {
            return Err(ShorError::UnsupportedPair {
                base: a.clone(),
                modulus: n.clone(),
            });
        }

        let counts = self.sampler.sample(a, n, self.shots);
        let threshold = (self.shots as f64 * self.threshold_fraction) as u64;
        for (pattern, _count) in filter_histogram(&counts, threshold) {
            let phase = phase_from_pattern(&pattern);
            if let Some(order) = recover_order(a, n, &phase) {
                return Ok(Some(order));
            }
        }
        Ok(None)
    }
}

/// Undo the sampler's qubit ordering: reverse the pattern, then read it as
/// an ordinary most-significant-bit-first binary string.
pub fn phase_from_pattern(pattern: &str) -> PhaseEstimate {
    let value = pattern
        .bytes()
        .rev()
        .fold(BigUint::zero(), |acc, bit| (acc << 1u32) + u32::from(bit == b'1'));
    PhaseEstimate::new(value, pattern.len())
}
