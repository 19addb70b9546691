//! Error taxonomy for factoring runs.
//!
//! Only configuration errors and attempt exhaustion cross the public
//! boundary. Every no-signal outcome inside a single attempt (an empty
//! filtered histogram, an exhausted convergent sequence, an order that
//! fails the modular identity) is an `Option` absorbed by the controller's
//! retry transition, never an error.

use num_bigint::BigUint;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShorError {
    /// The target must be an integer greater than 1.
    #[error("{0} is not a factorable modulus (need n > 1)")]
    InvalidModulus(BigUint),

    /// A prime modulus has no nontrivial factors.
    #[error("{0} is prime, nothing to factor")]
    PrimeModulus(BigUint),

    /// The initial base must lie in [2, n-2].
    #[error("initial base {base} is out of range for modulus {modulus}")]
    InvalidBase { base: BigUint, modulus: BigUint },

    /// The sampler has no precompiled circuit for this base/modulus pair.
    #[error("no order-finding circuit available for base {base} mod {modulus}")]
    UnsupportedPair { base: BigUint, modulus: BigUint },

    /// The retry cap was reached without finding a nontrivial factor.
    #[error("no factor found after {attempts} attempt(s)")]
    Exhausted { attempts: usize },
}
