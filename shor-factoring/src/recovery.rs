//! Period recovery from a bounded-precision phase measurement.
//!
//! A measurement of the order-finding circuit yields an integer v over p
//! bits whose value approximates k/r for some 0 <= k < r, where r is the
//! order being hunted. The continued-fraction convergents of v/2^p are the
//! best rational approximations with small denominators, so the true order
//! shows up among the convergent denominators, unless the measurement
//! aliased onto k = 0 or k = 1, which carries no period information.
//!
//! Everything here is exact integer arithmetic. A float eigenphase loses
//! low bits once n grows and silently produces wrong convergents.

use factoring_core::mod_pow;
use num_bigint::BigUint;
use num_traits::{One, Zero};

/// One phase measurement: `value` over `bits` bits of precision,
/// representing the eigenphase value/2^bits in [0, 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseEstimate {
    pub value: BigUint,
    pub bits: usize,
}

impl PhaseEstimate {
    pub fn new(value: BigUint, bits: usize) -> Self {
        debug_assert!(value.bits() as usize <= bits, "value exceeds the register width");
        PhaseEstimate { value, bits }
    }
}

/// A continued-fraction convergent h/k of the eigenphase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Convergent {
    pub numerator: BigUint,
    pub denominator: BigUint,
}

/// Lazy convergent sequence of a rational eigenphase.
///
/// Runs the Euclidean algorithm on (value, 2^bits) one quotient at a time,
/// carrying the h/k recurrences:
///
/// ```text
/// h_k = a_k * h_{k-1} + h_{k-2}        h_{-1} = 1, h_{-2} = 0
/// k_k = a_k * k_{k-1} + k_{k-2}        k_{-1} = 0, k_{-2} = 1
/// ```
///
/// The integer-part convergent 0/1 is not yielded; from the first yielded
/// term on, denominators are strictly increasing. The sequence is finite
/// (the eigenphase is rational) and each call to [`convergents`] restarts
/// it from scratch; no state is shared between calls.
pub struct Convergents {
    num: BigUint,
    den: BigUint,
    h_prev1: BigUint,
    h_prev2: BigUint,
    k_prev1: BigUint,
    k_prev2: BigUint,
    index: usize,
}

/// Convergent sequence of the given phase estimate.
pub fn convergents(phase: &PhaseEstimate) -> Convergents {
    Convergents {
        num: phase.value.clone(),
        den: BigUint::one() << phase.bits,
        h_prev1: BigUint::one(),
        h_prev2: BigUint::zero(),
        k_prev1: BigUint::zero(),
        k_prev2: BigUint::one(),
        index: 0,
    }
}

impl Iterator for Convergents {
    type Item = Convergent;

    fn next(&mut self) -> Option<Convergent> {
        loop {
            if self.den.is_zero() {
                return None;
            }
            let a = &self.num / &self.den;
            let rem = &self.num % &self.den;
            self.num = std::mem::replace(&mut self.den, rem);

            let h = &a * &self.h_prev1 + &self.h_prev2;
            let k = &a * &self.k_prev1 + &self.k_prev2;
            self.h_prev2 = std::mem::replace(&mut self.h_prev1, h.clone());
            self.k_prev2 = std::mem::replace(&mut self.k_prev1, k.clone());

            self.index += 1;
            if self.index == 1 {
                // Integer part of a phase in [0, 1); always 0/1.
                continue;
            }
            return Some(Convergent {
                numerator: h,
                denominator: k,
            });
        }
    }
}

/// Best rational approximation to the eigenphase among convergents with
/// denominator at most `max_denominator`. `None` when the phase is zero.
pub fn best_approximation(phase: &PhaseEstimate, max_denominator: &BigUint) -> Option<Convergent> {
    let mut best = None;
    for c in convergents(phase) {
        if c.denominator > *max_denominator {
            break;
        }
        best = Some(c);
    }
    best
}

/// Recover the order of `a` mod `n` from one phase measurement.
///
/// Rejects immediately when the best approximation with denominator <= n
/// has numerator exactly 1: such a phase is indistinguishable from k = 0/1
/// aliasing and reporting a period from it would be a false positive.
/// Otherwise walks the convergent denominators d in increasing order while
/// d <= n and returns the first with a^d = 1 (mod n).
///
/// Deterministic: the same estimate always yields the same answer.
pub fn recover_order(a: &BigUint, n: &BigUint, phase: &PhaseEstimate) -> Option<BigUint> {
    let best = best_approximation(phase, n)?;
    if best.numerator.is_one() {
        return None;
    }

    for c in convergents(phase) {
        if c.denominator > *n {
            break;
        }
        if mod_pow(a, &c.denominator, n).is_one() {
            return Some(c.denominator);
        }
    }
    None
}
