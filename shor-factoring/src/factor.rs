//! Turning a candidate order into a factor pair.

use factoring_core::{gcd, mod_pow};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;

/// Try to split `n` using a candidate order `r` of `a` mod `n`.
///
/// The candidate is re-verified rather than trusted, since a probabilistic
/// oracle can hand back a value that fails a^r = 1 (mod n). An odd r, a
/// failed identity, or a^(r/2) = n-1 all reject the candidate. The n-1
/// comparison is deliberate: it is the canonical residue of -1, and
/// comparing against a literal -1 never matches an unsigned residue.
///
/// On success the answer is whichever of gcd(a^(r/2) - 1, n) and
/// gcd(a^(r/2) + 1, n) lands strictly between 1 and n, paired with its
/// cofactor.
pub fn split_from_order(a: &BigUint, r: &BigUint, n: &BigUint) -> Option<(BigUint, BigUint)> {
    let one = BigUint::one();

    if r.is_odd() {
        return None;
    }
    if !mod_pow(a, r, n).is_one() {
        return None;
    }

    let half_power = mod_pow(a, &(r >> 1), n);
    if half_power == n - &one {
        // a^(r/2) = -1 (mod n): this order only yields trivial divisors
        return None;
    }

    let candidates = [gcd(&(&half_power - &one), n), gcd(&(&half_power + &one), n)];
    for divisor in candidates {
        if divisor > one && divisor < *n {
            let cofactor = n / &divisor;
            return Some((divisor, cofactor));
        }
    }
    None
}
