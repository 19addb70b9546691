//! Shared modular arithmetic and test-target generation for the
//! order-finding factorization workspace.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::Rng;

/// Greatest common divisor.
pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    a.gcd(b)
}

/// Modular exponentiation: base^exp mod modulus.
pub fn mod_pow(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> BigUint {
    base.modpow(exp, modulus)
}

/// Multiplicative order of `a` mod `n`: the smallest r >= 1 with
/// a^r = 1 (mod n).
///
/// Precondition: 1 < a < n and gcd(a, n) = 1 (the loop does not terminate
/// for non-coprime a; callers exclude those via the gcd short-circuit).
///
/// Runs in O(r) modular multiplications, which caps practical use at
/// demonstration-scale n; the sampling oracle exists to replace exactly
/// this loop.
pub fn multiplicative_order(a: &BigUint, n: &BigUint) -> BigUint {
    debug_assert!(*a > BigUint::one() && a < n, "order is defined for 1 < a < n");
    debug_assert!(gcd(a, n).is_one(), "order is defined for coprime a");

    let mut y = a.clone();
    let mut r = BigUint::one();
    while !y.is_one() {
        y = y * a % n;
        r += 1u32;
    }
    r
}

/// Uniform random value in [0, bound), by rejection sampling at the bit
/// length of the bound.
///
/// Panics when `bound` is zero.
pub fn random_below(bound: &BigUint, rng: &mut impl Rng) -> BigUint {
    assert!(!bound.is_zero(), "empty sampling range");

    let bits = bound.bits();
    let num_bytes = ((bits + 7) / 8) as usize;
    let excess_bits = (num_bytes as u64 * 8 - bits) as u32;

    loop {
        let mut bytes = vec![0u8; num_bytes];
        rng.fill(&mut bytes[..]);
        if excess_bits > 0 {
            bytes[0] &= 0xffu8 >> excess_bits;
        }
        let candidate = BigUint::from_bytes_be(&bytes);
        if &candidate < bound {
            return candidate;
        }
    }
}

/// Miller-Rabin probabilistic primality test with `rounds` random witnesses.
pub fn is_probably_prime(n: &BigUint, rounds: u32) -> bool {
    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let three = BigUint::from(3u32);

    if *n < two {
        return false;
    }
    if n.is_even() {
        return *n == two;
    }
    if *n == three {
        return true;
    }

    // Write n-1 as 2^s * d with d odd.
    let n_minus_1 = n - &one;
    let mut d = n_minus_1.clone();
    let mut s = 0u32;
    while d.is_even() {
        d >>= 1u32;
        s += 1;
    }

    let witness_span = n - &three;
    let mut rng = rand::thread_rng();

    'witness: for _ in 0..rounds {
        // Random witness in [2, n-2]
        let a = &two + random_below(&witness_span, &mut rng);

        let mut x = mod_pow(&a, &d, n);
        if x == one || x == n_minus_1 {
            continue 'witness;
        }
        for _ in 1..s {
            x = mod_pow(&x, &two, n);
            if x == n_minus_1 {
                continue 'witness;
            }
        }
        return false;
    }

    true
}

/// Random prime with exactly `bits` bits.
pub fn random_prime(bits: u64, rng: &mut impl Rng) -> BigUint {
    assert!(bits >= 2, "cannot generate a prime with fewer than 2 bits");

    let top_bit = BigUint::one() << (bits - 1);
    loop {
        // Top bit forces the length, bottom bit forces odd.
        let mut candidate = random_below(&top_bit, rng);
        candidate |= &top_bit;
        candidate |= BigUint::one();
        debug_assert_eq!(candidate.bits(), bits);
        if is_probably_prime(&candidate, 20) {
            return candidate;
        }
    }
}

/// An odd semiprime with known factors, for verifying factoring runs.
#[derive(Debug, Clone)]
pub struct SemiprimeTarget {
    pub n: BigUint,
    pub p: BigUint,
    pub q: BigUint,
}

impl SemiprimeTarget {
    /// True when (d1, d2) is exactly the known factor pair, in either order.
    pub fn matches(&self, d1: &BigUint, d2: &BigUint) -> bool {
        (*d1 == self.p && *d2 == self.q) || (*d1 == self.q && *d2 == self.p)
    }
}

/// Random semiprime built from two distinct primes of `bits` bits each.
pub fn random_semiprime(bits: u64, rng: &mut impl Rng) -> SemiprimeTarget {
    let p = random_prime(bits, rng);
    let q = loop {
        let q = random_prime(bits, rng);
        if q != p {
            break q;
        }
    };
    let n = &p * &q;
    SemiprimeTarget { n, p, q }
}
