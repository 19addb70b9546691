//! Integration tests for the order-finding factorization crate.

use num_bigint::BigUint;
use num_traits::One;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::Cell;
use std::collections::HashMap;

use factoring_core::{mod_pow, multiplicative_order, random_semiprime};
use shor_factoring::controller::SilentObserver;
use shor_factoring::oracle::phase_from_pattern;
use shor_factoring::recovery::{convergents, recover_order, PhaseEstimate};
use shor_factoring::sampler::{lsb_pattern, CircuitSpec, FixedHistogramSampler, IdealPhaseSampler};
use shor_factoring::{
    factor_ensemble, ClassicalOrderOracle, OrderOracle, QuantumOrderOracle, ShorConfig,
    ShorController, ShorError,
};

fn big(value: u64) -> BigUint {
    BigUint::from(value)
}

/// Oracle wrapper that counts invocations, for asserting the shortcut
/// paths never reach order finding.
struct CountingOracle {
    calls: Cell<usize>,
    inner: ClassicalOrderOracle,
}

impl CountingOracle {
    fn new() -> Self {
        CountingOracle {
            calls: Cell::new(0),
            inner: ClassicalOrderOracle,
        }
    }
}

impl OrderOracle for CountingOracle {
    fn find_order(&self, a: &BigUint, n: &BigUint) -> Result<Option<BigUint>, ShorError> {
        self.calls.set(self.calls.get() + 1);
        self.inner.find_order(a, n)
    }
}

// ============================================================
// Continued-fraction recovery
// ============================================================

#[test]
fn test_recovery_pipeline_from_measured_pattern() {
    // Sampler convention: "10100" reversed is 00101 = 5, over 5 bits.
    // Phase 5/32 ~ 1/6, so the order of 2 mod 21 falls out of the
    // convergent denominators.
    let phase = phase_from_pattern("10100");
    assert_eq!(phase, PhaseEstimate::new(big(5), 5));

    let r = recover_order(&big(2), &big(21), &phase);
    assert_eq!(r, Some(big(6)));
}

#[test]
fn test_recovered_order_satisfies_identity() {
    let n = big(21);
    for (a, pattern) in [(2u64, "10100"), (5, "10100"), (4, "110")] {
        let phase = phase_from_pattern(pattern);
        if let Some(r) = recover_order(&big(a), &n, &phase) {
            assert!(
                mod_pow(&big(a), &r, &n).is_one(),
                "recovered order {} of {} must satisfy a^r = 1",
                r,
                a
            );
        } else {
            panic!("expected an order for a = {}", a);
        }
    }
}

#[test]
fn test_recovery_denominators_increase_and_repeat() {
    for value in 1..32u64 {
        let estimate = PhaseEstimate::new(big(value), 5);
        let first: Vec<BigUint> = convergents(&estimate).map(|c| c.denominator).collect();
        let second: Vec<BigUint> = convergents(&estimate).map(|c| c.denominator).collect();
        assert_eq!(first, second, "sequence must restart identically");
        for pair in first.windows(2) {
            assert!(pair[0] < pair[1], "denominators for {}/32: {:?}", value, first);
        }
    }
}

#[test]
fn test_recovery_rejects_aliased_phase() {
    // 4/32 reduces to 1/8: numerator 1 means k = 0/1 aliasing
    let estimate = PhaseEstimate::new(big(4), 5);
    assert_eq!(recover_order(&big(5), &big(21), &estimate), None);
}

// ============================================================
// Order oracles
// ============================================================

#[test]
fn test_classical_oracle_finds_exact_orders() {
    let oracle = ClassicalOrderOracle;
    assert_eq!(oracle.find_order(&big(7), &big(15)).unwrap(), Some(big(4)));
    assert_eq!(oracle.find_order(&big(2), &big(21)).unwrap(), Some(big(6)));
    assert_eq!(oracle.find_order(&big(4), &big(21)).unwrap(), Some(big(3)));
}

#[test]
fn test_quantum_oracle_on_ideal_histograms() {
    let oracle = QuantumOrderOracle::new(IdealPhaseSampler);
    let n = big(21);

    // a = 4: 3 control bits, peaks at 3/8 and 5/8, order 3
    assert_eq!(oracle.find_order(&big(4), &n).unwrap(), Some(big(3)));
    // a = 5: 5 control bits, usable peaks at 5/32 and 27/32, order 6
    assert_eq!(oracle.find_order(&big(5), &n).unwrap(), Some(big(6)));
}

#[test]
fn test_quantum_oracle_rejects_pair_without_circuit() {
    let oracle = QuantumOrderOracle::new(IdealPhaseSampler);
    let err = oracle.find_order(&big(2), &big(21)).unwrap_err();
    assert_eq!(
        err,
        ShorError::UnsupportedPair {
            base: big(2),
            modulus: big(21),
        }
    );
}

#[test]
fn test_quantum_oracle_survives_noise_below_threshold() {
    // The true peak is buried among noise entries that the 10% threshold
    // removes; only the maximum and the peak survive filtering.
    let spec = CircuitSpec {
        control_bits: 5,
        work_bits: 5,
    };
    let mut counts: HashMap<String, u64> = HashMap::new();
    counts.insert(lsb_pattern(0, 5), 2_400);
    counts.insert(lsb_pattern(5, 5), 9_000); // phase 5/32: the signal
    for noise in [1u64, 2, 3, 9, 13, 30] {
        counts.insert(lsb_pattern(noise, 5), 600);
    }
    let oracle = QuantumOrderOracle::new(FixedHistogramSampler::new(5, 21, spec, counts));

    assert_eq!(oracle.find_order(&big(5), &big(21)).unwrap(), Some(big(6)));
}

#[test]
fn test_quantum_oracle_reports_no_signal() {
    let spec = CircuitSpec {
        control_bits: 5,
        work_bits: 5,
    };
    let counts: HashMap<String, u64> = [(lsb_pattern(0, 5), 15_000u64)].into_iter().collect();
    let oracle = QuantumOrderOracle::new(FixedHistogramSampler::new(5, 21, spec, counts));

    assert_eq!(oracle.find_order(&big(5), &big(21)).unwrap(), None);
}

// ============================================================
// Controller end-to-end
// ============================================================

#[test]
fn test_even_modulus_never_reaches_the_oracle() {
    let oracle = CountingOracle::new();
    let controller = ShorController::new(&oracle);
    let result = controller.factor(&big(8), &big(3)).unwrap();
    assert_eq!(result.factors, (big(2), big(4)));
    assert_eq!(result.attempts, 0);
    assert_eq!(oracle.calls.get(), 0);
}

#[test]
fn test_shared_factor_base_never_reaches_the_oracle() {
    let oracle = CountingOracle::new();
    let controller = ShorController::new(&oracle);
    let result = controller.factor(&big(15), &big(5)).unwrap();
    assert_eq!(result.factors, (big(5), big(3)));
    assert_eq!(result.attempts, 1);
    assert_eq!(oracle.calls.get(), 0);
}

#[test]
fn test_classical_factor_15_from_base_7() {
    // Order of 7 mod 15 is 4; 7^2 = 4, gcd(3, 15) = 3
    let controller = ShorController::new(ClassicalOrderOracle);
    let result = controller.factor(&big(15), &big(7)).unwrap();
    assert_eq!(result.factors, (big(3), big(5)));
    assert_eq!(result.attempts, 1);
}

#[test]
fn test_classical_retries_past_rejected_candidates() {
    // Base 5 mod 21 has order 6 but 5^3 = -1, so the run must retry with
    // fresh candidates until one splits 21.
    let controller = ShorController::new(ClassicalOrderOracle);
    let mut rng = StdRng::seed_from_u64(42);
    let result = controller
        .factor_with(&big(21), &big(5), &mut rng, &mut SilentObserver)
        .unwrap();

    let (d1, d2) = &result.factors;
    assert_eq!(d1 * d2, big(21));
    assert!(*d1 > BigUint::one() && *d1 < big(21));
    assert!(result.attempts >= 2, "base 5 itself cannot split 21");
}

#[test]
fn test_quantum_stub_end_to_end_factors_21() {
    // Replay histogram concentrated at value 5 over 5 bits (phase ~ 1/6)
    // for base 2: recovery yields order 6, and 2^3 = 8 splits 21.
    let spec = CircuitSpec {
        control_bits: 5,
        work_bits: 5,
    };
    let counts: HashMap<String, u64> = [
        (lsb_pattern(5, 5), 12_000u64),
        (lsb_pattern(0, 5), 3_000),
    ]
    .into_iter()
    .collect();
    let oracle = QuantumOrderOracle::new(FixedHistogramSampler::new(2, 21, spec, counts));

    let controller = ShorController::new(oracle);
    let result = controller.factor(&big(21), &big(2)).unwrap();
    assert_eq!(result.factors, (big(7), big(3)));
    assert_eq!(result.attempts, 1);
}

#[test]
fn test_quantum_unsupported_pair_surfaces_as_config_error() {
    // The stub only has a circuit for (2, 21); starting from base 5 asks
    // for a circuit that does not exist and must fail before sampling.
    let spec = CircuitSpec {
        control_bits: 5,
        work_bits: 5,
    };
    let oracle =
        QuantumOrderOracle::new(FixedHistogramSampler::new(2, 21, spec, HashMap::new()));
    let controller = ShorController::new(oracle);

    let err = controller.factor(&big(21), &big(5)).unwrap_err();
    assert_eq!(
        err,
        ShorError::UnsupportedPair {
            base: big(5),
            modulus: big(21),
        }
    );
}

#[test]
fn test_exhaustion_is_a_definite_failure() {
    // With a cap of one attempt and a base that cannot split 21, the run
    // must terminate with Exhausted instead of looping.
    let controller =
        ShorController::with_config(ClassicalOrderOracle, ShorConfig { max_attempts: 1 });
    let err = controller.factor(&big(21), &big(5)).unwrap_err();
    assert_eq!(err, ShorError::Exhausted { attempts: 1 });
}

#[test]
fn test_configuration_errors_are_not_retried() {
    let controller = ShorController::new(ClassicalOrderOracle);
    assert!(matches!(
        controller.factor(&BigUint::one(), &big(2)).unwrap_err(),
        ShorError::InvalidModulus(_)
    ));
    assert!(matches!(
        controller.factor(&big(101), &big(2)).unwrap_err(),
        ShorError::PrimeModulus(_)
    ));
    assert!(matches!(
        controller.factor(&big(15), &big(1)).unwrap_err(),
        ShorError::InvalidBase { .. }
    ));
}

#[test]
fn test_factors_random_semiprime() {
    let mut rng = StdRng::seed_from_u64(1234);
    let target = random_semiprime(10, &mut rng);

    let controller = ShorController::new(ClassicalOrderOracle);
    let result = controller
        .factor_with(&target.n, &big(2), &mut rng, &mut SilentObserver)
        .unwrap();

    let (d1, d2) = &result.factors;
    assert!(
        target.matches(d1, d2),
        "expected {} = {} x {}, got {} x {}",
        target.n,
        target.p,
        target.q,
        d1,
        d2
    );
}

#[test]
fn test_order_used_by_controller_is_minimal() {
    // The classical oracle must hand the controller the minimal order,
    // not just any exponent satisfying the identity.
    let r = multiplicative_order(&big(2), &big(253));
    assert_eq!(r, big(110));
    assert!(mod_pow(&big(2), &r, &big(253)).is_one());
}

// ============================================================
// Parallel ensemble
// ============================================================

#[test]
fn test_ensemble_first_hit_wins() {
    let bases = [big(2), big(3), big(5)];
    let result = factor_ensemble(
        &ClassicalOrderOracle,
        &big(253),
        &bases,
        &ShorConfig::default(),
    )
    .unwrap();

    let (d1, d2) = &result.factors;
    assert_eq!(d1 * d2, big(253));
    assert!(*d1 == big(11) || *d1 == big(23));
}

#[test]
fn test_ensemble_with_no_bases_is_exhausted() {
    let err = factor_ensemble(
        &ClassicalOrderOracle,
        &big(253),
        &[],
        &ShorConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err, ShorError::Exhausted { attempts: 0 });
}

#[test]
fn test_ensemble_surfaces_configuration_errors() {
    let bases = [big(2), big(3)];
    let err = factor_ensemble(
        &ClassicalOrderOracle,
        &big(101),
        &bases,
        &ShorConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ShorError::PrimeModulus(_)));
}
