//! The external quantum sampling collaborator.
//!
//! The order-finding circuit itself lives outside this crate. We consume it
//! as a black box: given a base/modulus pair it has a precompiled circuit
//! for, it returns a histogram of measured control-register patterns over a
//! fixed number of shots. Patterns use the collaborator's qubit ordering
//! (least-significant measured bit first), which the oracle undoes before
//! interpreting a pattern as a phase value.

use crate::histogram::Histogram;
use factoring_core::multiplicative_order;
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use rand::Rng;

/// Default number of repeated trials per sampling call.
pub const DEFAULT_SHOTS: u32 = 15_000;

/// Register sizing for one precompiled circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitSpec {
    /// Qubits in the control register; also the phase precision in bits.
    pub control_bits: usize,
    /// Qubits carrying the modular-multiplication state.
    pub work_bits: usize,
}

/// The precompiled circuit library: the only (base, modulus) pairs the
/// external collaborator can sample.
const CIRCUIT_LIBRARY: &[(u64, u64, CircuitSpec)] = &[
    (4, 21, CircuitSpec { control_bits: 3, work_bits: 2 }),
    (5, 21, CircuitSpec { control_bits: 5, work_bits: 5 }),
];

/// Register sizing for a supported pair, or `None` when no circuit exists.
pub fn library_circuit(a: &BigUint, n: &BigUint) -> Option<CircuitSpec> {
    let a = a.to_u64()?;
    let n = n.to_u64()?;
    CIRCUIT_LIBRARY
        .iter()
        .find(|(base, modulus, _)| *base == a && *modulus == n)
        .map(|(_, _, spec)| *spec)
}

/// Source of phase-measurement histograms.
pub trait PhaseSampler {
    /// Register sizing for (a, n), or `None` when this sampler has no
    /// circuit for the pair. Callers must treat `None` as a configuration
    /// error and never call [`PhaseSampler::sample`] for such a pair.
    fn circuit_for(&self, a: &BigUint, n: &BigUint) -> Option<CircuitSpec>;

    /// Draw `shots` measurements for a supported pair.
    fn sample(&self, a: &BigUint, n: &BigUint, shots: u32) -> Histogram;
}

/// Encode a measured value in the collaborator's bit order
/// (least-significant bit first).
pub fn lsb_pattern(value: u64, width: usize) -> String {
    (0..width)
        .map(|i| if value >> i & 1 == 1 { '1' } else { '0' })
        .collect()
}

/// Measurement-statistics stand-in for the external circuit library.
///
/// Computes the true order classically and concentrates counts at the
/// ideal peak locations round(k * 2^p / r) for k uniform in [0, r). This
/// is not a circuit simulation (no gates, no state vector); it exists so
/// the quantum control path can be exercised end to end without hardware.
/// Supports exactly the pairs of the real library.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdealPhaseSampler;

impl PhaseSampler for IdealPhaseSampler {
    fn circuit_for(&self, a: &BigUint, n: &BigUint) -> Option<CircuitSpec> {
        library_circuit(a, n)
    }

    fn sample(&self, a: &BigUint, n: &BigUint, shots: u32) -> Histogram {
        let spec = library_circuit(a, n).expect("sample() requires a supported pair");
        let precision = spec.control_bits;
        let scale = 1u64 << precision;
        let r = multiplicative_order(a, n)
            .to_u64()
            .expect("library orders fit in u64");

        let mut rng = rand::thread_rng();
        let mut counts = Histogram::new();
        for _ in 0..shots {
            let k = rng.gen_range(0..r);
            let peak = ((k * scale + r / 2) / r) % scale;
            *counts.entry(lsb_pattern(peak, precision)).or_insert(0) += 1;
        }
        counts
    }
}

/// Deterministic replay sampler for tests: one configured pair, one canned
/// histogram returned for every call.
#[derive(Debug, Clone)]
pub struct FixedHistogramSampler {
    base: BigUint,
    modulus: BigUint,
    spec: CircuitSpec,
    counts: Histogram,
}

impl FixedHistogramSampler {
    pub fn new(base: u64, modulus: u64, spec: CircuitSpec, counts: Histogram) -> Self {
        FixedHistogramSampler {
            base: BigUint::from(base),
            modulus: BigUint::from(modulus),
            spec,
            counts,
        }
    }
}

impl PhaseSampler for FixedHistogramSampler {
    fn circuit_for(&self, a: &BigUint, n: &BigUint) -> Option<CircuitSpec> {
        (*a == self.base && *n == self.modulus).then_some(self.spec)
    }

    fn sample(&self, _a: &BigUint, _n: &BigUint, _shots: u32) -> Histogram {
        self.counts.clone()
    }
}
