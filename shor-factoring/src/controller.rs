//! The retry loop driving candidate selection, order finding, and factor
//! extraction.
//!
//! One run walks SelectCandidate -> CheckTrivialFactor -> FindOrder ->
//! ExtractFactor, falling back to Retry whenever a stage comes up empty.
//! The attempt set is created at run start, grows by one tried base per
//! retry, and dies when the run returns; nothing else is mutable across
//! iterations.

use crate::error::ShorError;
use crate::factor::split_from_order;
use crate::oracle::OrderOracle;
use factoring_core::{gcd, is_probably_prime, random_below};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;
use rand::Rng;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Miller-Rabin rounds for the prime-modulus configuration check.
const PRIMALITY_ROUNDS: u32 = 20;

/// Tunables for one factoring run.
#[derive(Debug, Clone)]
pub struct ShorConfig {
    /// Hard cap on bases tried before the run reports exhaustion.
    pub max_attempts: usize,
}

impl Default for ShorConfig {
    fn default() -> Self {
        ShorConfig {
            max_attempts: 10_000,
        }
    }
}

/// A completed factoring run.
#[derive(Debug, Clone)]
pub struct Factorization {
    /// The number that was factored.
    pub n: BigUint,
    /// The nontrivial factor pair, d1 * d2 = n.
    pub factors: (BigUint, BigUint),
    /// Bases consumed, counting the one that succeeded.
    pub attempts: usize,
    /// Wall-clock time for the run.
    pub duration: Duration,
}

/// Progress events from a run.
///
/// Injected reporting instead of ambient verbosity flags: the controller
/// calls these at every transition and implementations decide what to do
/// with them. All methods default to no-ops.
pub trait ShorObserver {
    fn candidate_selected(&mut self, _attempt: usize, _a: &BigUint) {}
    fn trivial_factor(&mut self, _a: &BigUint, _divisor: &BigUint) {}
    fn order_found(&mut self, _a: &BigUint, _r: &BigUint) {}
    fn order_not_found(&mut self, _a: &BigUint) {}
    fn order_rejected(&mut self, _a: &BigUint, _r: &BigUint) {}
    fn factors_found(&mut self, _d1: &BigUint, _d2: &BigUint) {}
}

/// Observer that swallows every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl ShorObserver for SilentObserver {}

/// Observer that prints one line per event.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleObserver;

impl ShorObserver for ConsoleObserver {
    fn candidate_selected(&mut self, attempt: usize, a: &BigUint) {
        println!("attempt {}: trying base a = {}", attempt, a);
    }

    fn trivial_factor(&mut self, a: &BigUint, divisor: &BigUint) {
        println!("  gcd({}, n) = {} already splits n", a, divisor);
    }

    fn order_found(&mut self, a: &BigUint, r: &BigUint) {
        println!("  order of {} is {}", a, r);
    }

    fn order_not_found(&mut self, a: &BigUint) {
        println!("  no order recovered for base {}, retrying", a);
    }

    fn order_rejected(&mut self, a: &BigUint, r: &BigUint) {
        println!("  order {} of base {} yields no factor, retrying", r, a);
    }

    fn factors_found(&mut self, d1: &BigUint, d2: &BigUint) {
        println!("  found factors {} x {}", d1, d2);
    }
}

/// Retry loop around a configured order oracle.
pub struct ShorController<O> {
    oracle: O,
    config: ShorConfig,
}

impl<O: OrderOracle> ShorController<O> {
    pub fn new(oracle: O) -> Self {
        Self::with_config(oracle, ShorConfig::default())
    }

    pub fn with_config(oracle: O, config: ShorConfig) -> Self {
        ShorController { oracle, config }
    }

    /// Factor `n` starting from the given base, with thread-local
    /// randomness and no progress output.
    pub fn factor(&self, n: &BigUint, initial: &BigUint) -> Result<Factorization, ShorError> {
        self.factor_with(n, initial, &mut rand::thread_rng(), &mut SilentObserver)
    }

    /// Factor `n` with injected randomness and progress reporting.
    pub fn factor_with(
        &self,
        n: &BigUint,
        initial: &BigUint,
        rng: &mut impl Rng,
        observer: &mut dyn ShorObserver,
    ) -> Result<Factorization, ShorError> {
        self.run(n, initial, rng, observer, None)
    }

    fn run(
        &self,
        n: &BigUint,
        initial: &BigUint,
        rng: &mut impl Rng,
        observer: &mut dyn ShorObserver,
        stop: Option<&AtomicBool>,
    ) -> Result<Factorization, ShorError> {
        let start = Instant::now();
        let one = BigUint::one();
        let two = BigUint::from(2u32);

        if *n <= one {
            return Err(ShorError::InvalidModulus(n.clone()));
        }
        // An even modulus needs no search at all.
        if n.is_even() {
            if *n == two {
                return Err(ShorError::PrimeModulus(n.clone()));
            }
            let half = n / &two;
            observer.factors_found(&two, &half);
            return Ok(Factorization {
                n: n.clone(),
                factors: (two, half),
                attempts: 0,
                duration: start.elapsed(),
            });
        }
        if is_probably_prime(n, PRIMALITY_ROUNDS) {
            return Err(ShorError::PrimeModulus(n.clone()));
        }
        if *initial < two || *initial > n - &two {
            return Err(ShorError::InvalidBase {
                base: initial.clone(),
                modulus: n.clone(),
            });
        }

        // Candidate bases live in [2, n-2].
        let pool_size = n - BigUint::from(3u32);
        let mut attempts: Vec<BigUint> = Vec::new();
        let mut a = initial.clone();

        loop {
            if let Some(flag) = stop {
                if flag.load(Ordering::Relaxed) {
                    return Err(ShorError::Exhausted {
                        attempts: attempts.len(),
                    });
                }
            }
            if attempts.len() >= self.config.max_attempts
                || BigUint::from(attempts.len()) >= pool_size
            {
                return Err(ShorError::Exhausted {
                    attempts: attempts.len(),
                });
            }

            if !attempts.is_empty() {
                a = select_candidate(n, &attempts, rng);
            }
            observer.candidate_selected(attempts.len() + 1, &a);

            // A non-coprime base is already a factor.
            let divisor = gcd(&a, n);
            if !divisor.is_one() {
                observer.trivial_factor(&a, &divisor);
                let cofactor = n / &divisor;
                observer.factors_found(&divisor, &cofactor);
                return Ok(Factorization {
                    n: n.clone(),
                    factors: (divisor, cofactor),
                    attempts: attempts.len() + 1,
                    duration: start.elapsed(),
                });
            }

            match self.oracle.find_order(&a, n)? {
                Some(r) => {
                    observer.order_found(&a, &r);
                    if let Some((d1, d2)) = split_from_order(&a, &r, n) {
                        observer.factors_found(&d1, &d2);
                        return Ok(Factorization {
                            n: n.clone(),
                            factors: (d1, d2),
                            attempts: attempts.len() + 1,
                            duration: start.elapsed(),
                        });
                    }
                    observer.order_rejected(&a, &r);
                }
                None => observer.order_not_found(&a),
            }
            attempts.push(a.clone());
        }
    }
}

/// Uniform random base in [2, n-2] outside the attempt set.
///
/// Callers guarantee the pool is not exhausted.
fn select_candidate(n: &BigUint, attempts: &[BigUint], rng: &mut impl Rng) -> BigUint {
    let two = BigUint::from(2u32);
    let span = n - BigUint::from(3u32);
    loop {
        let candidate = &two + random_below(&span, rng);
        if !attempts.contains(&candidate) {
            return candidate;
        }
    }
}

/// Run independent factoring attempts from several initial bases as scoped
/// threads, first hit wins.
///
/// Each thread owns its attempt set and RNG; the only shared state is the
/// stop flag the winner raises and the result slot. Threads observe the
/// flag between iterations; an in-flight oracle call is never interrupted.
pub fn factor_ensemble<O: OrderOracle + Sync>(
    oracle: &O,
    n: &BigUint,
    initial_bases: &[BigUint],
    config: &ShorConfig,
) -> Result<Factorization, ShorError> {
    if initial_bases.is_empty() {
        return Err(ShorError::Exhausted { attempts: 0 });
    }

    let found = AtomicBool::new(false);
    let result: Mutex<Option<Factorization>> = Mutex::new(None);
    let config_error: Mutex<Option<ShorError>> = Mutex::new(None);
    let attempts_used = AtomicUsize::new(0);

    std::thread::scope(|s| {
        for initial in initial_bases {
            let found_ref = &found;
            let result_ref = &result;
            let error_ref = &config_error;
            let attempts_ref = &attempts_used;
            s.spawn(move || {
                if found_ref.load(Ordering::Relaxed) {
                    return;
                }
                let controller = ShorController::with_config(oracle, config.clone());
                let outcome = controller.run(
                    n,
                    initial,
                    &mut rand::thread_rng(),
                    &mut SilentObserver,
                    Some(found_ref),
                );
                match outcome {
                    Ok(hit) => {
                        attempts_ref.fetch_add(hit.attempts, Ordering::Relaxed);
                        found_ref.store(true, Ordering::Relaxed);
                        let mut slot = result_ref.lock().unwrap();
                        if slot.is_none() {
                            *slot = Some(hit);
                        }
                    }
                    Err(ShorError::Exhausted { attempts }) => {
                        attempts_ref.fetch_add(attempts, Ordering::Relaxed);
                    }
                    Err(err) => {
                        let mut slot = error_ref.lock().unwrap();
                        if slot.is_none() {
                            *slot = Some(err);
                        }
                    }
                }
            });
        }
    });

    if let Some(hit) = result.lock().unwrap().take() {
        return Ok(hit);
    }
    if let Some(err) = config_error.lock().unwrap().take() {
        return Err(err);
    }
    Err(ShorError::Exhausted {
        attempts: attempts_used.load(Ordering::Relaxed),
    })
}
