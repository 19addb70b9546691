//! Demo binary: factor a number with the order-finding retry loop.

use num_bigint::BigUint;
use serde::Serialize;
use std::process::ExitCode;

use shor_factoring::controller::{ConsoleObserver, ShorObserver, SilentObserver};
use shor_factoring::oracle::DEFAULT_THRESHOLD_FRACTION;
use shor_factoring::sampler::{IdealPhaseSampler, DEFAULT_SHOTS};
use shor_factoring::{
    factor_ensemble, ClassicalOrderOracle, Factorization, OrderOracle, QuantumOrderOracle,
    ShorConfig, ShorController,
};

/// Machine-readable summary of one run, printed with `--json`.
#[derive(Serialize)]
struct RunReport {
    n: String,
    factor1: String,
    factor2: String,
    attempts: usize,
    oracle: String,
    elapsed_ms: f64,
}

struct CliOptions {
    n: BigUint,
    initial: BigUint,
    quantum: bool,
    shots: u32,
    max_attempts: usize,
    threshold: f64,
    json: bool,
    quiet: bool,
    demo: bool,
}

fn usage() {
    println!("Usage: shor-factoring [N] [INITIAL] [flags]");
    println!();
    println!("  N               number to factor (default 253)");
    println!("  INITIAL         first base to try (default 4)");
    println!("  --quantum       use the sampling oracle instead of direct iteration");
    println!("  --shots S       trials per sampling call (default {})", DEFAULT_SHOTS);
    println!("  --max-attempts M  retry cap (default 10000)");
    println!("  --threshold F   relative histogram threshold (default {})", DEFAULT_THRESHOLD_FRACTION);
    println!("  --json          print a JSON report after the run");
    println!("  --quiet         suppress per-attempt progress lines");
    println!();
    println!("With no arguments, runs the demo sweep.");
}

fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut opts = CliOptions {
        n: BigUint::from(253u32),
        initial: BigUint::from(4u32),
        quantum: false,
        shots: DEFAULT_SHOTS,
        max_attempts: ShorConfig::default().max_attempts,
        threshold: DEFAULT_THRESHOLD_FRACTION,
        json: false,
        quiet: false,
        demo: args.is_empty(),
    };

    let mut positional: Vec<String> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--quantum" => opts.quantum = true,
            "--json" => opts.json = true,
            "--quiet" => opts.quiet = true,
            "--shots" => {
                i += 1;
                let value = args.get(i).ok_or("--shots needs a value")?;
                opts.shots = value.parse().map_err(|_| format!("bad --shots value: {}", value))?;
            }
            "--max-attempts" => {
                i += 1;
                let value = args.get(i).ok_or("--max-attempts needs a value")?;
                opts.max_attempts = value
                    .parse()
                    .map_err(|_| format!("bad --max-attempts value: {}", value))?;
            }
            "--threshold" => {
                i += 1;
                let value = args.get(i).ok_or("--threshold needs a value")?;
                opts.threshold = value
                    .parse()
                    .map_err(|_| format!("bad --threshold value: {}", value))?;
            }
            "--help" | "-h" => {
                usage();
                std::process::exit(0);
            }
            flag if flag.starts_with("--") => return Err(format!("unknown flag: {}", flag)),
            value => positional.push(value.to_string()),
        }
        i += 1;
    }

    if let Some(value) = positional.first() {
        opts.n = value.parse().map_err(|_| format!("bad N: {}", value))?;
        opts.demo = false;
    }
    if let Some(value) = positional.get(1) {
        opts.initial = value.parse().map_err(|_| format!("bad INITIAL: {}", value))?;
    }
    if positional.len() > 2 {
        return Err("too many positional arguments".to_string());
    }
    Ok(opts)
}

fn print_result(result: &Factorization, oracle_name: &str, json: bool) {
    println!();
    println!("Factor 1: {}", result.factors.0);
    println!("Factor 2: {}", result.factors.1);
    println!("Product:  {}", &result.factors.0 * &result.factors.1);
    println!("{} attempt(s), {:?}", result.attempts, result.duration);

    if json {
        let report = RunReport {
            n: result.n.to_string(),
            factor1: result.factors.0.to_string(),
            factor2: result.factors.1.to_string(),
            attempts: result.attempts,
            oracle: oracle_name.to_string(),
            elapsed_ms: result.duration.as_secs_f64() * 1_000.0,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(err) => eprintln!("report serialization failed: {}", err),
        }
    }
}

fn run_demo() {
    println!("=== shor-factoring demo ===\n");

    println!("--- Classical oracle ---");
    let controller = ShorController::new(ClassicalOrderOracle);
    let initial = BigUint::from(2u32);
    for n_val in [15u64, 21, 35, 253, 10_403] {
        let n = BigUint::from(n_val);
        match controller.factor(&n, &initial) {
            Ok(result) => println!(
                "  {} = {} x {} ({} attempt(s), {:?})",
                n, result.factors.0, result.factors.1, result.attempts, result.duration
            ),
            Err(err) => println!("  {} FAILED: {}", n, err),
        }
    }
    println!();

    println!("--- Quantum oracle (ideal sampler) ---");
    let oracle = QuantumOrderOracle::new(IdealPhaseSampler);
    let n = BigUint::from(21u32);
    for a_val in [4u32, 5] {
        let a = BigUint::from(a_val);
        match oracle.find_order(&a, &n) {
            Ok(Some(r)) => println!("  recovered order of {} mod {}: {}", a, n, r),
            Ok(None) => println!("  no order recovered for {} mod {}", a, n),
            Err(err) => println!("  {}", err),
        }
    }
    println!();

    println!("--- Parallel ensemble (classical) ---");
    let n = BigUint::from(253u32);
    let bases: Vec<BigUint> = [2u32, 3, 5].iter().map(|&b| BigUint::from(b)).collect();
    match factor_ensemble(&ClassicalOrderOracle, &n, &bases, &ShorConfig::default()) {
        Ok(result) => println!(
            "  {} = {} x {} ({} attempt(s) total)",
            n, result.factors.0, result.factors.1, result.attempts
        ),
        Err(err) => println!("  {} FAILED: {}", n, err),
    }
}

fn main() -> ExitCode {
    let opts = match parse_args() {
        Ok(opts) => opts,
        Err(message) => {
            eprintln!("{}", message);
            usage();
            return ExitCode::FAILURE;
        }
    };

    if opts.demo {
        run_demo();
        return ExitCode::SUCCESS;
    }

    let oracle_name = if opts.quantum { "quantum" } else { "classical" };
    println!("=== Factoring {} ===", opts.n);
    println!("initial base {}, {} oracle\n", opts.initial, oracle_name);

    let config = ShorConfig {
        max_attempts: opts.max_attempts,
    };
    let mut console = ConsoleObserver;
    let mut silent = SilentObserver;
    let observer: &mut dyn ShorObserver = if opts.quiet { &mut silent } else { &mut console };
    let mut rng = rand::thread_rng();

    let outcome = if opts.quantum {
        let oracle = QuantumOrderOracle::with_settings(IdealPhaseSampler, opts.shots, opts.threshold);
        ShorController::with_config(oracle, config).factor_with(
            &opts.n,
            &opts.initial,
            &mut rng,
            observer,
        )
    } else {
        ShorController::with_config(ClassicalOrderOracle, config).factor_with(
            &opts.n,
            &opts.initial,
            &mut rng,
            observer,
        )
    };

    match outcome {
        Ok(result) => {
            print_result(&result, oracle_name, opts.json);
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("\nNo factors found: {}", err);
            ExitCode::FAILURE
        }
    }
}
