//! # shor-factoring
//!
//! Integer factoring by multiplicative order: pick a base a, find the
//! order r of a mod N, and when r is even and a^(r/2) is not -1, split N
//! via gcd(a^(r/2) +- 1, N).
//!
//! The quantum circuit itself is out of scope: it is consumed as a
//! black-box sampler returning measurement histograms ([`sampler`]). This
//! crate is the classical control around it: the candidate retry loop
//! ([`controller`]), histogram filtering ([`histogram`]), exact
//! continued-fraction period recovery ([`recovery`]), and the
//! interchangeable classical/quantum order-finding strategies ([`oracle`]).

pub mod controller;
pub mod error;
pub mod factor;
pub mod histogram;
pub mod oracle;
pub mod recovery;
pub mod sampler;

pub use controller::{factor_ensemble, Factorization, ShorConfig, ShorController};
pub use error::ShorError;
pub use oracle::{ClassicalOrderOracle, OrderOracle, QuantumOrderOracle};
