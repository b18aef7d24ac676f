//! Log-space combinatorics used by the exact tests.

use crate::distribution::ln_gamma;
use fourfold_core::{FourfoldError, Result};

/// Log-factorial via `ln(Γ(n + 1))`.
pub fn ln_factorial(n: u64) -> f64 {
    ln_gamma(n as f64 + 1.0)
}

/// Log-space binomial coefficient ln(C(n, k)).
///
/// # Errors
///
/// Returns an error if `k > n`.
pub fn ln_binomial(n: u64, k: u64) -> Result<f64> {
    if k > n {
        return Err(FourfoldError::InvalidInput(
            "ln_binomial: k must be <= n".into(),
        ));
    }
    Ok(ln_factorial(n) - ln_factorial(k) - ln_factorial(n - k))
}
