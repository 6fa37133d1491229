//! Fixed-rate amortization.
//!
//! With monthly rate `r = annual / 12` and `n = years × 12` payments:
//!
//! ```text
//! payment = P · r(1+r)^n / ((1+r)^n − 1)
//! ```
//!
//! and `P / n` when `r == 0` (the closed form is 0/0 there).

use crate::domain::LoanTerm;

/// Monthly payment for `principal` at `annual_rate` (decimal fraction).
pub fn monthly_payment(principal: f64, annual_rate: f64, term: LoanTerm) -> f64 {
    let monthly_rate = annual_rate / 12.0;
    let n_payments = f64::from(term.payments());

    if monthly_rate == 0.0 {
        return principal / n_payments;
    }

    // (1+r)^n and (1+r)^n - 1 via ln_1p/exp_m1 so tiny rates do not cancel to 0.
    let log_growth = n_payments * monthly_rate.ln_1p();
    let growth = log_growth.exp();
    principal * (monthly_rate * growth) / log_growth.exp_m1()
}
