//! Cost grid builder.
//!
//! Every (down payment, price) pair gets the amortized mortgage payment plus
//! the monthly share of property tax and insurance, rounded to whole currency
//! units. Rows follow the down-payment axis, columns the price axis.

use crate::calc::payment::monthly_payment;
use crate::domain::{Axis, CostBreakdown, CostGrid, ScenarioInputs};

/// Unrounded cost components for one home price and down payment.
pub fn cost_breakdown(price: u64, down_payment: u64, scenario: &ScenarioInputs) -> CostBreakdown {
    let price = price as f64;
    // Principal is floored at zero when the down payment covers the price.
    let principal = (price - down_payment as f64).max(0.0);
    let mortgage = monthly_payment(principal, scenario.interest_rate, scenario.term);
    let tax = price * scenario.property_tax_rate / 12.0;
    let insurance = price * scenario.insurance_rate / 12.0;

    CostBreakdown {
        principal,
        mortgage,
        tax,
        insurance,
    }
}

/// Build the full grid: one row per down payment, one column per price.
pub fn build_grid(prices: &Axis, down_payments: &Axis, scenario: &ScenarioInputs) -> CostGrid {
    let rows = down_payments
        .values
        .iter()
        .map(|&down| {
            prices
                .values
                .iter()
                .map(|&price| cost_breakdown(price, down, scenario).rounded_total())
                .collect()
        })
        .collect();

    CostGrid {
        row_labels: down_payments.labels(),
        column_labels: prices.labels(),
        rows,
    }
}
