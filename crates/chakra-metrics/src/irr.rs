//! Internal rate of return via Newton-Raphson (spec §4.7: "IRR solver on
//! cashflow series").

const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1e-7;

/// One dated cashflow: negative for money going out (an entry), positive
/// for money coming back (an exit or the final mark-to-market).
#[derive(Copy, Clone, Debug)]
pub struct Cashflow {
    pub days_from_start: f64,
    pub amount: f64,
}

fn npv(rate: f64, flows: &[Cashflow]) -> f64 {
    flows
        .iter()
        .map(|cf| cf.amount / (1.0 + rate).powf(cf.days_from_start / 365.25))
        .sum()
}

fn npv_derivative(rate: f64, flows: &[Cashflow]) -> f64 {
    flows
        .iter()
        .map(|cf| {
            let t = cf.days_from_start / 365.25;
            -t * cf.amount / (1.0 + rate).powf(t + 1.0)
        })
        .sum()
}

/// Solve for the annualized rate that zeroes the NPV of `flows`. Returns
/// `None` if the series has fewer than two flows, lacks both a negative
/// and a positive entry (no sign change, no real root), or Newton's method
/// fails to converge within `MAX_ITERATIONS`.
pub fn irr(flows: &[Cashflow]) -> Option<f64> {
    if flows.len() < 2 {
        return None;
    }
    let has_negative = flows.iter().any(|cf| cf.amount < 0.0);
    let has_positive = flows.iter().any(|cf| cf.amount > 0.0);
    if !has_negative || !has_positive {
        return None;
    }

    let mut rate = 0.1;
    for _ in 0..MAX_ITERATIONS {
        let value = npv(rate, flows);
        if value.abs() < TOLERANCE {
            return Some(rate);
        }
        let derivative = npv_derivative(rate, flows);
        if derivative.abs() < f64::EPSILON {
            return None;
        }
        let next_rate = rate - value / derivative;
        if !next_rate.is_finite() || next_rate <= -1.0 {
            return None;
        }
        if (next_rate - rate).abs() < TOLERANCE {
            return Some(next_rate);
        }
        rate = next_rate;
    }
    None
}
