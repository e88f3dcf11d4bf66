//! Internal rate of return for periodic cash-flow schedules.
//!
//! The solver brackets the periodic rate, validates that the bracket holds a
//! sign change of NPV (widening the upper bound geometrically when the root
//! lies above it), then bisects.

use log::{debug, warn};
use serde::Serialize;

use super::error::PlanError;
use super::types::MONTHS_PER_YEAR;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IrrStatus {
    Converged,
    /// NPV has the same sign at both bracket ends, even after widening.
    NoRootInBracket,
    /// The iteration cap was reached before the tolerance was met.
    IterationLimit,
    /// A cash flow, or NPV at a bracket end, is infinite or NaN.
    NonFinite,
}

#[derive(Debug, Clone, Copy)]
pub struct IrrConfig {
    /// Lower periodic rate of the initial bracket.
    pub lower: f64,
    /// Upper periodic rate of the initial bracket; must be > 0 to widen.
    pub upper: f64,
    /// Absolute NPV tolerance.
    pub tolerance: f64,
    /// Bisection also stops once the bracket half-width falls below this.
    pub rate_tolerance: f64,
    pub max_iterations: u32,
    pub max_bracket_expansions: u32,
    pub periods_per_year: u32,
}

impl Default for IrrConfig {
    fn default() -> Self {
        Self {
            lower: 0.0,
            upper: 1.0,
            tolerance: 1e-6,
            rate_tolerance: 1e-15,
            max_iterations: 1000,
            max_bracket_expansions: 8,
            periods_per_year: MONTHS_PER_YEAR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrrSolution {
    pub periodic_rate: f64,
    /// `(1 + periodic_rate)^periods_per_year - 1`, in percent.
    pub annual_rate_pct: f64,
    pub iterations: u32,
    pub status: IrrStatus,
}

impl IrrSolution {
    pub fn converged(&self) -> bool {
        self.status == IrrStatus::Converged
    }

    pub fn ensure_converged(self) -> Result<Self, PlanError> {
        if self.converged() {
            Ok(self)
        } else {
            Err(PlanError::IrrNotConverged {
                iterations: self.iterations,
                status: self.status,
            })
        }
    }
}

/// `periods` contributions of `-contribution` (t = 0..periods) followed by a
/// single inflow of `future_value` at t = periods.
pub fn sip_cash_flows(contribution: f64, future_value: f64, periods: u32) -> Vec<f64> {
    let mut flows = Vec::with_capacity(periods as usize + 1);
    flows.extend(std::iter::repeat_n(-contribution, periods as usize));
    flows.push(future_value);
    flows
}

pub fn npv(rate: f64, flows: &[f64]) -> f64 {
    flows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// IRR of a monthly SIP with the default solver settings.
pub fn solve_irr(contribution: f64, future_value: f64, periods: u32) -> IrrSolution {
    IrrSolver::default().solve(&sip_cash_flows(contribution, future_value, periods))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IrrSolver {
    config: IrrConfig,
}

impl IrrSolver {
    pub fn new(config: IrrConfig) -> Self {
        Self { config }
    }

    pub fn solve(&self, flows: &[f64]) -> IrrSolution {
        let config = self.config;
        if flows.iter().any(|cf| !cf.is_finite()) {
            warn!("irr: cash flows contain non-finite values");
            return self.finish(0.0, 0, IrrStatus::NonFinite);
        }
        if flows.iter().all(|cf| cf.abs() < 1e-12) {
            return self.finish(0.0, 0, IrrStatus::Converged);
        }

        let mut lo = config.lower;
        let mut hi = config.upper;
        let mut npv_lo = npv(lo, flows);
        if !npv_lo.is_finite() {
            warn!("irr: NPV at {lo} is not finite");
            return self.finish(0.0, 0, IrrStatus::NonFinite);
        }
        if npv_lo.abs() < config.tolerance {
            return self.finish(lo, 0, IrrStatus::Converged);
        }
        let mut npv_hi = npv(hi, flows);

        let mut expansions = 0;
        while same_sign(npv_lo, npv_hi)
            && npv_hi > 0.0
            && hi > 0.0
            && expansions < config.max_bracket_expansions
        {
            lo = hi;
            npv_lo = npv_hi;
            hi *= 2.0;
            npv_hi = npv(hi, flows);
            expansions += 1;
        }
        if expansions > 0 {
            debug!("irr bracket widened {expansions} times to [{lo}, {hi}]");
        }

        if !npv_hi.is_finite() {
            warn!("irr: NPV at {hi} is not finite");
            return self.finish(0.0, 0, IrrStatus::NonFinite);
        }
        if npv_hi.abs() < config.tolerance {
            return self.finish(hi, 0, IrrStatus::Converged);
        }
        if same_sign(npv_lo, npv_hi) {
            warn!("irr: no sign change of NPV in [{lo}, {hi}] (npv {npv_lo} / {npv_hi})");
            let closest = if npv_lo.abs() <= npv_hi.abs() { lo } else { hi };
            return self.finish(closest, 0, IrrStatus::NoRootInBracket);
        }

        let mut mid = lo;
        for iteration in 1..=config.max_iterations {
            mid = 0.5 * (lo + hi);
            let npv_mid = npv(mid, flows);
            if npv_mid.abs() < config.tolerance || 0.5 * (hi - lo) < config.rate_tolerance {
                return self.finish(mid, iteration, IrrStatus::Converged);
            }
            if same_sign(npv_mid, npv_lo) {
                lo = mid;
                npv_lo = npv_mid;
            } else {
                hi = mid;
            }
        }

        warn!(
            "irr: tolerance {} not met after {} iterations; returning best estimate",
            config.tolerance, config.max_iterations
        );
        self.finish(mid, config.max_iterations, IrrStatus::IterationLimit)
    }

    fn finish(&self, periodic_rate: f64, iterations: u32, status: IrrStatus) -> IrrSolution {
        let annual = (1.0 + periodic_rate).powi(self.config.periods_per_year as i32) - 1.0;
        IrrSolution {
            periodic_rate,
            annual_rate_pct: annual * 100.0,
            iterations,
            status,
        }
    }
}

fn same_sign(a: f64, b: f64) -> bool {
    (a > 0.0 && b > 0.0) || (a < 0.0 && b < 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::annuity::annuity_due_factor;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn lump_sum_flows(principal: f64, rate: f64, periods: usize) -> Vec<f64> {
        let mut flows = vec![0.0; periods + 1];
        flows[0] = -principal;
        flows[periods] = principal * (1.0 + rate).powi(periods as i32);
        flows
    }

    #[test]
    fn sip_cash_flows_shape() {
        let flows = sip_cash_flows(100.0, 450.0, 4);
        assert_eq!(flows, vec![-100.0, -100.0, -100.0, -100.0, 450.0]);
        assert_eq!(sip_cash_flows(100.0, 0.0, 0), vec![0.0]);
    }

    #[test]
    fn npv_discounts_each_period() {
        let flows = [-100.0, 0.0, 121.0];
        assert_close(npv(0.1, &flows), 0.0, 1e-9);
        assert_close(npv(0.0, &flows), 21.0, 1e-12);
    }

    #[test]
    fn lump_sum_recovers_known_rate() {
        let r0 = 0.008;
        let solution = IrrSolver::default().solve(&lump_sum_flows(1_000.0, r0, 120));
        assert!(solution.converged());
        let expected_annual = ((1.0 + r0).powi(12) - 1.0) * 100.0;
        assert_close(solution.annual_rate_pct, expected_annual, 1e-4);
        assert_close(solution.periodic_rate, r0, 1e-8);
    }

    #[test]
    fn sip_at_one_percent_monthly_annualises_to_twelve_point_six_eight() {
        let future_value = 10_000.0 * annuity_due_factor(0.01, 360);
        let solution = solve_irr(10_000.0, future_value, 360);
        assert!(solution.converged());
        assert_close(solution.periodic_rate, 0.01, 1e-9);
        assert_close(solution.annual_rate_pct, 12.682_503_013_196_98, 1e-6);
        assert!(solution.iterations < 100);
    }

    #[test]
    fn zero_periods_give_zero_without_iterating() {
        let solution = solve_irr(10_000.0, 0.0, 0);
        assert_eq!(solution.status, IrrStatus::Converged);
        assert_eq!(solution.iterations, 0);
        assert_eq!(solution.annual_rate_pct, 0.0);
    }

    #[test]
    fn break_even_flows_give_zero_without_iterating() {
        let solution = solve_irr(10_000.0, 3_600_000.0, 360);
        assert_eq!(solution.status, IrrStatus::Converged);
        assert_eq!(solution.iterations, 0);
        assert_close(solution.annual_rate_pct, 0.0, 1e-12);
    }

    #[test]
    fn losing_investment_reports_missing_root() {
        let solution = solve_irr(10_000.0, 3_000_000.0, 360);
        assert_eq!(solution.status, IrrStatus::NoRootInBracket);
        assert_eq!(solution.periodic_rate, 0.0);
        assert!(matches!(
            solution.ensure_converged(),
            Err(PlanError::IrrNotConverged {
                status: IrrStatus::NoRootInBracket,
                ..
            })
        ));
    }

    #[test]
    fn bracket_widens_when_root_is_above_upper_bound() {
        // -1 now, 6.25 after two periods: 150% per period.
        let solution = IrrSolver::default().solve(&[-1.0, 0.0, 6.25]);
        assert!(solution.converged());
        assert_close(solution.periodic_rate, 1.5, 1e-9);
    }

    #[test]
    fn bracket_widening_is_capped() {
        let solver = IrrSolver::new(IrrConfig {
            max_bracket_expansions: 0,
            ..IrrConfig::default()
        });
        let solution = solver.solve(&[-1.0, 0.0, 6.25]);
        assert_eq!(solution.status, IrrStatus::NoRootInBracket);
        assert_eq!(solution.periodic_rate, 1.0);
    }

    #[test]
    fn iteration_cap_is_reported() {
        let solver = IrrSolver::new(IrrConfig {
            max_iterations: 3,
            tolerance: 1e-12,
            ..IrrConfig::default()
        });
        let solution = solver.solve(&lump_sum_flows(1_000.0, 0.008, 120));
        assert_eq!(solution.status, IrrStatus::IterationLimit);
        assert_eq!(solution.iterations, 3);
        assert!(solution.ensure_converged().is_err());
    }

    #[test]
    fn infinite_future_value_is_not_converged() {
        let solution = solve_irr(10_000.0, f64::INFINITY, 360);
        assert_eq!(solution.status, IrrStatus::NonFinite);
        assert!(!solution.converged());
        assert!(solution.annual_rate_pct.is_finite());
        assert!(matches!(
            solution.ensure_converged(),
            Err(PlanError::IrrNotConverged {
                status: IrrStatus::NonFinite,
                ..
            })
        ));
    }

    #[test]
    fn nan_cash_flow_is_not_converged() {
        let solution = IrrSolver::default().solve(&[-1.0, f64::NAN, 2.0]);
        assert_eq!(solution.status, IrrStatus::NonFinite);
    }

    #[test]
    fn converged_solution_passes_through_ensure() {
        let solution = solve_irr(1_000.0, 1_000.0 * annuity_due_factor(0.005, 24), 24);
        let checked = solution.ensure_converged().expect("must converge");
        assert_close(checked.periodic_rate, 0.005, 1e-9);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_sip_irr_recovers_contribution_rate(
            rate_bp in 1u32..300,
            periods in 1u32..600,
            contribution in 100u32..200_000
        ) {
            let rate = rate_bp as f64 / 10_000.0;
            let contribution = contribution as f64;
            let future_value = contribution * annuity_due_factor(rate, periods);
            let solution = solve_irr(contribution, future_value, periods);
            prop_assert!(solution.converged());
            prop_assert!((solution.periodic_rate - rate).abs() < 1e-7);
        }
    }
}
