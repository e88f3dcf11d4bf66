use log::debug;

use super::annuity::{annuity_due_factor, inflate, monthly_rate};
use super::error::PlanError;
use super::irr::solve_irr;
use super::types::{
    AssumptionSet, FAT_FIRE_MULTIPLE, FIRE_MULTIPLE, LEAN_FIRE_MULTIPLE, MONTHS_PER_YEAR,
    PlanResult, SAFETY_BUFFER, SipReturns,
};

/// Projects expenses, FIRE targets and the SIP outcome for one set of
/// assumptions. Inputs are not validated here; see [`AssumptionSet::validate`].
pub fn compute(assumptions: &AssumptionSet) -> PlanResult {
    let years = assumptions.years_to_retirement();
    let total_months = assumptions.total_months();

    let current_annual_expenses = assumptions.monthly_expenses * f64::from(MONTHS_PER_YEAR);
    let future_annual_expenses = inflate(current_annual_expenses, assumptions.inflation_rate, years);

    let lean_fire = future_annual_expenses * LEAN_FIRE_MULTIPLE;
    let fire = future_annual_expenses * FIRE_MULTIPLE;
    let fat_fire = future_annual_expenses * FAT_FIRE_MULTIPLE;

    let rate = monthly_rate(assumptions.investment_return_rate);
    let factor = annuity_due_factor(rate, total_months);
    let monthly_savings_required = contribution_for_target(fire, factor) * SAFETY_BUFFER;

    let future_value = assumptions.monthly_investment * factor;
    let total_investment = assumptions.monthly_investment * f64::from(total_months);
    let total_returns = future_value - total_investment;
    let absolute_return = if total_investment > 0.0 {
        total_returns / total_investment * 100.0
    } else {
        0.0
    };
    let irr = solve_irr(assumptions.monthly_investment, future_value, total_months);

    debug!(
        "plan: {years} years / {total_months} months, fire {fire:.2}, future value {future_value:.2}, irr {:.4}% ({:?})",
        irr.annual_rate_pct, irr.status
    );

    PlanResult {
        current_annual_expenses,
        future_annual_expenses,
        lean_fire,
        fire,
        fat_fire,
        monthly_savings_required,
        sip_returns: SipReturns {
            future_value,
            total_investment,
            total_returns,
            irr: irr.annual_rate_pct,
            absolute_return,
            irr_converged: irr.converged(),
        },
        inflation_rate: assumptions.inflation_rate,
        total_months,
    }
}

/// Monthly contribution (annuity-due, no buffer) that grows to
/// `target_amount` between the two ages.
pub fn required_monthly_savings(
    current_age: u32,
    retirement_age: u32,
    target_amount: f64,
    annual_return_rate: f64,
) -> Result<f64, PlanError> {
    let months = retirement_age
        .saturating_sub(current_age)
        .saturating_mul(MONTHS_PER_YEAR);
    let factor = annuity_due_factor(monthly_rate(annual_return_rate), months);
    if factor == 0.0 {
        return Err(PlanError::DivisionByZero {
            context: "required monthly savings over an empty horizon",
        });
    }
    Ok(target_amount / factor)
}

pub fn required_savings_exact(
    assumptions: &AssumptionSet,
    target_amount: f64,
) -> Result<f64, PlanError> {
    required_monthly_savings(
        assumptions.current_age,
        assumptions.retirement_age,
        target_amount,
        assumptions.investment_return_rate,
    )
}

/// [`required_savings_exact`] with the 20% safety buffer that
/// [`PlanResult::monthly_savings_required`] carries.
pub fn required_savings_with_buffer(
    assumptions: &AssumptionSet,
    target_amount: f64,
) -> Result<f64, PlanError> {
    Ok(required_savings_exact(assumptions, target_amount)? * SAFETY_BUFFER)
}

/// Share of the exact required contribution that the planned monthly
/// investment covers, in percent.
pub fn funding_progress_pct(assumptions: &AssumptionSet, result: &PlanResult) -> Option<f64> {
    let required = required_savings_exact(assumptions, result.fire).ok()?;
    if required <= 0.0 || !required.is_finite() {
        return None;
    }
    Some(assumptions.monthly_investment / required * 100.0)
}

// With no months left the whole target is due at once.
fn contribution_for_target(target: f64, factor: f64) -> f64 {
    if factor == 0.0 { target } else { target / factor }
}
