use serde::{Deserialize, Serialize};

use super::error::PlanError;

/// Portfolio multiple of projected annual expenses for lean FIRE (5% withdrawal).
pub const LEAN_FIRE_MULTIPLE: f64 = 20.0;
/// Portfolio multiple for standard FIRE (4% withdrawal).
pub const FIRE_MULTIPLE: f64 = 25.0;
/// Portfolio multiple for fat FIRE (2% withdrawal).
pub const FAT_FIRE_MULTIPLE: f64 = 50.0;
/// Margin applied to the headline required-savings figure.
pub const SAFETY_BUFFER: f64 = 1.2;
pub const MONTHS_PER_YEAR: u32 = 12;
/// Oldest age accepted for either end of the horizon.
pub const MAX_AGE: u32 = 120;
/// Largest accepted annual return or inflation rate, in percent.
pub const MAX_RATE_PCT: f64 = 100.0;
/// Largest accepted monthly expense or investment amount.
pub const MAX_MONTHLY_AMOUNT: f64 = 1e12;

/// Values a caller falls back to when a field is absent from user input.
/// The engine itself never substitutes them.
pub const DEFAULT_ASSUMPTIONS: AssumptionSet = AssumptionSet {
    current_age: 30,
    retirement_age: 60,
    monthly_expenses: 50_000.0,
    monthly_investment: 10_000.0,
    investment_return_rate: 12.0,
    inflation_rate: 6.0,
};

/// Inputs to a plan. Rates are annual percentages (12.0 means 12%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssumptionSet {
    pub current_age: u32,
    pub retirement_age: u32,
    pub monthly_expenses: f64,
    pub monthly_investment: f64,
    pub investment_return_rate: f64,
    pub inflation_rate: f64,
}

impl Default for AssumptionSet {
    fn default() -> Self {
        DEFAULT_ASSUMPTIONS
    }
}

impl AssumptionSet {
    /// Signed so that a reversed age pair stays representable.
    pub fn years_to_retirement(&self) -> i64 {
        i64::from(self.retirement_age) - i64::from(self.current_age)
    }

    /// Months of contributions; zero when the horizon is empty or reversed.
    pub fn total_months(&self) -> u32 {
        self.retirement_age
            .saturating_sub(self.current_age)
            .saturating_mul(MONTHS_PER_YEAR)
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        if self.current_age > MAX_AGE {
            return Err(PlanError::invalid(
                "currentAge",
                format!("must be <= {MAX_AGE}"),
            ));
        }
        if self.retirement_age > MAX_AGE {
            return Err(PlanError::invalid(
                "retirementAge",
                format!("must be <= {MAX_AGE}"),
            ));
        }
        if self.retirement_age <= self.current_age {
            return Err(PlanError::invalid(
                "retirementAge",
                "must be greater than currentAge",
            ));
        }
        if !self.monthly_expenses.is_finite() || self.monthly_expenses <= 0.0 {
            return Err(PlanError::invalid("monthlyExpenses", "must be > 0"));
        }
        if self.monthly_expenses > MAX_MONTHLY_AMOUNT {
            return Err(PlanError::invalid(
                "monthlyExpenses",
                format!("must be <= {MAX_MONTHLY_AMOUNT}"),
            ));
        }
        if !self.monthly_investment.is_finite() || self.monthly_investment < 0.0 {
            return Err(PlanError::invalid("monthlyInvestment", "cannot be negative"));
        }
        if self.monthly_investment > MAX_MONTHLY_AMOUNT {
            return Err(PlanError::invalid(
                "monthlyInvestment",
                format!("must be <= {MAX_MONTHLY_AMOUNT}"),
            ));
        }
        if !self.investment_return_rate.is_finite() || self.investment_return_rate <= 0.0 {
            return Err(PlanError::invalid("investmentReturnRate", "must be > 0"));
        }
        if self.investment_return_rate > MAX_RATE_PCT {
            return Err(PlanError::invalid(
                "investmentReturnRate",
                format!("must be <= {MAX_RATE_PCT}"),
            ));
        }
        if !self.inflation_rate.is_finite() || self.inflation_rate < 0.0 {
            return Err(PlanError::invalid("inflationRate", "cannot be negative"));
        }
        if self.inflation_rate > MAX_RATE_PCT {
            return Err(PlanError::invalid(
                "inflationRate",
                format!("must be <= {MAX_RATE_PCT}"),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SipReturns {
    pub future_value: f64,
    pub total_investment: f64,
    pub total_returns: f64,
    /// Annualised IRR in percent.
    pub irr: f64,
    /// Gain over contributions in percent.
    pub absolute_return: f64,
    pub irr_converged: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResult {
    pub current_annual_expenses: f64,
    pub future_annual_expenses: f64,
    #[serde(rename = "leanFIRE")]
    pub lean_fire: f64,
    pub fire: f64,
    #[serde(rename = "fatFIRE")]
    pub fat_fire: f64,
    pub monthly_savings_required: f64,
    pub sip_returns: SipReturns,
    pub inflation_rate: f64,
    pub total_months: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectoryPoint {
    pub age: u32,
    pub required_savings: f64,
    pub projected_savings: f64,
    pub fire_target: f64,
}
