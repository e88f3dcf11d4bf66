mod annuity;
mod engine;
mod error;
mod irr;
mod trajectory;
mod types;

pub use annuity::{annuity_due_factor, inflate, monthly_rate};
pub use engine::{
    compute, funding_progress_pct, required_monthly_savings, required_savings_exact,
    required_savings_with_buffer,
};
pub use error::PlanError;
pub use irr::{IrrConfig, IrrSolution, IrrSolver, IrrStatus, npv, sip_cash_flows, solve_irr};
pub use trajectory::{Trajectory, first_crossover_age, trajectory_point};
pub use types::{
    AssumptionSet, DEFAULT_ASSUMPTIONS, FAT_FIRE_MULTIPLE, FIRE_MULTIPLE, LEAN_FIRE_MULTIPLE,
    MAX_AGE, MAX_MONTHLY_AMOUNT, MAX_RATE_PCT, MONTHS_PER_YEAR, PlanResult, SAFETY_BUFFER,
    SipReturns, TrajectoryPoint,
};
