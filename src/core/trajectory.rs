use super::annuity::{annuity_due_factor, inflate, monthly_rate};
use super::engine::required_savings_exact;
use super::types::{AssumptionSet, FIRE_MULTIPLE, MONTHS_PER_YEAR, TrajectoryPoint};

/// Savings trajectory sampled once per year of age, `current_age` through
/// `retirement_age` inclusive.
///
/// Every point is computed on its own by [`trajectory_point`]; cloning the
/// iterator restarts the sequence from wherever the clone was taken.
#[derive(Debug, Clone)]
pub struct Trajectory {
    assumptions: AssumptionSet,
    next_age: u32,
    end_age: u32,
    exhausted: bool,
}

impl Trajectory {
    pub fn new(assumptions: &AssumptionSet) -> Self {
        Self {
            assumptions: *assumptions,
            next_age: assumptions.current_age,
            end_age: assumptions.retirement_age,
            exhausted: assumptions.retirement_age < assumptions.current_age,
        }
    }
}

impl Iterator for Trajectory {
    type Item = TrajectoryPoint;

    fn next(&mut self) -> Option<TrajectoryPoint> {
        if self.exhausted {
            return None;
        }
        let age = self.next_age;
        if age == self.end_age {
            self.exhausted = true;
        } else {
            self.next_age += 1;
        }
        Some(trajectory_point(&self.assumptions, age))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.exhausted {
            0
        } else {
            (self.end_age - self.next_age) as usize + 1
        };
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for Trajectory {
    fn next_back(&mut self) -> Option<TrajectoryPoint> {
        if self.exhausted {
            return None;
        }
        let age = self.end_age;
        if age == self.next_age {
            self.exhausted = true;
        } else {
            self.end_age -= 1;
        }
        Some(trajectory_point(&self.assumptions, age))
    }
}

impl ExactSizeIterator for Trajectory {}

/// Accumulated savings after contributing from `current_age` up to `age`.
///
/// `required_savings` follows the unbuffered contribution that reaches the
/// FIRE number exactly at retirement; `projected_savings` follows the planned
/// monthly investment. At the retirement age the two equal the FIRE number
/// and the plan's SIP future value respectively.
pub fn trajectory_point(assumptions: &AssumptionSet, age: u32) -> TrajectoryPoint {
    let future_annual = inflate(
        assumptions.monthly_expenses * f64::from(MONTHS_PER_YEAR),
        assumptions.inflation_rate,
        assumptions.years_to_retirement(),
    );
    let fire_target = future_annual * FIRE_MULTIPLE;

    let elapsed = age
        .saturating_sub(assumptions.current_age)
        .saturating_mul(MONTHS_PER_YEAR);
    let factor = annuity_due_factor(monthly_rate(assumptions.investment_return_rate), elapsed);
    let required_contribution = required_savings_exact(assumptions, fire_target).unwrap_or(0.0);

    TrajectoryPoint {
        age,
        required_savings: required_contribution * factor,
        projected_savings: assumptions.monthly_investment * factor,
        fire_target,
    }
}

/// First age at which projected savings reach the FIRE target.
pub fn first_crossover_age<I>(points: I) -> Option<u32>
where
    I: IntoIterator<Item = TrajectoryPoint>,
{
    points
        .into_iter()
        .find(|p| p.projected_savings >= p.fire_target)
        .map(|p| p.age)
}
