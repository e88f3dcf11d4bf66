use thiserror::Error;

use super::irr::IrrStatus;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("invalid assumptions: {field} {reason}")]
    InvalidAssumptions { field: &'static str, reason: String },

    #[error("division by zero in {context}")]
    DivisionByZero { context: &'static str },

    #[error("IRR did not converge after {iterations} iterations ({status:?})")]
    IrrNotConverged { iterations: u32, status: IrrStatus },
}

impl PlanError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        PlanError::InvalidAssumptions {
            field,
            reason: reason.into(),
        }
    }
}
