//! Order status state machine
//!
//! ```text
//! created ──► paid ──► completed
//!    │          │
//!    └──────────┴────► cancelled
//! ```
//!
//! `completed` and `cancelled` are terminal. The status update endpoint is
//! permissive by default and accepts any target status; [`TransitionPolicy::Strict`]
//! enforces the table above.

use super::types::OrderStatus;
use crate::error::{AppError, ErrorCode};
use serde::{Deserialize, Serialize};

impl OrderStatus {
    /// Statuses reachable from `self` under the domain transition table
    pub fn allowed_transitions(&self) -> &'static [OrderStatus] {
        match self {
            Self::Created => &[OrderStatus::Paid, OrderStatus::Cancelled],
            Self::Paid => &[OrderStatus::Completed, OrderStatus::Cancelled],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    pub fn can_transition_to(&self, to: OrderStatus) -> bool {
        self.allowed_transitions().contains(&to)
    }
}

/// How status updates are checked against the transition table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Any of the four statuses is accepted regardless of the current one
    #[default]
    Permissive,
    /// Only transitions from the table are accepted
    Strict,
}

impl TransitionPolicy {
    pub fn from_strict_flag(strict: bool) -> Self {
        if strict { Self::Strict } else { Self::Permissive }
    }

    /// Status the order must still hold when the write lands; strict mode only
    pub fn guard(&self, current: OrderStatus) -> Option<OrderStatus> {
        matches!(self, Self::Strict).then_some(current)
    }

    /// Check a requested move, returning `INVALID_TRANSITION` when refused.
    pub fn check(&self, from: OrderStatus, to: OrderStatus) -> Result<(), AppError> {
        match self {
            Self::Permissive => Ok(()),
            Self::Strict if from.can_transition_to(to) => Ok(()),
            Self::Strict => Err(AppError::new(ErrorCode::InvalidTransition)
                .with_detail("from", from.as_str())
                .with_detail("to", to.as_str())),
        }
    }
}

/// Parse a requested status string, mapping unknown values to `VALIDATION_ERROR`.
pub fn parse_status(raw: Option<&str>) -> Result<OrderStatus, AppError> {
    let allowed = OrderStatus::ALL.map(|s| s.as_str()).join(", ");
    raw.and_then(|s| s.parse().ok()).ok_or_else(|| {
        AppError::validation("Status inválido")
            .with_detail("status", format!("Status deve ser um de: {allowed}"))
    })
}
