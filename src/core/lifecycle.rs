//! Group order state machine.
//!
//! Legal transitions: Open -> OrdersClosed (close orders, manual or
//! deadline), OrdersClosed -> Settled (commit), Settled -> OrdersClosed
//! (revert), Open -> Canceled. Nothing else. The pure check here names the
//! target state; persistence-side serialization happens via conditional
//! status updates in the orders and settlement modules, so a race loser
//! always observes a conflict rather than a double transition.

use crate::entities::group_order::{self, OrderStatus};
use crate::errors::{Error, Result};

/// A requested lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Cut off incoming wishes (manual admin action or deadline sweep)
    CloseOrders,
    /// Commit a finalized split into ledger transactions
    Settle,
    /// Undo a committed settlement
    Revert,
    /// Abandon a group order before settlement
    Cancel,
}

impl Transition {
    /// Stable lowercase name, used in conflict errors and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CloseOrders => "close orders",
            Self::Settle => "settle",
            Self::Revert => "revert",
            Self::Cancel => "cancel",
        }
    }
}

/// The target status of a legal transition, or `None` if the transition is
/// not legal from `current`.
#[must_use]
pub const fn transition_target(current: OrderStatus, transition: Transition) -> Option<OrderStatus> {
    match (current, transition) {
        (OrderStatus::Open, Transition::CloseOrders) => Some(OrderStatus::OrdersClosed),
        (OrderStatus::Open, Transition::Cancel) => Some(OrderStatus::Canceled),
        (OrderStatus::OrdersClosed, Transition::Settle) => Some(OrderStatus::Settled),
        (OrderStatus::Settled, Transition::Revert) => Some(OrderStatus::OrdersClosed),
        _ => None,
    }
}

/// Checks a transition against a loaded group order, yielding the target
/// status or a `Conflict` error naming the attempt and the current status.
pub fn check_transition(
    group_order: &group_order::Model,
    transition: Transition,
) -> Result<OrderStatus> {
    transition_target(group_order.status, transition).ok_or(Error::Conflict {
        group_order_id: group_order.id,
        attempted: transition.as_str(),
        status: group_order.status.as_str(),
    })
}
