//! Core business logic for the LabEats settlement engine.
//!
//! Everything here is framework-agnostic: free async functions over a
//! `DatabaseConnection` (or, for the pure parts, over plain values), so the
//! same operations back whichever front end drives the canteen.

/// Group-order aggregation - the base split structure before costs
pub mod aggregate;
/// Category fee computation (fixed and percentage markups)
pub mod fees;
/// Atomic balance mutation and account checks
pub mod ledger;
/// Group order state machine and legal transitions
pub mod lifecycle;
/// Integer-cent money arithmetic and formatting
pub mod money;
/// Group order creation, wish intake, closing, cancellation
pub mod orders;
/// Direct purchases and sales against the catalog
pub mod purchase;
/// Settlement commit and revert
pub mod settlement;
/// Cost allocation across a group order's participants
pub mod split;
/// Direct user-to-user balance transfers
pub mod transfer;
