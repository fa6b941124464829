//! Ladder Reorder - Swap-Based Record Moves
//!
//! Moves a record one step up or down inside its partition by swapping
//! positions with the nearest neighbor. Provides the reorder engine with
//! its lifecycle hooks, the move action service for request handling, and
//! control state for list views.

pub mod action;
pub mod controls;
pub mod engine;

pub use action::{
    AccessPolicy, AfterChange, MoveAction, MoveOutcome, MoveReceipt, MoveRequest, RedirectPolicy,
    RedirectTarget,
};
pub use controls::{move_params, ControlState};
pub use engine::{ReorderEngine, ScopePolicy};
