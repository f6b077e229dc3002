//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine)
//! - `catalog` - Products, stock adjustments and fuzzy product ranking
//! - `conversation` - Chat topics, pending actions and the command interpreter

pub mod catalog;
pub mod conversation;
pub mod foundation;
