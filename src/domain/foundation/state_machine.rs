//! State machine trait for phase enums.
//!
//! Gives every lifecycle enum the same validated-transition interface, so a
//! conversation can never jump straight between two incompatible phases.

use super::ValidationError;

/// Trait for enums that represent state machines.
///
/// Implementors list their valid transitions and get a validated
/// `transition_to` for free.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for ConversationPhase {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         self.valid_transitions().contains(target)
///     }
///
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             Idle => vec![Idle, AwaitingProductChoice, AwaitingConfirmation],
///             // ... etc
///         }
///     }
/// }
///
/// let next = phase.transition_to(ConversationPhase::Idle)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }
}
