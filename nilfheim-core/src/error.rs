//! Engine error taxonomy.
//!
//! Every failure an action or the character service can report. Errors are
//! surfaced to the caller without retrying, and no error leaves a character
//! in a partially-updated state.

use crate::world::{CharacterClass, LifeState, PlayerId};
use thiserror::Error;

/// Error type for the progression/action engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A class-gated action was attempted by the wrong class.
    #[error("only a {required} may {action}, but {actual} tried")]
    InvalidActor {
        action: &'static str,
        required: CharacterClass,
        actual: CharacterClass,
    },

    /// No charges left, or a rate limit was hit.
    #[error("{0}")]
    ResourceExhausted(String),

    /// The character is dead or recovering and cannot initiate actions.
    #[error("character cannot act while {}", .0.name())]
    Incapacitated(LifeState),

    /// A mutation would break a model invariant (negative count, capped
    /// stat, out-of-range config value). Previous state is retained.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// No character registered under this key.
    #[error("no character registered for {0}")]
    NotFound(PlayerId),

    /// Character creation is idempotent; a second registration is rejected.
    #[error("{0} already has a character")]
    AlreadyRegistered(PlayerId),

    /// The named action is not part of the capability set.
    #[error("unknown action: {0}")]
    UnknownAction(String),
}

impl EngineError {
    /// Shorthand for charge exhaustion.
    pub fn no_charges() -> Self {
        EngineError::ResourceExhausted("no action charges available".to_string())
    }
}
