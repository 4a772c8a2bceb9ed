pub mod error;
pub mod event;
pub mod machine;

pub use error::{StateError, StateResult};
pub use event::{InteractionOutcome, PointerEvent, StateTransition};
pub use machine::{InteractionContext, InteractionState, PointerStateMachine};
