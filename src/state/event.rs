use super::machine::InteractionState;
use crate::editor::LayerId;
use crate::geometry::CanvasPoint;

/// Input delivered to the pointer state machine, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(CanvasPoint),
    Move(CanvasPoint),
    Up(CanvasPoint),
    DoubleClick(CanvasPoint),
    EditDone,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionOutcome {
    Unchanged,
    Redraw,
    OpenEditor { layer: LayerId, text: String },
    CloseEditor,
    CapacityReached { limit: usize },
}

impl InteractionOutcome {
    pub const fn needs_redraw(&self) -> bool {
        matches!(
            self,
            Self::Redraw | Self::OpenEditor { .. } | Self::CloseEditor
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateTransition {
    pub from: InteractionState,
    pub event: PointerEvent,
    pub to: InteractionState,
}

impl StateTransition {
    pub const fn new(from: InteractionState, event: PointerEvent, to: InteractionState) -> Self {
        Self { from, event, to }
    }
}
