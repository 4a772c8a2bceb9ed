use super::error::{StateError, StateResult};
use super::event::{InteractionOutcome, PointerEvent, StateTransition};
use crate::compositor::{top_layer_at, TextMetrics};
use crate::editor::{LayerError, LayerId, LayerPatch, LayerStore, TextStyle};
use crate::geometry::CanvasPoint;

const TRANSITION_HISTORY_LIMIT: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging {
        layer: LayerId,
        grab_offset: CanvasPoint,
        /// Layer whose edit affordance was open when the drag started.
        resume_editing: Option<LayerId>,
    },
    Editing {
        layer: LayerId,
    },
}

/// Everything a transition may read or mutate besides the machine itself.
pub struct InteractionContext<'a> {
    pub store: &'a mut LayerStore,
    pub metrics: &'a dyn TextMetrics,
    pub defaults: TextStyle,
    pub default_text: &'a str,
}

#[derive(Debug)]
pub struct PointerStateMachine {
    state: InteractionState,
    transition_history: Vec<StateTransition>,
}

impl PointerStateMachine {
    pub fn new() -> Self {
        Self {
            state: InteractionState::default(),
            transition_history: Vec::new(),
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn editing_layer(&self) -> Option<LayerId> {
        match self.state {
            InteractionState::Editing { layer } => Some(layer),
            _ => None,
        }
    }

    /// Drops any gesture in flight, used when the template changes.
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
    }

    pub fn handle(
        &mut self,
        event: PointerEvent,
        ctx: &mut InteractionContext<'_>,
    ) -> StateResult<InteractionOutcome> {
        let from = self.state;
        let (next, outcome) = match (from, event) {
            (InteractionState::Idle, PointerEvent::Down(at)) => self.press(ctx, at, None),
            (InteractionState::Editing { layer }, PointerEvent::Down(at)) => {
                self.press(ctx, at, Some(layer))
            }
            (InteractionState::Dragging { .. }, PointerEvent::Down(_)) => {
                (from, InteractionOutcome::Unchanged)
            }
            (
                InteractionState::Dragging {
                    layer, grab_offset, ..
                },
                PointerEvent::Move(at),
            ) => {
                if ctx
                    .store
                    .update_layer(layer, LayerPatch::position(at - grab_offset))
                {
                    (from, InteractionOutcome::Redraw)
                } else {
                    tracing::warn!(layer, "dragged layer disappeared; ending drag");
                    (InteractionState::Idle, InteractionOutcome::Redraw)
                }
            }
            (
                InteractionState::Dragging {
                    layer,
                    resume_editing,
                    ..
                },
                PointerEvent::Up(_),
            ) => {
                ctx.store.update_layer(layer, LayerPatch::dragging(false));
                let next = match resume_editing.filter(|id| ctx.store.get(*id).is_some()) {
                    Some(editing) => InteractionState::Editing { layer: editing },
                    None => InteractionState::Idle,
                };
                (next, InteractionOutcome::Redraw)
            }
            (_, PointerEvent::Move(_) | PointerEvent::Up(_)) => {
                (from, InteractionOutcome::Unchanged)
            }
            (_, PointerEvent::DoubleClick(at)) => {
                match top_layer_at(ctx.metrics, ctx.store.layers(), at) {
                    Some(layer) => {
                        if let InteractionState::Dragging { layer: dragged, .. } = from {
                            ctx.store.update_layer(dragged, LayerPatch::dragging(false));
                        }
                        ctx.store.set_active(Some(layer));
                        let text = ctx
                            .store
                            .get(layer)
                            .map(|found| found.text.clone())
                            .unwrap_or_default();
                        (
                            InteractionState::Editing { layer },
                            InteractionOutcome::OpenEditor { layer, text },
                        )
                    }
                    None => (from, InteractionOutcome::Unchanged),
                }
            }
            (InteractionState::Editing { .. }, PointerEvent::EditDone) => {
                ctx.store.set_active(None);
                (InteractionState::Idle, InteractionOutcome::CloseEditor)
            }
            (InteractionState::Editing { layer }, PointerEvent::Delete) => {
                if ctx.store.remove_layer(layer).is_none() {
                    tracing::warn!(layer, "delete requested for unknown layer");
                }
                (InteractionState::Idle, InteractionOutcome::CloseEditor)
            }
            (_, PointerEvent::EditDone | PointerEvent::Delete) => {
                tracing::warn!(from = ?from, event = ?event, "invalid state transition requested");
                return Err(StateError::InvalidStateTransition { from, event });
            }
        };

        if next != from {
            tracing::debug!(from = ?from, event = ?event, to = ?next, "pointer state transition");
            self.record(StateTransition::new(from, event, next));
        }
        self.state = next;
        Ok(outcome)
    }

    fn press(
        &self,
        ctx: &mut InteractionContext<'_>,
        at: CanvasPoint,
        editing: Option<LayerId>,
    ) -> (InteractionState, InteractionOutcome) {
        if let Some(layer) = top_layer_at(ctx.metrics, ctx.store.layers(), at) {
            let Some(position) = ctx.store.get(layer).map(|found| found.position) else {
                return (self.state, InteractionOutcome::Unchanged);
            };
            ctx.store.update_layer(layer, LayerPatch::dragging(true));
            return (
                InteractionState::Dragging {
                    layer,
                    grab_offset: at - position,
                    resume_editing: editing,
                },
                InteractionOutcome::Redraw,
            );
        }

        if ctx.store.active_id().is_some() {
            return (self.state, InteractionOutcome::Unchanged);
        }

        match ctx.store.add_layer(at, ctx.default_text, ctx.defaults) {
            Ok(layer) => (
                InteractionState::Editing { layer },
                InteractionOutcome::OpenEditor {
                    layer,
                    text: ctx.default_text.to_string(),
                },
            ),
            Err(LayerError::CapacityReached { limit }) => {
                tracing::warn!(limit, "text layer limit reached; ignoring new layer");
                (self.state, InteractionOutcome::CapacityReached { limit })
            }
        }
    }

    fn record(&mut self, transition: StateTransition) {
        if self.transition_history.len() >= TRANSITION_HISTORY_LIMIT {
            self.transition_history.remove(0);
        }
        self.transition_history.push(transition);
    }
}

#[cfg(test)]
impl PointerStateMachine {
    fn history(&self) -> &[StateTransition] {
        &self.transition_history
    }
}

impl Default for PointerStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PointerStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InteractionState::{:?}", self.state)
    }
}
