use super::layers::{LayerPatch, LayerStore, DEFAULT_MAX_LAYERS};
use super::style::{FontFamily, TextStyle};
use super::DEFAULT_LAYER_TEXT;
use crate::compositor::TextMetrics;
use crate::geometry::Color;
use crate::state::{
    InteractionContext, InteractionOutcome, InteractionState, PointerEvent, PointerStateMachine,
};
use crate::template::{LoadTicket, Template, TemplateSelection};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub max_layers: usize,
    pub default_text: String,
    pub default_style: TextStyle,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_layers: DEFAULT_MAX_LAYERS,
            default_text: DEFAULT_LAYER_TEXT.to_string(),
            default_style: TextStyle::default(),
        }
    }
}

/// Editing state for one open meme window.
#[derive(Debug)]
pub struct MemeSession {
    store: LayerStore,
    machine: PointerStateMachine,
    default_style: TextStyle,
    default_text: String,
    templates: TemplateSelection,
}

impl Default for MemeSession {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}

impl MemeSession {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            store: LayerStore::with_capacity_limit(settings.max_layers),
            machine: PointerStateMachine::new(),
            default_style: settings.default_style,
            default_text: settings.default_text,
            templates: TemplateSelection::new(),
        }
    }

    pub fn store(&self) -> &LayerStore {
        &self.store
    }

    pub fn interaction(&self) -> InteractionState {
        self.machine.state()
    }

    pub fn default_style(&self) -> TextStyle {
        self.default_style
    }

    pub fn templates(&self) -> &TemplateSelection {
        &self.templates
    }

    pub fn selected_template(&self) -> Option<&Template> {
        self.templates.selected()
    }

    pub fn set_templates(&mut self, templates: Vec<Template>) -> Option<LoadTicket> {
        self.reset_layers();
        self.templates.replace(templates)
    }

    pub fn select_template(&mut self, index: usize) -> Option<LoadTicket> {
        let ticket = self.templates.select(index)?;
        self.reset_layers();
        Some(ticket)
    }

    pub fn select_random_template(
        &mut self,
        roll: impl FnOnce(usize) -> usize,
    ) -> Option<LoadTicket> {
        let ticket = self.templates.select_random(roll)?;
        self.reset_layers();
        Some(ticket)
    }

    pub fn accepts_load(&self, ticket: &LoadTicket) -> bool {
        self.templates.accepts(ticket)
    }

    fn reset_layers(&mut self) {
        self.store.clear();
        self.machine.reset();
    }

    /// Routes a pointer event; rejected transitions are logged and ignored.
    pub fn pointer(&mut self, event: PointerEvent, metrics: &dyn TextMetrics) -> InteractionOutcome {
        let mut ctx = InteractionContext {
            store: &mut self.store,
            metrics,
            defaults: self.default_style,
            default_text: &self.default_text,
        };
        match self.machine.handle(event, &mut ctx) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(?err, "pointer event ignored");
                InteractionOutcome::Unchanged
            }
        }
    }

    /// Live text update from the edit affordance.
    pub fn edit_active_text(&mut self, text: &str) -> bool {
        match self.store.active_id() {
            Some(id) => self.store.update_layer(id, LayerPatch::text(text)),
            None => false,
        }
    }

    pub fn finish_editing(&mut self, metrics: &dyn TextMetrics) -> InteractionOutcome {
        self.pointer(PointerEvent::EditDone, metrics)
    }

    pub fn delete_active(&mut self, metrics: &dyn TextMetrics) -> InteractionOutcome {
        self.pointer(PointerEvent::Delete, metrics)
    }

    /// Style controls update the defaults and, when present, the active layer.
    /// Returns whether a layer changed.
    pub fn set_font_family(&mut self, family: FontFamily) -> bool {
        self.default_style.font_family = family;
        self.patch_active(LayerPatch {
            font_family: Some(family),
            ..LayerPatch::default()
        })
    }

    pub fn set_font_size(&mut self, size: u32) -> bool {
        self.default_style.set_font_size(size);
        self.patch_active(LayerPatch {
            font_size: Some(self.default_style.font_size),
            ..LayerPatch::default()
        })
    }

    pub fn set_color(&mut self, color: Color) -> bool {
        self.default_style.color = color;
        self.patch_active(LayerPatch {
            color: Some(color),
            ..LayerPatch::default()
        })
    }

    fn patch_active(&mut self, patch: LayerPatch) -> bool {
        match self.store.active_id() {
            Some(id) => self.store.update_layer(id, patch),
            None => false,
        }
    }

    /// Window teardown; late template loads are discarded afterwards.
    pub fn close(&mut self) {
        self.templates.close();
        self.reset_layers();
    }

    pub fn is_closed(&self) -> bool {
        self.templates.is_closed()
    }
}
