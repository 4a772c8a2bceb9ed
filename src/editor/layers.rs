use thiserror::Error;

use super::style::{FontFamily, TextStyle};
use crate::geometry::{CanvasPoint, Color};

pub const DEFAULT_MAX_LAYERS: usize = 32;

pub type LayerId = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct TextLayer {
    id: LayerId,
    pub text: String,
    pub position: CanvasPoint,
    pub font_size: u32,
    pub font_family: FontFamily,
    pub color: Color,
    pub dragging: bool,
}

impl TextLayer {
    pub fn new(id: LayerId, position: CanvasPoint, text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            id,
            text: text.into(),
            position,
            font_size: style.font_size.max(1),
            font_family: style.font_family,
            color: style.color,
            dragging: false,
        }
    }

    pub const fn id(&self) -> LayerId {
        self.id
    }

    pub const fn style(&self) -> TextStyle {
        TextStyle {
            font_family: self.font_family,
            font_size: self.font_size,
            color: self.color,
        }
    }
}

/// Partial update merged into a layer by [`LayerStore::update_layer`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerPatch {
    pub text: Option<String>,
    pub position: Option<CanvasPoint>,
    pub font_size: Option<u32>,
    pub font_family: Option<FontFamily>,
    pub color: Option<Color>,
    pub dragging: Option<bool>,
}

impl LayerPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn position(position: CanvasPoint) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn dragging(dragging: bool) -> Self {
        Self {
            dragging: Some(dragging),
            ..Self::default()
        }
    }

    pub fn style(style: TextStyle) -> Self {
        Self {
            font_size: Some(style.font_size),
            font_family: Some(style.font_family),
            color: Some(style.color),
            ..Self::default()
        }
    }

    fn apply(self, layer: &mut TextLayer) {
        if let Some(text) = self.text {
            layer.text = text;
        }
        if let Some(position) = self.position {
            layer.position = position;
        }
        if let Some(font_size) = self.font_size {
            layer.font_size = font_size.max(1);
        }
        if let Some(font_family) = self.font_family {
            layer.font_family = font_family;
        }
        if let Some(color) = self.color {
            layer.color = color;
        }
        if let Some(dragging) = self.dragging {
            layer.dragging = dragging;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerError {
    #[error("layer limit of {limit} reached")]
    CapacityReached { limit: usize },
}

#[derive(Debug, Clone)]
pub struct LayerStore {
    layers: Vec<TextLayer>,
    active: Option<LayerId>,
    next_id: LayerId,
    max_layers: usize,
}

impl Default for LayerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerStore {
    pub fn new() -> Self {
        Self::with_capacity_limit(DEFAULT_MAX_LAYERS)
    }

    pub fn with_capacity_limit(max_layers: usize) -> Self {
        Self {
            layers: Vec::new(),
            active: None,
            next_id: 1,
            max_layers: max_layers.max(1),
        }
    }

    fn allocate_id(&mut self) -> LayerId {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    fn find_mut(&mut self, id: LayerId) -> Option<&mut TextLayer> {
        self.layers.iter_mut().find(|layer| layer.id == id)
    }

    pub fn add_layer(
        &mut self,
        position: CanvasPoint,
        text: impl Into<String>,
        defaults: TextStyle,
    ) -> Result<LayerId, LayerError> {
        if self.layers.len() >= self.max_layers {
            return Err(LayerError::CapacityReached {
                limit: self.max_layers,
            });
        }
        let id = self.allocate_id();
        self.layers.push(TextLayer::new(id, position, text, defaults));
        self.active = Some(id);
        Ok(id)
    }

    /// Returns `false` when `id` is unknown; nothing changes in that case.
    pub fn update_layer(&mut self, id: LayerId, patch: LayerPatch) -> bool {
        let starts_drag = patch.dragging == Some(true);
        let Some(layer) = self.find_mut(id) else {
            return false;
        };
        patch.apply(layer);
        if starts_drag {
            for other in self.layers.iter_mut().filter(|layer| layer.id != id) {
                other.dragging = false;
            }
        }
        true
    }

    pub fn remove_layer(&mut self, id: LayerId) -> Option<TextLayer> {
        let index = self.layers.iter().position(|layer| layer.id == id)?;
        let layer = self.layers.remove(index);
        if self.active == Some(id) {
            self.active = None;
        }
        Some(layer)
    }

    pub fn set_active(&mut self, id: Option<LayerId>) {
        self.active = id.filter(|id| self.get(*id).is_some());
    }

    pub fn clear(&mut self) {
        self.layers.clear();
        self.active = None;
    }

    pub fn active_id(&self) -> Option<LayerId> {
        self.active
    }

    pub fn active(&self) -> Option<&TextLayer> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: LayerId) -> Option<&TextLayer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    pub fn layers(&self) -> &[TextLayer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub const fn max_layers(&self) -> usize {
        self.max_layers
    }

    pub fn dragging_id(&self) -> Option<LayerId> {
        self.layers.iter().find(|layer| layer.dragging).map(TextLayer::id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn point(x: f64, y: f64) -> CanvasPoint {
        CanvasPoint::new(x, y)
    }

    #[test]
    fn add_layer_assigns_unique_ids_and_counts_every_call() {
        let mut store = LayerStore::with_capacity_limit(100);
        let ids = (0..25)
            .map(|i| {
                store
                    .add_layer(point(f64::from(i), 0.0), "x", TextStyle::default())
                    .expect("below the cap")
            })
            .collect::<Vec<_>>();

        assert_eq!(store.len(), 25);
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 25);
        assert_eq!(store.active_id(), ids.last().copied());
    }

    #[test]
    fn add_layer_copies_default_style() {
        let mut store = LayerStore::new();
        let style = TextStyle {
            font_family: FontFamily::Georgia,
            font_size: 48,
            color: Color::new(1, 2, 3),
        };
        let id = store
            .add_layer(point(5.0, 6.0), "hello", style)
            .expect("add should work");
        let layer = store.get(id).expect("layer should exist");

        assert_eq!(layer.text, "hello");
        assert_eq!(layer.position, point(5.0, 6.0));
        assert_eq!(layer.style(), style);
        assert!(!layer.dragging);
    }

    #[test]
    fn add_layer_stops_at_capacity_without_mutation() {
        let mut store = LayerStore::with_capacity_limit(2);
        let first = store.add_layer(point(0.0, 0.0), "a", TextStyle::default()).unwrap();
        let _ = store.add_layer(point(0.0, 0.0), "b", TextStyle::default()).unwrap();
        store.set_active(Some(first));

        let err = store
            .add_layer(point(0.0, 0.0), "c", TextStyle::default())
            .expect_err("third layer should exceed the cap");
        assert_eq!(err, LayerError::CapacityReached { limit: 2 });
        assert_eq!(store.len(), 2);
        assert_eq!(store.active_id(), Some(first));
    }

    #[test]
    fn update_after_remove_is_a_noop() {
        let mut store = LayerStore::new();
        let id = store.add_layer(point(1.0, 1.0), "gone", TextStyle::default()).unwrap();
        let keep = store.add_layer(point(2.0, 2.0), "kept", TextStyle::default()).unwrap();

        assert!(store.remove_layer(id).is_some());
        assert!(!store.update_layer(id, LayerPatch::text("back")));
        assert!(store.get(id).is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.layers()[0].id(), keep);
    }

    #[test]
    fn update_merges_fields_and_keeps_order() {
        let mut store = LayerStore::new();
        let a = store.add_layer(point(0.0, 0.0), "a", TextStyle::default()).unwrap();
        let b = store.add_layer(point(0.0, 0.0), "b", TextStyle::default()).unwrap();

        assert!(store.update_layer(
            a,
            LayerPatch {
                text: Some("A".to_string()),
                color: Some(Color::BLACK),
                ..LayerPatch::default()
            }
        ));

        let ids = store.layers().iter().map(TextLayer::id).collect::<Vec<_>>();
        assert_eq!(ids, vec![a, b]);
        let layer = store.get(a).unwrap();
        assert_eq!(layer.text, "A");
        assert_eq!(layer.color, Color::BLACK);
        assert_eq!(layer.font_size, 32);
    }

    #[test]
    fn remove_active_layer_clears_active_pointer() {
        let mut store = LayerStore::new();
        let a = store.add_layer(point(0.0, 0.0), "a", TextStyle::default()).unwrap();
        let b = store.add_layer(point(0.0, 0.0), "b", TextStyle::default()).unwrap();
        assert_eq!(store.active_id(), Some(b));

        store.remove_layer(a);
        assert_eq!(store.active_id(), Some(b));
        store.remove_layer(b);
        assert_eq!(store.active_id(), None);
    }

    #[test]
    fn only_one_layer_is_dragging_at_a_time() {
        let mut store = LayerStore::new();
        let a = store.add_layer(point(0.0, 0.0), "a", TextStyle::default()).unwrap();
        let b = store.add_layer(point(0.0, 0.0), "b", TextStyle::default()).unwrap();

        store.update_layer(a, LayerPatch::dragging(true));
        store.update_layer(b, LayerPatch::dragging(true));

        assert_eq!(store.dragging_id(), Some(b));
        assert_eq!(store.layers().iter().filter(|layer| layer.dragging).count(), 1);
    }

    #[test]
    fn set_active_ignores_unknown_ids_and_clear_resets() {
        let mut store = LayerStore::new();
        let a = store.add_layer(point(0.0, 0.0), "a", TextStyle::default()).unwrap();
        store.set_active(Some(999));
        assert_eq!(store.active_id(), None);
        store.set_active(Some(a));
        assert_eq!(store.active_id(), Some(a));

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.active_id(), None);
    }

    #[test]
    fn font_size_patch_never_drops_to_zero() {
        let mut store = LayerStore::new();
        let a = store.add_layer(point(0.0, 0.0), "a", TextStyle::default()).unwrap();
        store.update_layer(
            a,
            LayerPatch {
                font_size: Some(0),
                ..LayerPatch::default()
            },
        );
        assert_eq!(store.get(a).unwrap().font_size, 1);
    }
}
