use gtk4::cairo;

use crate::editor::{LayerId, TextLayer};
use crate::geometry::{CanvasBounds, CanvasPoint, Color};

pub const OUTLINE_COLOR: Color = Color::BLACK;

/// Horizontal extent of a layer's text as it will be drawn.
pub trait TextMetrics {
    fn text_width(&self, layer: &TextLayer) -> f64;
}

pub fn outline_width(font_size: u32) -> f64 {
    f64::from(font_size) / 8.0
}

pub(super) fn apply_layer_font(context: &cairo::Context, layer: &TextLayer) {
    context.select_font_face(
        layer.font_family.name(),
        cairo::FontSlant::Normal,
        cairo::FontWeight::Bold,
    );
    context.set_font_size(f64::from(layer.font_size.max(1)));
}

pub(super) fn measure_text_advance(context: &cairo::Context, text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }

    context
        .text_extents(text)
        .map(|extents| extents.x_advance())
        .unwrap_or_else(|_| {
            let fallback = context
                .font_extents()
                .map(|extents| extents.max_x_advance().max(1.0) * 0.62)
                .unwrap_or(6.0);
            text.chars().count() as f64 * fallback
        })
}

/// Stroke first, then fill, so the outline never covers the glyph interior.
pub(super) fn draw_layer(context: &cairo::Context, layer: &TextLayer) -> Result<(), cairo::Error> {
    if layer.text.is_empty() {
        return Ok(());
    }
    context.save()?;
    apply_layer_font(context, layer);
    let width = measure_text_advance(context, &layer.text);
    context.new_path();
    context.move_to(layer.position.x - width / 2.0, layer.position.y);
    context.text_path(&layer.text);

    let (r, g, b) = OUTLINE_COLOR.unit_rgb();
    context.set_source_rgb(r, g, b);
    context.set_line_width(outline_width(layer.font_size));
    context.set_line_join(cairo::LineJoin::Round);
    context.stroke_preserve()?;

    let (r, g, b) = layer.color.unit_rgb();
    context.set_source_rgb(r, g, b);
    context.fill()?;
    context.restore()
}

/// Measures with the same face, weight and size used by [`draw_layer`].
pub struct CairoTextMetrics {
    context: cairo::Context,
}

impl CairoTextMetrics {
    pub fn new() -> Result<Self, cairo::Error> {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 1, 1)?;
        Ok(Self {
            context: cairo::Context::new(&surface)?,
        })
    }
}

impl TextMetrics for CairoTextMetrics {
    fn text_width(&self, layer: &TextLayer) -> f64 {
        apply_layer_font(&self.context, layer);
        measure_text_advance(&self.context, &layer.text)
    }
}

pub fn layer_bounds(layer: &TextLayer, text_width: f64) -> CanvasBounds {
    let half = text_width / 2.0;
    CanvasBounds {
        left: layer.position.x - half,
        top: layer.position.y - f64::from(layer.font_size),
        right: layer.position.x + half,
        bottom: layer.position.y,
    }
}

/// Topmost layer under `point`; later layers are drawn over earlier ones.
pub fn top_layer_at(
    metrics: &dyn TextMetrics,
    layers: &[TextLayer],
    point: CanvasPoint,
) -> Option<LayerId> {
    layers
        .iter()
        .rev()
        .find(|layer| layer_bounds(layer, metrics.text_width(layer)).contains(point))
        .map(TextLayer::id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::TextStyle;

    struct FixedWidth(f64);

    impl TextMetrics for FixedWidth {
        fn text_width(&self, _layer: &TextLayer) -> f64 {
            self.0
        }
    }

    fn layer(id: LayerId, x: f64, y: f64) -> TextLayer {
        TextLayer::new(id, CanvasPoint::new(x, y), "meme", TextStyle::default())
    }

    #[test]
    fn bounds_are_centered_and_sit_on_baseline() {
        let bounds = layer_bounds(&layer(1, 100.0, 100.0), 60.0);
        assert_eq!(bounds.left, 70.0);
        assert_eq!(bounds.right, 130.0);
        assert_eq!(bounds.top, 68.0);
        assert_eq!(bounds.bottom, 100.0);
    }

    #[test]
    fn hit_test_prefers_last_drawn_layer() {
        let layers = vec![layer(1, 100.0, 100.0), layer(2, 110.0, 105.0)];
        let metrics = FixedWidth(60.0);

        assert_eq!(
            top_layer_at(&metrics, &layers, CanvasPoint::new(105.0, 90.0)),
            Some(2)
        );
        assert_eq!(
            top_layer_at(&metrics, &layers, CanvasPoint::new(72.0, 70.0)),
            Some(1)
        );
        assert_eq!(
            top_layer_at(&metrics, &layers, CanvasPoint::new(10.0, 10.0)),
            None
        );
    }

    #[test]
    fn hit_test_includes_exact_boundary() {
        let layers = vec![layer(1, 100.0, 100.0)];
        let metrics = FixedWidth(60.0);
        assert_eq!(
            top_layer_at(&metrics, &layers, CanvasPoint::new(130.0, 68.0)),
            Some(1)
        );
    }

    #[test]
    fn cairo_metrics_grow_with_font_size_and_text_length() {
        let metrics = CairoTextMetrics::new().expect("1x1 surface should be creatable");
        let mut small = layer(1, 0.0, 0.0);
        small.font_size = 16;
        let mut large = small.clone();
        large.font_size = 64;
        let mut longer = small.clone();
        longer.text = "meme meme meme".to_string();

        let small_width = metrics.text_width(&small);
        assert!(small_width > 0.0);
        assert!(metrics.text_width(&large) > small_width);
        assert!(metrics.text_width(&longer) > small_width);
    }

    #[test]
    fn empty_text_has_zero_width() {
        let metrics = CairoTextMetrics::new().unwrap();
        let mut empty = layer(1, 0.0, 0.0);
        empty.text.clear();
        assert_eq!(metrics.text_width(&empty), 0.0);
    }
}
