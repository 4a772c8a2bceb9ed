//! Raster composition of a template image plus its text layers.
//!
//! Every render is a full clear-and-redraw; layer counts stay small.

mod surface;
mod text;

use gtk4::cairo;
use image::RgbaImage;
use thiserror::Error;

use crate::editor::TextLayer;
use crate::geometry::CanvasSize;

pub(crate) use surface::{cairo_surface_to_rgba_image, encode_png, rgba_image_to_cairo_surface};
pub use text::{
    layer_bounds, outline_width, top_layer_at, CairoTextMetrics, TextMetrics, OUTLINE_COLOR,
};

pub const VIEWPORT_MAX_WIDTH: f64 = 500.0;
pub const VIEWPORT_MAX_HEIGHT: f64 = 500.0;
pub const COMPACT_VIEWPORT_MAX_WIDTH: f64 = 350.0;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template image has no pixels")]
    EmptyImage,
    #[error("template image is too large for a drawing surface")]
    ImageTooLarge,
    #[error("cairo error while {operation}: {source}")]
    Cairo {
        operation: &'static str,
        #[source]
        source: cairo::Error,
    },
    #[error("canvas has not been rendered yet")]
    NothingRendered,
}

fn cairo_op(operation: &'static str) -> impl FnOnce(cairo::Error) -> RenderError {
    move |source| RenderError::Cairo { operation, source }
}

/// Upper bound for the drawn canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub max_width: f64,
    pub max_height: f64,
}

impl Viewport {
    pub const fn new(max_width: f64, max_height: f64) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    pub const fn regular() -> Self {
        Self::new(VIEWPORT_MAX_WIDTH, VIEWPORT_MAX_HEIGHT)
    }

    pub const fn compact() -> Self {
        Self::new(COMPACT_VIEWPORT_MAX_WIDTH, VIEWPORT_MAX_HEIGHT)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::regular()
    }
}

/// Uniform scale that fits the image inside the viewport.
pub fn fit_ratio(image_width: u32, image_height: u32, viewport: Viewport) -> f64 {
    if image_width == 0 || image_height == 0 {
        return 1.0;
    }
    (viewport.max_width / f64::from(image_width)).min(viewport.max_height / f64::from(image_height))
}

pub fn fitted_canvas_size(image_width: u32, image_height: u32, viewport: Viewport) -> CanvasSize {
    let ratio = fit_ratio(image_width, image_height, viewport);
    let scale = |side: u32| ((f64::from(side) * ratio) as u32).max(1);
    CanvasSize::new(scale(image_width), scale(image_height))
}

/// Decoded template pixels plus the matching cairo source surface.
pub struct TemplateImage {
    template_id: String,
    pixels: RgbaImage,
    surface: cairo::ImageSurface,
}

impl std::fmt::Debug for TemplateImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateImage")
            .field("template_id", &self.template_id)
            .field("width", &self.pixels.width())
            .field("height", &self.pixels.height())
            .finish()
    }
}

impl TemplateImage {
    pub fn from_rgba(template_id: impl Into<String>, pixels: RgbaImage) -> Result<Self, RenderError> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(RenderError::EmptyImage);
        }
        let surface = rgba_image_to_cairo_surface(&pixels).ok_or(RenderError::ImageTooLarge)?;
        Ok(Self {
            template_id: template_id.into(),
            pixels,
            surface,
        })
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Owns the drawing surface shared by the canvas widget and the exporter.
#[derive(Default)]
pub struct Compositor {
    surface: Option<cairo::ImageSurface>,
    ratio: f64,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn surface(&self) -> Option<&cairo::ImageSurface> {
        self.surface.as_ref()
    }

    pub fn canvas_size(&self) -> Option<CanvasSize> {
        self.surface.as_ref().map(|surface| {
            CanvasSize::new(
                u32::try_from(surface.width()).unwrap_or(0),
                u32::try_from(surface.height()).unwrap_or(0),
            )
        })
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn render(
        &mut self,
        template: &TemplateImage,
        layers: &[TextLayer],
        viewport: Viewport,
    ) -> Result<CanvasSize, RenderError> {
        let (surface, context, size) = self.draw_background(template, viewport)?;
        for layer in layers {
            text::draw_layer(&context, layer).map_err(cairo_op("drawing text layer"))?;
        }
        drop(context);
        surface.flush();
        self.surface = Some(surface);
        tracing::trace!(
            template = template.template_id(),
            layers = layers.len(),
            width = size.width,
            height = size.height,
            "canvas rendered"
        );
        Ok(size)
    }

    fn draw_background(
        &mut self,
        template: &TemplateImage,
        viewport: Viewport,
    ) -> Result<(cairo::ImageSurface, cairo::Context, CanvasSize), RenderError> {
        let size = fitted_canvas_size(template.width(), template.height(), viewport);
        let ratio = fit_ratio(template.width(), template.height(), viewport);
        let width = i32::try_from(size.width).map_err(|_| RenderError::ImageTooLarge)?;
        let height = i32::try_from(size.height).map_err(|_| RenderError::ImageTooLarge)?;

        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height)
            .map_err(cairo_op("creating canvas surface"))?;
        let context = cairo::Context::new(&surface).map_err(cairo_op("creating canvas context"))?;

        context.save().map_err(cairo_op("saving context"))?;
        context.scale(
            f64::from(size.width) / f64::from(template.width()),
            f64::from(size.height) / f64::from(template.height()),
        );
        context
            .set_source_surface(&template.surface, 0.0, 0.0)
            .map_err(cairo_op("setting template source"))?;
        context.paint().map_err(cairo_op("painting template"))?;
        context.restore().map_err(cairo_op("restoring context"))?;

        self.ratio = ratio;
        Ok((surface, context, size))
    }

    /// Current canvas as straight RGBA, sized like the on-screen canvas.
    pub fn snapshot(&mut self) -> Result<RgbaImage, RenderError> {
        let surface = self.surface.as_mut().ok_or(RenderError::NothingRendered)?;
        cairo_surface_to_rgba_image(surface).ok_or(RenderError::NothingRendered)
    }
}
