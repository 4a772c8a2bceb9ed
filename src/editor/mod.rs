//! Text layers, their shared style controls, and the editing session.

pub mod layers;
pub mod session;
pub mod style;

pub use layers::{LayerError, LayerId, LayerPatch, LayerStore, TextLayer, DEFAULT_MAX_LAYERS};
pub use session::{MemeSession, SessionSettings};
pub use style::{
    clamp_control_font_size, FontFamily, TextStyle, UnknownFontFamily, DEFAULT_FONT_SIZE,
    FONT_SIZE_MAX, FONT_SIZE_MIN,
};

pub const DEFAULT_LAYER_TEXT: &str = "Click to edit";
