use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::Color;

pub const FONT_SIZE_MIN: u32 = 16;
pub const FONT_SIZE_MAX: u32 = 64;
pub const DEFAULT_FONT_SIZE: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    Impact,
    Arial,
    #[serde(rename = "Comic Sans MS")]
    ComicSansMs,
    #[serde(rename = "Courier New")]
    CourierNew,
    Georgia,
    Verdana,
}

impl FontFamily {
    pub const ALL: [FontFamily; 6] = [
        Self::Impact,
        Self::Arial,
        Self::ComicSansMs,
        Self::CourierNew,
        Self::Georgia,
        Self::Verdana,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Impact => "Impact",
            Self::Arial => "Arial",
            Self::ComicSansMs => "Comic Sans MS",
            Self::CourierNew => "Courier New",
            Self::Georgia => "Georgia",
            Self::Verdana => "Verdana",
        }
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown font family: {0:?}")]
pub struct UnknownFontFamily(pub String);

impl FromStr for FontFamily {
    type Err = UnknownFontFamily;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|family| family.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownFontFamily(value.to_string()))
    }
}

/// Style shared by the font, size and color controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: FontFamily,
    pub font_size: u32,
    pub color: Color,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: FontFamily::Impact,
            font_size: DEFAULT_FONT_SIZE,
            color: Color::WHITE,
        }
    }
}

impl TextStyle {
    pub fn set_font_size(&mut self, size: u32) {
        self.font_size = clamp_control_font_size(size);
    }
}

/// Bounds a size coming from the size control.
pub const fn clamp_control_font_size(size: u32) -> u32 {
    if size < FONT_SIZE_MIN {
        FONT_SIZE_MIN
    } else if size > FONT_SIZE_MAX {
        FONT_SIZE_MAX
    } else {
        size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_family_round_trips_through_display_name() {
        for family in FontFamily::ALL {
            assert_eq!(family.name().parse::<FontFamily>().unwrap(), family);
        }
        assert!("Papyrus".parse::<FontFamily>().is_err());
    }

    #[test]
    fn font_family_serde_uses_css_names() {
        let json = serde_json::to_string(&FontFamily::ComicSansMs).unwrap();
        assert_eq!(json, "\"Comic Sans MS\"");
        let parsed: FontFamily = serde_json::from_str("\"Courier New\"").unwrap();
        assert_eq!(parsed, FontFamily::CourierNew);
    }

    #[test]
    fn default_style_is_white_impact_32() {
        let style = TextStyle::default();
        assert_eq!(style.font_family, FontFamily::Impact);
        assert_eq!(style.font_size, 32);
        assert_eq!(style.color, Color::WHITE);
    }

    #[test]
    fn control_font_size_is_clamped() {
        let mut style = TextStyle::default();
        style.set_font_size(4);
        assert_eq!(style.font_size, FONT_SIZE_MIN);
        style.set_font_size(200);
        assert_eq!(style.font_size, FONT_SIZE_MAX);
        style.set_font_size(40);
        assert_eq!(style.font_size, 40);
    }
}
