use serde_json::Value;

use crate::{
    foundation::core::Color,
    json::{self, FromJson},
};

/// Horizontal alignment of a text run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Justification {
    #[default]
    Left,
    Right,
    Center,
}

impl Justification {
    fn from_lottie(j: i32) -> Self {
        match j {
            1 => Self::Right,
            2 => Self::Center,
            _ => Self::Left,
        }
    }
}

/// A text document keyframe (`t.d.k[].s`): discrete, never interpolated.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextValue {
    /// Text content; `\r` separates lines.
    pub text: String,
    /// Font family or font name reference.
    pub font: String,
    /// Font size in points.
    pub size: f32,
    /// Line height; `0` means derived from `size`.
    pub line_height: f32,
    /// Fill color.
    pub fill: Color,
    /// Alignment.
    pub justification: Justification,
}

impl TextValue {
    pub fn line_count(&self) -> usize {
        self.text.split(['\r', '\n']).count()
    }

    pub fn effective_line_height(&self) -> f32 {
        if self.line_height > 0.0 {
            self.line_height
        } else {
            self.size * 1.2
        }
    }
}

impl FromJson for TextValue {
    fn from_json(v: &Value) -> Option<Self> {
        let v = json::unwrap_single(v);
        if !v.is_object() {
            return None;
        }
        let fill = json::parse::<Vec<f32>>(&v["fc"])
            .map(|c| Color::from_components(&c))
            .unwrap_or(Color::BLACK);
        Some(Self {
            text: json::parse(&v["t"])?,
            font: json::parse_or(&v["f"], String::new()),
            size: json::parse_or(&v["s"], 0.0),
            line_height: json::parse_or(&v["lh"], 0.0),
            fill,
            justification: Justification::from_lottie(json::parse_or(&v["j"], 0)),
        })
    }
}
