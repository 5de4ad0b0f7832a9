//! Style resolution from a source shape's paint state.

use crate::color::SerializableColor;
use crate::drawable::StyleOptions;
use serde::{Deserialize, Serialize};

/// Kind of paint a style layer carries. Only solid colors are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaintKind {
    #[default]
    Color,
    Gradient,
    Pattern,
}

/// One fill entry of a layered host style.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillLayer {
    pub enabled: bool,
    #[serde(default)]
    pub kind: PaintKind,
    pub color: SerializableColor,
}

/// One border entry of a layered host style.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BorderLayer {
    pub enabled: bool,
    #[serde(default)]
    pub kind: PaintKind,
    pub color: SerializableColor,
    pub thickness: f64,
}

/// An enabled border paint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub color: SerializableColor,
    pub thickness: f64,
}

/// Enabled paints of a source shape.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PaintState {
    pub fill: Option<SerializableColor>,
    pub border: Option<Border>,
}

impl PaintState {
    pub fn new(fill: Option<SerializableColor>, border: Option<Border>) -> Self {
        Self { fill, border }
    }

    /// Pick the first enabled solid-color fill and border.
    pub fn from_layers(fills: &[FillLayer], borders: &[BorderLayer]) -> Self {
        let fill = fills
            .iter()
            .find(|f| f.enabled && f.kind == PaintKind::Color)
            .map(|f| f.color);
        let border = borders
            .iter()
            .find(|b| b.enabled && b.kind == PaintKind::Color)
            .map(|b| Border {
                color: b.color,
                thickness: b.thickness,
            });
        Self { fill, border }
    }
}

/// What kind of shape the paint was read from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SourceKind {
    Shape,
    Text { text_color: SerializableColor },
}

/// Resolve drawing options over the default options.
pub fn resolve_options(paint: &PaintState, kind: &SourceKind) -> StyleOptions {
    resolve_options_with(paint, kind, &StyleOptions::default())
}

/// Resolve drawing options, taking unset fields from `base`.
///
/// A shape with a border but no fill stays outline-only; a shape with
/// neither gets an opaque black fill; text falls back to its text color.
pub fn resolve_options_with(
    paint: &PaintState,
    kind: &SourceKind,
    base: &StyleOptions,
) -> StyleOptions {
    let mut options = StyleOptions {
        fill: None,
        ..*base
    };

    if let Some(fill) = paint.fill {
        options.fill = Some(fill);
    }

    match paint.border {
        Some(border) => {
            options.stroke = Some(border.color);
            options.stroke_width = border.thickness;
        }
        None => options.stroke = Some(SerializableColor::transparent()),
    }

    if paint.fill.is_none() {
        match kind {
            SourceKind::Text { text_color } => options.fill = Some(*text_color),
            SourceKind::Shape if paint.border.is_none() => {
                options.fill = Some(SerializableColor::black())
            }
            SourceKind::Shape => {}
        }
    }

    options
}
