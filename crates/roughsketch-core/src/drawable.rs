//! Generator output: drawables, operation sets and style options.

use crate::color::SerializableColor;
use crate::path::{self, PathResult};
use kurbo::{BezPath, Point, Size};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One geometric instruction. Order defines path traversal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawingOperation {
    MoveTo(Point),
    LineTo(Point),
    BezierCurveTo { c1: Point, c2: Point, end: Point },
    ClosePath,
}

/// How an operation set is painted.
///
/// Kinds the compositor does not know are kept as [`OperationKind::Unknown`]
/// so newer generators can be read without failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperationKind {
    /// Outline stroked with the stroke color.
    StrokePath,
    /// Solid fill with the fill color.
    FillPath,
    /// Hatch lines stroked with the fill color.
    HatchFill,
    /// Solid fill whose geometry is already a path string.
    PrecomputedFillPath,
    /// Hatch lines clipped to an outline.
    PatternFill,
    Unknown(String),
}

impl OperationKind {
    pub fn name(&self) -> &str {
        match self {
            OperationKind::StrokePath => "strokePath",
            OperationKind::FillPath => "fillPath",
            OperationKind::HatchFill => "hatchFill",
            OperationKind::PrecomputedFillPath => "precomputedFillPath",
            OperationKind::PatternFill => "patternFill",
            OperationKind::Unknown(name) => name,
        }
    }
}

impl From<String> for OperationKind {
    fn from(name: String) -> Self {
        // rough.js names are accepted alongside the canonical ones.
        match name.as_str() {
            "strokePath" | "path" => OperationKind::StrokePath,
            "fillPath" => OperationKind::FillPath,
            "hatchFill" | "fillSketch" => OperationKind::HatchFill,
            "precomputedFillPath" | "path2Dfill" => OperationKind::PrecomputedFillPath,
            "patternFill" | "path2Dpattern" => OperationKind::PatternFill,
            _ => OperationKind::Unknown(name),
        }
    }
}

impl From<OperationKind> for String {
    fn from(kind: OperationKind) -> Self {
        kind.name().to_string()
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One paint operation group within a drawable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSet {
    pub kind: OperationKind,
    #[serde(default)]
    pub operations: Vec<DrawingOperation>,
    /// Precomputed SVG path, used instead of `operations` by some kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Pattern tile size, when the generator reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}

impl OperationSet {
    pub fn from_operations(kind: OperationKind, operations: Vec<DrawingOperation>) -> Self {
        Self {
            kind,
            operations,
            path: None,
            size: None,
        }
    }

    pub fn from_path(kind: OperationKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            operations: Vec::new(),
            path: Some(path.into()),
            size: None,
        }
    }

    fn path_text(&self) -> Option<&str> {
        self.path.as_deref().filter(|p| !p.trim().is_empty())
    }

    /// True when neither operations nor a non-blank path are present.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty() && self.path_text().is_none()
    }

    /// Geometry from the operations, falling back to the path string.
    pub fn geometry(&self) -> PathResult<Option<BezPath>> {
        if !self.operations.is_empty() {
            return path::ops_to_path(&self.operations).map(Some);
        }
        self.path_geometry()
    }

    /// Geometry from the path string only.
    pub fn path_geometry(&self) -> PathResult<Option<BezPath>> {
        self.path_text().map(path::parse_path).transpose()
    }

    /// Geometry from the path string, falling back to the operations.
    pub fn outline_geometry(&self) -> PathResult<Option<BezPath>> {
        match self.path_geometry()? {
            Some(path) => Ok(Some(path)),
            None if !self.operations.is_empty() => path::ops_to_path(&self.operations).map(Some),
            None => Ok(None),
        }
    }
}

fn default_stroke() -> Option<SerializableColor> {
    Some(SerializableColor::black())
}

fn default_stroke_width() -> f64 {
    1.0
}

fn default_fill_weight() -> f64 {
    -1.0
}

/// Paint options shared by every set of a drawable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleOptions {
    /// Outline color (None = no outline paint).
    #[serde(default = "default_stroke")]
    pub stroke: Option<SerializableColor>,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    /// Fill color (None = unfilled).
    #[serde(default)]
    pub fill: Option<SerializableColor>,
    /// Hatch line width; negative means half the stroke width.
    #[serde(default = "default_fill_weight")]
    pub fill_weight: f64,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            stroke: default_stroke(),
            stroke_width: default_stroke_width(),
            fill: None,
            fill_weight: default_fill_weight(),
        }
    }
}

impl StyleOptions {
    /// Effective hatch line width.
    pub fn hatch_weight(&self) -> f64 {
        if self.fill_weight < 0.0 {
            self.stroke_width / 2.0
        } else {
            self.fill_weight
        }
    }
}

/// One primitive's complete rough rendering. Sets are in paint order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drawable {
    #[serde(default, alias = "sets")]
    pub operation_sets: Vec<OperationSet>,
    #[serde(default)]
    pub options: StyleOptions,
}

impl Drawable {
    pub fn new(operation_sets: Vec<OperationSet>, options: StyleOptions) -> Self {
        Self {
            operation_sets,
            options,
        }
    }

    /// Read a drawable from its JSON form.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
