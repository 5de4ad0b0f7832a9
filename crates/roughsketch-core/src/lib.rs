//! RoughSketch Core Library
//!
//! Turns rough drawables produced by a drawing generator into styled,
//! bounding-box-fitted vector scene trees.

pub mod color;
pub mod compositor;
pub mod config;
pub mod drawable;
pub mod generator;
pub mod path;
pub mod scene;
pub mod style;

pub use color::{ColorParseError, SerializableColor};
pub use compositor::{CompositeError, CompositeResult, build_hatch, build_pattern, composite};
pub use config::{ConfigError, SketchConfig};
pub use drawable::{Drawable, DrawingOperation, OperationKind, OperationSet, StyleOptions};
pub use generator::{DrawingGenerator, GeneratorError, Primitive, SketchError, Sketcher};
pub use path::{PathError, bounding_box, parse_path, serialize_ops, serialize_path};
pub use scene::{ClipMode, Group, NodeId, SceneNode, Stroke, VectorPath};
pub use style::{Border, PaintState, SourceKind, resolve_options, resolve_options_with};

#[cfg(feature = "rough-generator")]
pub use generator::RoughrGenerator;
