//! RoughSketch Host Library
//!
//! Applies the compositor to layers of a host document: style resolution,
//! generation, insertion of the rough group and hiding of the original.

pub mod adapter;
pub mod document;

pub use adapter::{
    ConversionSummary, ConvertError, Converted, DocumentContext, HostError, HostResult, LayerId,
    LayerInfo, LayerKind, SceneHost, convert_layer, convert_selection,
};
pub use document::{Layer, MemoryDocument};
