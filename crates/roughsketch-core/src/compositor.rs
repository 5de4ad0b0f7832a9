//! Drawable compositor.
//!
//! Materializes a [`Drawable`] as a scene tree: solid fills, stroked
//! outlines, hatch fills and clipped hatch patterns, grouped under a root
//! whose frame is fitted to the content.

use crate::color::SerializableColor;
use crate::drawable::{Drawable, OperationKind, OperationSet, StyleOptions};
use crate::path::PathError;
use crate::scene::{ClipMode, Group, SceneNode, Stroke, VectorPath};
use kurbo::{Point, Rect, Size};
use log::debug;
use thiserror::Error;

/// Compositing errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompositeError {
    #[error("Malformed path: {0}")]
    MalformedPath(#[from] PathError),
}

/// Result type for compositing.
pub type CompositeResult<T> = Result<T, CompositeError>;

/// Name given to the root group before the host renames it.
pub const ROOT_NAME: &str = "Rough";

/// Build the scene tree for `drawable` inside a frame of `target` size.
///
/// Sets are painted in order. Unknown kinds and empty sets produce no node.
/// Any malformed geometry aborts the whole call.
pub fn composite(drawable: &Drawable, target: Size) -> CompositeResult<Group> {
    let frame = Rect::from_origin_size(Point::ZERO, target);
    let options = &drawable.options;
    let mut root = Group::new(ROOT_NAME, frame);

    for set in &drawable.operation_sets {
        match &set.kind {
            OperationKind::StrokePath => {
                if let Some(node) = build_stroke(set, options)? {
                    root.push(node);
                }
            }
            OperationKind::FillPath => {
                if let Some(node) = build_fill(set, options, false)? {
                    root.push(node);
                }
            }
            OperationKind::PrecomputedFillPath => {
                if let Some(node) = build_fill(set, options, true)? {
                    root.push(node);
                }
            }
            OperationKind::HatchFill => {
                if let Some(node) = build_hatch(set, options)? {
                    root.push(node);
                }
            }
            OperationKind::PatternFill => {
                if let Some(node) = build_pattern(set, options, frame)? {
                    root.push(node);
                }
            }
            OperationKind::Unknown(name) => {
                debug!("Skipping operation set of unknown kind '{}'", name);
            }
        }
    }

    root.adjust_to_fit();
    Ok(root)
}

fn build_stroke(set: &OperationSet, options: &StyleOptions) -> CompositeResult<Option<VectorPath>> {
    let Some(path) = set.geometry()? else {
        return Ok(None);
    };
    let color = options.stroke.unwrap_or_else(SerializableColor::transparent);
    Ok(Some(VectorPath::stroked(
        "Stroke",
        path,
        Stroke::new(color, options.stroke_width),
    )))
}

fn build_fill(
    set: &OperationSet,
    options: &StyleOptions,
    precomputed: bool,
) -> CompositeResult<Option<VectorPath>> {
    let geometry = if precomputed {
        set.path_geometry()?
    } else {
        set.geometry()?
    };
    let Some(path) = geometry else {
        return Ok(None);
    };

    let mut node = VectorPath::new("Fill", path);
    node.fills.extend(options.fill);
    Ok(Some(node))
}

/// Hatch lines stroked with the fill color at the derived fill weight.
pub fn build_hatch(
    set: &OperationSet,
    options: &StyleOptions,
) -> CompositeResult<Option<VectorPath>> {
    let Some(path) = set.geometry()? else {
        return Ok(None);
    };
    let color = options.fill.unwrap_or_else(SerializableColor::transparent);
    Ok(Some(VectorPath::stroked(
        "Hatch",
        path,
        Stroke::new(color, options.hatch_weight()),
    )))
}

/// Hatch lines clipped to the set's outline.
///
/// The returned group holds the invisible mask first and the hatch second.
/// Its frame is fitted to the mask and the hatch is anchored at the group's
/// local origin.
pub fn build_pattern(
    set: &OperationSet,
    options: &StyleOptions,
    frame: Rect,
) -> CompositeResult<Option<Group>> {
    if set.is_empty() {
        return Ok(None);
    }

    let mut pattern = Group::new("Pattern", frame);

    let mut mask = VectorPath::new("Mask", set.outline_geometry()?.unwrap_or_default());
    mask.clip_mask = Some(ClipMode::Outline);
    pattern.push(mask);

    let hatch = build_hatch(set, options)?;
    let has_hatch = hatch.is_some();
    if let Some(hatch) = hatch {
        pattern.push(hatch);
    }

    pattern.adjust_to_fit();

    if has_hatch {
        if let Some(hatch) = pattern.children_mut().last_mut() {
            hatch.set_origin(Point::ZERO);
        }
    }
    if pattern.frame.area() == 0.0 {
        debug!("Pattern mask has no extent; it will not affect fitting");
    }

    Ok(Some(pattern))
}

/// Convenience check used by hosts: does the tree contain any paint?
pub fn has_visible_paint(group: &Group) -> bool {
    let mut visible = false;
    group.walk(&mut |node| {
        if let SceneNode::Path(p) = node {
            visible |= p.fills.iter().any(|c| !c.is_transparent())
                || p.strokes.iter().any(|s| !s.color.is_transparent() && s.width > 0.0);
        }
    });
    visible
}
