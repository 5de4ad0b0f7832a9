//! Scene tree produced by the compositor.
//!
//! Groups own their children outright: a node is moved into exactly one
//! group when it is pushed and can never be re-parented. Child coordinates
//! are relative to the origin of the enclosing group's frame.

use crate::color::SerializableColor;
use crate::path;
use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for scene nodes.
pub type NodeId = Uuid;

/// Outline paint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: SerializableColor,
    pub width: f64,
}

impl Stroke {
    pub fn new(color: SerializableColor, width: f64) -> Self {
        Self { color, width }
    }
}

/// How a clip mask restricts the siblings painted after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClipMode {
    /// Clip to the mask outline, whether or not the mask paints anything.
    #[default]
    Outline,
    /// Clip to the mask's painted alpha.
    Alpha,
}

/// A styled vector path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorPath {
    pub(crate) id: NodeId,
    pub name: String,
    /// Geometry in the parent group's coordinate space.
    pub path: BezPath,
    /// Fill colors (zero or one).
    pub fills: Vec<SerializableColor>,
    /// Strokes (zero or one).
    pub strokes: Vec<Stroke>,
    /// Set when this path masks the siblings that follow it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_mask: Option<ClipMode>,
}

impl VectorPath {
    /// Create an unpainted path.
    pub fn new(name: impl Into<String>, path: BezPath) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            path,
            fills: Vec::new(),
            strokes: Vec::new(),
            clip_mask: None,
        }
    }

    /// Create a path painted with a single fill.
    pub fn filled(name: impl Into<String>, path: BezPath, fill: SerializableColor) -> Self {
        let mut node = Self::new(name, path);
        node.fills.push(fill);
        node
    }

    /// Create a path painted with a single stroke.
    pub fn stroked(name: impl Into<String>, path: BezPath, stroke: Stroke) -> Self {
        let mut node = Self::new(name, path);
        node.strokes.push(stroke);
        node
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Control-point bounding box in parent coordinates.
    pub fn frame(&self) -> Rect {
        path::bounding_box(&self.path)
    }

    pub fn is_empty(&self) -> bool {
        self.path.elements().is_empty()
    }

    pub fn is_clip_mask(&self) -> bool {
        self.clip_mask.is_some()
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.path.apply_affine(Affine::translate(offset));
    }
}

/// A container node with an explicit frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub(crate) id: NodeId,
    pub name: String,
    /// Frame in the parent's coordinate space.
    pub frame: Rect,
    children: Vec<SceneNode>,
}

impl Group {
    /// Create an empty group with an explicit frame.
    pub fn new(name: impl Into<String>, frame: Rect) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            frame,
            children: Vec::new(),
        }
    }

    /// Create an empty group framed at the origin with the given size.
    pub fn with_size(name: impl Into<String>, size: Size) -> Self {
        Self::new(name, Rect::from_origin_size(Point::ZERO, size))
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Append a child, taking ownership of it.
    pub fn push(&mut self, child: impl Into<SceneNode>) {
        self.children.push(child.into());
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut [SceneNode] {
        &mut self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Union of the children's frames in local coordinates.
    ///
    /// A clip mask confines every later sibling to the mask's own box, and
    /// children without extent (empty paths, collapsed groups, single
    /// points) never widen the result. Returns `None` when nothing counts.
    pub fn content_bounds(&self) -> Option<Rect> {
        let mut clip: Option<Rect> = None;
        let mut bounds: Option<Rect> = None;

        for child in &self.children {
            if child.is_empty() {
                if child.is_clip_mask() {
                    clip = Some(Rect::ZERO);
                }
                continue;
            }

            let mut frame = child.frame();
            if let Some(clip) = clip {
                // Fully clipped content collapses to a point.
                frame = if clip.overlaps(frame) {
                    frame.intersect(clip)
                } else {
                    Rect::ZERO
                };
            }
            if child.is_clip_mask() {
                clip = Some(frame);
            }
            if frame.width() <= 0.0 && frame.height() <= 0.0 {
                continue;
            }
            bounds = Some(bounds.map_or(frame, |b| b.union(frame)));
        }

        bounds
    }

    /// Shrink the frame to the tight box of the children.
    ///
    /// Child groups are fitted first. Children keep their position in the
    /// parent's space: the frame moves by the content offset and the
    /// children move back by the same amount. A group with no counted
    /// content collapses to a zero-size frame at its current origin.
    pub fn adjust_to_fit(&mut self) {
        for child in &mut self.children {
            if let SceneNode::Group(group) = child {
                group.adjust_to_fit();
            }
        }

        let origin = self.frame.origin().to_vec2();
        let Some(bounds) = self.content_bounds() else {
            self.frame = Rect::from_origin_size(self.frame.origin(), Size::ZERO);
            return;
        };

        let offset = bounds.origin().to_vec2();
        if offset != Vec2::ZERO {
            for child in &mut self.children {
                child.translate(-offset);
            }
        }
        self.frame = bounds + origin;
    }

    /// Depth-first pre-order walk over every node below this group.
    pub fn walk(&self, visit: &mut impl FnMut(&SceneNode)) {
        for child in &self.children {
            visit(child);
            if let SceneNode::Group(group) = child {
                group.walk(visit);
            }
        }
    }

    /// Number of nodes below this group.
    pub fn descendant_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }
}

/// A node of the scene tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneNode {
    Group(Group),
    Path(VectorPath),
}

impl SceneNode {
    pub fn id(&self) -> NodeId {
        match self {
            SceneNode::Group(g) => g.id,
            SceneNode::Path(p) => p.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SceneNode::Group(g) => &g.name,
            SceneNode::Path(p) => &p.name,
        }
    }

    /// Frame in the parent's coordinate space.
    pub fn frame(&self) -> Rect {
        match self {
            SceneNode::Group(g) => g.frame,
            SceneNode::Path(p) => p.frame(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SceneNode::Group(g) => g.is_empty(),
            SceneNode::Path(p) => p.is_empty(),
        }
    }

    pub fn is_clip_mask(&self) -> bool {
        matches!(self, SceneNode::Path(p) if p.is_clip_mask())
    }

    pub fn translate(&mut self, offset: Vec2) {
        match self {
            SceneNode::Group(g) => g.frame = g.frame + offset,
            SceneNode::Path(p) => p.translate(offset),
        }
    }

    /// Move the node so its frame origin lands on `origin`.
    pub fn set_origin(&mut self, origin: Point) {
        let offset = origin - self.frame().origin();
        self.translate(offset);
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            SceneNode::Group(g) => Some(g),
            SceneNode::Path(_) => None,
        }
    }

    pub fn as_path(&self) -> Option<&VectorPath> {
        match self {
            SceneNode::Path(p) => Some(p),
            SceneNode::Group(_) => None,
        }
    }
}

impl From<Group> for SceneNode {
    fn from(group: Group) -> Self {
        SceneNode::Group(group)
    }
}

impl From<VectorPath> for SceneNode {
    fn from(path: VectorPath) -> Self {
        SceneNode::Path(path)
    }
}
