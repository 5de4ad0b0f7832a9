//! Scene host adapter.
//!
//! Replaces selected document layers with rough renderings: each leaf is
//! resolved to style options, generated, composited and inserted next to
//! the original, which is hidden and deselected.

use kurbo::{Rect, Size, Vec2};
use log::{debug, info, warn};
use roughsketch_core::generator::{DrawingGenerator, GeneratorError, Primitive};
use roughsketch_core::style::{PaintState, SourceKind, resolve_options_with};
use roughsketch_core::{CompositeError, Group, SketchConfig, compositor};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for document layers.
pub type LayerId = Uuid;

/// Host document errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    #[error("Layer not found: {0}")]
    LayerNotFound(LayerId),
    #[error("Layer {0} cannot contain other layers")]
    NotAContainer(LayerId),
}

/// Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;

/// Per-layer conversion errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    #[error("Layer {0} has no path geometry")]
    UnsupportedSelection(LayerId),
    #[error(transparent)]
    Composite(#[from] CompositeError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error(transparent)]
    Host(#[from] HostError),
}

/// What a layer is, as far as conversion cares.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LayerKind {
    Shape,
    Text {
        text_color: roughsketch_core::SerializableColor,
    },
    /// Container of other layers.
    Group,
    /// Output of an earlier conversion.
    Rough,
}

/// Snapshot of a layer's conversion-relevant state.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerInfo {
    pub id: LayerId,
    pub name: String,
    pub kind: LayerKind,
    /// Frame in the parent's coordinate space.
    pub frame: Rect,
    pub parent: Option<LayerId>,
    pub children: Vec<LayerId>,
    pub paint: PaintState,
}

/// Document operations the adapter needs from its host.
pub trait SceneHost {
    fn layer(&self, id: LayerId) -> Option<LayerInfo>;

    /// Outline of the layer as SVG path commands in its parent's
    /// coordinate space, or `None` when it has no traceable path.
    fn layer_path(&self, id: LayerId) -> Option<String>;

    /// Insert `group` as the topmost child of `parent` (or of the document
    /// root) and return the new layer's id.
    fn insert_group(
        &mut self,
        parent: Option<LayerId>,
        name: &str,
        group: Group,
    ) -> HostResult<LayerId>;

    /// Remove a layer and everything below it.
    fn remove_layer(&mut self, id: LayerId) -> HostResult<()>;

    fn set_hidden(&mut self, id: LayerId, hidden: bool) -> HostResult<()>;

    fn set_selected(&mut self, id: LayerId, selected: bool) -> HostResult<()>;
}

/// Selection state handed to the adapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentContext {
    /// Selected layers in selection order.
    pub selection: Vec<LayerId>,
    /// Container receiving output for layers that have no parent.
    pub active_container: Option<LayerId>,
}

impl DocumentContext {
    pub fn new(selection: Vec<LayerId>) -> Self {
        Self {
            selection,
            active_container: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }
}

/// A successfully converted layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Converted {
    pub source: LayerId,
    pub result: LayerId,
}

/// Outcome of converting a selection.
#[derive(Debug, Default)]
pub struct ConversionSummary {
    pub converted: Vec<Converted>,
    /// Layers without path geometry.
    pub skipped: Vec<LayerId>,
    pub failed: Vec<(LayerId, ConvertError)>,
}

impl ConversionSummary {
    pub fn is_empty(&self) -> bool {
        self.converted.is_empty() && self.skipped.is_empty() && self.failed.is_empty()
    }

    fn record(&mut self, id: LayerId, outcome: Result<Option<LayerId>, ConvertError>) {
        match outcome {
            Ok(Some(result)) => self.converted.push(Converted { source: id, result }),
            Ok(None) => {}
            Err(ConvertError::UnsupportedSelection(id)) => {
                debug!("Skipping layer {} without path geometry", id);
                self.skipped.push(id);
            }
            Err(e) => {
                warn!("Failed to convert layer {}: {}", id, e);
                self.failed.push((id, e));
            }
        }
    }
}

/// Convert every selected layer.
///
/// Containers are walked depth-first, pre-order, and each leaf is handled
/// on its own: a failing leaf is recorded and the rest still convert. An
/// empty selection does nothing.
pub fn convert_selection<H, G>(
    host: &mut H,
    ctx: &DocumentContext,
    generator: &mut G,
    config: &SketchConfig,
) -> ConversionSummary
where
    H: SceneHost + ?Sized,
    G: DrawingGenerator + ?Sized,
{
    let mut summary = ConversionSummary::default();
    if ctx.is_empty() {
        debug!("Nothing selected");
        return summary;
    }

    for &id in &ctx.selection {
        visit(host, ctx, generator, config, id, &mut summary);
    }

    info!(
        "Converted {} layers ({} skipped, {} failed)",
        summary.converted.len(),
        summary.skipped.len(),
        summary.failed.len()
    );
    summary
}

fn visit<H, G>(
    host: &mut H,
    ctx: &DocumentContext,
    generator: &mut G,
    config: &SketchConfig,
    id: LayerId,
    summary: &mut ConversionSummary,
) where
    H: SceneHost + ?Sized,
    G: DrawingGenerator + ?Sized,
{
    let Some(info) = host.layer(id) else {
        summary.record(id, Err(HostError::LayerNotFound(id).into()));
        return;
    };

    match info.kind {
        LayerKind::Group => {
            for child in &info.children {
                visit(host, ctx, generator, config, *child, summary);
            }
        }
        LayerKind::Rough => summary.record(id, Err(ConvertError::UnsupportedSelection(id))),
        LayerKind::Shape | LayerKind::Text { .. } => {
            let outcome = convert_layer(host, ctx, generator, config, &info);
            summary.record(id, outcome.map(Some));
        }
    }
}

/// Size of the frame the generator draws into: the receiving container's
/// frame, or the extent of the layer itself at the document root.
fn target_size(info: &LayerInfo, container: Option<&LayerInfo>) -> Size {
    match container {
        Some(container) => container.frame.size(),
        None => Size::new(info.frame.x1.max(0.0), info.frame.y1.max(0.0)),
    }
}

/// Origin of `layer` in document coordinates.
fn document_origin<H: SceneHost + ?Sized>(host: &H, layer: &LayerInfo) -> Vec2 {
    let mut origin = layer.frame.origin().to_vec2();
    let mut parent = layer.parent;
    while let Some(info) = parent.and_then(|id| host.layer(id)) {
        origin += info.frame.origin().to_vec2();
        parent = info.parent;
    }
    origin
}

/// Convert one leaf layer.
///
/// Path lookup, generation and compositing run before the document is
/// touched. If a later step fails, the inserted group is removed and the
/// original is shown again.
pub fn convert_layer<H, G>(
    host: &mut H,
    ctx: &DocumentContext,
    generator: &mut G,
    config: &SketchConfig,
    info: &LayerInfo,
) -> Result<LayerId, ConvertError>
where
    H: SceneHost + ?Sized,
    G: DrawingGenerator + ?Sized,
{
    let source_kind = match info.kind {
        LayerKind::Shape => SourceKind::Shape,
        LayerKind::Text { text_color } => SourceKind::Text { text_color },
        LayerKind::Group | LayerKind::Rough => {
            return Err(ConvertError::UnsupportedSelection(info.id));
        }
    };
    let d = host
        .layer_path(info.id)
        .ok_or(ConvertError::UnsupportedSelection(info.id))?;

    let parent = info.parent.or(ctx.active_container);
    let container = parent.and_then(|id| host.layer(id));

    let options = resolve_options_with(&info.paint, &source_kind, &config.default_options);
    let drawable = generator.generate(&Primitive::Path(d), &options)?;
    let mut group = compositor::composite(&drawable, target_size(info, container.as_ref()))?;
    if !compositor::has_visible_paint(&group) {
        debug!("Layer {} produced no visible paint", info.id);
    }

    // Root-level outlines are in document space; rebase them into the
    // active container they are moved into.
    if let (None, Some(container)) = (info.parent, &container) {
        group.frame = group.frame - document_origin(host, container);
    }

    let name = config.display_name(&info.name);
    let result = host.insert_group(parent, &name, group)?;

    if let Err(e) = finish_layer(host, config, info.id, result) {
        warn!("Rolling back conversion of layer {}: {}", info.id, e);
        if let Err(undo) = host.remove_layer(result) {
            warn!("Failed to remove layer {}: {}", result, undo);
        }
        if config.hide_original {
            if let Err(undo) = host.set_hidden(info.id, false) {
                warn!("Failed to show layer {}: {}", info.id, undo);
            }
        }
        return Err(e.into());
    }

    debug!("Replaced layer {} with {} ({})", info.id, result, name);
    Ok(result)
}

/// Hide and deselect the source, then select the result.
fn finish_layer<H: SceneHost + ?Sized>(
    host: &mut H,
    config: &SketchConfig,
    source: LayerId,
    result: LayerId,
) -> HostResult<()> {
    if config.hide_original {
        host.set_hidden(source, true)?;
    }
    host.set_selected(source, false)?;
    if config.select_result {
        host.set_selected(result, true)?;
    }
    Ok(())
}
