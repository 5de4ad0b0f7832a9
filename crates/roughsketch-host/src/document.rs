//! In-memory layer document implementing [`SceneHost`].

use crate::adapter::{
    DocumentContext, HostError, HostResult, LayerId, LayerInfo, LayerKind, SceneHost,
};
use kurbo::Rect;
use roughsketch_core::style::PaintState;
use roughsketch_core::{Group, SerializableColor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A layer stored in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub kind: LayerKind,
    pub frame: Rect,
    pub parent: Option<LayerId>,
    /// Child layers, back to front.
    pub children: Vec<LayerId>,
    #[serde(default)]
    pub paint: PaintState,
    /// Outline as SVG commands in the parent's coordinate space.
    #[serde(default)]
    pub path: Option<String>,
    /// Scene tree of a converted layer.
    #[serde(default)]
    pub content: Option<Group>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub selected: bool,
}

impl Layer {
    fn new(name: &str, kind: LayerKind, frame: Rect, parent: Option<LayerId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            kind,
            frame,
            parent,
            children: Vec::new(),
            paint: PaintState::default(),
            path: None,
            content: None,
            hidden: false,
            selected: false,
        }
    }
}

/// A layer document held entirely in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryDocument {
    layers: HashMap<LayerId, Layer>,
    /// Top-level layers, back to front.
    roots: Vec<LayerId>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    fn attach(&mut self, layer: Layer) -> HostResult<LayerId> {
        let id = layer.id;
        match layer.parent {
            Some(parent_id) => {
                let parent = self
                    .layers
                    .get_mut(&parent_id)
                    .ok_or(HostError::LayerNotFound(parent_id))?;
                if parent.kind != LayerKind::Group {
                    return Err(HostError::NotAContainer(parent_id));
                }
                parent.children.push(id);
            }
            None => self.roots.push(id),
        }
        self.layers.insert(id, layer);
        Ok(id)
    }

    /// Add a shape layer with the given outline.
    pub fn add_shape(
        &mut self,
        parent: Option<LayerId>,
        name: &str,
        frame: Rect,
        path: &str,
        paint: PaintState,
    ) -> HostResult<LayerId> {
        let mut layer = Layer::new(name, LayerKind::Shape, frame, parent);
        layer.path = Some(path.to_string());
        layer.paint = paint;
        self.attach(layer)
    }

    /// Add a text layer, optionally with its glyph outline.
    pub fn add_text(
        &mut self,
        parent: Option<LayerId>,
        name: &str,
        frame: Rect,
        text_color: SerializableColor,
        outline: Option<&str>,
    ) -> HostResult<LayerId> {
        let mut layer = Layer::new(name, LayerKind::Text { text_color }, frame, parent);
        layer.path = outline.map(str::to_string);
        self.attach(layer)
    }

    pub fn add_group(
        &mut self,
        parent: Option<LayerId>,
        name: &str,
        frame: Rect,
    ) -> HostResult<LayerId> {
        self.attach(Layer::new(name, LayerKind::Group, frame, parent))
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Children of `parent` (or the top-level layers), back to front.
    pub fn children_of(&self, parent: Option<LayerId>) -> &[LayerId] {
        match parent {
            Some(id) => self
                .layers
                .get(&id)
                .map(|l| l.children.as_slice())
                .unwrap_or_default(),
            None => &self.roots,
        }
    }

    pub fn select(&mut self, id: LayerId) -> HostResult<()> {
        self.set_selected(id, true)
    }

    /// Selected layers in document order (depth-first, back to front).
    pub fn selected_layers(&self) -> Vec<LayerId> {
        let mut out = Vec::new();
        let mut stack: Vec<LayerId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(layer) = self.layers.get(&id) else {
                continue;
            };
            if layer.selected {
                out.push(id);
            }
            stack.extend(layer.children.iter().rev().copied());
        }
        out
    }

    /// Snapshot of the current selection for the adapter.
    pub fn context(&self) -> DocumentContext {
        DocumentContext::new(self.selected_layers())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    fn layer_mut(&mut self, id: LayerId) -> HostResult<&mut Layer> {
        self.layers.get_mut(&id).ok_or(HostError::LayerNotFound(id))
    }
}

impl SceneHost for MemoryDocument {
    fn layer(&self, id: LayerId) -> Option<LayerInfo> {
        self.layers.get(&id).map(|l| LayerInfo {
            id: l.id,
            name: l.name.clone(),
            kind: l.kind,
            frame: l.frame,
            parent: l.parent,
            children: l.children.clone(),
            paint: l.paint,
        })
    }

    fn layer_path(&self, id: LayerId) -> Option<String> {
        let layer = self.layers.get(&id)?;
        match layer.kind {
            LayerKind::Shape | LayerKind::Text { .. } => layer.path.clone(),
            LayerKind::Group | LayerKind::Rough => None,
        }
    }

    fn insert_group(
        &mut self,
        parent: Option<LayerId>,
        name: &str,
        group: Group,
    ) -> HostResult<LayerId> {
        let mut layer = Layer::new(name, LayerKind::Rough, group.frame, parent);
        layer.content = Some(group);
        self.attach(layer)
    }

    fn remove_layer(&mut self, id: LayerId) -> HostResult<()> {
        let layer = self.layers.remove(&id).ok_or(HostError::LayerNotFound(id))?;
        let siblings = match layer.parent.and_then(|p| self.layers.get_mut(&p)) {
            Some(parent) => &mut parent.children,
            None => &mut self.roots,
        };
        siblings.retain(|&child| child != id);

        let mut stack = layer.children;
        while let Some(child) = stack.pop() {
            if let Some(removed) = self.layers.remove(&child) {
                stack.extend(removed.children);
            }
        }
        Ok(())
    }

    fn set_hidden(&mut self, id: LayerId, hidden: bool) -> HostResult<()> {
        self.layer_mut(id)?.hidden = hidden;
        Ok(())
    }

    fn set_selected(&mut self, id: LayerId, selected: bool) -> HostResult<()> {
        self.layer_mut(id)?.selected = selected;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{ConversionSummary, ConvertError, convert_selection};
    use roughsketch_core::generator::{
        DrawingGenerator, GeneratorError, GeneratorResult, Primitive,
    };
    use roughsketch_core::style::Border;
    use roughsketch_core::{Drawable, OperationKind, OperationSet, SketchConfig, StyleOptions};

    /// Emits the source outline as a fill and a stroke, recording every call.
    #[derive(Default)]
    struct TracingGenerator {
        seen: Vec<(String, StyleOptions)>,
    }

    impl DrawingGenerator for TracingGenerator {
        fn generate(
            &mut self,
            primitive: &Primitive,
            options: &StyleOptions,
        ) -> GeneratorResult<Drawable> {
            let Primitive::Path(d) = primitive else {
                return Err(GeneratorError::Unsupported(primitive.name()));
            };
            self.seen.push((d.clone(), *options));
            Ok(Drawable::new(
                vec![
                    OperationSet::from_path(OperationKind::PrecomputedFillPath, d.clone()),
                    OperationSet::from_path(OperationKind::StrokePath, d.clone()),
                ],
                *options,
            ))
        }
    }

    /// Document whose selection changes fail for one layer.
    struct StubbornDocument {
        doc: MemoryDocument,
        locked: Option<LayerId>,
    }

    impl SceneHost for StubbornDocument {
        fn layer(&self, id: LayerId) -> Option<LayerInfo> {
            self.doc.layer(id)
        }

        fn layer_path(&self, id: LayerId) -> Option<String> {
            self.doc.layer_path(id)
        }

        fn insert_group(
            &mut self,
            parent: Option<LayerId>,
            name: &str,
            group: Group,
        ) -> HostResult<LayerId> {
            let id = self.doc.insert_group(parent, name, group)?;
            self.locked = Some(id);
            Ok(id)
        }

        fn remove_layer(&mut self, id: LayerId) -> HostResult<()> {
            self.doc.remove_layer(id)
        }

        fn set_hidden(&mut self, id: LayerId, hidden: bool) -> HostResult<()> {
            self.doc.set_hidden(id, hidden)
        }

        fn set_selected(&mut self, id: LayerId, selected: bool) -> HostResult<()> {
            if self.locked == Some(id) {
                return Err(HostError::LayerNotFound(id));
            }
            self.doc.set_selected(id, selected)
        }
    }

    fn square(x: f64, y: f64, size: f64) -> String {
        format!(
            "M{x} {y} L{} {y} L{} {} L{x} {} Z",
            x + size,
            x + size,
            y + size,
            y + size
        )
    }

    fn hex(s: &str) -> SerializableColor {
        SerializableColor::from_hex(s).unwrap()
    }

    /// Unstyled square shape whose frame matches its outline.
    fn add_square(
        doc: &mut MemoryDocument,
        parent: Option<LayerId>,
        name: &str,
        x: f64,
        y: f64,
        size: f64,
    ) -> LayerId {
        doc.add_shape(
            parent,
            name,
            Rect::new(x, y, x + size, y + size),
            &square(x, y, size),
            PaintState::default(),
        )
        .unwrap()
    }

    fn convert(doc: &mut MemoryDocument, generator: &mut TracingGenerator) -> ConversionSummary {
        let ctx = doc.context();
        convert_selection(doc, &ctx, generator, &SketchConfig::default())
    }

    #[test]
    fn test_convert_single_shape() {
        let mut doc = MemoryDocument::new();
        let board = doc
            .add_group(None, "Board", Rect::new(0.0, 0.0, 400.0, 300.0))
            .unwrap();
        let shape = doc
            .add_shape(
                Some(board),
                "Box",
                Rect::new(10.0, 10.0, 60.0, 60.0),
                &square(10.0, 10.0, 50.0),
                PaintState::new(Some(hex("#336699")), None),
            )
            .unwrap();
        doc.select(shape).unwrap();

        let mut generator = TracingGenerator::default();
        let summary = convert(&mut doc, &mut generator);

        assert_eq!(summary.converted.len(), 1);
        assert!(summary.skipped.is_empty() && summary.failed.is_empty());

        let result = summary.converted[0].result;
        let rough = doc.get(result).unwrap();
        assert_eq!(rough.name, "Rough Box");
        assert_eq!(rough.kind, LayerKind::Rough);
        assert_eq!(rough.parent, Some(board));
        assert_eq!(rough.frame, Rect::new(10.0, 10.0, 60.0, 60.0));
        assert!(rough.selected);
        assert_eq!(rough.content.as_ref().unwrap().children().len(), 2);

        let original = doc.get(shape).unwrap();
        assert!(original.hidden);
        assert!(!original.selected);
        assert_eq!(doc.children_of(Some(board)), &[shape, result]);

        let (_, options) = &generator.seen[0];
        assert_eq!(options.fill, Some(hex("#336699")));
        assert_eq!(options.stroke, Some(SerializableColor::transparent()));
    }

    #[test]
    fn test_group_selection_recurses_pre_order() {
        let mut doc = MemoryDocument::new();
        let outer = doc
            .add_group(None, "Outer", Rect::new(0.0, 0.0, 200.0, 200.0))
            .unwrap();
        let first = add_square(&mut doc, Some(outer), "First", 0.0, 0.0, 10.0);
        let inner = doc
            .add_group(Some(outer), "Inner", Rect::new(50.0, 50.0, 150.0, 150.0))
            .unwrap();
        let second = add_square(&mut doc, Some(inner), "Second", 5.0, 5.0, 20.0);
        let label = doc
            .add_text(
                Some(inner),
                "Label",
                Rect::new(0.0, 0.0, 40.0, 12.0),
                hex("#222222"),
                None,
            )
            .unwrap();
        doc.select(outer).unwrap();

        let mut generator = TracingGenerator::default();
        let summary = convert(&mut doc, &mut generator);

        let sources: Vec<LayerId> = summary.converted.iter().map(|c| c.source).collect();
        assert_eq!(sources, vec![first, second]);
        assert_eq!(summary.skipped, vec![label]);
        assert_eq!(generator.seen[0].0, square(0.0, 0.0, 10.0));

        // Converted output lands beside each leaf, inside its own container.
        let second_result = summary.converted[1].result;
        assert_eq!(doc.get(second_result).unwrap().parent, Some(inner));
    }

    #[test]
    fn test_text_with_outline_uses_text_color() {
        let mut doc = MemoryDocument::new();
        let text = doc
            .add_text(
                None,
                "Title",
                Rect::new(0.0, 0.0, 30.0, 10.0),
                hex("#aa0000"),
                Some(&square(0.0, 0.0, 10.0)),
            )
            .unwrap();
        doc.select(text).unwrap();

        let mut generator = TracingGenerator::default();
        let summary = convert(&mut doc, &mut generator);

        assert_eq!(summary.converted.len(), 1);
        assert_eq!(generator.seen[0].1.fill, Some(hex("#aa0000")));
        assert_eq!(doc.get(summary.converted[0].result).unwrap().parent, None);
    }

    #[test]
    fn test_bordered_shape_is_not_filled() {
        let mut doc = MemoryDocument::new();
        let border = Border {
            color: hex("#FF0000"),
            thickness: 2.0,
        };
        let shape = doc
            .add_shape(
                None,
                "Outline",
                Rect::new(0.0, 0.0, 10.0, 10.0),
                &square(0.0, 0.0, 10.0),
                PaintState::new(None, Some(border)),
            )
            .unwrap();
        doc.select(shape).unwrap();

        let mut generator = TracingGenerator::default();
        convert(&mut doc, &mut generator);

        let (_, options) = &generator.seen[0];
        assert_eq!(options.fill, None);
        assert_eq!(options.stroke, Some(hex("#FF0000")));
        assert_eq!(options.stroke_width, 2.0);
    }

    #[test]
    fn test_malformed_leaf_does_not_abort_selection() {
        let mut doc = MemoryDocument::new();
        let broken = doc
            .add_shape(
                None,
                "Broken",
                Rect::new(0.0, 0.0, 10.0, 10.0),
                "M0 0 A1 1 0 0 0 5 5",
                PaintState::default(),
            )
            .unwrap();
        let fine = add_square(&mut doc, None, "Fine", 0.0, 0.0, 10.0);
        doc.select(broken).unwrap();
        doc.select(fine).unwrap();

        let mut generator = TracingGenerator::default();
        let summary = convert(&mut doc, &mut generator);

        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, broken);
        assert!(matches!(summary.failed[0].1, ConvertError::Composite(_)));
        assert_eq!(summary.converted.len(), 1);
        assert_eq!(summary.converted[0].source, fine);

        // The failed layer is untouched.
        let broken_layer = doc.get(broken).unwrap();
        assert!(!broken_layer.hidden);
        assert!(broken_layer.selected);
        assert_eq!(doc.len(), 3);
    }

    #[test]
    fn test_failed_post_step_rolls_back() {
        let mut doc = MemoryDocument::new();
        let board = doc
            .add_group(None, "Board", Rect::new(0.0, 0.0, 100.0, 100.0))
            .unwrap();
        let shape = add_square(&mut doc, Some(board), "Box", 0.0, 0.0, 10.0);
        doc.select(shape).unwrap();

        let ctx = doc.context();
        let mut host = StubbornDocument { doc, locked: None };
        let mut generator = TracingGenerator::default();
        let summary = convert_selection(&mut host, &ctx, &mut generator, &SketchConfig::default());

        assert!(summary.converted.is_empty());
        assert_eq!(summary.failed.len(), 1);
        assert!(matches!(summary.failed[0].1, ConvertError::Host(_)));

        let doc = host.doc;
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.children_of(Some(board)), &[shape]);
        assert!(!doc.get(shape).unwrap().hidden);
    }

    #[test]
    fn test_remove_layer_drops_subtree() {
        let mut doc = MemoryDocument::new();
        let outer = doc
            .add_group(None, "Outer", Rect::new(0.0, 0.0, 50.0, 50.0))
            .unwrap();
        let inner = doc
            .add_group(Some(outer), "Inner", Rect::new(0.0, 0.0, 20.0, 20.0))
            .unwrap();
        add_square(&mut doc, Some(inner), "Leaf", 0.0, 0.0, 5.0);
        let kept = add_square(&mut doc, None, "Kept", 0.0, 0.0, 5.0);

        doc.remove_layer(outer).unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.children_of(None), &[kept]);
        assert_eq!(doc.remove_layer(outer), Err(HostError::LayerNotFound(outer)));
    }

    #[test]
    fn test_empty_selection_is_noop() {
        let mut doc = MemoryDocument::new();
        add_square(&mut doc, None, "Idle", 0.0, 0.0, 10.0);

        let mut generator = TracingGenerator::default();
        let summary = convert(&mut doc, &mut generator);

        assert!(summary.is_empty());
        assert!(generator.seen.is_empty());
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_rough_layers_are_skipped() {
        let mut doc = MemoryDocument::new();
        let shape = add_square(&mut doc, None, "Box", 0.0, 0.0, 10.0);
        doc.select(shape).unwrap();

        let mut generator = TracingGenerator::default();
        let first = convert(&mut doc, &mut generator);
        let rough = first.converted[0].result;

        let second = convert(&mut doc, &mut generator);
        assert_eq!(second.skipped, vec![rough]);
        assert!(second.converted.is_empty());
    }

    #[test]
    fn test_config_controls_post_steps() {
        let mut doc = MemoryDocument::new();
        let shape = add_square(&mut doc, None, "Box", 0.0, 0.0, 10.0);
        doc.select(shape).unwrap();

        let config = SketchConfig {
            name_prefix: "Sketchy ".to_string(),
            hide_original: false,
            select_result: false,
            ..SketchConfig::default()
        };
        let mut generator = TracingGenerator::default();
        let ctx = doc.context();
        let summary = convert_selection(&mut doc, &ctx, &mut generator, &config);

        let rough = doc.get(summary.converted[0].result).unwrap();
        assert_eq!(rough.name, "Sketchy Box");
        assert!(!rough.selected);
        assert!(!doc.get(shape).unwrap().hidden);
        assert!(!doc.get(shape).unwrap().selected);
    }

    #[test]
    fn test_unknown_layer_is_reported() {
        let mut doc = MemoryDocument::new();
        let ghost = Uuid::new_v4();
        let mut generator = TracingGenerator::default();
        let summary = convert_selection(
            &mut doc,
            &DocumentContext::new(vec![ghost]),
            &mut generator,
            &SketchConfig::default(),
        );
        assert!(matches!(
            summary.failed[0].1,
            ConvertError::Host(HostError::LayerNotFound(id)) if id == ghost
        ));
    }

    #[test]
    fn test_active_container_receives_root_output() {
        let mut doc = MemoryDocument::new();
        let page = doc
            .add_group(None, "Page", Rect::new(100.0, 50.0, 300.0, 250.0))
            .unwrap();
        let shape = add_square(&mut doc, None, "Loose", 110.0, 60.0, 10.0);

        let ctx = DocumentContext {
            selection: vec![shape],
            active_container: Some(page),
        };
        let mut generator = TracingGenerator::default();
        let summary = convert_selection(&mut doc, &ctx, &mut generator, &SketchConfig::default());

        let rough = doc.get(summary.converted[0].result).unwrap();
        assert_eq!(rough.parent, Some(page));
        // Document position is unchanged once expressed in the page's space.
        assert_eq!(rough.frame, Rect::new(10.0, 10.0, 20.0, 20.0));
    }

    #[test]
    fn test_insert_into_non_container_fails() {
        let mut doc = MemoryDocument::new();
        let shape = add_square(&mut doc, None, "Box", 0.0, 0.0, 10.0);
        let err = doc.add_group(Some(shape), "Nested", Rect::ZERO).unwrap_err();
        assert_eq!(err, HostError::NotAContainer(shape));
    }

    #[test]
    fn test_document_json_round_trip() {
        let mut doc = MemoryDocument::new();
        let shape = add_square(&mut doc, None, "Box", 0.0, 0.0, 10.0);
        doc.select(shape).unwrap();
        let mut generator = TracingGenerator::default();
        convert(&mut doc, &mut generator);

        let restored = MemoryDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(restored.len(), doc.len());
        assert_eq!(restored.selected_layers(), doc.selected_layers());
    }
}
