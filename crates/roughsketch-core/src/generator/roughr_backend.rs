//! Generator backed by the `roughr` crate.

use super::{DrawingGenerator, GeneratorError, GeneratorResult, Primitive};
use crate::color::SerializableColor;
use crate::drawable::{Drawable, DrawingOperation, OperationKind, OperationSet, StyleOptions};
use kurbo::Point;
use log::debug;
use palette::Srgba;
use roughr::Point2D;
use roughr::core::{OpSetType, OpType, Options, OptionsBuilder};
use roughr::generator::Generator;

/// Rough.js-style generator.
pub struct RoughrGenerator {
    generator: Generator,
    roughness: f32,
    seed: Option<u64>,
}

impl Default for RoughrGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl RoughrGenerator {
    pub fn new() -> Self {
        Self {
            generator: Generator::default(),
            roughness: 1.0,
            seed: None,
        }
    }

    /// Set the roughness (0 = clean lines).
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    /// Fix the random seed so output is reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn options(&self, style: &StyleOptions) -> GeneratorResult<Options> {
        let mut builder = OptionsBuilder::default();
        builder
            .roughness(self.roughness)
            .stroke_width(style.stroke_width as f32)
            .fill_weight(style.fill_weight as f32);
        if let Some(seed) = self.seed {
            builder.seed(seed);
        }
        if let Some(stroke) = style.stroke {
            builder.stroke(to_srgba(stroke));
        }
        if let Some(fill) = style.fill {
            builder.fill(to_srgba(fill));
        }
        builder.build().map_err(|e| GeneratorError::Failed(e.to_string()))
    }
}

fn to_srgba(color: SerializableColor) -> Srgba {
    Srgba::new(
        color.r as f32 / 255.0,
        color.g as f32 / 255.0,
        color.b as f32 / 255.0,
        color.a as f32 / 255.0,
    )
}

/// Points in roughr's coordinate type; the unit is fixed by the caller.
fn to_points<U>(points: &[Point]) -> Vec<Point2D<f64, U>> {
    points.iter().map(|p| Point2D::new(p.x, p.y)).collect()
}

impl DrawingGenerator for RoughrGenerator {
    fn generate(
        &mut self,
        primitive: &Primitive,
        style: &StyleOptions,
    ) -> GeneratorResult<Drawable> {
        let options = Some(self.options(style)?);
        let generator = &self.generator;

        let drawable = match primitive {
            Primitive::Line { from, to } => {
                generator.line::<f64>(from.x, from.y, to.x, to.y, &options)
            }
            Primitive::Rectangle(r) => {
                generator.rectangle::<f64>(r.x0, r.y0, r.width(), r.height(), &options)
            }
            Primitive::Ellipse { center, size } => {
                generator.ellipse::<f64>(center.x, center.y, size.width, size.height, &options)
            }
            Primitive::Circle { center, diameter } => {
                generator.circle::<f64>(center.x, center.y, *diameter, &options)
            }
            Primitive::LinearPath(points) => {
                generator.linear_path(&to_points(points), false, &options)
            }
            Primitive::Polygon(points) => generator.polygon(&to_points(points), &options),
            Primitive::Arc {
                center,
                size,
                start,
                stop,
                closed,
            } => generator.arc::<f64>(
                center.x,
                center.y,
                size.width,
                size.height,
                *start,
                *stop,
                *closed,
                &options,
            ),
            Primitive::Curve(points) => generator.curve(&to_points(points), &options),
            Primitive::Path(d) => generator.path::<f64>(d.clone(), &options),
        };

        debug!("Generated {} with {} operation sets", primitive.name(), drawable.sets.len());
        Ok(drawable_from_roughr(&drawable, *style))
    }
}

/// Convert a `roughr` drawable, attaching the options it was generated with.
pub fn drawable_from_roughr(
    drawable: &roughr::core::Drawable<f64>,
    options: StyleOptions,
) -> Drawable {
    let sets = drawable
        .sets
        .iter()
        .map(|set| {
            let kind = match set.op_set_type {
                OpSetType::Path => OperationKind::StrokePath,
                OpSetType::FillPath => OperationKind::FillPath,
                OpSetType::FillSketch => OperationKind::HatchFill,
            };
            let operations = set
                .ops
                .iter()
                .filter_map(|op| match (&op.op, op.data.as_slice()) {
                    (OpType::Move, [x, y, ..]) => {
                        Some(DrawingOperation::MoveTo(Point::new(*x, *y)))
                    }
                    (OpType::LineTo, [x, y, ..]) => {
                        Some(DrawingOperation::LineTo(Point::new(*x, *y)))
                    }
                    (OpType::BCurveTo, [x1, y1, x2, y2, x, y, ..]) => {
                        Some(DrawingOperation::BezierCurveTo {
                            c1: Point::new(*x1, *y1),
                            c2: Point::new(*x2, *y2),
                            end: Point::new(*x, *y),
                        })
                    }
                    _ => None,
                })
                .collect();
            OperationSet::from_operations(kind, operations)
        })
        .collect();

    Drawable::new(sets, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::composite;
    use kurbo::{Rect, Size};

    fn generate(primitive: Primitive) -> Drawable {
        RoughrGenerator::new()
            .with_seed(7)
            .generate(&primitive, &StyleOptions::default())
            .unwrap()
    }

    fn has_stroke(drawable: &Drawable) -> bool {
        drawable
            .operation_sets
            .iter()
            .any(|s| s.kind == OperationKind::StrokePath && !s.operations.is_empty())
    }

    #[test]
    fn test_rectangle_produces_stroke() {
        let drawable = generate(Primitive::Rectangle(Rect::new(10.0, 10.0, 110.0, 60.0)));
        assert!(has_stroke(&drawable));

        let root = composite(&drawable, Size::new(200.0, 200.0)).unwrap();
        assert!(!root.is_empty());
    }

    #[test]
    fn test_linear_path() {
        let drawable = generate(Primitive::LinearPath(vec![
            Point::new(0.0, 0.0),
            Point::new(50.0, 10.0),
            Point::new(80.0, 60.0),
        ]));
        assert!(has_stroke(&drawable));
    }

    #[test]
    fn test_polygon() {
        let drawable = generate(Primitive::Polygon(vec![
            Point::new(0.0, 0.0),
            Point::new(60.0, 0.0),
            Point::new(30.0, 50.0),
        ]));
        assert!(has_stroke(&drawable));
    }

    #[test]
    fn test_arc() {
        let drawable = generate(Primitive::Arc {
            center: Point::new(50.0, 50.0),
            size: Size::new(80.0, 40.0),
            start: 0.0,
            stop: std::f64::consts::PI,
            closed: false,
        });
        assert!(has_stroke(&drawable));
    }

    #[test]
    fn test_curve() {
        let drawable = generate(Primitive::Curve(vec![
            Point::new(10.0, 10.0),
            Point::new(40.0, 60.0),
            Point::new(90.0, 20.0),
            Point::new(120.0, 70.0),
        ]));
        assert!(has_stroke(&drawable));

        let root = composite(&drawable, Size::new(200.0, 200.0)).unwrap();
        assert!(!root.is_empty());
    }
}
