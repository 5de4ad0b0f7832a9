//! Drawing generator boundary.
//!
//! A generator turns an ideal primitive into a rough [`Drawable`]; the
//! randomization lives entirely on the generator's side. [`Sketcher`] pairs
//! a generator with a target frame and composites every drawable it gets.

#[cfg(feature = "rough-generator")]
mod roughr_backend;

#[cfg(feature = "rough-generator")]
pub use roughr_backend::{RoughrGenerator, drawable_from_roughr};

use crate::compositor::{self, CompositeError};
use crate::drawable::{Drawable, StyleOptions};
use crate::scene::Group;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Generator errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeneratorError {
    #[error("Unsupported primitive: {0}")]
    Unsupported(&'static str),
    #[error("Generation failed: {0}")]
    Failed(String),
}

/// Result type for generator operations.
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// An ideal geometric primitive to be roughened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    Line { from: Point, to: Point },
    Rectangle(Rect),
    /// Ellipse given by center and full size.
    Ellipse { center: Point, size: Size },
    Circle { center: Point, diameter: f64 },
    /// Open polyline.
    LinearPath(Vec<Point>),
    /// Closed polyline.
    Polygon(Vec<Point>),
    /// Elliptical arc between two angles in radians.
    Arc {
        center: Point,
        size: Size,
        start: f64,
        stop: f64,
        closed: bool,
    },
    /// Smooth curve through the points.
    Curve(Vec<Point>),
    /// SVG path command string.
    Path(String),
}

impl Primitive {
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Line { .. } => "line",
            Primitive::Rectangle(_) => "rectangle",
            Primitive::Ellipse { .. } => "ellipse",
            Primitive::Circle { .. } => "circle",
            Primitive::LinearPath(_) => "linearPath",
            Primitive::Polygon(_) => "polygon",
            Primitive::Arc { .. } => "arc",
            Primitive::Curve(_) => "curve",
            Primitive::Path(_) => "path",
        }
    }
}

/// Produces rough drawables from primitives.
pub trait DrawingGenerator {
    fn generate(
        &mut self,
        primitive: &Primitive,
        options: &StyleOptions,
    ) -> GeneratorResult<Drawable>;
}

impl<G: DrawingGenerator + ?Sized> DrawingGenerator for &mut G {
    fn generate(
        &mut self,
        primitive: &Primitive,
        options: &StyleOptions,
    ) -> GeneratorResult<Drawable> {
        (**self).generate(primitive, options)
    }
}

/// Errors from generating and compositing one primitive.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SketchError {
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error(transparent)]
    Composite(#[from] CompositeError),
}

/// Result type for [`Sketcher`] operations.
pub type SketchResult<T> = Result<T, SketchError>;

/// Draws primitives into scene groups sized to a fixed frame.
pub struct Sketcher<G> {
    generator: G,
    frame: Size,
}

impl<G: DrawingGenerator> Sketcher<G> {
    pub fn new(generator: G, frame: Size) -> Self {
        Self { generator, frame }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn generator_mut(&mut self) -> &mut G {
        &mut self.generator
    }

    pub fn frame(&self) -> Size {
        self.frame
    }

    /// Generate `primitive` and composite the result.
    pub fn draw(&mut self, primitive: Primitive, options: &StyleOptions) -> SketchResult<Group> {
        let drawable = self.generator.generate(&primitive, options)?;
        Ok(compositor::composite(&drawable, self.frame)?)
    }

    pub fn line(&mut self, from: Point, to: Point, options: &StyleOptions) -> SketchResult<Group> {
        self.draw(Primitive::Line { from, to }, options)
    }

    pub fn rectangle(&mut self, rect: Rect, options: &StyleOptions) -> SketchResult<Group> {
        self.draw(Primitive::Rectangle(rect), options)
    }

    pub fn ellipse(
        &mut self,
        center: Point,
        size: Size,
        options: &StyleOptions,
    ) -> SketchResult<Group> {
        self.draw(Primitive::Ellipse { center, size }, options)
    }

    pub fn circle(
        &mut self,
        center: Point,
        diameter: f64,
        options: &StyleOptions,
    ) -> SketchResult<Group> {
        self.draw(Primitive::Circle { center, diameter }, options)
    }

    pub fn linear_path(
        &mut self,
        points: Vec<Point>,
        options: &StyleOptions,
    ) -> SketchResult<Group> {
        self.draw(Primitive::LinearPath(points), options)
    }

    pub fn polygon(&mut self, points: Vec<Point>, options: &StyleOptions) -> SketchResult<Group> {
        self.draw(Primitive::Polygon(points), options)
    }

    pub fn arc(
        &mut self,
        center: Point,
        size: Size,
        start: f64,
        stop: f64,
        closed: bool,
        options: &StyleOptions,
    ) -> SketchResult<Group> {
        self.draw(
            Primitive::Arc {
                center,
                size,
                start,
                stop,
                closed,
            },
            options,
        )
    }

    pub fn curve(&mut self, points: Vec<Point>, options: &StyleOptions) -> SketchResult<Group> {
        self.draw(Primitive::Curve(points), options)
    }

    pub fn path(&mut self, d: impl Into<String>, options: &StyleOptions) -> SketchResult<Group> {
        self.draw(Primitive::Path(d.into()), options)
    }
}

/// SVG command string for a polyline, closed when `close` is set.
pub fn polyline_path(points: &[Point], close: bool) -> String {
    let mut d = String::new();
    for (i, p) in points.iter().enumerate() {
        let command = if i == 0 { 'M' } else { 'L' };
        d.push_str(&format!("{command}{} {} ", p.x, p.y));
    }
    if close && !points.is_empty() {
        d.push('Z');
    }
    d.trim_end().to_string()
}
