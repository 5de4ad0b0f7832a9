//! Path geometry adapter.
//!
//! Converts between the SVG path mini-language emitted by drawing generators
//! (`M/m`, `L/l`, `C/c`, `Z/z`) and [`kurbo::BezPath`], and computes the
//! control-point bounding boxes the scene model fits groups against.

use crate::drawable::DrawingOperation;
use kurbo::{BezPath, PathEl, Point, Rect, Vec2};
use thiserror::Error;

/// Malformed path geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    #[error("Unrecognized path command '{command}' at offset {offset}")]
    UnknownCommand { command: char, offset: usize },
    #[error("Path command '{command}' expects {expected} numbers, found {found}")]
    MissingArguments {
        command: char,
        expected: usize,
        found: usize,
    },
    #[error("Invalid number '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },
    #[error("Number at offset {offset} does not follow a command")]
    UnexpectedNumber { offset: usize },
    #[error("Drawing command '{0}' has no current point (missing moveto)")]
    MissingMoveTo(char),
    #[error("Operation {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },
}

/// Result type for path operations.
pub type PathResult<T> = Result<T, PathError>;

/// Summary of one subpath, used to compare geometry independent of encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Subpath {
    /// Point established by the moveto.
    pub start: Point,
    /// End point of every segment, in order.
    pub endpoints: Vec<Point>,
    /// Whether the subpath ends with a closepath.
    pub closed: bool,
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn skip_separators(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == ',' {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn at_number(&mut self) -> bool {
        self.skip_separators();
        matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.')
    }

    fn number(&mut self) -> PathResult<f64> {
        let start = self.pos;
        let bytes = self.src.as_bytes();
        let mut end = start;

        if end < bytes.len() && (bytes[end] == b'-' || bytes[end] == b'+') {
            end += 1;
        }
        let mut seen_dot = false;
        while end < bytes.len() {
            match bytes[end] {
                b'0'..=b'9' => end += 1,
                b'.' if !seen_dot => {
                    seen_dot = true;
                    end += 1;
                }
                _ => break,
            }
        }
        // Exponent, only when followed by digits so "1e" is rejected below.
        if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
            let mut exp = end + 1;
            if exp < bytes.len() && (bytes[exp] == b'-' || bytes[exp] == b'+') {
                exp += 1;
            }
            if exp < bytes.len() && bytes[exp].is_ascii_digit() {
                while exp < bytes.len() && bytes[exp].is_ascii_digit() {
                    exp += 1;
                }
                end = exp;
            }
        }

        let text = &self.src[start..end];
        let value = text.parse::<f64>().map_err(|_| PathError::InvalidNumber {
            text: text.to_string(),
            offset: start,
        })?;
        self.pos = end;
        Ok(value)
    }

    fn coords<const N: usize>(&mut self, command: char) -> PathResult<[f64; N]> {
        let mut out = [0.0; N];
        for (found, slot) in out.iter_mut().enumerate() {
            if !self.at_number() {
                return Err(PathError::MissingArguments {
                    command,
                    expected: N,
                    found,
                });
            }
            *slot = self.number()?;
        }
        Ok(out)
    }
}

/// Incremental builder tracking the current point and subpath start.
struct PathBuilder {
    path: BezPath,
    current: Option<Point>,
    start: Point,
    after_close: bool,
}

impl PathBuilder {
    fn new() -> Self {
        Self {
            path: BezPath::new(),
            current: None,
            start: Point::ZERO,
            after_close: false,
        }
    }

    fn base(&self, relative: bool) -> Vec2 {
        match (relative, self.current) {
            (true, Some(p)) => p.to_vec2(),
            _ => Vec2::ZERO,
        }
    }

    /// Current point for a drawing command, reopening a subpath after closepath.
    fn ensure_current(&mut self, command: char) -> PathResult<Point> {
        let current = self.current.ok_or(PathError::MissingMoveTo(command))?;
        if self.after_close {
            self.path.move_to(current);
            self.after_close = false;
        }
        Ok(current)
    }

    fn move_to(&mut self, p: Point) {
        self.path.move_to(p);
        self.current = Some(p);
        self.start = p;
        self.after_close = false;
    }

    fn line_to(&mut self, p: Point, command: char) -> PathResult<()> {
        self.ensure_current(command)?;
        self.path.line_to(p);
        self.current = Some(p);
        Ok(())
    }

    fn curve_to(&mut self, c1: Point, c2: Point, end: Point, command: char) -> PathResult<()> {
        self.ensure_current(command)?;
        self.path.curve_to(c1, c2, end);
        self.current = Some(end);
        Ok(())
    }

    fn close(&mut self, command: char) -> PathResult<()> {
        if self.current.is_none() {
            return Err(PathError::MissingMoveTo(command));
        }
        if !self.after_close {
            self.path.close_path();
        }
        self.current = Some(self.start);
        self.after_close = true;
        Ok(())
    }
}

/// Parse an SVG path command string into a [`BezPath`].
///
/// Numbers may be separated by whitespace or commas, and a command letter
/// may be followed by several argument groups (extra pairs after a moveto
/// are treated as linetos). Blank input yields an empty path.
pub fn parse_path(input: &str) -> PathResult<BezPath> {
    let mut lexer = Lexer::new(input);
    let mut builder = PathBuilder::new();
    // Command applied to argument groups that follow without a letter.
    let mut repeat: Option<char> = None;

    loop {
        lexer.skip_separators();
        let Some(c) = lexer.peek() else { break };
        let offset = lexer.pos;

        let command = if c.is_ascii_alphabetic() {
            lexer.pos += c.len_utf8();
            c
        } else if lexer.at_number() {
            repeat.ok_or(PathError::UnexpectedNumber { offset })?
        } else {
            return Err(PathError::UnknownCommand { command: c, offset });
        };

        let relative = command.is_ascii_lowercase();
        match command {
            'M' | 'm' => {
                let [x, y] = lexer.coords::<2>(command)?;
                let base = builder.base(relative);
                builder.move_to(Point::new(x, y) + base);
                repeat = Some(if relative { 'l' } else { 'L' });
            }
            'L' | 'l' => {
                let [x, y] = lexer.coords::<2>(command)?;
                let base = builder.base(relative);
                builder.line_to(Point::new(x, y) + base, command)?;
                repeat = Some(command);
            }
            'C' | 'c' => {
                let [x1, y1, x2, y2, x, y] = lexer.coords::<6>(command)?;
                let base = builder.base(relative);
                builder.curve_to(
                    Point::new(x1, y1) + base,
                    Point::new(x2, y2) + base,
                    Point::new(x, y) + base,
                    command,
                )?;
                repeat = Some(command);
            }
            'Z' | 'z' => {
                builder.close(command)?;
                repeat = None;
            }
            other => return Err(PathError::UnknownCommand { command: other, offset }),
        }
    }

    Ok(builder.path)
}

/// Serialize drawing operations into the command grammar [`parse_path`] reads.
///
/// Fails on NaN or infinite coordinates, which have no textual form.
pub fn serialize_ops(operations: &[DrawingOperation]) -> PathResult<String> {
    let mut out = String::new();
    for (index, op) in operations.iter().enumerate() {
        let finite = match op {
            DrawingOperation::MoveTo(p) | DrawingOperation::LineTo(p) => p.is_finite(),
            DrawingOperation::BezierCurveTo { c1, c2, end } => {
                c1.is_finite() && c2.is_finite() && end.is_finite()
            }
            DrawingOperation::ClosePath => true,
        };
        if !finite {
            return Err(PathError::NonFiniteCoordinate { index });
        }

        match op {
            DrawingOperation::MoveTo(p) => out.push_str(&format!("M{} {} ", p.x, p.y)),
            DrawingOperation::LineTo(p) => out.push_str(&format!("L{} {} ", p.x, p.y)),
            DrawingOperation::BezierCurveTo { c1, c2, end } => out.push_str(&format!(
                "C{} {}, {} {}, {} {} ",
                c1.x, c1.y, c2.x, c2.y, end.x, end.y
            )),
            DrawingOperation::ClosePath => out.push_str("Z "),
        }
    }
    Ok(out.trim_end().to_string())
}

/// Serialize a path back into command syntax.
///
/// Quadratic segments are raised to cubics since the grammar has no `Q`.
pub fn serialize_path(path: &BezPath) -> PathResult<String> {
    let mut ops = Vec::new();
    let mut current = Point::ZERO;
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                ops.push(DrawingOperation::MoveTo(p));
                current = p;
            }
            PathEl::LineTo(p) => {
                ops.push(DrawingOperation::LineTo(p));
                current = p;
            }
            PathEl::QuadTo(q, end) => {
                let c1 = current + (q - current) * 2.0 / 3.0;
                let c2 = end + (q - end) * 2.0 / 3.0;
                ops.push(DrawingOperation::BezierCurveTo { c1, c2, end });
                current = end;
            }
            PathEl::CurveTo(c1, c2, end) => {
                ops.push(DrawingOperation::BezierCurveTo { c1, c2, end });
                current = end;
            }
            PathEl::ClosePath => ops.push(DrawingOperation::ClosePath),
        }
    }
    serialize_ops(&ops)
}

/// Build a path directly from drawing operations.
pub fn ops_to_path(operations: &[DrawingOperation]) -> PathResult<BezPath> {
    let mut builder = PathBuilder::new();
    for op in operations {
        match *op {
            DrawingOperation::MoveTo(p) => builder.move_to(p),
            DrawingOperation::LineTo(p) => builder.line_to(p, 'L')?,
            DrawingOperation::BezierCurveTo { c1, c2, end } => {
                builder.curve_to(c1, c2, end, 'C')?
            }
            DrawingOperation::ClosePath => builder.close('Z')?,
        }
    }
    Ok(builder.path)
}

/// Axis-aligned box over every control and end point of the path.
///
/// Curve control points are included, so the box is conservative for
/// curves. An empty path yields [`Rect::ZERO`].
pub fn bounding_box(path: &BezPath) -> Rect {
    let mut points = path.elements().iter().flat_map(|el| match *el {
        PathEl::MoveTo(p) | PathEl::LineTo(p) => vec![p],
        PathEl::QuadTo(a, b) => vec![a, b],
        PathEl::CurveTo(a, b, c) => vec![a, b, c],
        PathEl::ClosePath => Vec::new(),
    });

    let Some(first) = points.next() else {
        return Rect::ZERO;
    };
    points.fold(Rect::from_points(first, first), |rect, p| rect.union_pt(p))
}

/// Split a path into per-subpath summaries.
pub fn subpaths(path: &BezPath) -> Vec<Subpath> {
    let mut out: Vec<Subpath> = Vec::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => out.push(Subpath {
                start: p,
                endpoints: Vec::new(),
                closed: false,
            }),
            PathEl::LineTo(p) | PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => {
                if let Some(sub) = out.last_mut() {
                    sub.endpoints.push(p);
                }
            }
            PathEl::ClosePath => {
                if let Some(sub) = out.last_mut() {
                    sub.closed = true;
                }
            }
        }
    }
    out
}
