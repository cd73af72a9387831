//! Rendering the simulation.
//!
//! Nothing in here affects the matching. Pieces, trees, matchings and whole
//! states know how to describe themselves as disks and edges on a
//! [`Surface`]; what the surface does with them is up to the surface.

use kurbo::Point;

/// Which part of the forest a disk belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Layer {
    /// A growing piece, in an outer layer of some tree.
    Outer,
    /// A shrinking piece, in an inner layer of some tree.
    Inner,
    /// A frozen piece, at one end of a matching.
    Matched,
}

/// The different kinds of lines between pieces.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EdgeKind {
    /// A tree edge, from parent to child.
    Tree {
        /// Is the parent in an outer layer? Edges from inner parents are
        /// matched edges within the tree.
        outer_parent: bool,
    },
    /// The edge between the two ends of a finalized matching.
    Matched,
}

/// Something we can draw on.
pub trait Surface {
    /// Draws a disk.
    ///
    /// `depth` is the number of blossoms that the disk is nested inside. The
    /// radius can be zero or negative.
    fn disk(&mut self, center: Point, radius: f64, layer: Layer, depth: usize);

    /// Draws a line between two pieces.
    fn edge(&mut self, from: Point, to: Point, kind: EdgeKind);
}

#[cfg(feature = "debug-svg")]
pub use svg_surface::SvgSurface;

#[cfg(feature = "debug-svg")]
mod svg_surface {
    use kurbo::{Point, Rect};
    use svg::{
        node::element::{Circle, Line},
        Document,
    };

    use super::{EdgeKind, Layer, Surface};

    /// A [`Surface`] that builds an svg document.
    pub struct SvgSurface {
        document: Document,
        stroke_width: f64,
    }

    impl SvgSurface {
        /// Creates an empty document showing `view_box`.
        pub fn new(view_box: Rect, stroke_width: f64) -> Self {
            let document = Document::new().set(
                "viewBox",
                (view_box.x0, view_box.y0, view_box.width(), view_box.height()),
            );
            SvgSurface {
                document,
                stroke_width,
            }
        }

        /// The document so far.
        pub fn document(&self) -> &Document {
            &self.document
        }

        /// Finishes drawing, and returns the document.
        pub fn into_document(self) -> Document {
            self.document
        }

        fn take(&mut self) -> Document {
            std::mem::replace(&mut self.document, Document::new())
        }
    }

    fn fill(layer: Layer, depth: usize) -> String {
        let hue = match layer {
            Layer::Outer => 120,
            Layer::Inner => 0,
            Layer::Matched => 220,
        };
        let lightness = 75usize.saturating_sub(12 * depth).max(25);
        format!("hsl({hue}, 60%, {lightness}%)")
    }

    impl Surface for SvgSurface {
        fn disk(&mut self, center: Point, radius: f64, layer: Layer, depth: usize) {
            // Shrunken disks still get a dot, so that their points are visible.
            let (radius, fill) = if radius > 0.0 {
                (radius, fill(layer, depth))
            } else {
                (2.0 * self.stroke_width, "black".to_owned())
            };
            let circle = Circle::new()
                .set("cx", center.x)
                .set("cy", center.y)
                .set("r", radius)
                .set("fill", fill)
                .set("fill-opacity", 0.6)
                .set("stroke", "black")
                .set("stroke-width", self.stroke_width);
            self.document = self.take().add(circle);
        }

        fn edge(&mut self, from: Point, to: Point, kind: EdgeKind) {
            let (color, dash) = match kind {
                EdgeKind::Tree { outer_parent: true } => ("gray", "4 2"),
                EdgeKind::Tree {
                    outer_parent: false,
                } => ("black", "none"),
                EdgeKind::Matched => ("blue", "none"),
            };
            let line = Line::new()
                .set("x1", from.x)
                .set("y1", from.y)
                .set("x2", to.x)
                .set("y2", to.y)
                .set("stroke", color)
                .set("stroke-dasharray", dash)
                .set("stroke-width", 2.0 * self.stroke_width)
                .set("stroke-linecap", "round");
            self.document = self.take().add(line);
        }
    }
}
