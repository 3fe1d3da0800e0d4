// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scaled axis-aligned boxes and partial overrides.

use kurbo::{Point, Rect, Size, Vec2};

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Tolerance used by [`BoundingBox::approx_eq`].
const APPROX_EPSILON: f64 = 1e-4;

bitflags::bitflags! {
    /// Sides on which one box reaches past an edge of another.
    ///
    /// Returned by [`BoundingBox::directionally_intersects`]; empty means no
    /// overlap in any direction.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Sides: u8 {
        /// The other box reaches below this box's top edge.
        const NORTH = 1 << 0;
        /// The other box reaches above this box's bottom edge.
        const SOUTH = 1 << 1;
        /// The other box reaches right of this box's left edge.
        const WEST = 1 << 2;
        /// The other box reaches left of this box's right edge.
        const EAST = 1 << 3;
    }
}

/// Per-edge slack for [`BoundingBox::intersects_with_margin`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Margin {
    /// Extra reach past the left edge.
    pub left: f64,
    /// Extra reach past the top edge.
    pub top: f64,
    /// Extra reach past the right edge.
    pub right: f64,
    /// Extra reach past the bottom edge.
    pub bottom: f64,
}

impl Margin {
    /// The same margin on every edge.
    pub const fn uniform(m: f64) -> Self {
        Self {
            left: m,
            top: m,
            right: m,
            bottom: m,
        }
    }
}

/// Axis-aligned box with nested-space zoom factors.
///
/// `inner_scale` is the box's own scale within its coordinate space and
/// `total_scale` the composite scale through all enclosing spaces. When only
/// one of the two is known at construction, the other defaults to it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Scale within the owning coordinate space.
    pub inner_scale: f64,
    /// Composite scale through every enclosing space.
    pub total_scale: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::ZERO
    }
}

impl BoundingBox {
    /// Zero-sized box at the origin with unit scales.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// A box with unit scales.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            inner_scale: 1.0,
            total_scale: 1.0,
        }
    }

    /// A box with explicit scales; a missing scale defaults to the other one, then to `1`.
    pub fn with_scales(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        inner_scale: Option<f64>,
        total_scale: Option<f64>,
    ) -> Self {
        Self {
            x,
            y,
            width,
            height,
            inner_scale: inner_scale.or(total_scale).unwrap_or(1.0),
            total_scale: total_scale.or(inner_scale).unwrap_or(1.0),
        }
    }

    /// Box covering `rect`, with unit scales.
    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(rect.x0, rect.y0, rect.width(), rect.height())
    }

    /// The edges as a [`Rect`].
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.right(), self.bottom())
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Width and height.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Top edge.
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Left edge.
    pub fn left(&self) -> f64 {
        self.x
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Width in the box's own (unscaled) units.
    pub fn inner_width(&self) -> f64 {
        self.width / self.inner_scale
    }

    /// Height in the box's own (unscaled) units.
    pub fn inner_height(&self) -> f64 {
        self.height / self.inner_scale
    }

    /// Center point.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether `p` lies inside or on the edge of this box.
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Whether `other` lies entirely inside this box (edges may touch).
    pub fn fully_contains(&self, other: &Self) -> bool {
        other.top() >= self.top()
            && other.bottom() <= self.bottom()
            && other.right() <= self.right()
            && other.left() >= self.left()
    }

    /// Strict overlap test: boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Self) -> bool {
        other.top() < self.bottom()
            && other.bottom() > self.top()
            && other.right() > self.left()
            && other.left() < self.right()
    }

    /// Overlap test with this box grown by `margin` on each edge.
    pub fn intersects_with_margin(&self, other: &Self, margin: Margin) -> bool {
        other.top() < self.bottom() + margin.bottom
            && other.bottom() > self.top() - margin.top
            && other.right() > self.left() - margin.left
            && other.left() < self.right() + margin.right
    }

    /// Which of this box's edges `other` reaches past.
    pub fn directionally_intersects(&self, other: &Self) -> Sides {
        let mut sides = Sides::empty();
        sides.set(Sides::NORTH, other.bottom() > self.top());
        sides.set(Sides::SOUTH, other.top() < self.bottom());
        sides.set(Sides::WEST, other.right() > self.left());
        sides.set(Sides::EAST, other.left() < self.right());
        sides
    }

    /// Multiply position and size by `factor`; scales are kept.
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
            width: self.width * factor,
            height: self.height * factor,
            ..*self
        }
    }

    /// Divide position and size by `factor`; scales are kept.
    pub fn unscale(&self, factor: f64) -> Self {
        Self {
            x: self.x / factor,
            y: self.y / factor,
            width: self.width / factor,
            height: self.height / factor,
            ..*self
        }
    }

    /// Shrink by `n` in total on each axis, keeping the center.
    pub fn shrink_centered(&self, n: f64) -> Self {
        self.shrink_xy(n, n)
    }

    /// Shrink by `dx` horizontally and `dy` vertically, keeping the center.
    pub fn shrink_xy(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx / 2.0,
            y: self.y + dy / 2.0,
            width: self.width - dx,
            height: self.height - dy,
            ..*self
        }
    }

    /// Move each edge inward by the matching margin.
    pub fn shrink_sides(&self, m: Margin) -> Self {
        Self {
            x: self.x + m.left,
            y: self.y + m.top,
            width: self.width - (m.left + m.right),
            height: self.height - (m.top + m.bottom),
            ..*self
        }
    }

    /// Overlapping region, or `None` when the boxes do not overlap with positive area.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let x = other.x.max(self.x);
        let y = other.y.max(self.y);
        let right = other.right().min(self.right());
        let bottom = other.bottom().min(self.bottom());
        if x >= right || y >= bottom {
            return None;
        }
        Some(Self {
            x,
            y,
            width: right - x,
            height: bottom - y,
            ..*self
        })
    }

    /// Overlapping region without the emptiness check; may have negative size.
    pub fn intersection(&self, other: &Self) -> Self {
        let x = other.x.max(self.x);
        let y = other.y.max(self.y);
        Self {
            x,
            y,
            width: other.right().min(self.right()) - x,
            height: other.bottom().min(self.bottom()) - y,
            ..*self
        }
    }

    /// Smallest box covering both; scales come from `self`.
    pub fn union(&self, other: &Self) -> Self {
        let x = other.x.min(self.x);
        let y = other.y.min(self.y);
        Self {
            x,
            y,
            width: other.right().max(self.right()) - x,
            height: other.bottom().max(self.bottom()) - y,
            ..*self
        }
    }

    /// Express this box relative to `origin`'s top-left corner.
    pub fn relative_to(&self, origin: &Self) -> Self {
        Self {
            x: self.x - origin.x,
            y: self.y - origin.y,
            ..*self
        }
    }

    /// Translate by `delta`.
    pub fn shift(&self, delta: Vec2) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
            ..*self
        }
    }

    /// Same size and scales at a new top-left corner.
    pub fn with_origin(&self, origin: Point) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            ..*self
        }
    }

    /// Re-place the box at an authoritative position and size, keeping scales.
    pub fn transform(&self, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..*self
        }
    }

    /// Apply a partial override, interpolated by the override's `blend`.
    ///
    /// Unset override fields leave the base value untouched. `blend = 1` takes the
    /// override outright and `blend = 0` ignores it.
    pub fn compose(&self, patch: &OverrideBoundingBox) -> Self {
        let t = patch.blend;
        Self {
            x: lerp(self.x, patch.x.unwrap_or(self.x), t),
            y: lerp(self.y, patch.y.unwrap_or(self.y), t),
            width: lerp(self.width, patch.width.unwrap_or(self.width), t),
            height: lerp(self.height, patch.height.unwrap_or(self.height), t),
            inner_scale: lerp(
                self.inner_scale,
                patch.inner_scale.unwrap_or(self.inner_scale),
                t,
            ),
            total_scale: lerp(
                self.total_scale,
                patch.total_scale.unwrap_or(self.total_scale),
                t,
            ),
        }
    }

    /// Replace the position only.
    pub fn compose_position(&self, position: Point) -> Self {
        self.with_origin(position)
    }

    /// Bitwise equality of every field.
    pub fn exactly_equals(&self, other: &Self) -> bool {
        self.x == other.x
            && self.y == other.y
            && self.width == other.width
            && self.height == other.height
            && self.inner_scale == other.inner_scale
            && self.total_scale == other.total_scale
    }

    /// Every field within `1e-4` of the other's.
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.approx_eq_within(other, APPROX_EPSILON)
    }

    /// Every field within `epsilon` of the other's.
    pub fn approx_eq_within(&self, other: &Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.width - other.width).abs() < epsilon
            && (self.height - other.height).abs() < epsilon
            && (self.inner_scale - other.inner_scale).abs() < epsilon
            && (self.total_scale - other.total_scale).abs() < epsilon
    }
}

/// Partial patch for a [`BoundingBox`].
///
/// Every geometric field is optional; `blend` controls how strongly the set
/// fields pull the base box toward them when composed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OverrideBoundingBox {
    /// Replacement left edge.
    pub x: Option<f64>,
    /// Replacement top edge.
    pub y: Option<f64>,
    /// Replacement width.
    pub width: Option<f64>,
    /// Replacement height.
    pub height: Option<f64>,
    /// Replacement inner scale.
    pub inner_scale: Option<f64>,
    /// Replacement total scale.
    pub total_scale: Option<f64>,
    /// Interpolation factor in `[0, 1]`.
    pub blend: f64,
}

impl Default for OverrideBoundingBox {
    fn default() -> Self {
        Self {
            x: None,
            y: None,
            width: None,
            height: None,
            inner_scale: None,
            total_scale: None,
            blend: 1.0,
        }
    }
}

impl OverrideBoundingBox {
    /// Override the position only.
    pub fn position(p: Point) -> Self {
        Self {
            x: Some(p.x),
            y: Some(p.y),
            ..Self::default()
        }
    }

    /// Override position and size.
    pub fn rect(rect: Rect) -> Self {
        Self {
            x: Some(rect.x0),
            y: Some(rect.y0),
            width: Some(rect.width()),
            height: Some(rect.height()),
            ..Self::default()
        }
    }

    /// Same patch with a different blend factor.
    pub fn with_blend(self, blend: f64) -> Self {
        Self { blend, ..self }
    }

    /// The fully specified edges, if position and size are all set.
    pub fn edges(&self) -> Option<Rect> {
        let (x, y) = (self.x?, self.y?);
        Some(Rect::new(x, y, x + self.width?, y + self.height?))
    }

    /// Strict containment: every edge lies strictly inside `other`.
    ///
    /// `false` when any edge is unset.
    pub fn is_contained_by(&self, other: &BoundingBox) -> bool {
        self.edges().is_some_and(|r| {
            other.top() < r.y0 && other.bottom() > r.y1 && other.right() > r.x1 && other.left() < r.x0
        })
    }

    /// See [`BoundingBox::directionally_intersects`]; empty when either side is incomplete.
    pub fn directionally_intersects(&self, other: &Self) -> Sides {
        let (Some(me), Some(o)) = (self.edges(), other.edges()) else {
            return Sides::empty();
        };
        let mut sides = Sides::empty();
        sides.set(Sides::NORTH, o.y1 > me.y0);
        sides.set(Sides::SOUTH, o.y0 < me.y1);
        sides.set(Sides::WEST, o.x1 > me.x0);
        sides.set(Sides::EAST, o.x0 < me.x1);
        sides
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_default_to_each_other() {
        let b = BoundingBox::with_scales(0.0, 0.0, 1.0, 1.0, Some(2.0), None);
        assert_eq!(b.total_scale, 2.0, "total falls back to inner");
        let b = BoundingBox::with_scales(0.0, 0.0, 1.0, 1.0, None, Some(3.0));
        assert_eq!(b.inner_scale, 3.0, "inner falls back to total");
        let b = BoundingBox::with_scales(0.0, 0.0, 1.0, 1.0, None, None);
        assert_eq!((b.inner_scale, b.total_scale), (1.0, 1.0), "both default to one");
    }

    #[test]
    fn edge_touching_boxes_do_not_intersect() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b), "shared edge is not overlap");
        assert!(a.intersect(&b).is_none(), "no positive-area intersection");
        assert!(
            a.intersects_with_margin(&b, Margin { right: 1.0, ..Margin::default() }),
            "right margin reaches the neighbor"
        );
    }

    #[test]
    fn containment_and_union() {
        let outer = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let inner = BoundingBox::new(10.0, 10.0, 20.0, 20.0);
        assert!(outer.fully_contains(&inner), "outer contains inner");
        assert!(!inner.fully_contains(&outer), "inner does not contain outer");
        assert!(outer.fully_contains(&outer), "containment is reflexive");
        let far = BoundingBox::new(200.0, 50.0, 10.0, 10.0);
        assert_eq!(
            outer.union(&far).to_rect(),
            Rect::new(0.0, 0.0, 210.0, 100.0),
            "union spans both"
        );
        assert_eq!(
            outer.intersect(&inner).map(|b| b.to_rect()),
            Some(inner.to_rect()),
            "intersection with a contained box is that box"
        );
    }

    #[test]
    fn compose_blends_only_set_fields() {
        let base = BoundingBox::with_scales(0.0, 0.0, 100.0, 50.0, Some(2.0), Some(4.0));
        let patch = OverrideBoundingBox {
            x: Some(100.0),
            width: Some(200.0),
            ..OverrideBoundingBox::default()
        };
        let full = base.compose(&patch);
        assert_eq!((full.x, full.width), (100.0, 200.0), "blend 1 takes the patch");
        assert_eq!((full.y, full.height), (0.0, 50.0), "unset fields are kept");
        assert_eq!((full.inner_scale, full.total_scale), (2.0, 4.0), "scales kept");

        let half = base.compose(&patch.with_blend(0.5));
        assert_eq!((half.x, half.width), (50.0, 150.0), "blend 0.5 is the midpoint");
        assert!(base.compose(&patch.with_blend(0.0)).exactly_equals(&base), "blend 0 is identity");
    }

    #[test]
    fn transform_keeps_scales() {
        let base = BoundingBox::with_scales(1.0, 2.0, 3.0, 4.0, Some(0.5), Some(0.25));
        let moved = base.transform(10.0, 20.0, 30.0, 40.0);
        assert_eq!(moved.to_rect(), Rect::new(10.0, 20.0, 40.0, 60.0), "new placement");
        assert_eq!((moved.inner_scale, moved.total_scale), (0.5, 0.25), "scales kept");
        assert_eq!(moved.inner_width(), 60.0, "inner width divides by inner scale");
    }

    #[test]
    fn directional_intersection_reports_sides() {
        let me = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let right_of = BoundingBox::new(20.0, 0.0, 10.0, 10.0);
        let sides = me.directionally_intersects(&right_of);
        assert!(sides.contains(Sides::WEST), "reaches past the left edge");
        assert!(!sides.contains(Sides::EAST), "starts beyond the right edge");
        assert!(
            sides.contains(Sides::NORTH | Sides::SOUTH),
            "vertically aligned boxes overlap both horizontal edges"
        );
    }

    #[test]
    fn override_containment_requires_complete_edges() {
        let outer = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let partial = OverrideBoundingBox::position(Point::new(10.0, 10.0));
        assert!(!partial.is_contained_by(&outer), "size unknown");
        let full = OverrideBoundingBox::rect(Rect::new(10.0, 10.0, 20.0, 20.0));
        assert!(full.is_contained_by(&outer), "strictly inside");
        let touching = OverrideBoundingBox::rect(Rect::new(0.0, 10.0, 20.0, 20.0));
        assert!(!touching.is_contained_by(&outer), "touching edge is not strict containment");
    }

    #[test]
    fn approx_equality() {
        let a = BoundingBox::new(1.0, 1.0, 1.0, 1.0);
        let b = a.shift(Vec2::new(0.00001, 0.0));
        assert!(a.approx_eq(&b), "within tolerance");
        assert!(!a.exactly_equals(&b), "but not exactly equal");
        assert!(!a.approx_eq(&a.shift(Vec2::new(0.01, 0.0))), "outside tolerance");
    }
}
