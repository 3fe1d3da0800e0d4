// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nested coordinate spaces.
//!
//! Every space maps its logical plane into its parent's plane by
//! `parent = origin + (logical - viewport) * scale`. Chaining those maps from the
//! outermost space inward always yields a uniform scale plus an offset, so the
//! composite is stored in that form and inverted exactly.

use kurbo::{Affine, Point, Rect, Vec2};

use crate::BoundingBox;

/// One nested space, described in its parent's logical coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpaceFrame {
    /// Where the space's visible top-left sits in the parent plane.
    pub origin: Point,
    /// The logical point shown at the space's top-left (pan position).
    pub viewport: Point,
    /// Zoom of this space relative to its parent.
    pub scale: f64,
}

impl Default for SpaceFrame {
    fn default() -> Self {
        Self {
            origin: Point::ZERO,
            viewport: Point::ZERO,
            scale: 1.0,
        }
    }
}

impl SpaceFrame {
    /// A frame with the given placement, pan, and zoom.
    ///
    /// A zoom that is not finite and positive is replaced by `1`.
    pub fn new(origin: Point, viewport: Point, scale: f64) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            log::warn!("ignoring invalid space scale {scale}");
            1.0
        };
        Self {
            origin,
            viewport,
            scale,
        }
    }

    /// Map a point from this space's plane into the parent plane.
    pub fn to_parent(&self, p: Point) -> Point {
        self.origin + (p - self.viewport) * self.scale
    }

    /// Map a point from the parent plane into this space's plane.
    pub fn from_parent(&self, p: Point) -> Point {
        self.viewport + (p - self.origin) / self.scale
    }
}

/// Composite mapping from a (possibly deeply nested) space's plane to client coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpaceTransform {
    plane_scale: f64,
    offset: Vec2,
}

impl Default for SpaceTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl SpaceTransform {
    /// Client coordinates themselves.
    pub const IDENTITY: Self = Self {
        plane_scale: 1.0,
        offset: Vec2::ZERO,
    };

    /// Compose frames listed from the outermost space inward.
    pub fn from_frames(frames: impl IntoIterator<Item = SpaceFrame>) -> Self {
        frames.into_iter().fold(Self::IDENTITY, Self::nest)
    }

    /// The transform of a space nested inside `self` via `frame`.
    pub fn nest(self, frame: SpaceFrame) -> Self {
        let local_offset = frame.origin.to_vec2() - frame.viewport.to_vec2() * frame.scale;
        Self {
            plane_scale: self.plane_scale * frame.scale,
            offset: self.offset + local_offset * self.plane_scale,
        }
    }

    /// Product of every zoom factor along the chain.
    pub fn plane_scale(&self) -> f64 {
        self.plane_scale
    }

    /// Logical → client.
    pub fn space_to_client(&self, p: Point) -> Point {
        (p.to_vec2() * self.plane_scale + self.offset).to_point()
    }

    /// Client → logical. Exact inverse of [`space_to_client`](Self::space_to_client).
    pub fn client_to_space(&self, p: Point) -> Point {
        ((p.to_vec2() - self.offset) / self.plane_scale).to_point()
    }

    /// A logical-space displacement measured in client pixels.
    pub fn vec_to_client(&self, v: Vec2) -> Vec2 {
        v * self.plane_scale
    }

    /// A client-pixel displacement measured in logical units.
    pub fn vec_to_space(&self, v: Vec2) -> Vec2 {
        v / self.plane_scale
    }

    /// Map a logical rectangle to client coordinates.
    pub fn rect_to_client(&self, r: Rect) -> Rect {
        Rect::from_points(self.space_to_client(r.origin()), self.space_to_client(Point::new(r.x1, r.y1)))
    }

    /// Map a client rectangle to logical coordinates.
    pub fn rect_to_space(&self, r: Rect) -> Rect {
        Rect::from_points(self.client_to_space(r.origin()), self.client_to_space(Point::new(r.x1, r.y1)))
    }

    /// The client-space box of a logical rectangle.
    ///
    /// `inner_scale` is the zoom the box applies to its own content (`1` for
    /// ordinary nodes, the frame scale for a space).
    pub fn box_to_client(&self, logical: Rect, inner_scale: f64) -> BoundingBox {
        let r = self.rect_to_client(logical);
        BoundingBox {
            x: r.x0,
            y: r.y0,
            width: r.width(),
            height: r.height(),
            inner_scale,
            total_scale: self.plane_scale,
        }
    }

    /// The same mapping as a [`kurbo::Affine`].
    pub fn as_affine(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.plane_scale)
    }
}
