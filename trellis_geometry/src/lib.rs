// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Geometry: boxes, nested coordinate spaces, and depth ordering.
//!
//! - [`BoundingBox`] is an axis-aligned rectangle carrying two zoom factors:
//!   `inner_scale` (the box's own scale within its coordinate space) and
//!   `total_scale` (the composite scale through every enclosing space).
//! - [`OverrideBoundingBox`] is a partial patch that [`BoundingBox::compose`]
//!   blends onto a base box.
//! - [`SpaceFrame`] describes one nested space (a canvas, or a portal onto another
//!   canvas) and [`SpaceTransform`] composes a chain of them into a single
//!   scale + offset mapping with exact inverse: [`SpaceTransform::client_to_space`]
//!   and [`SpaceTransform::space_to_client`].
//! - [`snap_to_grid`] snaps a scalar only when it is already within a small
//!   tolerance of a grid line.
//! - [`ZBand`] names the reserved z-index ranges (system, modal, draggable, other,
//!   usable, low).
//! - [`DepthIndex`] is the depth-ordering service: it stores `(rect, z)` per entry
//!   and answers point and rectangle queries top-most first.
//!
//! ## Nested spaces
//!
//! ```rust
//! use kurbo::Point;
//! use trellis_geometry::{SpaceFrame, SpaceTransform};
//!
//! // A canvas at the client origin, zoomed 2x, scrolled to (100, 0)…
//! let canvas = SpaceTransform::IDENTITY.nest(SpaceFrame::new(
//!     Point::ZERO,
//!     Point::new(100.0, 0.0),
//!     2.0,
//! ));
//! // …containing a portal placed at logical (150, 50), at half scale.
//! let portal = canvas.nest(SpaceFrame::new(Point::new(150.0, 50.0), Point::ZERO, 0.5));
//!
//! let client = Point::new(130.0, 120.0);
//! let logical = portal.client_to_space(client);
//! assert_eq!(logical, Point::new(30.0, 20.0));
//! assert_eq!(portal.space_to_client(logical), client);
//! assert_eq!(portal.plane_scale(), 1.0);
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for `kurbo`.
//! - `libm`: `no_std` floating-point math through `kurbo`'s `libm` support.
//!
//! This crate is `no_std` and uses `alloc`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod bounding_box;
mod depth;
mod snap;
mod space;
mod z;

pub use bounding_box::{BoundingBox, Margin, OverrideBoundingBox, Sides};
pub use depth::{DepthDamage, DepthIndex, DepthKey};
pub use snap::{DEFAULT_SNAP_TOLERANCE, snap_point_to_grid, snap_to_grid, snap_to_grid_within};
pub use space::{SpaceFrame, SpaceTransform};
pub use z::{MAX_Z, Z_BAND_SIZE, ZBand};
