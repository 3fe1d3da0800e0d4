// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the node tree: identifiers, flags, lifecycle, and local geometry.

use core::fmt;

use alloc::rc::Rc;
use kurbo::{Point, Rect, Size};
use trellis_geometry::SpaceFrame;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Identifier for a node in the tree (generational).
///
/// A `NodeId` is a weak handle: it never keeps a node alive, and once the node
/// has been cleaned up every query through the id answers "not found" while
/// every mutation is a no-op.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Capability and behavior flags, resolved once when a node is built.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u16 {
        /// Node is visible. Invisible nodes hide their whole subtree from hit tests.
        const VISIBLE           = 1 << 0;
        /// Node can be returned by hit tests.
        const PICKABLE          = 1 << 1;
        /// Node can receive focus.
        const FOCUSABLE         = 1 << 2;
        /// Node can be dragged.
        const DRAGGABLE         = 1 << 3;
        /// Node can be selected.
        const SELECTABLE        = 1 << 4;
        /// Node can be resized.
        const RESIZABLE         = 1 << 5;
        /// Node reacts to hover.
        const HOVERABLE         = 1 << 6;
        /// Grabbing this node drags its nearest draggable ancestor.
        const DRAG_HANDLE       = 1 << 7;
        /// Node accepts drops.
        const DROPPABLE         = 1 << 8;
        /// Node is see-through for hit tests and navigation (set while dragged).
        const TRANSPARENT       = 1 << 9;
        /// Children are hit-tested even outside this node's own bounds.
        const OVERFLOW          = 1 << 10;
        /// Children are hit-tested in insertion order instead of topmost first.
        const FORWARD_HIT_ORDER = 1 << 11;
        /// Node opens a nested coordinate space for its children.
        const SPACE             = 1 << 12;
        /// Node takes part in [`Tree::z_enumerate`](crate::Tree::z_enumerate).
        const ZINDEXED          = 1 << 13;
        /// Node is a text-editing control; pointer-downs on it never start a drag.
        const TEXT_INPUT        = 1 << 14;
        /// Node is dragged as a floating clone instead of in place.
        const CLONE_ON_DRAG     = 1 << 15;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::PICKABLE
    }
}

/// Per-node state machine.
///
/// `Constructed → Initialized → Live → CleaningUp → Dead`. `Dead` is terminal
/// and is what every stale [`NodeId`] reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Inserted but not yet initialized.
    Constructed,
    /// [`Tree::init`](crate::Tree::init) ran; becomes live on the next commit.
    Initialized,
    /// Participates in hit testing and depth ordering.
    Live,
    /// Cleanup is in progress; mutations are refused.
    CleaningUp,
    /// Released.
    Dead,
}

/// How a node is being moved by an active drag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DragMode {
    /// Moved in place, rendered transparent and elevated.
    InPlace,
    /// A floating clone is rendered; the node itself stays put.
    Clone,
}

bitflags::bitflags! {
    /// Transient visual hints a renderer may draw on a node.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Indication: u8 {
        /// The node can be grabbed.
        const DRAG     = 1 << 0;
        /// The node is a navigation target.
        const NAVIGATE = 1 << 1;
        /// The node is the current drop candidate.
        const CAN_DROP = 1 << 2;
    }
}

/// Pan and zoom of a nested space.
///
/// The space's top-left sits at the owning node's bounds origin; `viewport` is
/// the logical point shown there and `scale` the zoom relative to the parent.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpaceView {
    /// Logical point displayed at the space's top-left.
    pub viewport: Point,
    /// Zoom relative to the enclosing space.
    pub scale: f64,
}

impl Default for SpaceView {
    fn default() -> Self {
        Self {
            viewport: Point::ZERO,
            scale: 1.0,
        }
    }
}

impl SpaceView {
    /// A space showing `viewport` at its top-left with the given zoom.
    pub fn new(viewport: Point, scale: f64) -> Self {
        Self { viewport, scale }
    }

    /// The frame this view produces for a node placed at `bounds`.
    pub fn frame(&self, bounds: Rect) -> SpaceFrame {
        SpaceFrame::new(bounds.origin(), self.viewport, self.scale)
    }
}

/// Predicate used by [`HitShape::Custom`]: `(local point, logical size) -> hit`.
pub type HitPredicate = Rc<dyn Fn(Point, Size) -> bool>;

/// Shape tested by hit testing, in the node's own logical coordinates.
#[derive(Clone, Default)]
pub enum HitShape {
    /// The full bounds, edges included.
    #[default]
    Bounds,
    /// The circle inscribed in the bounds.
    Circle,
    /// An annular sector around the bounds center (a radial menu slot).
    ///
    /// Angles are in radians, measured from the positive x axis toward
    /// positive y (clockwise on screen).
    RadialSlice {
        /// Inner radius; points closer to the center miss.
        inner_radius: f64,
        /// Outer radius; points further away miss.
        outer_radius: f64,
        /// Start angle.
        start_angle: f64,
        /// Angular extent from `start_angle`.
        sweep: f64,
    },
    /// An arbitrary predicate.
    Custom(HitPredicate),
}

impl fmt::Debug for HitShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounds => f.write_str("Bounds"),
            Self::Circle => f.write_str("Circle"),
            Self::RadialSlice {
                inner_radius,
                outer_radius,
                start_angle,
                sweep,
            } => f
                .debug_struct("RadialSlice")
                .field("inner_radius", inner_radius)
                .field("outer_radius", outer_radius)
                .field("start_angle", start_angle)
                .field("sweep", sweep)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl HitShape {
    /// Whether `local` (relative to the top-left, logical units) hits a node of `size`.
    pub fn contains(&self, local: Point, size: Size) -> bool {
        match self {
            Self::Bounds => {
                local.x >= 0.0 && local.y >= 0.0 && local.x <= size.width && local.y <= size.height
            }
            Self::Circle => {
                let r = size.width.min(size.height) / 2.0;
                let c = Point::new(size.width / 2.0, size.height / 2.0);
                (local - c).hypot() <= r
            }
            Self::RadialSlice {
                inner_radius,
                outer_radius,
                start_angle,
                sweep,
            } => {
                let c = Point::new(size.width / 2.0, size.height / 2.0);
                let d = local - c;
                let dist = d.hypot();
                if dist < *inner_radius || dist > *outer_radius {
                    return false;
                }
                let tau = core::f64::consts::TAU;
                let rel = (d.y.atan2(d.x) - start_angle).rem_euclid(tau);
                rel <= *sweep
            }
            Self::Custom(pred) => pred(local, size),
        }
    }
}

/// Local state for a node, as supplied by the owner.
#[derive(Clone, Debug)]
pub struct LocalNode {
    /// Bounds in the logical coordinates of the nearest enclosing space.
    pub bounds: Rect,
    /// Type tag; sibling navigation only moves between nodes of equal kind.
    pub kind: &'static str,
    /// Capability flags.
    pub flags: NodeFlags,
    /// Z-order. Higher is drawn on top and wins hit tests.
    pub z_index: i32,
    /// Shape used by hit testing.
    pub hit_shape: HitShape,
    /// Set when the node opens a nested space for its children.
    pub space: Option<SpaceView>,
}

impl Default for LocalNode {
    fn default() -> Self {
        Self {
            bounds: Rect::ZERO,
            kind: "node",
            flags: NodeFlags::default(),
            z_index: 0,
            hit_shape: HitShape::Bounds,
            space: None,
        }
    }
}

impl LocalNode {
    /// A node of `kind` with the given bounds and default flags.
    pub fn new(kind: &'static str, bounds: Rect) -> Self {
        Self {
            bounds,
            kind,
            ..Self::default()
        }
    }

    /// Add capability flags.
    pub fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Set the z-index.
    pub fn with_z_index(mut self, z: i32) -> Self {
        self.z_index = z;
        self
    }

    /// Set the hit shape.
    pub fn with_hit_shape(mut self, shape: HitShape) -> Self {
        self.hit_shape = shape;
        self
    }

    /// Make the node open a nested space.
    pub fn with_space(mut self, view: SpaceView) -> Self {
        self.space = Some(view);
        self.flags |= NodeFlags::SPACE;
        self
    }
}
