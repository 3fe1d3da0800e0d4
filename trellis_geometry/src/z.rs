// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reserved z-index bands.
//!
//! From the top down: one band for system overlays, one for modals, one for
//! nodes being dragged, one for other elevated content. The bottom band holds
//! low-priority decorations and everything in between is usable by ordinary
//! content.

use core::ops::RangeInclusive;

/// Highest representable z-index.
pub const MAX_Z: i32 = i32::MAX;

/// Width of each reserved band.
pub const Z_BAND_SIZE: i32 = 1_000_000;

const MIN_Z: i32 = 1;

/// A named z-index range.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ZBand {
    /// System-level overlays; the top-most band.
    System,
    /// Modals and dialogs.
    Modal,
    /// Nodes elevated for the duration of a drag gesture.
    Draggable,
    /// Other elevated content.
    Other,
    /// Ordinary content.
    Usable,
    /// Low-priority decorations; the bottom band.
    Low,
}

impl ZBand {
    /// Smallest z-index in the band.
    pub const fn min(self) -> i32 {
        match self {
            Self::System => Self::System.max() - Z_BAND_SIZE,
            Self::Modal => Self::Modal.max() - Z_BAND_SIZE,
            Self::Draggable => Self::Draggable.max() - Z_BAND_SIZE,
            Self::Other => Self::Other.max() - Z_BAND_SIZE,
            Self::Usable => Self::Low.max() + 1,
            Self::Low => MIN_Z + 1,
        }
    }

    /// Largest z-index in the band.
    pub const fn max(self) -> i32 {
        match self {
            Self::System => MAX_Z - 1,
            Self::Modal => Self::System.min() - 1,
            Self::Draggable => Self::Modal.min() - 1,
            Self::Other => Self::Draggable.min() - 1,
            Self::Usable => Self::Other.min() - 1,
            Self::Low => Self::Low.min() + Z_BAND_SIZE,
        }
    }

    /// The band as an inclusive range.
    pub const fn range(self) -> RangeInclusive<i32> {
        self.min()..=self.max()
    }

    /// Whether `z` falls in this band.
    pub const fn contains(self, z: i32) -> bool {
        z >= self.min() && z <= self.max()
    }

    /// Clamp `z` into this band.
    pub const fn clamp(self, z: i32) -> i32 {
        if z < self.min() {
            self.min()
        } else if z > self.max() {
            self.max()
        } else {
            z
        }
    }

    /// The band `z` falls in, if any.
    pub fn of(z: i32) -> Option<Self> {
        [
            Self::System,
            Self::Modal,
            Self::Draggable,
            Self::Other,
            Self::Usable,
            Self::Low,
        ]
        .into_iter()
        .find(|band| band.contains(z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_are_ordered_and_disjoint() {
        let order = [
            ZBand::System,
            ZBand::Modal,
            ZBand::Draggable,
            ZBand::Other,
            ZBand::Usable,
            ZBand::Low,
        ];
        for pair in order.windows(2) {
            assert!(
                pair[0].min() > pair[1].max(),
                "{:?} sits above {:?}",
                pair[0],
                pair[1]
            );
        }
        assert_eq!(ZBand::System.max(), 2_147_483_646, "system tops out below i32::MAX");
        assert_eq!(ZBand::Low.range(), 2..=1_000_002, "low band");
    }

    #[test]
    fn draggable_band_sits_between_content_and_modals() {
        let drag = ZBand::Draggable.min();
        assert!(drag > ZBand::Usable.max(), "above ordinary content");
        assert!(drag < ZBand::Modal.min(), "below modals");
        assert_eq!(ZBand::of(drag), Some(ZBand::Draggable), "classified");
    }

    #[test]
    fn clamping() {
        assert_eq!(ZBand::Draggable.clamp(5), ZBand::Draggable.min(), "raised into band");
        assert_eq!(ZBand::Low.clamp(i32::MAX), ZBand::Low.max(), "lowered into band");
        assert_eq!(ZBand::Usable.clamp(5_000_000), 5_000_000, "in-band values unchanged");
        assert_eq!(ZBand::of(0), None, "zero is below every band");
    }
}
