//! Strongly typed, zero-cost identifier wrappers.
//!
//! Cars, pickups and track segments are all addressed by dense integer
//! indices into `Vec`s owned by the race loop.  Names exist only for display.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a car in the race's entrant list.  Stable for the whole race.
    pub struct CarId(u32);
}

typed_id! {
    /// Index of a power-up pickup box on the track.
    pub struct PickupId(u16);
}

typed_id! {
    /// Index of a segment within a track's cyclic segment list.
    pub struct SegmentId(u16);
}

impl CarId {
    /// Iterator over `count` consecutive car IDs starting at zero.
    pub fn range(count: usize) -> impl Iterator<Item = CarId> {
        (0..count as u32).map(CarId)
    }
}
