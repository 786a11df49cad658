//! Temperature representation.
//!
//! Every temperature in the core is a [`Deci`]: tenths of a degree
//! Celsius in a plain `i32` (37.5 C is `Deci(375)`).  One scale for
//! filtering, control, clamping, and display means no float rounding
//! anywhere and exact equality in tests.
//!
//! Probe hardware reports half-degree counts (×2 Celsius).  The ×2 to
//! ×10 promotion is a multiply by [`RAW_TO_DECI`]; the smoothing filter
//! leans on this ratio for its averaging weight, see
//! [`filter`](crate::filter).

use core::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Multiplier from raw half-degree probe counts to tenths.
pub const RAW_TO_DECI: i32 = 5;

/// Formatted reading, e.g. `"37.5"`.  Sized for any `i32` plus the dot.
pub type DisplayText = heapless::String<12>;

/// A temperature in tenths of a degree Celsius.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Deci(i32);

impl Deci {
    pub const fn new(tenths: i32) -> Self {
        Self(tenths)
    }

    /// Promote a raw half-degree probe count onto the tenths scale.
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw * RAW_TO_DECI)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    /// The greater of `self` and `floor` (peg a gauge reading).
    pub fn max_floor(self, floor: Self) -> Self {
        self.max(floor)
    }

    /// Render as `whole.tenth`.  Negative readings display as `0.0` —
    /// the gauges peg at their floors well above zero anyway.
    pub fn format(self) -> DisplayText {
        let v = self.0.max(0);
        let mut s = DisplayText::new();
        // Capacity covers any i32, so the write cannot fail.
        let _ = write!(s, "{}.{}", v / 10, v % 10);
        s
    }
}
