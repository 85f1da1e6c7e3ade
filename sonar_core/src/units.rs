//! Distance estimate type.

use std::fmt;

/// Centimeters per inch, inverted.
pub const CM_TO_INCH: f32 = 0.393_701;

/// One-way distance to the nearest reflector, in centimeters.
///
/// Zero is reserved for "no echo this cycle"; it never means an object
/// touching the sensor.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Distance(f32);

impl Distance {
    /// Nothing in range.
    pub const NONE: Distance = Distance(0.0);

    /// Negative and non-finite inputs collapse to `NONE`.
    pub fn from_cm(cm: f32) -> Self {
        if cm.is_finite() && cm > 0.0 {
            Self(cm)
        } else {
            Self::NONE
        }
    }

    #[inline]
    pub fn cm(self) -> f32 {
        self.0
    }

    #[inline]
    pub fn inches(self) -> f32 {
        self.0 * CM_TO_INCH
    }

    /// True when an echo contributed to this estimate.
    #[inline]
    pub fn has_echo(self) -> bool {
        self.0 > 0.0
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} cm", self.0)
    }
}
