//! Newtype wrappers for the physical quantities that cross API seams.
//!
//! Wrapping prevents a pressure from being passed where a temperature is
//! expected when a constructor takes four floats in a row. Only the handful
//! of quantities that actually appear in public signatures get a type; the
//! numerics underneath work on plain `f64`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

macro_rules! quantity {
    ($(#[$meta:meta])* $name:ident, $unit:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(pub f64);

        impl $name {
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Raw value in base units.
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} {}", self.0, $unit)
            }
        }

        impl Add for $name {
            type Output = $name;
            fn add(self, rhs: $name) -> $name {
                $name(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = $name;
            fn sub(self, rhs: $name) -> $name {
                $name(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $name {
            type Output = $name;
            fn mul(self, rhs: f64) -> $name {
                $name(self.0 * rhs)
            }
        }

        impl Div<f64> for $name {
            type Output = $name;
            fn div(self, rhs: f64) -> $name {
                $name(self.0 / rhs)
            }
        }

        impl From<f64> for $name {
            fn from(v: f64) -> Self {
                Self(v)
            }
        }
    };
}

quantity!(
    /// Absolute temperature [K]
    Kelvin,
    "K"
);
quantity!(
    /// Pressure [Pa]
    Pascals,
    "Pa"
);
quantity!(
    /// Length [m]
    Meters,
    "m"
);
quantity!(
    /// Duration of simulated time [s]
    Seconds,
    "s"
);
quantity!(
    /// Velocity [m/s]
    MetersPerSecond,
    "m/s"
);

impl Kelvin {
    /// Water freezing point at 1 atm.
    pub const FREEZING: Kelvin = Kelvin(273.15);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_preserves_units() {
        let t = Kelvin::new(220.0) + Kelvin::new(5.0);
        assert_eq!(t.value(), 225.0);
        let d = Meters::new(10.0) * 0.5;
        assert_eq!(d.value(), 5.0);
    }

    #[test]
    fn display_includes_unit() {
        assert_eq!(format!("{}", Pascals::new(24000.0)), "24000 Pa");
    }
}
