//! Unit constants.
//!
//! Lengths are expressed in millimetres and times in nanoseconds. Multiply a
//! value by a constant to convert it into the internal unit system.

/// Micrometre.
pub const UM: f64 = 1e-3;

/// Picosecond.
pub const PS: f64 = 1e-3;
