//! Immutable 2D vector used by the physics simulation.
//!
//! Every operation returns a new value. Division by zero (including
//! normalising a zero-length vector) is reported as
//! [`VectorError::DivideByZero`] rather than producing NaN components.

use std::ops::{Add, Mul, Neg, Sub};

use crate::error::VectorError;

/// A 2D vector value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    #[inline]
    pub fn add(self, other: Vector2) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    #[inline]
    pub fn subtract(self, other: Vector2) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    #[inline]
    pub fn multiply(self, n: f64) -> Self {
        Self::new(self.x * n, self.y * n)
    }

    /// Divide both components by `n`.
    #[inline]
    pub fn divide(self, n: f64) -> Result<Self, VectorError> {
        if n == 0.0 {
            return Err(VectorError::DivideByZero);
        }
        Ok(Self::new(self.x / n, self.y / n))
    }

    #[inline]
    pub fn magnitude(self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    #[inline]
    pub fn magnitude_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Unit vector in the same direction.
    #[inline]
    pub fn normalise(self) -> Result<Self, VectorError> {
        self.divide(self.magnitude())
    }

    /// True when neither component is NaN or infinite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::add(self, rhs)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Vector2 {
        self.subtract(rhs)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;

    fn mul(self, rhs: f64) -> Vector2 {
        self.multiply(rhs)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;

    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

impl From<(f64, f64)> for Vector2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}
