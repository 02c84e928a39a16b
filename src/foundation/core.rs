use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

pub use kurbo::Vec2;

/// Integer pixel-space vector (offsets between coordinate spaces).
///
/// Arithmetic saturates at the `i32` range.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct VectorInt {
    pub x: i32,
    pub y: i32,
}

impl VectorInt {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for VectorInt {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl Sub for VectorInt {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

impl Neg for VectorInt {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(self.x.saturating_neg(), self.y.saturating_neg())
    }
}

/// Linear RGBA colour, four floats.
///
/// Channels are conventionally in `[0, 1]` but are never clamped on write:
/// intermediate results may leave the range until a clamp task runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Fully cleared colour (transparent black).
    pub const fn transparent() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    pub const fn gray(v: f32) -> Self {
        Self::new(v, v, v, 1.0)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Multiply colour channels by alpha.
    pub fn premult(self) -> Self {
        Self::new(self.r * self.a, self.g * self.a, self.b * self.a, self.a)
    }

    /// Inverse of [`Color::premult`]; zero alpha yields transparent black.
    pub fn demult(self) -> Self {
        if self.a == 0.0 {
            return Self::transparent();
        }
        let inv = 1.0 / self.a;
        Self::new(self.r * inv, self.g * inv, self.b * inv, self.a)
    }

    /// Colour inverted around one, alpha preserved.
    pub fn inverted(self) -> Self {
        Self::new(1.0 - self.r, 1.0 - self.g, 1.0 - self.b, self.a)
    }

    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    pub fn channels(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_channels([r, g, b, a]: [f32; 4]) -> Self {
        Self::new(r, g, b, a)
    }

    /// Straight-alpha RGBA8 to float colour.
    pub fn from_rgba8([r, g, b, a]: [u8; 4]) -> Self {
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        )
    }

    /// Float colour to straight-alpha RGBA8, saturating out-of-range values.
    pub fn to_rgba8(self) -> [u8; 4] {
        fn q(v: f32) -> u8 {
            if v.is_nan() {
                return 0;
            }
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

impl Add for Color {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b, self.a + rhs.a)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Color {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.r - rhs.r, self.g - rhs.g, self.b - rhs.b, self.a - rhs.a)
    }
}

impl SubAssign for Color {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f32> for Color {
    type Output = Self;

    fn mul(self, k: f32) -> Self {
        Self::new(self.r * k, self.g * k, self.b * k, self.a * k)
    }
}

impl Div<f32> for Color {
    type Output = Self;

    fn div(self, k: f32) -> Self {
        Self::new(self.r / k, self.g / k, self.b / k, self.a / k)
    }
}

impl Neg for Color {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.r, -self.g, -self.b, -self.a)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
