use std::ops::{Add, Sub};

use crate::foundation::core::Color;

/// A pixel storage type paired with the wider type its blur sums run in.
///
/// Running sums add and subtract many samples; doing that in the storage
/// type loses precision for floats and overflows for integers, so every
/// kernel widens on read and narrows exactly once on write.
pub trait Accumulate: Copy + Default + Send + Sync {
    type Accum: Copy + Default + Add<Output = Self::Accum> + Sub<Output = Self::Accum> + Send;

    fn widen(self) -> Self::Accum;

    /// Divide `acc` by `divisor` and convert back to storage, rounding
    /// integers to nearest.
    fn narrow(acc: Self::Accum, divisor: u32) -> Self;

    /// How many maximal samples fit in one accumulator without overflow.
    fn max_window() -> usize;
}

impl Accumulate for f32 {
    type Accum = f64;

    fn widen(self) -> f64 {
        f64::from(self)
    }

    fn narrow(acc: f64, divisor: u32) -> f32 {
        (acc / f64::from(divisor)) as f32
    }

    fn max_window() -> usize {
        usize::MAX
    }
}

impl Accumulate for f64 {
    type Accum = f64;

    fn widen(self) -> f64 {
        self
    }

    fn narrow(acc: f64, divisor: u32) -> f64 {
        acc / f64::from(divisor)
    }

    fn max_window() -> usize {
        usize::MAX
    }
}

fn narrow_int(acc: u32, divisor: u32, max: u32) -> u32 {
    let d = u64::from(divisor.max(1));
    let v = (u64::from(acc) + d / 2) / d;
    v.min(u64::from(max)) as u32
}

impl Accumulate for u8 {
    type Accum = u32;

    fn widen(self) -> u32 {
        u32::from(self)
    }

    fn narrow(acc: u32, divisor: u32) -> u8 {
        narrow_int(acc, divisor, u32::from(u8::MAX)) as u8
    }

    fn max_window() -> usize {
        (u32::MAX / u32::from(u8::MAX)) as usize
    }
}

impl Accumulate for u16 {
    type Accum = u32;

    fn widen(self) -> u32 {
        u32::from(self)
    }

    fn narrow(acc: u32, divisor: u32) -> u16 {
        narrow_int(acc, divisor, u32::from(u16::MAX)) as u16
    }

    fn max_window() -> usize {
        (u32::MAX / u32::from(u16::MAX)) as usize
    }
}

/// Double-precision running sum of [`Color`] samples.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ColorAccumulator {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Add for ColorAccumulator {
    type Output = Self;

    fn add(self, o: Self) -> Self {
        Self {
            r: self.r + o.r,
            g: self.g + o.g,
            b: self.b + o.b,
            a: self.a + o.a,
        }
    }
}

impl Sub for ColorAccumulator {
    type Output = Self;

    fn sub(self, o: Self) -> Self {
        Self {
            r: self.r - o.r,
            g: self.g - o.g,
            b: self.b - o.b,
            a: self.a - o.a,
        }
    }
}

impl Accumulate for Color {
    type Accum = ColorAccumulator;

    fn widen(self) -> ColorAccumulator {
        ColorAccumulator {
            r: f64::from(self.r),
            g: f64::from(self.g),
            b: f64::from(self.b),
            a: f64::from(self.a),
        }
    }

    fn narrow(acc: ColorAccumulator, divisor: u32) -> Color {
        let d = f64::from(divisor);
        Color::new(
            (acc.r / d) as f32,
            (acc.g / d) as f32,
            (acc.b / d) as f32,
            (acc.a / d) as f32,
        )
    }

    fn max_window() -> usize {
        usize::MAX
    }
}

#[cfg(test)]
#[path = "../../tests/unit/blur/accum.rs"]
mod tests;
