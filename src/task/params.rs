use crate::blur::gaussian::gaussian_reach;
use crate::foundation::core::Vec2;
use crate::foundation::error::{StrataError, StrataResult};
use crate::surface::blend::BlendMethod;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BlendParams {
    #[serde(default)]
    pub method: BlendMethod,
    #[serde(default = "one")]
    pub amount: f32,
}

fn one() -> f32 {
    1.0
}

impl Default for BlendParams {
    fn default() -> Self {
        Self {
            method: BlendMethod::Composite,
            amount: 1.0,
        }
    }
}

impl BlendParams {
    pub fn validate(&self) -> StrataResult<()> {
        if !self.amount.is_finite() {
            return Err(StrataError::validation("blend amount must be finite"));
        }
        Ok(())
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BlurKind {
    /// One box pass per axis.
    #[default]
    Box,
    /// Two box passes per axis at three quarters of the length.
    FastGaussian,
    /// Greedy 5x5 / 3x3 / 3-tap binomial decomposition.
    Gaussian,
    /// Mean of an independent horizontal and vertical box blur.
    Cross,
    /// Mean over an ellipse with the box lengths as radii. Falls back to
    /// [`BlurKind::Box`] when either axis is off.
    Disc,
}

/// Largest accepted blur size on either axis, in pixels.
pub const MAX_BLUR_SIZE: f64 = 65536.0;

/// Blur kind and per-axis size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BlurParams {
    #[serde(default)]
    pub kind: BlurKind,
    pub size: Vec2,
}

/// Box half-length for one axis; zero disables the axis.
fn box_length(size: f64) -> usize {
    if size <= 0.0 {
        0
    } else {
        ((size * 0.5) as usize).max(1)
    }
}

/// Per-pass box length of the two-pass fast gaussian for one axis.
fn fast_gaussian_length(size: f64) -> usize {
    if size <= 0.0 {
        return 0;
    }
    let length = (size * 0.5 + 1.0).max(1.0);
    (length * 3.0 / 4.0) as usize
}

impl BlurParams {
    pub fn new(kind: BlurKind, size: Vec2) -> Self {
        Self { kind, size }
    }

    pub fn validate(&self) -> StrataResult<()> {
        if !self.size.is_finite() || self.size.x < 0.0 || self.size.y < 0.0 {
            return Err(StrataError::validation(format!(
                "blur size must be finite and non-negative, got ({}, {})",
                self.size.x, self.size.y
            )));
        }
        if self.size.x > MAX_BLUR_SIZE || self.size.y > MAX_BLUR_SIZE {
            return Err(StrataError::validation(format!(
                "blur size ({}, {}) exceeds {MAX_BLUR_SIZE}",
                self.size.x, self.size.y
            )));
        }
        Ok(())
    }

    pub fn box_lengths(&self) -> (usize, usize) {
        (box_length(self.size.x), box_length(self.size.y))
    }

    pub fn fast_gaussian_lengths(&self) -> (usize, usize) {
        (
            fast_gaussian_length(self.size.x),
            fast_gaussian_length(self.size.y),
        )
    }

    /// Pass budget handed to the gaussian decomposition.
    pub fn gaussian_budget(&self) -> (usize, usize) {
        (
            self.size.x.round().max(0.0) as usize,
            self.size.y.round().max(0.0) as usize,
        )
    }

    /// How far outside an output pixel the blur reads, per axis.
    pub fn reach(&self) -> (usize, usize) {
        match self.kind {
            BlurKind::Box | BlurKind::Cross | BlurKind::Disc => self.box_lengths(),
            BlurKind::FastGaussian => {
                let (x, y) = self.fast_gaussian_lengths();
                (2 * x, 2 * y)
            }
            BlurKind::Gaussian => {
                let (bx, by) = self.gaussian_budget();
                gaussian_reach(bx, by)
            }
        }
    }

    /// [`BlurParams::reach`] as rectangle offsets, saturating at `i32::MAX`.
    pub fn reach_i32(&self) -> (i32, i32) {
        let (x, y) = self.reach();
        (
            i32::try_from(x).unwrap_or(i32::MAX),
            i32::try_from(y).unwrap_or(i32::MAX),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/task/params.rs"]
mod tests;
