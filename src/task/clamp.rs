use crate::foundation::core::Color;
use crate::foundation::error::{StrataError, StrataResult};

/// Alpha magnitude under which a pixel is cleared outright.
pub const CLAMP_ALPHA_EPSILON: f32 = 1e-8;

/// Channel range clamp, optionally redistributing negative energy.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ClampParams {
    pub invert_negative: bool,
    pub clamp_floor: bool,
    pub clamp_ceiling: bool,
    pub floor: f32,
    pub ceiling: f32,
}

impl Default for ClampParams {
    fn default() -> Self {
        Self {
            invert_negative: false,
            clamp_floor: true,
            clamp_ceiling: true,
            floor: 0.0,
            ceiling: 1.0,
        }
    }
}

impl ClampParams {
    pub fn validate(&self) -> StrataResult<()> {
        if !self.floor.is_finite() || !self.ceiling.is_finite() {
            return Err(StrataError::validation("clamp bounds must be finite"));
        }
        if self.clamp_floor && self.clamp_ceiling && self.floor > self.ceiling {
            return Err(StrataError::validation(format!(
                "clamp floor {} above ceiling {}",
                self.floor, self.ceiling
            )));
        }
        Ok(())
    }

    /// Clamp one pixel.
    ///
    /// With `invert_negative`, a colour whose alpha is below the floor is
    /// negated as a whole; then r, g and b are visited in that order and any
    /// channel below the floor has its deficit taken from the other two
    /// before being pinned. Later channels see the adjusted values. The
    /// ceiling applies afterwards in every mode.
    pub fn clamp_pixel(&self, src: Color) -> Color {
        if src.a.abs() < CLAMP_ALPHA_EPSILON {
            return Color::transparent();
        }

        let mut c = src;
        if self.invert_negative {
            if c.a < self.floor {
                c = -c;
            }
            let mut ch = [c.r, c.g, c.b];
            for i in 0..3 {
                if ch[i] < self.floor {
                    let deficit = self.floor - ch[i];
                    ch[(i + 1) % 3] -= deficit;
                    ch[(i + 2) % 3] -= deficit;
                    ch[i] = self.floor;
                }
            }
            c = Color::new(ch[0], ch[1], ch[2], c.a);
        } else if self.clamp_floor {
            c = Color::from_channels(c.channels().map(|v| v.max(self.floor)));
        }

        if self.clamp_ceiling {
            c = Color::from_channels(c.channels().map(|v| v.min(self.ceiling)));
        }
        c
    }
}

#[cfg(test)]
#[path = "../../tests/unit/task/clamp.rs"]
mod tests;
