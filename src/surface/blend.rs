use crate::foundation::core::Color;

/// Tolerance used to decide whether an alpha value is zero.
pub const COLOR_EPSILON: f32 = 1e-6;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
/// Per-pixel compositing rule applied when `src` is laid over `dst`.
///
/// All methods work on straight (non-premultiplied) colour.
pub enum BlendMethod {
    /// `src` over `dst`, weighted by source alpha.
    #[default]
    Composite,
    /// Linear interpolation from `dst` to `src`, alpha included.
    Straight,
    /// Like `Composite` but keeps the alpha of `dst`.
    Onto,
    /// `Straight` with source alpha multiplied by destination alpha.
    StraightOnto,
    /// `dst` over `src`.
    Behind,
    Screen,
    Overlay,
    HardLight,
    Multiply,
    Divide,
    /// Additive, cropped to the destination alpha.
    Add,
    /// Additive, alpha is the clamped sum of both alphas.
    AddComposite,
    Subtract,
    Difference,
    Brighten,
    Darken,
    /// Cuts the destination alpha by the source alpha.
    AlphaOver,
}

impl BlendMethod {
    /// Blend one pixel.
    pub fn blend(self, src: Color, dst: Color, amount: f32) -> Color {
        match self {
            Self::Composite => composite(src, dst, amount),
            Self::Straight => straight(src, dst, amount),
            Self::Onto => onto(src, dst, amount),
            Self::StraightOnto => straight(src.with_alpha(src.a * dst.a), dst, amount),
            Self::Behind => {
                let a = if src.a == 0.0 {
                    COLOR_EPSILON * amount
                } else {
                    src.a * amount
                };
                composite(dst, src.with_alpha(a), 1.0)
            }
            Self::Screen => {
                let (src, amount) = invert_negative(src, amount);
                let mixed = map_rgb(src, dst, |a, b| 1.0 - (1.0 - a) * (1.0 - b));
                onto(mixed.with_alpha(src.a), dst, amount)
            }
            Self::Overlay => {
                let (a, amount) = invert_negative(src, amount);
                let mixed = map_rgb(a, dst, |a, b| {
                    let multiply = b * a;
                    let screen = 1.0 - (1.0 - a) * (1.0 - b);
                    a * screen + (1.0 - a) * multiply
                });
                onto(mixed.with_alpha(a.a), dst, amount)
            }
            Self::HardLight => {
                let (a, amount) = invert_negative(src, amount);
                let mixed = map_rgb(a, dst, |a, b| {
                    if a > 0.5 {
                        1.0 - (1.0 - (a * 2.0 - 1.0)) * (1.0 - b)
                    } else {
                        b * (a * 2.0)
                    }
                });
                onto(mixed.with_alpha(a.a), dst, amount)
            }
            Self::Multiply => {
                let (a, amount) = invert_negative(src, amount);
                let k = amount * a.a;
                map_rgb(a, dst, |a, b| (b * a - b) * k + b)
            }
            Self::Divide => {
                let k = amount * src.a;
                map_rgb(src, dst, |a, b| (b / (a + COLOR_EPSILON) - b) * k + b)
            }
            Self::Add => {
                let (ba, aa) = (dst.a, src.a * amount);
                map_rgb(src, dst, |a, b| b * ba + a * aa)
            }
            Self::AddComposite => {
                let (ba, aa) = (dst.a, src.a * amount);
                let alpha = (ba + aa).clamp(0.0, 1.0);
                let k = if alpha.abs() > 1e-8 { 1.0 / alpha } else { 0.0 };
                let (ba, aa) = (ba * k, aa * k);
                map_rgb(src, dst, |a, b| b * ba + a * aa).with_alpha(alpha)
            }
            Self::Subtract => {
                let (ba, aa) = (dst.a, src.a * amount);
                map_rgb(src, dst, |a, b| b * ba - a * aa)
            }
            Self::Difference => {
                let (ba, aa) = (dst.a, src.a * amount);
                map_rgb(src, dst, |a, b| (b * ba - a * aa).abs())
            }
            Self::Brighten => {
                let alpha = src.a * amount;
                map_rgb(src, dst, |a, b| b.max(a * alpha))
            }
            Self::Darken => {
                let alpha = src.a * amount;
                map_rgb(src, dst, |a, b| b.min((a - 1.0) * alpha + 1.0))
            }
            Self::AlphaOver => {
                let cut = dst.with_alpha((1.0 - src.a) * dst.a);
                straight(cut, dst, amount)
            }
        }
    }
}

fn composite(src: Color, dst: Color, amount: f32) -> Color {
    let a_src = src.a * amount;
    let a_dst = dst.a;
    let a_out = a_src + a_dst * (1.0 - a_src);
    if a_out.abs() <= COLOR_EPSILON {
        return Color::transparent();
    }
    let c = src * a_src + dst * a_dst * (1.0 - a_src);
    (c / a_out).with_alpha(a_out)
}

fn straight(src: Color, dst: Color, amount: f32) -> Color {
    let a_out = (src.a - dst.a) * amount + dst.a;
    if a_out.abs() <= COLOR_EPSILON {
        return Color::transparent();
    }
    let c = (src * src.a - dst * dst.a) * amount + dst * dst.a;
    (c / a_out).with_alpha(a_out)
}

fn onto(src: Color, dst: Color, amount: f32) -> Color {
    composite(src, dst.with_alpha(1.0), amount).with_alpha(dst.a)
}

fn invert_negative(c: Color, amount: f32) -> (Color, f32) {
    if amount < 0.0 {
        (c.inverted(), -amount)
    } else {
        (c, amount)
    }
}

/// Apply `f(src_channel, dst_channel)` to r, g, b; alpha comes from `dst`.
fn map_rgb(src: Color, dst: Color, f: impl Fn(f32, f32) -> f32) -> Color {
    Color::new(f(src.r, dst.r), f(src.g, dst.g), f(src.b, dst.b), dst.a)
}

#[cfg(test)]
#[path = "../../tests/unit/surface/blend.rs"]
mod tests;
