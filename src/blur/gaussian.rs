use std::ops::DerefMut;

use crate::foundation::error::StrataResult;
use crate::surface::pen::{GenericPen, PenPos};

use super::accum::Accumulate;
use super::boxblur::region_size;

/// One binomial pass of the greedy gaussian decomposition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GaussianPass {
    /// `[1 4 6 4 1]` on both axes, reflect at edges. Consumes 4 per axis.
    Blur5x5,
    /// `[1 2 1]` on both axes, clamp at edges. Consumes 2 per axis.
    Blur3x3,
    /// `[1 2 1]` horizontally only. Consumes up to 2 of the x budget.
    Blur3x1,
    /// `[1 2 1]` vertically only. Consumes up to 2 of the y budget.
    Blur1x3,
}

impl GaussianPass {
    /// Pixels read beyond the output on each side, as `(x, y)`.
    pub fn reach(self) -> (usize, usize) {
        match self {
            Self::Blur5x5 => (2, 2),
            Self::Blur3x3 => (1, 1),
            Self::Blur3x1 => (1, 0),
            Self::Blur1x3 => (0, 1),
        }
    }
}

/// How many passes of each kind a [`gaussian_blur`] call ran.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GaussianPassCounts {
    pub blur_5x5: usize,
    pub blur_3x3: usize,
    pub blur_3x1: usize,
    pub blur_1x3: usize,
}

impl GaussianPassCounts {
    pub fn total(&self) -> usize {
        self.blur_5x5 + self.blur_3x3 + self.blur_3x1 + self.blur_1x3
    }

    fn record(&mut self, pass: GaussianPass) {
        match pass {
            GaussianPass::Blur5x5 => self.blur_5x5 += 1,
            GaussianPass::Blur3x3 => self.blur_3x3 += 1,
            GaussianPass::Blur3x1 => self.blur_3x1 += 1,
            GaussianPass::Blur1x3 => self.blur_1x3 += 1,
        }
    }
}

/// Greedy decomposition of a `(blur_x, blur_y)` budget into passes.
///
/// 5x5 while both budgets are at least 4, then 3x3 while both are at least
/// 2, then single-axis 3-tap passes for whatever is left on each axis.
pub fn plan_gaussian_passes(mut bx: usize, mut by: usize) -> Vec<GaussianPass> {
    let mut passes = Vec::new();
    while bx >= 4 && by >= 4 {
        passes.push(GaussianPass::Blur5x5);
        bx -= 4;
        by -= 4;
    }
    while bx >= 2 && by >= 2 {
        passes.push(GaussianPass::Blur3x3);
        bx -= 2;
        by -= 2;
    }
    while bx > 0 {
        passes.push(GaussianPass::Blur3x1);
        bx -= bx.min(2);
    }
    while by > 0 {
        passes.push(GaussianPass::Blur1x3);
        by -= by.min(2);
    }
    passes
}

/// Total reach of a pass list, summed per axis.
pub fn passes_reach(passes: &[GaussianPass]) -> (usize, usize) {
    passes.iter().fold((0, 0), |(x, y), p| {
        let (rx, ry) = p.reach();
        (x + rx, y + ry)
    })
}

/// Reach of `plan_gaussian_passes(blur_x, blur_y)` without building the plan.
pub fn gaussian_reach(blur_x: usize, blur_y: usize) -> (usize, usize) {
    let n5 = blur_x.min(blur_y) / 4;
    let (bx, by) = (blur_x - 4 * n5, blur_y - 4 * n5);
    let n3 = bx.min(by) / 2;
    let (bx, by) = (bx - 2 * n3, by - 2 * n3);
    let shared = n5.saturating_mul(2).saturating_add(n3);
    (
        shared.saturating_add(bx.div_ceil(2)),
        shared.saturating_add(by.div_ceil(2)),
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Edge {
    Reflect,
    Clamp,
}

impl Edge {
    fn index(self, i: isize, n: usize) -> usize {
        let last = n as isize - 1;
        let j = match self {
            Self::Reflect if i < 0 => -i,
            Self::Reflect if i > last => 2 * last - i,
            _ => i,
        };
        j.clamp(0, last) as usize
    }
}

/// Binomial filter of order `2 * radius` over one line, left unnormalised.
///
/// The padded line is reduced by `2 * radius` cascaded pair sums, which
/// yields the binomial weights without a multiply per tap.
fn binomial_line<A: Copy + std::ops::Add<Output = A>>(
    n: usize,
    radius: usize,
    edge: Edge,
    sample: impl Fn(usize) -> A,
    scratch: &mut Vec<A>,
    mut write: impl FnMut(usize, A),
) {
    if n == 0 {
        return;
    }
    scratch.clear();
    let r = radius as isize;
    scratch.extend((-r..n as isize + r).map(|i| sample(edge.index(i, n))));
    let mut len = scratch.len();
    for _ in 0..2 * radius {
        for i in 0..len - 1 {
            scratch[i] = scratch[i] + scratch[i + 1];
        }
        len -= 1;
    }
    for (i, v) in scratch[..n].iter().enumerate() {
        write(i, *v);
    }
}

/// Separable binomial pass applied in place to a `w x h` region at the
/// pen's cursor. The horizontal result stays in the accumulator type so the
/// region is narrowed once, by the combined weight.
fn separable_pass<T, B>(
    pen: &mut GenericPen<B>,
    w: usize,
    h: usize,
    (rx, ry): (usize, usize),
    edge: Edge,
) where
    T: Accumulate,
    B: DerefMut<Target = [T]>,
{
    if w == 0 || h == 0 {
        return;
    }
    let origin = pen.pos();
    let stride = pen.width();
    let divisor = 1u32 << (2 * (rx + ry));
    let mut at = vec![T::Accum::default(); w * h];
    let mut scratch = Vec::with_capacity(w.max(h) + 4);

    {
        let buf = pen.as_slice();
        for y in 0..h {
            let row = &buf[(origin.y + y) * stride + origin.x..][..w];
            let out = &mut at[y * w..(y + 1) * w];
            binomial_line(w, rx, edge, |i| row[i].widen(), &mut scratch, |i, v| {
                out[i] = v;
            });
        }
    }

    let buf = pen.as_mut_slice();
    let mut column = vec![T::Accum::default(); h];
    for x in 0..w {
        binomial_line(h, ry, edge, |i| at[i * w + x], &mut scratch, |i, v| {
            column[i] = v;
        });
        for (y, v) in column.iter().enumerate() {
            buf[(origin.y + y) * stride + origin.x + x] = T::narrow(*v, divisor);
        }
    }
}

/// `[1 4 6 4 1]` separable blur (weights sum to 256), reflecting at edges.
pub fn gaussian_blur_5x5<T, B>(pen: &mut GenericPen<B>, w: usize, h: usize) -> StrataResult<()>
where
    T: Accumulate,
    B: DerefMut<Target = [T]>,
{
    check_region(pen, w, h)?;
    separable_pass(pen, w, h, (2, 2), Edge::Reflect);
    Ok(())
}

/// `[1 2 1]` separable blur (weights sum to 16), clamping at edges.
pub fn gaussian_blur_3x3<T, B>(pen: &mut GenericPen<B>, w: usize, h: usize) -> StrataResult<()>
where
    T: Accumulate,
    B: DerefMut<Target = [T]>,
{
    check_region(pen, w, h)?;
    separable_pass(pen, w, h, (1, 1), Edge::Clamp);
    Ok(())
}

/// Horizontal-only `[1 2 1] / 4`, clamping at edges.
pub fn gaussian_blur_3x1<T, B>(pen: &mut GenericPen<B>, w: usize, h: usize) -> StrataResult<()>
where
    T: Accumulate,
    B: DerefMut<Target = [T]>,
{
    check_region(pen, w, h)?;
    separable_pass(pen, w, h, (1, 0), Edge::Clamp);
    Ok(())
}

/// Vertical-only `[1 2 1] / 4`, clamping at edges.
pub fn gaussian_blur_1x3<T, B>(pen: &mut GenericPen<B>, w: usize, h: usize) -> StrataResult<()>
where
    T: Accumulate,
    B: DerefMut<Target = [T]>,
{
    check_region(pen, w, h)?;
    separable_pass(pen, w, h, (0, 1), Edge::Clamp);
    Ok(())
}

fn check_region<T, B>(pen: &GenericPen<B>, w: usize, h: usize) -> StrataResult<()>
where
    B: DerefMut<Target = [T]>,
{
    let p = pen.pos();
    region_size(pen, PenPos::new(p.x + w, p.y + h)).map(|_| ())
}

/// Run one planned pass on the region.
pub fn apply_gaussian_pass<T, B>(
    pen: &mut GenericPen<B>,
    w: usize,
    h: usize,
    pass: GaussianPass,
) -> StrataResult<()>
where
    T: Accumulate,
    B: DerefMut<Target = [T]>,
{
    match pass {
        GaussianPass::Blur5x5 => gaussian_blur_5x5(pen, w, h),
        GaussianPass::Blur3x3 => gaussian_blur_3x3(pen, w, h),
        GaussianPass::Blur3x1 => gaussian_blur_3x1(pen, w, h),
        GaussianPass::Blur1x3 => gaussian_blur_1x3(pen, w, h),
    }
}

/// Blur the `w x h` region at the pen's cursor in place with the greedy
/// pass decomposition of `(blur_x, blur_y)`.
pub fn gaussian_blur<T, B>(
    pen: &mut GenericPen<B>,
    w: usize,
    h: usize,
    blur_x: usize,
    blur_y: usize,
) -> StrataResult<GaussianPassCounts>
where
    T: Accumulate,
    B: DerefMut<Target = [T]>,
{
    check_region(pen, w, h)?;
    let mut counts = GaussianPassCounts::default();
    for pass in plan_gaussian_passes(blur_x, blur_y) {
        apply_gaussian_pass(pen, w, h, pass)?;
        counts.record(pass);
    }
    Ok(counts)
}

#[cfg(test)]
#[path = "../../tests/unit/blur/gaussian.rs"]
mod tests;
