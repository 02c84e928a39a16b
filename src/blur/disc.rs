use std::ops::{Deref, DerefMut};

use crate::foundation::error::{StrataError, StrataResult};
use crate::surface::pen::{GenericPen, PenPos};

use super::accum::Accumulate;
use super::boxblur::{check_dst, region_size, running_sums};

/// Half-width of every row of the elliptic mask with radii `(rx, ry)`.
///
/// Entry `i` covers mask row `dy = i - ry` and holds the largest `dx` with
/// `(dx / rx)^2 + (dy / ry)^2 <= 1`. A zero `ry` yields the single row `rx`.
pub fn disc_spans(rx: usize, ry: usize) -> Vec<usize> {
    if ry == 0 {
        return vec![rx];
    }
    let rx2 = (rx as u128).pow(2);
    let ry2 = (ry as u128).pow(2);
    let limit = rx2 * ry2;
    (0..=2 * ry)
        .map(|i| {
            let dy = i.abs_diff(ry) as u128;
            let bound = (limit - dy * dy * rx2) / ry2;
            usize::try_from(bound.isqrt()).unwrap_or(usize::MAX)
        })
        .collect()
}

fn mask_count<T: Accumulate>(spans: &[usize], rx: usize, ry: usize) -> StrataResult<u32> {
    spans
        .iter()
        .try_fold(0usize, |acc, s| s.checked_mul(2)?.checked_add(1)?.checked_add(acc))
        .filter(|n| *n <= T::max_window() && *n <= u32::MAX as usize)
        .map(|n| n as u32)
        .ok_or_else(|| {
            StrataError::validation(format!(
                "disc of radii ({rx}, {ry}) exceeds accumulator capacity of {} samples",
                T::max_window()
            ))
        })
}

/// Disc blur of `[src.pos(), end)` into `dst` at its cursor.
///
/// Each output is the mean of the samples under an ellipse with radii
/// `(rx, ry)` centred on it, indices clamped to the region.
pub fn disc_blur<T, SB, DB>(
    src: &GenericPen<SB>,
    end: PenPos,
    rx: usize,
    ry: usize,
    dst: &mut GenericPen<DB>,
) -> StrataResult<()>
where
    T: Accumulate,
    SB: Deref<Target = [T]>,
    DB: DerefMut<Target = [T]>,
{
    let (w, h) = region_size(src, end)?;
    check_dst(dst, w, h)?;
    let spans = disc_spans(rx, ry);
    let count = mask_count::<T>(&spans, rx, ry)?;
    if w == 0 || h == 0 {
        return Ok(());
    }

    let mut acc = vec![T::Accum::default(); w * h];
    let sp = src.pos();
    let last = (h - 1) as isize;
    for (i, &span) in spans.iter().enumerate() {
        let dy = i as isize - ry as isize;
        for (y, out) in acc.chunks_exact_mut(w).enumerate() {
            let sy = (y as isize + dy).clamp(0, last) as usize;
            let line = &src.row(sp.y + sy)[sp.x..sp.x + w];
            running_sums(w, span, |x| line[x], |x, sum| out[x] = out[x] + sum);
        }
    }

    let dp = dst.pos();
    for (y, sums) in acc.chunks_exact(w).enumerate() {
        let out = &mut dst.row_mut(dp.y + y)[dp.x..dp.x + w];
        for (o, s) in out.iter_mut().zip(sums) {
            *o = T::narrow(*s, count);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/blur/disc.rs"]
mod tests;
