use std::ops::{Deref, DerefMut};

use crate::foundation::error::{StrataError, StrataResult};
use crate::surface::pen::{GenericPen, Pen, PenPos};

use super::accum::Accumulate;

/// Width and height of the region `[pen.pos(), end)`.
pub(crate) fn region_size<B, T>(pen: &GenericPen<B>, end: PenPos) -> StrataResult<(usize, usize)>
where
    B: Deref<Target = [T]>,
{
    let off = end - pen.pos();
    if off.dx < 0 || off.dy < 0 || end.x > pen.width() || end.y > pen.height() {
        return Err(StrataError::validation(format!(
            "blur region {:?}..{end:?} outside {}x{} buffer",
            pen.pos(),
            pen.width(),
            pen.height()
        )));
    }
    Ok((off.dx as usize, off.dy as usize))
}

pub(crate) fn check_dst<B, T>(dst: &GenericPen<B>, w: usize, h: usize) -> StrataResult<()>
where
    B: Deref<Target = [T]>,
{
    let room = dst.end() - dst.pos();
    if (room.dx as usize) < w || (room.dy as usize) < h {
        return Err(StrataError::validation(format!(
            "blur destination at {:?} cannot hold {w}x{h}",
            dst.pos()
        )));
    }
    Ok(())
}

fn check_window<T: Accumulate>(length: usize) -> StrataResult<u32> {
    let window = length
        .checked_mul(2)
        .and_then(|v| v.checked_add(1))
        .filter(|w| *w <= T::max_window() && *w <= u32::MAX as usize)
        .ok_or_else(|| {
            StrataError::validation(format!(
                "box window of length {length} exceeds accumulator capacity of {} samples",
                T::max_window()
            ))
        })?;
    Ok(window as u32)
}

/// Running window sums over one line of `n` samples read through `sample`.
///
/// `emit(i, sum)` receives the sum of `sample(clamp(i + j))` for `j` in
/// `-length..=length`, indices clamped to `[0, n - 1]`.
pub(crate) fn running_sums<T: Accumulate>(
    n: usize,
    length: usize,
    sample: impl Fn(usize) -> T,
    mut emit: impl FnMut(usize, T::Accum),
) {
    if n == 0 {
        return;
    }
    let last = n - 1;
    let at = |i: isize| -> T::Accum { sample(i.clamp(0, last as isize) as usize).widen() };
    let k = length as isize;

    let mut sum = T::Accum::default();
    for j in -k..=k {
        sum = sum + at(j);
    }
    for i in 0..n {
        emit(i, sum);
        let i = i as isize;
        sum = sum - at(i - k) + at(i + k + 1);
    }
}

/// Box filter over one line: the running sums divided by the window.
fn box_line<T: Accumulate>(
    n: usize,
    length: usize,
    window: u32,
    sample: impl Fn(usize) -> T,
    mut write: impl FnMut(usize, T),
) {
    running_sums(n, length, sample, |i, sum| write(i, T::narrow(sum, window)));
}

/// Horizontal box blur of `[src.pos(), end)` into `dst` at its cursor.
pub fn hbox_blur<T, SB, DB>(
    src: &GenericPen<SB>,
    end: PenPos,
    length: usize,
    dst: &mut GenericPen<DB>,
) -> StrataResult<()>
where
    T: Accumulate,
    SB: Deref<Target = [T]>,
    DB: DerefMut<Target = [T]>,
{
    let (w, h) = region_size(src, end)?;
    check_dst(dst, w, h)?;
    let window = check_window::<T>(length)?;
    let (sp, dp) = (src.pos(), dst.pos());
    for y in 0..h {
        let row = &src.row(sp.y + y)[sp.x..sp.x + w];
        let out = &mut dst.row_mut(dp.y + y)[dp.x..dp.x + w];
        box_line(w, length, window, |i| row[i], |i, v| out[i] = v);
    }
    Ok(())
}

/// Vertical box blur of `[src.pos(), end)` into `dst` at its cursor.
pub fn vbox_blur<T, SB, DB>(
    src: &GenericPen<SB>,
    end: PenPos,
    length: usize,
    dst: &mut GenericPen<DB>,
) -> StrataResult<()>
where
    T: Accumulate,
    SB: Deref<Target = [T]>,
    DB: DerefMut<Target = [T]>,
{
    let (w, h) = region_size(src, end)?;
    check_dst(dst, w, h)?;
    let window = check_window::<T>(length)?;
    let (sp, dp) = (src.pos(), dst.pos());
    let (sw, dw) = (src.width(), dst.width());
    let (src_buf, dst_buf) = (src.as_slice(), dst.as_mut_slice());
    for x in 0..w {
        box_line(
            h,
            length,
            window,
            |i| src_buf[(sp.y + i) * sw + sp.x + x],
            |i, v| dst_buf[(dp.y + i) * dw + dp.x + x] = v,
        );
    }
    Ok(())
}

/// Separable box blur: horizontal with `hlength`, then vertical with
/// `vlength`, through a scratch buffer the size of the region.
pub fn box_blur<T, SB, DB>(
    src: &GenericPen<SB>,
    end: PenPos,
    hlength: usize,
    vlength: usize,
    dst: &mut GenericPen<DB>,
) -> StrataResult<()>
where
    T: Accumulate,
    SB: Deref<Target = [T]>,
    DB: DerefMut<Target = [T]>,
{
    let (w, h) = region_size(src, end)?;
    let mut tmp = vec![T::default(); w * h];
    let mut tmp_pen = Pen::new(&mut tmp[..], w, h)?;
    hbox_blur(src, end, hlength, &mut tmp_pen)?;
    vbox_blur(&tmp_pen, PenPos::new(w, h), vlength, dst)
}

#[cfg(test)]
#[path = "../../tests/unit/blur/boxblur.rs"]
mod tests;
