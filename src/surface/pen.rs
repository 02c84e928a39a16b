use std::ops::{Deref, DerefMut, Sub};

use crate::foundation::error::{StrataError, StrataResult};

/// Cursor position inside a pen's buffer, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PenPos {
    pub x: usize,
    pub y: usize,
}

impl PenPos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Difference between two cursor positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PenOffset {
    pub dx: isize,
    pub dy: isize,
}

impl Sub for PenPos {
    type Output = PenOffset;

    fn sub(self, rhs: Self) -> PenOffset {
        PenOffset {
            dx: self.x as isize - rhs.x as isize,
            dy: self.y as isize - rhs.y as isize,
        }
    }
}

/// A cursor over a row-major 2-D buffer.
///
/// The buffer is any slice-like storage; [`Pen`] writes through `&mut [T]`
/// and [`PenRef`] only reads through `&[T]`. The cursor may sit anywhere in
/// `[0, width] x [0, height]`; reading at the one-past-the-end position is
/// out of bounds.
#[derive(Debug)]
pub struct GenericPen<B> {
    buf: B,
    width: usize,
    height: usize,
    x: usize,
    y: usize,
}

pub type Pen<'a, T> = GenericPen<&'a mut [T]>;
pub type PenRef<'a, T> = GenericPen<&'a [T]>;

impl<B, T> GenericPen<B>
where
    B: Deref<Target = [T]>,
{
    /// Wrap `buf` as a `width x height` image with the cursor at the origin.
    pub fn new(buf: B, width: usize, height: usize) -> StrataResult<Self> {
        let needed = width
            .checked_mul(height)
            .ok_or_else(|| StrataError::allocation(width, height))?;
        if buf.len() < needed {
            return Err(StrataError::validation(format!(
                "pen buffer holds {} values, {width}x{height} needs {needed}",
                buf.len()
            )));
        }
        Ok(Self {
            buf,
            width,
            height,
            x: 0,
            y: 0,
        })
    }

    /// Wrap a buffer already known to hold `width * height` values.
    pub(crate) fn from_parts(buf: B, width: usize, height: usize) -> Self {
        debug_assert!(buf.len() >= width * height);
        Self {
            buf,
            width,
            height,
            x: 0,
            y: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pos(&self) -> PenPos {
        PenPos::new(self.x, self.y)
    }

    /// One past the last pixel of the buffer.
    pub fn end(&self) -> PenPos {
        PenPos::new(self.width, self.height)
    }

    pub fn move_to(&mut self, x: usize, y: usize) {
        debug_assert!(x <= self.width && y <= self.height);
        self.x = x;
        self.y = y;
    }

    pub fn move_by(&mut self, dx: isize, dy: isize) {
        self.x = self.x.saturating_add_signed(dx);
        self.y = self.y.saturating_add_signed(dy);
        debug_assert!(self.x <= self.width && self.y <= self.height);
    }

    pub fn inc_x(&mut self) {
        self.x += 1;
    }

    pub fn dec_x(&mut self) {
        self.x -= 1;
    }

    pub fn inc_y(&mut self) {
        self.y += 1;
    }

    pub fn dec_y(&mut self) {
        self.y -= 1;
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    fn offset_index(&self, dx: isize, dy: isize) -> Option<usize> {
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        (x < self.width && y < self.height).then(|| self.index(x, y))
    }

    /// Remainder of the current row, starting at the cursor. Empty once the
    /// cursor is past the last row.
    pub fn x(&self) -> &[T] {
        if self.y >= self.height || self.x >= self.width {
            return &[];
        }
        let start = self.index(self.x, self.y);
        let end = self.index(self.width, self.y);
        &self.buf[start..end]
    }

    /// Remainder of the current column, starting at the cursor.
    pub fn y<'a>(&'a self) -> impl Iterator<Item = &'a T> + 'a
    where
        T: 'a,
    {
        let start = self.index(self.x, self.y);
        let len = if self.x < self.width {
            self.height.saturating_sub(self.y)
        } else {
            0
        };
        self.buf[start.min(self.buf.len())..]
            .iter()
            .step_by(self.width.max(1))
            .take(len)
    }

    pub fn row(&self, y: usize) -> &[T] {
        let start = self.index(0, y);
        &self.buf[start..start + self.width]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.buf[..self.width * self.height]
    }

    /// Read-only view sharing this pen's buffer and cursor.
    pub fn as_pen_ref(&self) -> PenRef<'_, T> {
        GenericPen {
            buf: &self.buf[..],
            width: self.width,
            height: self.height,
            x: self.x,
            y: self.y,
        }
    }
}

impl<B, T> GenericPen<B>
where
    B: Deref<Target = [T]>,
    T: Copy,
{
    pub fn get_value(&self) -> T {
        self.buf[self.index(self.x, self.y)]
    }

    /// Value at `(dx, dy)` relative to the cursor. Panics out of bounds.
    pub fn get(&self, dx: isize, dy: isize) -> T {
        let x = self.x as isize + dx;
        let y = self.y as isize + dy;
        assert!(
            x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height,
            "pen read at ({x}, {y}) outside {}x{}",
            self.width,
            self.height
        );
        self.buf[self.index(x as usize, y as usize)]
    }

    pub fn try_get(&self, dx: isize, dy: isize) -> Option<T> {
        self.offset_index(dx, dy).map(|i| self.buf[i])
    }
}

impl<B, T> GenericPen<B>
where
    B: DerefMut<Target = [T]>,
{
    pub fn x_mut(&mut self) -> &mut [T] {
        if self.y >= self.height || self.x >= self.width {
            return &mut [];
        }
        let start = self.index(self.x, self.y);
        let end = self.index(self.width, self.y);
        &mut self.buf[start..end]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let start = self.index(0, y);
        let w = self.width;
        &mut self.buf[start..start + w]
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let n = self.width * self.height;
        &mut self.buf[..n]
    }

    /// Mutable view sharing this pen's buffer and cursor.
    pub fn reborrow(&mut self) -> Pen<'_, T> {
        GenericPen {
            buf: &mut self.buf[..],
            width: self.width,
            height: self.height,
            x: self.x,
            y: self.y,
        }
    }

    pub fn put_value(&mut self, v: T) {
        let i = self.index(self.x, self.y);
        self.buf[i] = v;
    }

    /// Write `v` at `(dx, dy)` relative to the cursor. Panics out of bounds.
    pub fn put(&mut self, dx: isize, dy: isize, v: T) {
        let Some(i) = self.offset_index(dx, dy) else {
            panic!(
                "pen write at offset ({dx}, {dy}) from ({}, {}) outside {}x{}",
                self.x, self.y, self.width, self.height
            );
        };
        self.buf[i] = v;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/pen.rs"]
mod tests;
