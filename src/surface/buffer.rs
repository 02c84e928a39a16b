use std::ops::{Index, IndexMut};

use crate::foundation::core::Color;
use crate::foundation::error::{StrataError, StrataResult};
use crate::geometry::rect::RectInt;

use super::blend::BlendMethod;
use super::pen::{Pen, PenRef};

/// Which code path a [`Surface::blit_to`] call took.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlitPath {
    /// The clipped rectangle was empty; nothing was written.
    Skipped,
    /// Rows were copied verbatim.
    RowCopy,
    /// Every pixel went through the blend function.
    Composite,
}

/// Owned row-major buffer of float colours.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Surface {
    width: usize,
    height: usize,
    data: Vec<Color>,
}

fn alloc_pixels(width: usize, height: usize, max_pixels: usize) -> StrataResult<Vec<Color>> {
    let n = width
        .checked_mul(height)
        .filter(|n| *n <= max_pixels)
        .ok_or_else(|| StrataError::allocation(width, height))?;
    let mut data = Vec::new();
    data.try_reserve_exact(n)
        .map_err(|_| StrataError::allocation(width, height))?;
    data.resize(n, Color::transparent());
    Ok(data)
}

impl Surface {
    /// Transparent `width x height` surface.
    pub fn new(width: usize, height: usize) -> StrataResult<Self> {
        Self::with_limit(width, height, usize::MAX)
    }

    /// Like [`Surface::new`], refusing more than `max_pixels` pixels.
    pub fn with_limit(width: usize, height: usize, max_pixels: usize) -> StrataResult<Self> {
        Ok(Self {
            width,
            height,
            data: alloc_pixels(width, height, max_pixels)?,
        })
    }

    pub fn from_pixels(width: usize, height: usize, data: Vec<Color>) -> StrataResult<Self> {
        if width.checked_mul(height) != Some(data.len()) {
            return Err(StrataError::validation(format!(
                "{} pixels do not form a {width}x{height} surface",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn rect(&self) -> RectInt {
        RectInt::with_size(self.width as i32, self.height as i32)
    }

    pub fn pixels(&self) -> &[Color] {
        &self.data
    }

    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.data
    }

    pub fn into_pixels(self) -> Vec<Color> {
        self.data
    }

    /// Reallocate as a transparent `width x height` surface.
    pub fn set_size(&mut self, width: usize, height: usize) -> StrataResult<()> {
        self.data = alloc_pixels(width, height, usize::MAX)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn fill(&mut self, c: Color) {
        self.data.fill(c);
    }

    /// Fill the part of `rect` that lies inside the surface.
    pub fn fill_rect(&mut self, rect: RectInt, c: Color) {
        let r = rect.intersection(&self.rect());
        if !r.valid() {
            return;
        }
        for y in r.miny..r.maxy {
            self[y as usize][r.minx as usize..r.maxx as usize].fill(c);
        }
    }

    pub fn clear(&mut self) {
        self.fill(Color::transparent());
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        (x < self.width && y < self.height).then(|| self.data[y * self.width + x])
    }

    /// Writing pen with the cursor at `(x, y)`.
    pub fn get_pen(&mut self, x: usize, y: usize) -> Pen<'_, Color> {
        let (w, h) = (self.width, self.height);
        let mut pen = Pen::from_parts(&mut self.data[..], w, h);
        pen.move_to(x.min(w), y.min(h));
        pen
    }

    /// Reading pen with the cursor at `(x, y)`.
    pub fn pen_ref(&self, x: usize, y: usize) -> PenRef<'_, Color> {
        let mut pen = PenRef::from_parts(&self.data[..], self.width, self.height);
        pen.move_to(x.min(self.width), y.min(self.height));
        pen
    }

    /// Copy the `w x h` block at `(x, y)` of this surface onto `dst`, starting
    /// at the destination cursor.
    ///
    /// The block is clipped against both surfaces; an empty result returns
    /// [`BlitPath::Skipped`]. `Straight` at full amount copies rows directly,
    /// anything else blends per pixel.
    #[allow(clippy::too_many_arguments)]
    pub fn blit_to(
        &self,
        dst: &mut Pen<'_, Color>,
        mut x: i32,
        mut y: i32,
        mut w: i32,
        mut h: i32,
        method: BlendMethod,
        amount: f32,
    ) -> BlitPath {
        let (sw, sh) = (self.width as i64, self.height as i64);
        if i64::from(x) >= sw || i64::from(y) >= sh {
            return BlitPath::Skipped;
        }
        if x < 0 {
            w += x;
            x = 0;
        }
        if y < 0 {
            h += y;
            y = 0;
        }
        let off = dst.end() - dst.pos();
        let w = i64::from(w).min(off.dx as i64).min(sw - i64::from(x));
        let h = i64::from(h).min(off.dy as i64).min(sh - i64::from(y));
        if w <= 0 || h <= 0 {
            return BlitPath::Skipped;
        }
        let (x, y, w, h) = (x as usize, y as usize, w as usize, h as usize);
        let origin = dst.pos();

        if method == BlendMethod::Straight && amount == 1.0 {
            for row in 0..h {
                let src = &self[y + row][x..x + w];
                dst.row_mut(origin.y + row)[origin.x..origin.x + w].copy_from_slice(src);
            }
            return BlitPath::RowCopy;
        }

        for row in 0..h {
            let src = &self[y + row][x..x + w];
            let out = &mut dst.row_mut(origin.y + row)[origin.x..origin.x + w];
            for (d, s) in out.iter_mut().zip(src) {
                *d = method.blend(*s, *d, amount);
            }
        }
        BlitPath::Composite
    }
}

impl Index<usize> for Surface {
    type Output = [Color];

    fn index(&self, y: usize) -> &[Color] {
        &self.data[y * self.width..(y + 1) * self.width]
    }
}

impl IndexMut<usize> for Surface {
    fn index_mut(&mut self, y: usize) -> &mut [Color] {
        &mut self.data[y * self.width..(y + 1) * self.width]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/buffer.rs"]
mod tests;
