use smallvec::SmallVec;

use crate::foundation::core::Color;
use crate::foundation::error::{StrataError, StrataResult};
use crate::geometry::rect::RectInt;
use crate::surface::buffer::Surface;
use crate::surface::pen::Pen;

use super::arena::{SurfaceArena, SurfaceId};

/// Writable window over the whole rows `[row0, row0 + height)` of a surface.
///
/// Row arguments are surface rows, not band-relative.
pub(crate) struct TargetBand<'a> {
    data: &'a mut [Color],
    width: usize,
    row0: usize,
    height: usize,
}

impl<'a> TargetBand<'a> {
    pub(crate) fn new(data: &'a mut [Color], width: usize, row0: usize) -> Self {
        let height = data.len().checked_div(width).unwrap_or(0);
        Self {
            data,
            width,
            row0,
            height,
        }
    }

    pub(crate) fn whole(surface: &'a mut Surface) -> Self {
        let width = surface.width();
        Self::new(surface.pixels_mut(), width, 0)
    }

    /// Cut `data` into bands for the ascending, disjoint row ranges `rows`.
    /// Rows between ranges are skipped.
    pub(crate) fn split_rows(
        mut data: &'a mut [Color],
        width: usize,
        rows: &[(usize, usize)],
    ) -> Vec<TargetBand<'a>> {
        let mut bands = Vec::with_capacity(rows.len());
        let mut at = 0;
        for &(start, end) in rows {
            let (_, rest) = std::mem::take(&mut data).split_at_mut((start - at) * width);
            let (band, rest) = rest.split_at_mut((end - start) * width);
            bands.push(TargetBand::new(band, width, start));
            data = rest;
            at = end;
        }
        bands
    }

    pub(crate) fn rect(&self) -> RectInt {
        RectInt::new(
            0,
            self.row0 as i32,
            self.width as i32,
            (self.row0 + self.height) as i32,
        )
    }

    pub(crate) fn row0(&self) -> usize {
        self.row0
    }

    pub(crate) fn row(&self, y: i32) -> &[Color] {
        let start = (y as usize - self.row0) * self.width;
        &self.data[start..start + self.width]
    }

    pub(crate) fn row_mut(&mut self, y: i32) -> &mut [Color] {
        let start = (y as usize - self.row0) * self.width;
        &mut self.data[start..start + self.width]
    }

    pub(crate) fn fill_rect(&mut self, rect: RectInt, c: Color) {
        let r = rect.intersection(&self.rect());
        if !r.valid() {
            return;
        }
        for y in r.miny..r.maxy {
            self.row_mut(y)[r.minx as usize..r.maxx as usize].fill(c);
        }
    }

    /// Pen over the band; its cursor rows are band-relative.
    pub(crate) fn pen(&mut self) -> Pen<'_, Color> {
        Pen::from_parts(&mut self.data[..], self.width, self.height)
    }
}

/// Where a sub-task's pixels are read from.
pub(crate) enum SourceRef<'a> {
    Surface(&'a Surface),
    /// The sub-task wrote into the band its parent is writing.
    Target,
    /// Nothing was rendered; every pixel reads as transparent.
    Empty,
}

/// Read access to surfaces other than the one being written.
pub(crate) trait SourceLookup {
    fn surface(&self, id: SurfaceId) -> StrataResult<&Surface>;

    /// Pixel cap for working buffers a task allocates on its own.
    fn max_pixels(&self) -> usize;
}

impl SourceLookup for SurfaceArena {
    fn surface(&self, id: SurfaceId) -> StrataResult<&Surface> {
        self.get(id)
    }

    fn max_pixels(&self) -> usize {
        SurfaceArena::max_pixels(self)
    }
}

/// Where the executor finds the surfaces a task tree writes.
pub(crate) trait SurfaceStore {
    /// Whether the progress callback is polled between tasks.
    fn polls(&self) -> bool;

    /// The arena itself when the store owns it exclusively.
    fn arena_mut(&mut self) -> Option<&mut SurfaceArena>;

    /// Run `f` with a writable band over surface `id` and read access to
    /// every other surface.
    fn with_target<R>(
        &mut self,
        id: SurfaceId,
        f: impl FnOnce(&mut TargetBand<'_>, &dyn SourceLookup) -> StrataResult<R>,
    ) -> StrataResult<R>;
}

/// Sequential store: surfaces are checked out of the arena one at a time.
pub(crate) struct ArenaStore<'a> {
    pub(crate) arena: &'a mut SurfaceArena,
}

impl SurfaceStore for ArenaStore<'_> {
    fn polls(&self) -> bool {
        true
    }

    fn arena_mut(&mut self) -> Option<&mut SurfaceArena> {
        Some(&mut *self.arena)
    }

    fn with_target<R>(
        &mut self,
        id: SurfaceId,
        f: impl FnOnce(&mut TargetBand<'_>, &dyn SourceLookup) -> StrataResult<R>,
    ) -> StrataResult<R> {
        let mut surface = self.arena.take(id)?;
        let out = f(&mut TargetBand::whole(&mut surface), &*self.arena);
        self.arena.restore(id, surface)?;
        out
    }
}

pub(crate) type PrivateSurfaces = SmallVec<[(SurfaceId, Surface); 4]>;

struct TileLookup<'s> {
    private: &'s [(SurfaceId, Surface)],
    arena: &'s SurfaceArena,
}

impl SourceLookup for TileLookup<'_> {
    fn surface(&self, id: SurfaceId) -> StrataResult<&Surface> {
        match self.private.iter().find(|(p, _)| *p == id) {
            Some((_, s)) => Ok(s),
            None => self.arena.get(id),
        }
    }

    fn max_pixels(&self) -> usize {
        self.arena.max_pixels()
    }
}

/// Store for one tile: the tile's band of the shared surface, its private
/// scratch surfaces, and read-only access to the arena.
pub(crate) struct TileStore<'a> {
    shared: SurfaceId,
    band: TargetBand<'a>,
    private: PrivateSurfaces,
    arena: &'a SurfaceArena,
}

impl<'a> TileStore<'a> {
    pub(crate) fn new(
        shared: SurfaceId,
        band: TargetBand<'a>,
        private: PrivateSurfaces,
        arena: &'a SurfaceArena,
    ) -> Self {
        Self {
            shared,
            band,
            private,
            arena,
        }
    }

    pub(crate) fn into_private(self) -> PrivateSurfaces {
        self.private
    }
}

impl SurfaceStore for TileStore<'_> {
    fn polls(&self) -> bool {
        false
    }

    fn arena_mut(&mut self) -> Option<&mut SurfaceArena> {
        None
    }

    fn with_target<R>(
        &mut self,
        id: SurfaceId,
        f: impl FnOnce(&mut TargetBand<'_>, &dyn SourceLookup) -> StrataResult<R>,
    ) -> StrataResult<R> {
        if id == self.shared {
            let lookup = TileLookup {
                private: &self.private,
                arena: self.arena,
            };
            return f(&mut self.band, &lookup);
        }
        let i = self
            .private
            .iter()
            .position(|(p, _)| *p == id)
            .ok_or_else(|| StrataError::execution(format!("surface {id} is not owned by this tile")))?;
        let mut surface = std::mem::take(&mut self.private[i].1);
        let lookup = TileLookup {
            private: &self.private,
            arena: self.arena,
        };
        let out = f(&mut TargetBand::whole(&mut surface), &lookup);
        self.private[i].1 = surface;
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/target.rs"]
mod tests;
