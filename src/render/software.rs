use crate::blur::boxblur::{box_blur, hbox_blur, vbox_blur};
use crate::blur::disc::disc_blur;
use crate::blur::gaussian::gaussian_blur;
use crate::foundation::core::{Color, VectorInt};
use crate::foundation::error::{StrataError, StrataResult};
use crate::geometry::rect::RectInt;
use crate::surface::blend::BlendMethod;
use crate::surface::buffer::Surface;
use crate::surface::pen::PenPos;
use crate::task::clamp::ClampParams;
use crate::task::node::{Backend, Task, TaskKind};
use crate::task::params::{BlendParams, BlurKind, BlurParams};

use super::target::{SourceLookup, SourceRef, TargetBand};

/// A sub-task's output as seen from its parent.
struct Input<'a> {
    rect: RectInt,
    offset: VectorInt,
    src: SourceRef<'a>,
}

impl<'a> Input<'a> {
    fn of(parent: &Task, sub: &Task, lookup: &'a dyn SourceLookup) -> StrataResult<Self> {
        let src = match sub.target_surface {
            _ if sub.is_empty() => SourceRef::Empty,
            Some(id) if Some(id) == parent.target_surface => SourceRef::Target,
            Some(id) => SourceRef::Surface(lookup.surface(id)?),
            None => {
                return Err(StrataError::execution(format!(
                    "{} sub-task has no surface",
                    sub.kind.name()
                )));
            }
        };
        Ok(Self {
            rect: sub.target_rect,
            offset: sub.target_offset,
            src,
        })
    }

    /// The sub-task's rectangle in the parent's surface space, with the
    /// parent reading it displaced by `shift`.
    fn rect_in(&self, parent: &Task, shift: VectorInt) -> RectInt {
        match self.src {
            SourceRef::Empty => RectInt::zero(),
            _ => self.rect.translate(parent.target_offset - self.offset + shift),
        }
    }

    /// Frame row `fy` from frame column `fx` into `out`. Pixels outside the
    /// sub-task's rectangle read as transparent.
    fn read_row(&self, band: &TargetBand<'_>, fx: i32, fy: i32, out: &mut [Color]) {
        out.fill(Color::transparent());
        let sy = fy + self.offset.y;
        let sx = fx + self.offset.x;
        if sy < self.rect.miny || sy >= self.rect.maxy {
            return;
        }
        let x0 = sx.max(self.rect.minx);
        let x1 = (sx + out.len() as i32).min(self.rect.maxx);
        if x0 >= x1 {
            return;
        }
        let row = match &self.src {
            SourceRef::Surface(s) => &s[sy as usize],
            SourceRef::Target => band.row(sy),
            SourceRef::Empty => return,
        };
        out[(x0 - sx) as usize..(x1 - sx) as usize]
            .copy_from_slice(&row[x0 as usize..x1 as usize]);
    }
}

/// Execute one lowered task into `band`. Sub-tasks must already have run.
pub(crate) fn run(
    task: &Task,
    band: &mut TargetBand<'_>,
    lookup: &dyn SourceLookup,
) -> StrataResult<()> {
    if task.backend != Backend::Software {
        return Err(StrataError::execution(format!(
            "{} task was not lowered to the software backend",
            task.kind.name()
        )));
    }
    let rect = task.target_rect;
    if !rect.valid() {
        return Ok(());
    }
    if !band.rect().contains(&rect) {
        return Err(StrataError::execution(format!(
            "{} task rect {rect:?} outside its target band {:?}",
            task.kind.name(),
            band.rect()
        )));
    }

    match &task.kind {
        TaskKind::Solid { color } => {
            band.fill_rect(rect, *color);
            Ok(())
        }
        TaskKind::Source { surface, origin } => {
            run_source(task, lookup.surface(*surface)?, *origin, band);
            Ok(())
        }
        TaskKind::Clamp(p) => run_clamp(task, p, band, lookup),
        TaskKind::Blend(p) => run_blend(task, p, band, lookup),
        TaskKind::Blur(p) => run_blur(task, p, band, lookup),
        TaskKind::Translate { offset } => run_translate(task, *offset, band, lookup),
        TaskKind::List => Ok(()),
    }
}

fn sub_task(task: &Task, i: usize) -> StrataResult<&Task> {
    task.sub_tasks.get(i).ok_or_else(|| {
        StrataError::execution(format!("{} task is missing sub-task {i}", task.kind.name()))
    })
}

fn run_source(task: &Task, image: &Surface, origin: VectorInt, band: &mut TargetBand<'_>) {
    let rect = task.target_rect;
    band.fill_rect(rect, Color::transparent());
    let placed = image.rect().translate(origin + task.target_offset);
    let r = rect.intersection(&placed);
    if !r.valid() {
        return;
    }
    let row0 = band.row0();
    let mut pen = band.pen();
    pen.move_to(r.minx as usize, r.miny as usize - row0);
    image.blit_to(
        &mut pen,
        r.minx - placed.minx,
        r.miny - placed.miny,
        r.width(),
        r.height(),
        BlendMethod::Straight,
        1.0,
    );
}

/// Walk the rows of `region`, a part of the task's rectangle, handing `f`
/// the frame coordinates of the row start and the output slice.
fn for_each_row(
    task: &Task,
    region: RectInt,
    band: &mut TargetBand<'_>,
    mut f: impl FnMut(&TargetBand<'_>, i32, i32, &mut [Color]),
) {
    if !region.valid() {
        return;
    }
    let mut row = vec![Color::transparent(); region.width() as usize];
    let fx = region.minx - task.target_offset.x;
    for y in region.miny..region.maxy {
        f(&*band, fx, y - task.target_offset.y, &mut row);
        band.row_mut(y)[region.minx as usize..region.maxx as usize].copy_from_slice(&row);
    }
}

/// Clamp writes only where its input has pixels; the rest of its rectangle
/// keeps whatever the target already holds.
fn run_clamp(
    task: &Task,
    params: &ClampParams,
    band: &mut TargetBand<'_>,
    lookup: &dyn SourceLookup,
) -> StrataResult<()> {
    let input = Input::of(task, sub_task(task, 0)?, lookup)?;
    let region = task
        .target_rect
        .intersection(&input.rect_in(task, VectorInt::ZERO));
    for_each_row(task, region, band, |band, fx, fy, row| {
        input.read_row(band, fx, fy, row);
        for px in row.iter_mut() {
            *px = params.clamp_pixel(*px);
        }
    });
    Ok(())
}

fn run_blend(
    task: &Task,
    params: &BlendParams,
    band: &mut TargetBand<'_>,
    lookup: &dyn SourceLookup,
) -> StrataResult<()> {
    let dst = Input::of(task, sub_task(task, 0)?, lookup)?;
    let src = Input::of(task, sub_task(task, 1)?, lookup)?;
    let mut src_row = vec![Color::transparent(); task.target_rect.width() as usize];
    for_each_row(task, task.target_rect, band, |band, fx, fy, row| {
        dst.read_row(band, fx, fy, row);
        src.read_row(band, fx, fy, &mut src_row);
        for (d, s) in row.iter_mut().zip(&src_row) {
            *d = params.method.blend(*s, *d, params.amount);
        }
    });
    Ok(())
}

fn run_translate(
    task: &Task,
    offset: VectorInt,
    band: &mut TargetBand<'_>,
    lookup: &dyn SourceLookup,
) -> StrataResult<()> {
    let input = Input::of(task, sub_task(task, 0)?, lookup)?;
    let region = task.target_rect.intersection(&input.rect_in(task, offset));
    for_each_row(task, region, band, |band, fx, fy, row| {
        input.read_row(band, fx - offset.x, fy - offset.y, row);
    });
    Ok(())
}

fn run_blur(
    task: &Task,
    params: &BlurParams,
    band: &mut TargetBand<'_>,
    lookup: &dyn SourceLookup,
) -> StrataResult<()> {
    let input = Input::of(task, sub_task(task, 0)?, lookup)?;
    let (rx, ry) = params.reach_i32();
    let local = task.frame_rect().expand_x(rx).expand_y(ry);
    let limit = lookup.max_pixels();
    let mut src = Surface::with_limit(local.width() as usize, local.height() as usize, limit)?;
    for j in 0..src.height() {
        input.read_row(band, local.minx, local.miny + j as i32, &mut src[j]);
    }
    let out = blur_surface(params, src, limit)?;

    let (rx, ry) = (rx as usize, ry as usize);
    let rect = task.target_rect;
    for y in rect.miny..rect.maxy {
        let ly = (y - rect.miny) as usize + ry;
        band.row_mut(y)[rect.minx as usize..rect.maxx as usize]
            .copy_from_slice(&out[ly][rx..rx + rect.width() as usize]);
    }
    Ok(())
}

/// Blur a whole surface with clamped edges. Working surfaces are refused
/// above `max_pixels`.
pub(crate) fn blur_surface(
    params: &BlurParams,
    mut src: Surface,
    max_pixels: usize,
) -> StrataResult<Surface> {
    let (w, h) = (src.width(), src.height());
    let end = PenPos::new(w, h);
    let scratch = || Surface::with_limit(w, h, max_pixels);
    match params.kind {
        BlurKind::Disc => {
            let (hl, vl) = params.box_lengths();
            let mut dst = scratch()?;
            if hl > 0 && vl > 0 && w * h > 2 {
                disc_blur(&src.pen_ref(0, 0), end, hl, vl, &mut dst.get_pen(0, 0))?;
            } else {
                box_blur(&src.pen_ref(0, 0), end, hl, vl, &mut dst.get_pen(0, 0))?;
            }
            Ok(dst)
        }
        BlurKind::Box => {
            let (hl, vl) = params.box_lengths();
            let mut dst = scratch()?;
            box_blur(&src.pen_ref(0, 0), end, hl, vl, &mut dst.get_pen(0, 0))?;
            Ok(dst)
        }
        BlurKind::FastGaussian => {
            let (hl, vl) = params.fast_gaussian_lengths();
            let mut tmp = scratch()?;
            box_blur(&src.pen_ref(0, 0), end, hl, vl, &mut tmp.get_pen(0, 0))?;
            box_blur(&tmp.pen_ref(0, 0), end, hl, vl, &mut src.get_pen(0, 0))?;
            Ok(src)
        }
        BlurKind::Gaussian => {
            let (bx, by) = params.gaussian_budget();
            let counts = gaussian_blur(&mut src.get_pen(0, 0), w, h, bx, by)?;
            tracing::trace!(passes = counts.total(), "gaussian blur");
            Ok(src)
        }
        BlurKind::Cross => {
            let (hl, vl) = params.box_lengths();
            let mut horizontal = scratch()?;
            let mut vertical = scratch()?;
            hbox_blur(&src.pen_ref(0, 0), end, hl, &mut horizontal.get_pen(0, 0))?;
            vbox_blur(&src.pen_ref(0, 0), end, vl, &mut vertical.get_pen(0, 0))?;
            for (a, b) in horizontal.pixels_mut().iter_mut().zip(vertical.pixels()) {
                *a = (*a + *b) * 0.5;
            }
            Ok(horizontal)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/software.rs"]
mod tests;
