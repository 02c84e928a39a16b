//! Rewrite passes that turn a generic task tree into a software plan.

pub(crate) mod clamp;
pub(crate) mod lower;
pub(crate) mod split;

use crate::foundation::core::VectorInt;
use crate::foundation::error::StrataResult;
use crate::geometry::rect::RectInt;
use crate::render::arena::{SurfaceArena, SurfaceId};
use crate::render::engine::RenderOpts;
use crate::task::node::Task;

/// A rewrite pass over a task tree.
pub trait Optimizer {
    fn name(&self) -> &'static str;

    fn run(&self, task: &mut Task, cx: &mut OptimizeContext<'_>) -> StrataResult<()>;
}

/// What the passes did, and the scratch surfaces the caller must release
/// once the plan has executed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OptimizeReport {
    pub scratch: Vec<SurfaceId>,
    pub aliased: usize,
    pub tiles: usize,
}

/// State shared by the passes of one optimization run.
pub struct OptimizeContext<'a> {
    pub(crate) arena: &'a mut SurfaceArena,
    pub(crate) opts: &'a RenderOpts,
    pub(crate) report: OptimizeReport,
}

impl<'a> OptimizeContext<'a> {
    pub fn new(arena: &'a mut SurfaceArena, opts: &'a RenderOpts) -> Self {
        Self {
            arena,
            opts,
            report: OptimizeReport::default(),
        }
    }

    pub fn arena(&self) -> &SurfaceArena {
        self.arena
    }

    pub fn report(&self) -> &OptimizeReport {
        &self.report
    }

    pub fn into_report(self) -> OptimizeReport {
        self.report
    }

    /// Allocate a temporary surface sized to `rect`.
    pub(crate) fn alloc_scratch(&mut self, rect: RectInt) -> StrataResult<SurfaceId> {
        let (w, h) = (rect.width().max(0) as usize, rect.height().max(0) as usize);
        let id = self.arena.alloc(w, h, true)?;
        tracing::debug!(surface = %id, w, h, "allocated scratch surface");
        self.report.scratch.push(id);
        Ok(id)
    }

    /// Release a surface allocated by [`OptimizeContext::alloc_scratch`].
    /// Surfaces owned by the caller are left alone.
    pub(crate) fn release_scratch(&mut self, id: SurfaceId) -> StrataResult<()> {
        if let Some(i) = self.report.scratch.iter().position(|s| *s == id) {
            self.report.scratch.swap_remove(i);
            self.arena.release(id)?;
        }
        Ok(())
    }

    /// Drop every scratch surface; used when a run fails half way.
    pub(crate) fn release_all(&mut self) {
        for id in std::mem::take(&mut self.report.scratch) {
            if let Err(e) = self.arena.release(id) {
                tracing::debug!(surface = %id, error = %e, "failed to release scratch surface");
            }
        }
    }
}

/// Point `sub` at its parent's surface. The rectangle is carried through
/// frame space, then truncated to the parent's.
pub(crate) fn alias_to_parent(
    surface: SurfaceId,
    offset: VectorInt,
    rect: RectInt,
    sub: &mut Task,
) {
    sub.target_rect = sub.target_rect.translate(offset - sub.target_offset);
    sub.target_offset = offset;
    sub.target_surface = Some(surface);
    sub.trunc_target_rect(rect);
}

/// Give `sub` a fresh scratch surface the size of its rectangle, with the
/// rectangle's corner at the surface origin.
pub(crate) fn assign_scratch(sub: &mut Task, cx: &mut OptimizeContext<'_>) -> StrataResult<()> {
    let rect = sub.target_rect;
    let id = cx.alloc_scratch(rect)?;
    sub.target_offset = sub.target_offset - rect.min_point();
    sub.target_rect = RectInt::with_size(rect.width(), rect.height());
    sub.target_surface = Some(id);
    Ok(())
}

/// The software pipeline for `opts`, in run order.
pub(crate) fn software_passes(opts: &RenderOpts) -> Vec<Box<dyn Optimizer>> {
    let mut passes: Vec<Box<dyn Optimizer>> = vec![Box::new(lower::LowerSoftware)];
    if opts.parallel {
        passes.push(Box::new(split::SplitTiles));
    }
    passes
}

#[cfg(test)]
#[path = "../../tests/unit/optimize/mod.rs"]
mod tests;
