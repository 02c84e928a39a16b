use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::foundation::core::VectorInt;
use crate::foundation::error::{StrataError, StrataResult};
use crate::geometry::rect::RectInt;
use crate::geometry::region::DamageRegion;
use crate::optimize::{OptimizeContext, OptimizeReport, software_passes};
use crate::task::node::{Task, TaskKind, TaskState};

use super::arena::{SurfaceArena, SurfaceId};
use super::software;
use super::target::{ArenaStore, PrivateSurfaces, SurfaceStore, TargetBand, TileStore};

/// Renderer configuration.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderOpts {
    /// Let clamps render their input in place when it is scratch.
    pub in_place: bool,
    /// Render tiles of split tasks on a rayon pool.
    pub parallel: bool,
    pub threads: Option<usize>,
    /// Height of a tile band.
    pub tile_rows: usize,
    /// Tasks shorter than this are never split.
    pub min_split_rows: usize,
    pub max_surface_pixels: usize,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            in_place: true,
            parallel: false,
            threads: None,
            tile_rows: 64,
            min_split_rows: 128,
            max_surface_pixels: 1 << 28,
        }
    }
}

fn env_usize(name: &str) -> Option<usize> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&n| n > 0)
}

impl RenderOpts {
    /// Apply `STRATA_THREADS`, `STRATA_TILE_ROWS` and `STRATA_PARALLEL`.
    /// Unparsable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(n) = env_usize("STRATA_THREADS") {
            self.threads = Some(n);
        }
        if let Some(n) = env_usize("STRATA_TILE_ROWS") {
            self.tile_rows = n;
        }
        if let Ok(v) = std::env::var("STRATA_PARALLEL") {
            match v.trim() {
                "1" | "true" | "yes" | "on" => self.parallel = true,
                "0" | "false" | "no" | "off" => self.parallel = false,
                _ => {}
            }
        }
        self
    }

    pub fn validate(&self) -> StrataResult<()> {
        if self.threads == Some(0) {
            return Err(StrataError::validation(
                "render option 'threads' must be >= 1 when set",
            ));
        }
        if self.tile_rows == 0 {
            return Err(StrataError::validation("render option 'tile_rows' must be >= 1"));
        }
        if self.max_surface_pixels == 0 {
            return Err(StrataError::validation(
                "render option 'max_surface_pixels' must be >= 1",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub tasks_run: usize,
    pub tiles_run: usize,
    pub surfaces_allocated: usize,
    pub aliased: usize,
}

impl RenderStats {
    fn absorb(&mut self, other: RenderStats) {
        self.tasks_run += other.tasks_run;
        self.tiles_run += other.tiles_run;
        self.surfaces_allocated += other.surfaces_allocated;
        self.aliased += other.aliased;
    }
}

/// Polled between tasks and tiles; returning `false` cancels the render.
pub trait ProgressCallback: Sync {
    fn amount_complete(&self, done: usize, total: usize) -> bool;
}

impl<F> ProgressCallback for F
where
    F: Fn(usize, usize) -> bool + Sync,
{
    fn amount_complete(&self, done: usize, total: usize) -> bool {
        self(done, total)
    }
}

/// Never cancels.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn amount_complete(&self, _done: usize, _total: usize) -> bool {
        true
    }
}

/// Execution state shared across tiles.
struct ExecCx<'a> {
    progress: &'a dyn ProgressCallback,
    pool: Option<&'a rayon::ThreadPool>,
    total: usize,
    done: AtomicUsize,
    tasks_run: AtomicUsize,
    tiles_run: AtomicUsize,
    cancelled: AtomicBool,
}

impl ExecCx<'_> {
    fn poll(&self) -> StrataResult<()> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Err(StrataError::Cancelled);
        }
        let done = self.done.load(Ordering::Relaxed);
        if !self.progress.amount_complete(done, self.total) {
            self.cancelled.store(true, Ordering::Relaxed);
            tracing::warn!(done, total = self.total, "render cancelled by progress callback");
            return Err(StrataError::Cancelled);
        }
        Ok(())
    }

    fn finish(&self, tasks: usize) {
        self.done.fetch_add(tasks, Ordering::Relaxed);
    }
}

fn build_thread_pool(threads: Option<usize>) -> StrataResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(StrataError::validation(
            "render option 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| StrataError::execution(format!("failed to build rayon thread pool: {e}")))
}

/// Optimizes and executes task trees against a [`SurfaceArena`].
pub struct Renderer {
    opts: RenderOpts,
    pool: Option<rayon::ThreadPool>,
}

impl Renderer {
    pub fn new(opts: RenderOpts) -> StrataResult<Self> {
        opts.validate()?;
        let pool = if opts.parallel {
            Some(build_thread_pool(opts.threads)?)
        } else {
            None
        };
        Ok(Self { opts, pool })
    }

    pub fn opts(&self) -> &RenderOpts {
        &self.opts
    }

    /// Run the software passes over a task whose root already owns a
    /// surface. On failure every scratch surface allocated so far is
    /// released.
    #[tracing::instrument(skip(self, task, arena))]
    pub fn optimize(&self, task: &mut Task, arena: &mut SurfaceArena) -> StrataResult<OptimizeReport> {
        task.validate()?;
        arena.set_max_pixels(self.opts.max_surface_pixels);
        let mut cx = OptimizeContext::new(arena, &self.opts);
        for pass in software_passes(&self.opts) {
            if let Err(e) = pass.run(task, &mut cx) {
                tracing::debug!(pass = pass.name(), error = %e, "optimizer pass failed");
                cx.release_all();
                return Err(e);
            }
        }
        let report = cx.into_report();
        tracing::debug!(
            scratch = report.scratch.len(),
            aliased = report.aliased,
            tiles = report.tiles,
            "optimized task tree"
        );
        Ok(report)
    }

    /// Execute an optimized tree bottom-up.
    #[tracing::instrument(skip(self, task, arena, progress))]
    pub fn execute(
        &self,
        task: &mut Task,
        arena: &mut SurfaceArena,
        progress: &dyn ProgressCallback,
    ) -> StrataResult<RenderStats> {
        let cx = ExecCx {
            progress,
            pool: self.pool.as_ref(),
            total: task.task_count(),
            done: AtomicUsize::new(0),
            tasks_run: AtomicUsize::new(0),
            tiles_run: AtomicUsize::new(0),
            cancelled: AtomicBool::new(false),
        };
        run_node(task, &mut ArenaStore { arena }, &cx)?;
        // Everything has been written; a late stop request changes nothing.
        let _ = progress.amount_complete(cx.total, cx.total);
        Ok(RenderStats {
            tasks_run: cx.tasks_run.into_inner(),
            tiles_run: cx.tiles_run.into_inner(),
            ..RenderStats::default()
        })
    }

    /// Render `task` (frame space) into the whole of surface `target`.
    ///
    /// Pixels of `target` outside the task's rectangle are left untouched.
    #[tracing::instrument(skip(self, task, arena, progress))]
    pub fn render(
        &self,
        task: Task,
        arena: &mut SurfaceArena,
        target: SurfaceId,
        progress: &dyn ProgressCallback,
    ) -> StrataResult<RenderStats> {
        let bounds = arena.get(target)?.rect();
        self.render_rect(task, arena, target, bounds, progress)
    }

    /// Re-render only the merged rectangles of `damage` into `target`.
    #[tracing::instrument(skip(self, task, arena, damage, progress))]
    pub fn render_damage(
        &self,
        task: &Task,
        arena: &mut SurfaceArena,
        target: SurfaceId,
        damage: &DamageRegion,
        progress: &dyn ProgressCallback,
    ) -> StrataResult<RenderStats> {
        let bounds = arena.get(target)?.rect();
        let mut region = damage.clone();
        region.merge();
        let mut stats = RenderStats::default();
        for rect in region.rects() {
            let r = rect.intersection(&bounds);
            if !r.valid() {
                continue;
            }
            stats.absorb(self.render_rect(task.clone(), arena, target, r, progress)?);
        }
        Ok(stats)
    }

    /// Bind `task` to the whole of `target` and optimize it without
    /// executing. The caller owns the returned scratch surfaces.
    pub fn plan(
        &self,
        task: Task,
        arena: &mut SurfaceArena,
        target: SurfaceId,
    ) -> StrataResult<(Task, OptimizeReport)> {
        let bounds = arena.get(target)?.rect();
        let mut task = bind_root(task, target, bounds);
        let report = self.optimize(&mut task, arena)?;
        Ok((task, report))
    }

    fn render_rect(
        &self,
        task: Task,
        arena: &mut SurfaceArena,
        target: SurfaceId,
        rect: RectInt,
        progress: &dyn ProgressCallback,
    ) -> StrataResult<RenderStats> {
        let mut task = bind_root(task, target, rect);
        let report = self.optimize(&mut task, arena)?;
        let result = self.execute(&mut task, arena, progress);
        let mut release_err = None;
        for id in &report.scratch {
            if let Err(e) = arena.release(*id) {
                tracing::debug!(surface = %id, error = %e, "failed to release scratch surface");
                release_err.get_or_insert(e);
            }
        }
        let mut stats = result?;
        if let Some(e) = release_err {
            return Err(e);
        }
        stats.surfaces_allocated = report.scratch.len();
        stats.aliased = report.aliased;
        Ok(stats)
    }
}

/// The root writes frame space 1:1 into `target`, restricted to `rect`.
fn bind_root(mut task: Task, target: SurfaceId, rect: RectInt) -> Task {
    task.target_surface = Some(target);
    task.target_offset = VectorInt::ZERO;
    task.trunc_target_rect(rect);
    task
}

fn run_node<S: SurfaceStore>(task: &mut Task, store: &mut S, cx: &ExecCx<'_>) -> StrataResult<()> {
    if task.is_empty() {
        task.set_state(TaskState::Executed);
        cx.finish(task.task_count());
        return Ok(());
    }

    if matches!(task.kind, TaskKind::List)
        && let Some(pool) = cx.pool
        && let Some(rows) = tile_rows(task)
        && let Some(arena) = store.arena_mut()
    {
        run_tiles(task, rows, arena, pool, cx)?;
        task.state = TaskState::Executed;
        cx.finish(1);
        return Ok(());
    }

    for sub in &mut task.sub_tasks {
        run_node(sub, store, cx)?;
    }
    if store.polls() {
        cx.poll()?;
    }
    if !matches!(task.kind, TaskKind::List) {
        let id = task.target_surface.ok_or_else(|| {
            StrataError::execution(format!("{} task has no target surface", task.kind.name()))
        })?;
        store.with_target(id, |band, lookup| software::run(task, band, lookup))?;
        cx.tasks_run.fetch_add(1, Ordering::Relaxed);
    }
    tracing::trace!(kind = task.kind.name(), rect = ?task.target_rect, "task executed");
    task.state = TaskState::Executed;
    cx.finish(1);
    Ok(())
}

/// Row ranges of a list's tiles when they write ascending, disjoint bands
/// of the list's own surface.
fn tile_rows(list: &Task) -> Option<Vec<(usize, usize)>> {
    let mut rows = Vec::with_capacity(list.sub_tasks.len());
    let mut last = 0;
    for tile in &list.sub_tasks {
        let r = tile.target_rect;
        if tile.target_surface != list.target_surface || !r.valid() || r.miny < last {
            return None;
        }
        rows.push((r.miny as usize, r.maxy as usize));
        last = r.maxy;
    }
    Some(rows)
}

fn take_private(
    tile: &Task,
    shared: SurfaceId,
    arena: &mut SurfaceArena,
    taken: &mut Vec<PrivateSurfaces>,
) -> StrataResult<()> {
    let mut private = PrivateSurfaces::new();
    for id in tile.written_surfaces() {
        if id == shared {
            continue;
        }
        match arena.take(id) {
            Ok(s) => private.push((id, s)),
            Err(e) => {
                taken.push(private);
                return Err(e);
            }
        }
    }
    taken.push(private);
    Ok(())
}

fn restore_private(arena: &mut SurfaceArena, taken: Vec<PrivateSurfaces>) -> StrataResult<()> {
    for (id, s) in taken.into_iter().flatten() {
        arena.restore(id, s)?;
    }
    Ok(())
}

/// Run the tiles of a list on the pool, each into its own band of the
/// shared surface. A tile that has started always runs to completion;
/// cancellation only stops tiles that have not.
fn run_tiles(
    list: &mut Task,
    rows: Vec<(usize, usize)>,
    arena: &mut SurfaceArena,
    pool: &rayon::ThreadPool,
    cx: &ExecCx<'_>,
) -> StrataResult<()> {
    let shared = list
        .target_surface
        .ok_or_else(|| StrataError::execution("tile list has no target surface"))?;

    let mut taken = Vec::with_capacity(list.sub_tasks.len());
    for tile in &list.sub_tasks {
        if let Err(e) = take_private(tile, shared, arena, &mut taken) {
            restore_private(arena, taken)?;
            return Err(e);
        }
    }
    let mut target = match arena.take(shared) {
        Ok(s) => s,
        Err(e) => {
            restore_private(arena, taken)?;
            return Err(e);
        }
    };
    if rows.last().is_some_and(|&(_, end)| end > target.height()) {
        arena.restore(shared, target)?;
        restore_private(arena, taken)?;
        return Err(StrataError::execution("tile rows exceed the shared surface"));
    }

    let width = target.width();
    let bands = TargetBand::split_rows(target.pixels_mut(), width, &rows);
    let shared_arena: &SurfaceArena = arena;
    tracing::debug!(tiles = bands.len(), surface = %shared, "running tiles");

    let results: Vec<(StrataResult<()>, PrivateSurfaces)> = pool.install(|| {
        list.sub_tasks
            .par_iter_mut()
            .zip(bands.into_par_iter())
            .zip(taken.into_par_iter())
            .map(|((tile, band), private)| {
                let mut store = TileStore::new(shared, band, private, shared_arena);
                let result = cx.poll().and_then(|()| run_node(tile, &mut store, cx));
                if result.is_ok() {
                    cx.tiles_run.fetch_add(1, Ordering::Relaxed);
                }
                (result, store.into_private())
            })
            .collect()
    });

    let mut first_err = None;
    let mut back = Vec::with_capacity(results.len());
    for (result, private) in results {
        if let Err(e) = result {
            // Cancellation wins over follow-on failures.
            if first_err.is_none() || e.is_cancelled() {
                first_err = Some(e);
            }
        }
        back.push(private);
    }
    arena.restore(shared, target)?;
    restore_private(arena, back)?;
    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/engine.rs"]
mod tests;
