use crate::foundation::core::VectorInt;
use crate::foundation::error::StrataResult;
use crate::geometry::rect::RectInt;
use crate::render::arena::SurfaceId;
use crate::task::node::{Backend, Task, TaskKind, TaskState};

use super::{OptimizeContext, Optimizer};

/// Cuts tall splittable tasks into row-band tiles that can render on
/// separate threads.
///
/// Tiles share the split task's surface, each writing only its own rows.
/// Every other surface inside a tile is re-allocated per tile so no two
/// tiles touch the same scratch memory. Runs only when parallel rendering
/// is enabled.
pub struct SplitTiles;

impl Optimizer for SplitTiles {
    fn name(&self) -> &'static str {
        "split_tiles"
    }

    fn run(&self, task: &mut Task, cx: &mut OptimizeContext<'_>) -> StrataResult<()> {
        if !cx.opts.parallel {
            return Ok(());
        }
        split_node(task, cx)
    }
}

fn split_node(task: &mut Task, cx: &mut OptimizeContext<'_>) -> StrataResult<()> {
    if task.is_empty() {
        return Ok(());
    }
    let tall = task.target_rect.height() as usize >= cx.opts.min_split_rows.max(1);
    if tall
        && task.is_splittable()
        && !matches!(task.kind, TaskKind::List)
        && let Some(shared) = task.target_surface
    {
        return split_into_tiles(task, shared, cx);
    }
    for sub in &mut task.sub_tasks {
        split_node(sub, cx)?;
    }
    Ok(())
}

fn split_into_tiles(
    task: &mut Task,
    shared: SurfaceId,
    cx: &mut OptimizeContext<'_>,
) -> StrataResult<()> {
    let rect = task.target_rect;
    let rows = cx.opts.tile_rows.max(1) as i32;
    let stale: Vec<SurfaceId> = task
        .written_surfaces()
        .into_iter()
        .filter(|id| *id != shared)
        .collect();

    let mut tiles = Vec::new();
    let mut y = rect.miny;
    while y < rect.maxy {
        let band = RectInt::new(rect.minx, y, rect.maxx, (y + rows).min(rect.maxy));
        if let Some(mut tile) = task.split(band) {
            let mut remap = Vec::new();
            reassign_private(&mut tile, shared, &mut remap, cx)?;
            tiles.push(tile);
        }
        y += rows;
    }
    for id in stale {
        cx.release_scratch(id)?;
    }

    tracing::debug!(
        kind = task.kind.name(),
        tiles = tiles.len(),
        rows,
        "split task into row tiles"
    );
    cx.report.tiles += tiles.len();
    let offset = task.target_offset;
    *task = Task {
        kind: TaskKind::List,
        backend: Backend::Software,
        target_surface: Some(shared),
        target_rect: rect,
        target_offset: offset,
        sub_tasks: tiles,
        state: TaskState::Planned,
    };
    Ok(())
}

type Remap = Vec<(SurfaceId, Option<(SurfaceId, VectorInt)>)>;

/// Top-down: the first node met on an old surface owns it and sizes its
/// replacement; nodes aliased onto it below follow with the same shift.
fn reassign_private(
    task: &mut Task,
    shared: SurfaceId,
    remap: &mut Remap,
    cx: &mut OptimizeContext<'_>,
) -> StrataResult<()> {
    if let Some(old) = task.target_surface
        && old != shared
    {
        let entry = match remap.iter().find(|(o, _)| *o == old) {
            Some((_, e)) => *e,
            None => {
                let e = if task.is_empty() {
                    None
                } else {
                    let id = cx.alloc_scratch(task.target_rect)?;
                    Some((id, -task.target_rect.min_point()))
                };
                remap.push((old, e));
                e
            }
        };
        match entry {
            Some((id, shift)) => {
                task.target_surface = Some(id);
                task.target_rect = task.target_rect.translate(shift);
                task.target_offset = task.target_offset + shift;
            }
            None => task.target_surface = None,
        }
    }
    for sub in &mut task.sub_tasks {
        reassign_private(sub, shared, remap, cx)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/optimize/split.rs"]
mod tests;
