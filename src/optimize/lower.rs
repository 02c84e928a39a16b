use crate::foundation::error::{StrataError, StrataResult};
use crate::task::node::{Backend, Task, TaskKind, TaskState};

use super::clamp::ClampSW;
use super::{OptimizeContext, Optimizer, alias_to_parent, assign_scratch};

/// Lowers every node to the software backend and decides where each one
/// writes, top-down from a root that already owns a surface.
pub struct LowerSoftware;

impl Optimizer for LowerSoftware {
    fn name(&self) -> &'static str {
        "lower_software"
    }

    fn run(&self, task: &mut Task, cx: &mut OptimizeContext<'_>) -> StrataResult<()> {
        if task.target_surface.is_none() && !task.is_empty() {
            return Err(StrataError::validation("root task has no target surface"));
        }
        lower(task, cx)
    }
}

fn needs_scratch(sub: &Task, cx: &OptimizeContext<'_>) -> bool {
    sub.target_surface.is_none_or(|id| !cx.arena.is_temporary(id))
}

fn lower(task: &mut Task, cx: &mut OptimizeContext<'_>) -> StrataResult<()> {
    task.backend = Backend::Software;
    task.state = TaskState::Planned;
    if task.is_empty() {
        task.target_surface = None;
        for sub in &mut task.sub_tasks {
            lower(sub, cx)?;
        }
        return Ok(());
    }
    let surface = task.target_surface.ok_or_else(|| {
        StrataError::execution(format!("{} task reached lowering without a surface", task.kind.name()))
    })?;

    match task.kind {
        TaskKind::Clamp(_) => ClampSW.run(task, cx)?,
        TaskKind::List => {
            let (offset, rect) = (task.target_offset, task.target_rect);
            for sub in &mut task.sub_tasks {
                if sub.target_surface != Some(surface) {
                    alias_to_parent(surface, offset, rect, sub);
                }
            }
        }
        _ => {
            for sub in &mut task.sub_tasks {
                if !sub.is_empty() && needs_scratch(sub, cx) {
                    assign_scratch(sub, cx)?;
                }
            }
        }
    }

    for sub in &mut task.sub_tasks {
        lower(sub, cx)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/optimize/lower.rs"]
mod tests;
