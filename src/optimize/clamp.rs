use crate::foundation::error::{StrataError, StrataResult};
use crate::task::node::{Backend, Task, TaskKind};

use super::{OptimizeContext, Optimizer, alias_to_parent, assign_scratch};

/// Software lowering of a clamp node.
///
/// When the sub-task's surface is temporary (or not assigned yet) and
/// in-place rendering is enabled, the sub-task renders straight into the
/// clamp's own surface and the clamp then runs over it in place. Otherwise
/// the sub-task gets a fresh surface the size of its rectangle.
pub struct ClampSW;

impl Optimizer for ClampSW {
    fn name(&self) -> &'static str {
        "clamp_sw"
    }

    fn run(&self, task: &mut Task, cx: &mut OptimizeContext<'_>) -> StrataResult<()> {
        if !matches!(task.kind, TaskKind::Clamp(_)) {
            return Ok(());
        }
        let surface = task
            .target_surface
            .ok_or_else(|| StrataError::validation("clamp task has no target surface"))?;
        task.backend = Backend::Software;
        let (offset, rect) = (task.target_offset, task.target_rect);
        let sub = task
            .sub_tasks
            .first_mut()
            .ok_or_else(|| StrataError::validation("clamp task has no sub-task"))?;
        if sub.is_empty() {
            return Ok(());
        }

        let temporary = sub
            .target_surface
            .is_none_or(|id| cx.arena.is_temporary(id));
        if cx.opts.in_place && temporary {
            alias_to_parent(surface, offset, rect, sub);
            cx.report.aliased += 1;
            tracing::debug!(surface = %surface, "clamp runs in place");
        } else {
            assign_scratch(sub, cx)?;
            tracing::debug!(from = ?sub.target_surface, into = %surface, "clamp copies");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/optimize/clamp.rs"]
mod tests;
