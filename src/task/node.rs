use crate::foundation::core::{Color, VectorInt};
use crate::foundation::error::{StrataError, StrataResult};
use crate::geometry::rect::RectInt;
use crate::render::arena::SurfaceId;

use super::clamp::ClampParams;
use super::params::{BlendParams, BlurParams};

/// Lifecycle of a task node.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Pure description, no surface yet.
    #[default]
    Unassigned,
    /// Surface, rectangle and offset fixed by the optimizer.
    Planned,
    /// A tile cloned out of a planned task.
    Split,
    /// Pixels written.
    Executed,
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    Generic,
    Software,
}

/// Operation performed by a [`Task`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskKind {
    /// Fill with a constant colour.
    Solid { color: Color },
    /// A persistent image whose top-left pixel sits at frame point `origin`.
    Source { surface: SurfaceId, origin: VectorInt },
    Clamp(ClampParams),
    /// Sub-task 0 is the destination, sub-task 1 the source.
    Blend(BlendParams),
    Blur(BlurParams),
    /// Shift the sub-task's frame content by `offset`.
    Translate { offset: VectorInt },
    /// Sub-tasks share this task's surface and write disjoint parts of it.
    List,
}

impl TaskKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Solid { .. } => "solid",
            Self::Source { .. } => "source",
            Self::Clamp(_) => "clamp",
            Self::Blend(_) => "blend",
            Self::Blur(_) => "blur",
            Self::Translate { .. } => "translate",
            Self::List => "list",
        }
    }

    fn arity(&self) -> Option<usize> {
        match self {
            Self::Solid { .. } | Self::Source { .. } => Some(0),
            Self::Clamp(_) | Self::Blur(_) | Self::Translate { .. } => Some(1),
            Self::Blend(_) => Some(2),
            Self::List => None,
        }
    }
}

/// One node of a frame's render plan.
///
/// Coordinates: `target_rect` is in the pixel space of `target_surface`, and
/// a frame point `p` lands on surface pixel `p + target_offset`. Until the
/// optimizer assigns a surface the offset is zero, so the rectangle is in
/// frame space.
///
/// Pixels outside a task's `target_rect` read as transparent to its parent.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Task {
    pub kind: TaskKind,
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub target_surface: Option<SurfaceId>,
    pub target_rect: RectInt,
    #[serde(default)]
    pub target_offset: VectorInt,
    #[serde(default)]
    pub sub_tasks: Vec<Task>,
    #[serde(default)]
    pub state: TaskState,
}

fn bounds_of(tasks: &[Task]) -> RectInt {
    tasks
        .iter()
        .map(|t| t.target_rect)
        .filter(RectInt::valid)
        .reduce(|a, b| a.union(&b))
        .unwrap_or_else(RectInt::zero)
}

impl Task {
    /// Generic task over `target_rect` in frame space.
    pub fn new(kind: TaskKind, target_rect: RectInt, sub_tasks: Vec<Task>) -> Self {
        Self {
            kind,
            backend: Backend::Generic,
            target_surface: None,
            target_rect,
            target_offset: VectorInt::ZERO,
            sub_tasks,
            state: TaskState::Unassigned,
        }
    }

    pub fn solid(color: Color, rect: RectInt) -> Self {
        Self::new(TaskKind::Solid { color }, rect, Vec::new())
    }

    /// Place a `width x height` image surface at `origin`.
    pub fn source(surface: SurfaceId, origin: VectorInt, width: usize, height: usize) -> Self {
        let side = |n: usize| i32::try_from(n).unwrap_or(i32::MAX);
        let rect = RectInt::with_size(side(width), side(height)).translate(origin);
        Self::new(TaskKind::Source { surface, origin }, rect, Vec::new())
    }

    pub fn clamp(params: ClampParams, sub_task: Task) -> Self {
        let rect = sub_task.target_rect;
        Self::new(TaskKind::Clamp(params), rect, vec![sub_task])
    }

    /// Blend `src` onto `dst`; covers the union of both.
    pub fn blend(params: BlendParams, dst: Task, src: Task) -> Self {
        let subs = vec![dst, src];
        let rect = bounds_of(&subs);
        Self::new(TaskKind::Blend(params), rect, subs)
    }

    /// Blur; covers the sub-task grown by the blur's reach.
    pub fn blur(params: BlurParams, sub_task: Task) -> Self {
        let (rx, ry) = params.reach_i32();
        let rect = sub_task.target_rect.expand_x(rx).expand_y(ry);
        Self::new(TaskKind::Blur(params), rect, vec![sub_task])
    }

    pub fn translate(offset: VectorInt, sub_task: Task) -> Self {
        let rect = sub_task.target_rect.translate(offset);
        Self::new(TaskKind::Translate { offset }, rect, vec![sub_task])
    }

    pub fn list(sub_tasks: Vec<Task>) -> Self {
        let rect = bounds_of(&sub_tasks);
        Self::new(TaskKind::List, rect, sub_tasks)
    }

    /// The target rectangle in frame space.
    pub fn frame_rect(&self) -> RectInt {
        self.target_rect.translate(-self.target_offset)
    }

    pub fn is_empty(&self) -> bool {
        !self.target_rect.valid()
    }

    /// Frame region this task reads from its sub-tasks to produce `frame`.
    fn needed_from_sub_tasks(&self, frame: RectInt) -> RectInt {
        match &self.kind {
            TaskKind::Blur(p) => {
                let (rx, ry) = p.reach_i32();
                frame.expand_x(rx).expand_y(ry)
            }
            TaskKind::Translate { offset } => frame.translate(-*offset),
            _ => frame,
        }
    }

    /// Restrict this task to `rect` (surface space) and propagate what that
    /// leaves needed into the sub-tasks.
    pub fn trunc_target_rect(&mut self, rect: RectInt) {
        let r = self.target_rect.intersection(&rect);
        if !r.valid() {
            self.target_rect = RectInt::zero();
            for sub in &mut self.sub_tasks {
                sub.trunc_target_rect(RectInt::zero());
            }
            return;
        }
        self.target_rect = r;
        let needed = self.needed_from_sub_tasks(self.frame_rect());
        for sub in &mut self.sub_tasks {
            let sub_rect = needed.translate(sub.target_offset);
            sub.trunc_target_rect(sub_rect);
        }
    }

    /// True when every node of the subtree computes each output pixel from
    /// the same pixel of its inputs, so tiles can be rendered independently.
    pub fn is_splittable(&self) -> bool {
        !matches!(self.kind, TaskKind::Blur(_)) && self.sub_tasks.iter().all(Task::is_splittable)
    }

    /// Clone of this task truncated to `rect`, or `None` when the task
    /// cannot be split or nothing of it lies inside `rect`.
    pub fn split(&self, rect: RectInt) -> Option<Task> {
        if !self.is_splittable() {
            return None;
        }
        let mut tile = self.clone();
        tile.trunc_target_rect(rect);
        if tile.is_empty() {
            return None;
        }
        tile.set_state(TaskState::Split);
        Some(tile)
    }

    /// Arity and parameter check for the whole subtree.
    pub fn validate(&self) -> StrataResult<()> {
        if let Some(n) = self.kind.arity()
            && n != self.sub_tasks.len()
        {
            return Err(StrataError::validation(format!(
                "{} task takes {n} sub-task(s), got {}",
                self.kind.name(),
                self.sub_tasks.len()
            )));
        }
        match &self.kind {
            TaskKind::Clamp(p) => p.validate()?,
            TaskKind::Blend(p) => p.validate()?,
            TaskKind::Blur(p) => p.validate()?,
            TaskKind::Solid { color } if !color.is_finite() => {
                return Err(StrataError::validation("solid colour must be finite"));
            }
            _ => {}
        }
        self.sub_tasks.iter().try_for_each(Task::validate)
    }

    pub fn set_state(&mut self, state: TaskState) {
        self.state = state;
        for sub in &mut self.sub_tasks {
            sub.set_state(state);
        }
    }

    /// Distinct target surfaces of the subtree, in first-visit order.
    pub fn written_surfaces(&self) -> Vec<SurfaceId> {
        let mut out = Vec::new();
        self.visit(&mut |t| {
            if let Some(id) = t.target_surface
                && !out.contains(&id)
            {
                out.push(id);
            }
        });
        out
    }

    /// Nodes in the subtree, this one included.
    pub fn task_count(&self) -> usize {
        1 + self.sub_tasks.iter().map(Task::task_count).sum::<usize>()
    }

    /// Pre-order walk.
    pub fn visit(&self, f: &mut impl FnMut(&Task)) {
        f(self);
        for sub in &self.sub_tasks {
            sub.visit(f);
        }
    }

    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut Task)) {
        f(self);
        for sub in &mut self.sub_tasks {
            sub.visit_mut(f);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/task/node.rs"]
mod tests;
