use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::core::{Color, Vec2, VectorInt};
use crate::foundation::error::{StrataError, StrataResult};
use crate::geometry::rect::RectInt;
use crate::render::arena::SurfaceArena;
use crate::task::clamp::ClampParams;
use crate::task::node::Task;
use crate::task::params::{BlendParams, BlurKind, BlurParams};

use super::io::load_image;

/// A frame to render: output size, optional background and the task tree.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneDesc {
    pub width: u32,
    pub height: u32,
    /// Fills the output before the tree renders over it.
    #[serde(default)]
    pub background: Option<Color>,
    pub root: TaskDesc,
}

/// JSON form of a task tree, tagged by `"op"`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TaskDesc {
    Solid {
        color: Color,
        rect: RectInt,
    },
    /// An image file, relative paths resolved against the scene file.
    Image {
        path: PathBuf,
        #[serde(default)]
        origin: VectorInt,
    },
    Clamp {
        #[serde(flatten)]
        params: ClampParams,
        input: Box<TaskDesc>,
    },
    Blend {
        #[serde(flatten)]
        params: BlendParams,
        dst: Box<TaskDesc>,
        src: Box<TaskDesc>,
    },
    Blur {
        #[serde(default)]
        kind: BlurKind,
        size: Vec2,
        input: Box<TaskDesc>,
    },
    Translate {
        offset: VectorInt,
        input: Box<TaskDesc>,
    },
    List {
        items: Vec<TaskDesc>,
    },
}

impl SceneDesc {
    pub fn from_json(json: &str) -> StrataResult<Self> {
        let scene: Self = serde_json::from_str(json).map_err(|e| StrataError::serde(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn load(path: &Path) -> StrataResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read scene '{}'", path.display()))?;
        Self::from_json(&json)
    }

    pub fn to_json_pretty(&self) -> StrataResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| StrataError::serde(e.to_string()))
    }

    pub fn validate(&self) -> StrataResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(StrataError::validation(format!(
                "scene size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// The output rectangle in frame space.
    pub fn frame_rect(&self) -> RectInt {
        RectInt::with_size(self.width as i32, self.height as i32)
    }
}

impl TaskDesc {
    /// Build the task tree, loading images into `arena` as persistent
    /// surfaces.
    pub fn build(&self, arena: &mut SurfaceArena, base_dir: &Path) -> StrataResult<Task> {
        Ok(match self {
            Self::Solid { color, rect } => Task::solid(*color, *rect),
            Self::Image { path, origin } => {
                let surface = load_image(&base_dir.join(path))?;
                let (w, h) = (surface.width(), surface.height());
                let id = arena.insert(surface, false);
                Task::source(id, *origin, w, h)
            }
            Self::Clamp { params, input } => Task::clamp(*params, input.build(arena, base_dir)?),
            Self::Blend { params, dst, src } => Task::blend(
                *params,
                dst.build(arena, base_dir)?,
                src.build(arena, base_dir)?,
            ),
            Self::Blur { kind, size, input } => {
                Task::blur(BlurParams::new(*kind, *size), input.build(arena, base_dir)?)
            }
            Self::Translate { offset, input } => {
                Task::translate(*offset, input.build(arena, base_dir)?)
            }
            Self::List { items } => Task::list(
                items
                    .iter()
                    .map(|d| d.build(arena, base_dir))
                    .collect::<StrataResult<Vec<_>>>()?,
            ),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/desc.rs"]
mod tests;
