//! Strata is a software rendering core for 2-D frames.
//!
//! A frame is described as a tree of [`Task`]s (solid fills, images, clamps,
//! blends, blurs, translations). The [`Renderer`] lowers that tree into a
//! software plan, deciding which intermediate results get their own
//! scratch [`Surface`] and which can be written straight into their
//! parent's, then executes it bottom-up.
//!
//! # Pipeline overview
//!
//! 1. **Describe**: build a [`Task`] tree in frame space (or load a [`SceneDesc`]).
//! 2. **Optimize**: [`LowerSoftware`] assigns surfaces, [`ClampSW`] renders clamp
//!    inputs in place when they are scratch, [`SplitTiles`] cuts tall tasks into
//!    row tiles for parallel execution.
//! 3. **Execute**: tasks run after their sub-tasks; tiles of a split task may run
//!    on a rayon pool, each writing its own band of the shared surface.
//!
//! Underneath sit the building blocks the tasks use: rectangle algebra and
//! damage regions ([`Rect`], [`DamageRegion`]), pens over 2-D buffers
//! ([`GenericPen`]), and separable blur kernels that sum in a wider
//! [`Accumulate::Accum`] type than the pixels they store.
//!
//! `unsafe` is forbidden in this crate.
#![forbid(unsafe_code)]

mod blur;
mod foundation;
mod geometry;
mod optimize;
mod render;
mod scene;
mod surface;
mod task;

pub use blur::accum::{Accumulate, ColorAccumulator};
pub use blur::boxblur::{box_blur, hbox_blur, vbox_blur};
pub use blur::disc::{disc_blur, disc_spans};
pub use blur::gaussian::{
    GaussianPass, GaussianPassCounts, apply_gaussian_pass, gaussian_blur, gaussian_blur_1x3,
    gaussian_blur_3x1, gaussian_blur_3x3, gaussian_blur_5x5, gaussian_reach, passes_reach,
    plan_gaussian_passes,
};
pub use foundation::core::{Color, Vec2, VectorInt};
pub use foundation::error::{StrataError, StrataResult};
pub use geometry::rect::{EpsilonLess, NativeLess, Rect, RectInt, RectReal, StrictOrder};
pub use geometry::region::{
    DamageRegion, rects_add, rects_add_by, rects_merge, rects_merge_by, rects_subtract,
    rects_subtract_by,
};
pub use optimize::clamp::ClampSW;
pub use optimize::lower::LowerSoftware;
pub use optimize::split::SplitTiles;
pub use optimize::{OptimizeContext, OptimizeReport, Optimizer};
pub use render::arena::{ArenaStats, SurfaceArena, SurfaceId};
pub use render::engine::{NoProgress, ProgressCallback, RenderOpts, RenderStats, Renderer};
pub use scene::desc::{SceneDesc, TaskDesc};
pub use scene::io::{decode_image, encode_png, load_image, save_png};
pub use surface::blend::BlendMethod;
pub use surface::buffer::{BlitPath, Surface};
pub use surface::pen::{GenericPen, Pen, PenOffset, PenPos, PenRef};
pub use task::clamp::{CLAMP_ALPHA_EPSILON, ClampParams};
pub use task::node::{Backend, Task, TaskKind, TaskState};
pub use task::params::{BlendParams, BlurKind, BlurParams, MAX_BLUR_SIZE};
