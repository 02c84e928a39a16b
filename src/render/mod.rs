//! Software execution: surface arena, per-task kernels and the renderer.

pub(crate) mod arena;
pub(crate) mod engine;
pub(crate) mod software;
pub(crate) mod target;
