//! Render plan nodes and their per-operation parameters.

pub(crate) mod clamp;
pub(crate) mod node;
pub(crate) mod params;
