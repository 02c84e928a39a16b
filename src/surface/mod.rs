//! Pixel storage: float surfaces, pens over 2-D buffers, and blending.

pub(crate) mod blend;
pub(crate) mod buffer;
pub(crate) mod pen;
