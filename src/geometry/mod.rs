//! Rectangle algebra and damage regions.

pub(crate) mod rect;
pub(crate) mod region;
