//! Separable blur kernels over pens.
//!
//! Every kernel reads samples in the storage type and sums them in the wider
//! [`accum::Accumulate::Accum`] type.

pub(crate) mod accum;
pub(crate) mod boxblur;
pub(crate) mod disc;
pub(crate) mod gaussian;
