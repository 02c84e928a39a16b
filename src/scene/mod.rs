//! JSON scene descriptions and image IO for the command line front end.

pub(crate) mod desc;
pub(crate) mod io;
