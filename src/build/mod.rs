//! Turns a Lottie document into a render tree plus the animators driving it.

pub(crate) mod composition;
pub(crate) mod layer;
pub(crate) mod precomp;
pub(crate) mod shape;
pub(crate) mod text;
pub(crate) mod transform;
