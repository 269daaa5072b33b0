pub(crate) mod animator;
pub(crate) mod container;
pub(crate) mod cubic;
pub(crate) mod keyframe;
pub(crate) mod shape;
pub(crate) mod spatial;
pub(crate) mod store;
pub(crate) mod value;
