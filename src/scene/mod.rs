//! Retained render tree fed by the animation adapters.
//!
//! Nodes cache their device-space bounds; `revalidate` reports what changed since the last
//! pass to an [`InvalidationController`](node::InvalidationController).

pub(crate) mod canvas;
pub(crate) mod draw;
pub(crate) mod node;
