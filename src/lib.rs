//! Lottie/Bodymovin animation engine.
//!
//! A document is bound once into a render tree plus a flat list of animators. Only properties
//! that can actually change get an animator; everything static is applied at build time.
//! Seeking ticks the animators, pushes changed values into the tree, and reports the damaged
//! area:
//!
//! - Build an [`Animation`] with [`AnimationBuilder`] (or [`Animation::make`])
//! - Call [`Animation::seek_frame`] per frame and redraw the returned [`Rect`]
//! - Record the frame through any [`Canvas`], e.g. a [`DisplayList`]
#![forbid(unsafe_code)]

mod animation;
mod bind;
mod build;
mod foundation;
mod json;
mod player;
mod scene;

pub use crate::animation::value::{Justification, TextValue};
pub use crate::bind::expression::{ExpressionEvaluator, ExpressionManager};
pub use crate::bind::slots::SlotManager;
pub use crate::foundation::core::{Affine, BezPath, Cap, Color, Join, Point, Rect, Size, Vec2};
pub use crate::foundation::error::{LottieError, LottieResult};
pub use crate::foundation::log::{LogLevel, Logger, RecordingLogger, TracingLogger};
pub use crate::player::animation::{Animation, AnimationBuilder, BuildOpts, Stats};
pub use crate::scene::canvas::{Canvas, DisplayList, DrawOp, PaintStyle, RenderContext};
