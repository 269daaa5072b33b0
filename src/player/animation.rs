use std::{rc::Rc, str::FromStr, time::Duration, time::Instant};

use serde_json::Value;

use crate::{
    animation::animator::{AnimatorScope, seek_all},
    bind::{binder::PropertyBinder, expression::ExpressionManager, slots::SlotManager},
    build::composition::{BuildContext, CompRange},
    foundation::{
        core::{Affine, Rect, Size},
        error::{LottieError, LottieResult},
        log::{Logger, TracingLogger},
        math::last_valid_frame,
    },
    json,
    scene::{
        canvas::{Canvas, RenderContext},
        node::{InvalidationController, NodeRef},
    },
};

/// Options controlling document building.
#[derive(Clone, Debug)]
pub struct BuildOpts {
    /// Maximum precomp nesting depth; deeper references are skipped with an error.
    pub max_precomp_depth: usize,
}

impl Default for BuildOpts {
    fn default() -> Self {
        Self {
            max_precomp_depth: 32,
        }
    }
}

/// Build statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// Size of the JSON source in bytes (0 when built from a parsed value).
    pub json_size: usize,
    /// Time spent parsing JSON.
    pub json_parse_time: Duration,
    /// Time spent building the render tree and animators.
    pub scene_build_time: Duration,
    /// Top-level animators ticked on every seek.
    pub animator_count: usize,
    /// Layers attached, including precomp contents.
    pub layer_count: usize,
    /// Precomp instances attached.
    pub precomp_count: usize,
}

/// Configures and builds [`Animation`]s.
pub struct AnimationBuilder {
    logger: Rc<dyn Logger>,
    slots: Option<SlotManager>,
    expressions: Option<Rc<dyn ExpressionManager>>,
    opts: BuildOpts,
}

impl Default for AnimationBuilder {
    fn default() -> Self {
        Self {
            logger: Rc::new(TracingLogger),
            slots: None,
            expressions: None,
            opts: BuildOpts::default(),
        }
    }
}

impl AnimationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn logger(mut self, logger: Rc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn slot_manager(mut self, slots: SlotManager) -> Self {
        self.slots = Some(slots);
        self
    }

    pub fn expression_manager(mut self, expressions: Rc<dyn ExpressionManager>) -> Self {
        self.expressions = Some(expressions);
        self
    }

    pub fn opts(mut self, opts: BuildOpts) -> Self {
        self.opts = opts;
        self
    }

    /// Parse and build a document from JSON text.
    pub fn build(&self, source: &str) -> LottieResult<Animation> {
        let parse_start = Instant::now();
        let doc: Value = serde_json::from_str(source)?;
        let json_parse_time = parse_start.elapsed();

        let mut animation = self.build_from_value(&doc)?;
        animation.stats.json_size = source.len();
        animation.stats.json_parse_time = json_parse_time;
        Ok(animation)
    }

    /// Build from an already parsed document.
    ///
    /// Only structural problems are errors; malformed properties are logged and left at
    /// their defaults.
    #[tracing::instrument(skip_all)]
    pub fn build_from_value(&self, doc: &Value) -> LottieResult<Animation> {
        let build_start = Instant::now();
        let header = Header::parse(doc)?;

        let binder = PropertyBinder::new(doc, &*self.logger, header.fps)
            .with_slots(self.slots.as_ref())
            .with_expressions(self.expressions.as_deref());
        let mut ctx = BuildContext::new(binder, doc, &self.opts, header.fps);

        let mut animators = AnimatorScope::new();
        let root = ctx.attach_composition(
            &doc["layers"],
            &mut animators,
            CompRange {
                in_point: header.in_point,
                out_point: header.out_point,
            },
        );
        // Sync animated state for clients that render before the first seek. Damage is left to
        // that seek: undrawn nodes report their full bounds on first revalidation.
        seek_all(&mut animators, header.in_point);

        let stats = Stats {
            scene_build_time: build_start.elapsed(),
            animator_count: animators.len(),
            layer_count: ctx.counters.layers,
            precomp_count: ctx.counters.precomps,
            ..Stats::default()
        };
        tracing::debug!(
            animators = stats.animator_count,
            layers = stats.layer_count,
            "built animation"
        );

        Ok(Animation {
            root,
            animators,
            version: header.version,
            size: header.size,
            fps: header.fps,
            in_point: header.in_point,
            out_point: header.out_point,
            stats,
        })
    }
}

struct Header {
    version: String,
    size: Size,
    fps: f32,
    in_point: f32,
    out_point: f32,
}

impl Header {
    fn parse(doc: &Value) -> LottieResult<Self> {
        if !doc.is_object() {
            return Err(LottieError::validation("document root must be a JSON object"));
        }
        let number = |key: &str| {
            json::parse::<f32>(&doc[key])
                .ok_or_else(|| LottieError::validation(format!("missing or invalid \"{key}\"")))
        };

        let version = json::parse::<String>(&doc["v"])
            .filter(|v| !v.is_empty())
            .ok_or_else(|| LottieError::validation("missing version (\"v\")"))?;
        let (width, height) = (number("w")?, number("h")?);
        if !(width > 0.0 && height > 0.0) {
            return Err(LottieError::validation(format!(
                "invalid size {width}x{height}"
            )));
        }
        let fps = number("fr")?;
        if !(fps.is_finite() && fps > 0.0) {
            return Err(LottieError::validation(format!("invalid frame rate {fps}")));
        }
        let (in_point, out_point) = (number("ip")?, number("op")?);
        if !(in_point.is_finite() && out_point.is_finite()) {
            return Err(LottieError::validation("non-finite in/out point"));
        }

        Ok(Self {
            version,
            size: Size::new(f64::from(width), f64::from(height)),
            fps,
            in_point,
            out_point: out_point.max(in_point),
        })
    }
}

/// A built Lottie animation: a render tree plus the animators driving it.
///
/// Single-threaded; seeking mutates the tree in place.
pub struct Animation {
    root: NodeRef,
    animators: AnimatorScope,
    version: String,
    size: Size,
    fps: f32,
    in_point: f32,
    out_point: f32,
    stats: Stats,
}

impl Animation {
    /// Build with default options, logging the error and returning `None` on failure.
    pub fn make(source: &str) -> Option<Self> {
        match AnimationBuilder::default().build(source) {
            Ok(animation) => Some(animation),
            Err(err) => {
                tracing::error!(error = %err, "could not build animation");
                None
            }
        }
    }

    /// Seek to frame `t` and return the damaged area in composition coordinates.
    ///
    /// `t` is clamped to `[in_point, out_point)`. An empty (`Rect::ZERO`) result means nothing
    /// visible changed since the previous seek.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn seek_frame(&mut self, t: f32) -> Rect {
        let t = if t.is_nan() {
            self.in_point
        } else {
            t.clamp(self.in_point, last_valid_frame(self.in_point, self.out_point))
        };

        seek_all(&mut self.animators, t);

        let mut ic = InvalidationController::new();
        self.root
            .borrow_mut()
            .revalidate(&mut ic, Affine::IDENTITY);
        ic.bounds()
    }

    /// Seek to a normalized position in `[0, 1]` of the frame range.
    pub fn seek(&mut self, normalized: f32) -> Rect {
        let n = if normalized.is_nan() { 0.0 } else { normalized.clamp(0.0, 1.0) };
        self.seek_frame(self.in_point + n * (self.out_point - self.in_point))
    }

    /// Seek to a time in seconds.
    pub fn seek_frame_time(&mut self, seconds: f32) -> Rect {
        self.seek_frame(seconds * self.fps)
    }

    /// Render at composition size, clipped to the composition bounds.
    pub fn render(&self, canvas: &mut dyn Canvas) {
        self.render_to(canvas, None);
    }

    /// Render scaled uniformly to fit `dst` and centered in it, or at composition size when
    /// `dst` is `None`.
    pub fn render_to(&self, canvas: &mut dyn Canvas, dst: Option<Rect>) {
        let src = self.size.to_rect();
        canvas.save();
        if let Some(dst) = dst {
            canvas.concat(center_fit(src, dst));
        }
        canvas.clip_rect(src);
        self.root
            .borrow()
            .render(canvas, &RenderContext::default());
        canvas.restore();
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f32 {
        (self.out_point - self.in_point) / self.fps
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn in_point(&self) -> f32 {
        self.in_point
    }

    pub fn out_point(&self) -> f32 {
        self.out_point
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }
}

/// Uniform scale mapping `src` into `dst`, centered along the slack axis.
fn center_fit(src: Rect, dst: Rect) -> Affine {
    if src.is_zero_area() {
        return Affine::IDENTITY;
    }
    let scale = (dst.width() / src.width()).min(dst.height() / src.height());
    let offset = dst.center().to_vec2() - src.center().to_vec2() * scale;
    Affine::translate(offset) * Affine::scale(scale)
}

impl FromStr for Animation {
    type Err = LottieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnimationBuilder::default().build(s)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/animation.rs"]
mod tests;
