use serde_json::Value;

use crate::{
    animation::{
        animator::{
            Animator, AnimatorScope, KeyframeAnimator, ScalarAnimator, Slot, SpatialAnimator,
            TextAnimator, VectorAnimator,
        },
        keyframe::{KeyframeTrack, parse_keyframes},
        shape::parse_shape_vector,
        spatial::SpatialStore,
        store::{KeyframeStore, ScalarStore, TextStore, VectorStore},
        value::TextValue,
    },
    bind::{
        expression::{ExpressionAnimator, ExpressionManager},
        slots::SlotManager,
    },
    foundation::{
        core::Point,
        log::{LogLevel, Logger, report},
    },
    json::{self, FromJson},
};

/// A value type that can be bound from a Lottie property.
pub(crate) trait BindableValue: PartialEq + Sized + 'static {
    type Store: KeyframeStore + Default;

    fn parse_static(jv: &Value) -> Option<Self>;

    fn animator(track: KeyframeTrack, store: Self::Store, target: Slot<Self>) -> KeyframeAnimator;

    fn expression(
        manager: &dyn ExpressionManager,
        expr: &str,
        target: Slot<Self>,
        fps: f32,
    ) -> Option<Box<dyn Animator>>;
}

impl BindableValue for f32 {
    type Store = ScalarStore;

    fn parse_static(jv: &Value) -> Option<Self> {
        f32::from_json(jv)
    }

    fn animator(track: KeyframeTrack, store: ScalarStore, target: Slot<Self>) -> KeyframeAnimator {
        KeyframeAnimator::Scalar(ScalarAnimator {
            track,
            store,
            target,
        })
    }

    fn expression(
        manager: &dyn ExpressionManager,
        expr: &str,
        target: Slot<Self>,
        fps: f32,
    ) -> Option<Box<dyn Animator>> {
        let evaluator = manager.create_number_evaluator(expr)?;
        Some(Box::new(ExpressionAnimator::new(
            evaluator,
            target,
            fps,
            |v, _| v,
        )))
    }
}

impl BindableValue for Vec<f32> {
    type Store = VectorStore;

    fn parse_static(jv: &Value) -> Option<Self> {
        <Vec<f32>>::from_json(jv)
    }

    fn animator(track: KeyframeTrack, store: VectorStore, target: Slot<Self>) -> KeyframeAnimator {
        KeyframeAnimator::Vector(VectorAnimator {
            track,
            store,
            target,
        })
    }

    fn expression(
        manager: &dyn ExpressionManager,
        expr: &str,
        target: Slot<Self>,
        fps: f32,
    ) -> Option<Box<dyn Animator>> {
        let evaluator = manager.create_array_evaluator(expr)?;
        Some(Box::new(ExpressionAnimator::new(
            evaluator,
            target,
            fps,
            |v, _| v,
        )))
    }
}

impl BindableValue for Point {
    type Store = SpatialStore;

    fn parse_static(jv: &Value) -> Option<Self> {
        Point::from_json(jv)
    }

    fn animator(track: KeyframeTrack, store: SpatialStore, target: Slot<Self>) -> KeyframeAnimator {
        KeyframeAnimator::Spatial(SpatialAnimator {
            track,
            store,
            target,
        })
    }

    fn expression(
        manager: &dyn ExpressionManager,
        expr: &str,
        target: Slot<Self>,
        fps: f32,
    ) -> Option<Box<dyn Animator>> {
        let evaluator = manager.create_array_evaluator(expr)?;
        Some(Box::new(ExpressionAnimator::new(
            evaluator,
            target,
            fps,
            |v: Vec<f32>, cur: &Point| {
                let at = |i: usize, d: f64| v.get(i).map_or(d, |&c| f64::from(c));
                Point::new(at(0, cur.x), at(1, cur.y))
            },
        )))
    }
}

impl BindableValue for TextValue {
    type Store = TextStore;

    fn parse_static(jv: &Value) -> Option<Self> {
        TextValue::from_json(jv)
    }

    fn animator(track: KeyframeTrack, store: TextStore, target: Slot<Self>) -> KeyframeAnimator {
        KeyframeAnimator::Text(TextAnimator {
            track,
            store,
            target,
        })
    }

    fn expression(
        manager: &dyn ExpressionManager,
        expr: &str,
        target: Slot<Self>,
        fps: f32,
    ) -> Option<Box<dyn Animator>> {
        let evaluator = manager.create_string_evaluator(expr)?;
        Some(Box::new(ExpressionAnimator::new(
            evaluator,
            target,
            fps,
            |text, cur: &TextValue| TextValue {
                text,
                ..cur.clone()
            },
        )))
    }
}

/// Binds JSON properties to value slots, registering animators for the time-varying ones.
pub(crate) struct PropertyBinder<'a> {
    doc: &'a Value,
    logger: &'a dyn Logger,
    slots: Option<&'a SlotManager>,
    expressions: Option<&'a dyn ExpressionManager>,
    fps: f32,
}

impl<'a> PropertyBinder<'a> {
    pub(crate) fn new(doc: &'a Value, logger: &'a dyn Logger, fps: f32) -> Self {
        Self {
            doc,
            logger,
            slots: None,
            expressions: None,
            fps: if fps > 0.0 { fps } else { 1.0 },
        }
    }

    pub(crate) fn with_slots(mut self, slots: Option<&'a SlotManager>) -> Self {
        self.slots = slots;
        self
    }

    pub(crate) fn with_expressions(mut self, expressions: Option<&'a dyn ExpressionManager>) -> Self {
        self.expressions = expressions;
        self
    }

    #[cfg(test)]
    pub(crate) fn logger(&self) -> &'a dyn Logger {
        self.logger
    }

    pub(crate) fn warn(&self, message: &str, json: Option<&Value>) {
        report(self.logger, LogLevel::Warning, message, json);
    }

    pub(crate) fn error(&self, message: &str, json: Option<&Value>) {
        report(self.logger, LogLevel::Error, message, json);
    }

    /// Bind `jprop` into `target`.
    ///
    /// Static and constant properties are written once; animated ones get an animator pushed
    /// into `scope`. Returns `false` when the property is absent or failed to parse, leaving
    /// `target` untouched.
    pub(crate) fn bind<V: BindableValue>(
        &self,
        jprop: &Value,
        scope: &mut AnimatorScope,
        target: &Slot<V>,
    ) -> bool {
        self.bind_with(jprop, scope, target, V::parse_static, V::Store::default())
    }

    /// Shape paths (`sh.ks`) ride on the vector animator with their own encoding.
    pub(crate) fn bind_shape(
        &self,
        jprop: &Value,
        scope: &mut AnimatorScope,
        target: &Slot<Vec<f32>>,
    ) -> bool {
        self.bind_with(
            jprop,
            scope,
            target,
            parse_shape_vector,
            VectorStore::with_parser(parse_shape_vector),
        )
    }

    fn bind_with<V: BindableValue>(
        &self,
        jprop: &Value,
        scope: &mut AnimatorScope,
        target: &Slot<V>,
        parse_static: fn(&Value) -> Option<V>,
        mut store: V::Store,
    ) -> bool {
        if !jprop.is_object() {
            return false;
        }
        let jprop = self.resolve_slot(jprop);

        if let Some(expr) = jprop["x"].as_str()
            && self.bind_expression(expr, scope, target)
        {
            return true;
        }

        let jk = &jprop["k"];
        let animated = json::parse_or::<bool>(&jprop["a"], false);
        if !animated && let Some(v) = parse_static(jk) {
            target.set(v);
            return true;
        }

        let keyframes = jk
            .as_array()
            .filter(|entries| entries.first().is_some_and(Value::is_object));
        let Some(jkfs) = keyframes else {
            // Some exporters flag plain values as animated.
            if let Some(v) = parse_static(jk) {
                target.set(v);
                return true;
            }
            self.error("Could not parse property.", Some(jprop));
            return false;
        };

        match parse_keyframes(jkfs, &mut store, self.logger) {
            Ok(track) => {
                let mut animator = V::animator(track, store, target.clone());
                if animator.is_constant() {
                    animator.seek(0.0);
                } else {
                    scope.push(Box::new(animator));
                }
                true
            }
            Err(err) => {
                self.error(&err.to_string(), Some(jprop));
                false
            }
        }
    }

    fn resolve_slot<'p>(&self, jprop: &'p Value) -> &'p Value
    where
        'a: 'p,
    {
        let Some(sid) = jprop["sid"].as_str() else {
            return jprop;
        };
        if let Some(p) = self.slots.and_then(|s| s.get(sid)) {
            return p;
        }
        let doc: &'a Value = self.doc;
        let p = &doc["slots"][sid]["p"];
        if p.is_object() {
            return p;
        }
        self.warn(&format!("Slot \"{sid}\" not found."), Some(jprop));
        jprop
    }

    fn bind_expression<V: BindableValue>(
        &self,
        expr: &str,
        scope: &mut AnimatorScope,
        target: &Slot<V>,
    ) -> bool {
        let Some(manager) = self.expressions else {
            self.warn(
                "Expression found but no expression manager is registered.",
                None,
            );
            return false;
        };
        match V::expression(manager, expr, target.clone(), self.fps) {
            Some(animator) => {
                scope.push(animator);
                true
            }
            None => {
                self.warn("Unsupported expression; using the literal value.", None);
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bind/binder.rs"]
mod tests;
