use serde_json::json;

use super::*;
use crate::{
    animation::animator::seek_all, bind::expression::ExpressionEvaluator,
    foundation::log::RecordingLogger,
};

struct Seconds;

impl ExpressionEvaluator<f32> for Seconds {
    fn evaluate(&mut self, seconds: f32) -> f32 {
        seconds * 2.0
    }
}

struct XOnly;

impl ExpressionEvaluator<Vec<f32>> for XOnly {
    fn evaluate(&mut self, seconds: f32) -> Vec<f32> {
        vec![seconds]
    }
}

/// Understands `"double_time"` (numbers) and `"x_only"` (arrays).
struct TestExpressions;

impl ExpressionManager for TestExpressions {
    fn create_number_evaluator(
        &self,
        expr: &str,
    ) -> Option<Box<dyn ExpressionEvaluator<f32>>> {
        (expr == "double_time").then(|| Box::new(Seconds) as Box<dyn ExpressionEvaluator<f32>>)
    }

    fn create_array_evaluator(&self, expr: &str) -> Option<Box<dyn ExpressionEvaluator<Vec<f32>>>> {
        (expr == "x_only").then(|| Box::new(XOnly) as Box<dyn ExpressionEvaluator<Vec<f32>>>)
    }

    fn create_string_evaluator(&self, _expr: &str) -> Option<Box<dyn ExpressionEvaluator<String>>> {
        None
    }
}

#[test]
fn static_values_are_applied_without_animators() {
    let (doc, logger) = (Value::Null, RecordingLogger::new());
    let binder = PropertyBinder::new(&doc, &logger, 30.0);
    let mut scope = AnimatorScope::new();
    let target = Slot::new(0.0f32);

    assert!(binder.bind(&json!({"a": 0, "k": 5}), &mut scope, &target));
    assert_eq!(target.get(), 5.0);
    assert!(scope.is_empty());
}

#[test]
fn absent_properties_leave_the_target_alone() {
    let (doc, logger) = (Value::Null, RecordingLogger::new());
    let binder = PropertyBinder::new(&doc, &logger, 30.0);
    let mut scope = AnimatorScope::new();
    let target = Slot::new(7.0f32);

    assert!(!binder.bind(&Value::Null, &mut scope, &target));
    assert_eq!(target.get(), 7.0);
    assert!(logger.entries().is_empty());
}

#[test]
fn keyframed_values_register_an_animator() {
    let (doc, logger) = (Value::Null, RecordingLogger::new());
    let binder = PropertyBinder::new(&doc, &logger, 30.0);
    let mut scope = AnimatorScope::new();
    let target = Slot::new(0.0f32);

    let prop = json!({"a": 1, "k": [{"t": 0, "s": [0]}, {"t": 10, "s": [10]}]});
    assert!(binder.bind(&prop, &mut scope, &target));
    assert_eq!(scope.len(), 1);

    assert!(seek_all(&mut scope, 5.0));
    assert_eq!(target.get(), 5.0);
}

#[test]
fn constant_keyframes_are_applied_once() {
    let (doc, logger) = (Value::Null, RecordingLogger::new());
    let binder = PropertyBinder::new(&doc, &logger, 30.0);
    let mut scope = AnimatorScope::new();
    let target = Slot::new(Vec::new());

    let prop = json!({"a": 1, "k": [{"t": 0, "s": [3, 4]}, {"t": 10, "s": [3, 4]}]});
    assert!(binder.bind(&prop, &mut scope, &target));
    assert!(scope.is_empty());
    assert_eq!(target.get(), vec![3.0, 4.0]);
}

#[test]
fn animated_flag_on_plain_values_is_tolerated() {
    let (doc, logger) = (Value::Null, RecordingLogger::new());
    let binder = PropertyBinder::new(&doc, &logger, 30.0);
    let mut scope = AnimatorScope::new();
    let target = Slot::new(0.0f32);

    assert!(binder.bind(&json!({"a": 1, "k": 7}), &mut scope, &target));
    assert_eq!(target.get(), 7.0);
}

#[test]
fn unparseable_properties_fail_and_log() {
    let (doc, logger) = (Value::Null, RecordingLogger::new());
    let binder = PropertyBinder::new(&doc, &logger, 30.0);
    let mut scope = AnimatorScope::new();
    let target = Slot::new(1.0f32);

    assert!(!binder.bind(&json!({"a": 1, "k": "nope"}), &mut scope, &target));
    assert_eq!(target.get(), 1.0);
    assert_eq!(logger.count(LogLevel::Error), 1);

    let vectors = Slot::new(Vec::new());
    let prop = json!({"a": 1, "k": [{"t": 0, "s": [0, 0]}, {"t": 10, "s": [1]}]});
    assert!(!binder.bind(&prop, &mut scope, &vectors));
    assert!(vectors.get().is_empty());
    assert!(scope.is_empty());
    assert_eq!(logger.count(LogLevel::Error), 2);
    assert!(logger.contains("bind error: Mismatched keyframe vector length"));
}

#[test]
fn slot_overrides_win_over_document_slots() {
    let doc = json!({"slots": {"opacity": {"p": {"a": 0, "k": 9}}}});
    let logger = RecordingLogger::new();
    let mut scope = AnimatorScope::new();
    let prop = json!({"sid": "opacity", "a": 0, "k": 100});

    let target = Slot::new(0.0f32);
    PropertyBinder::new(&doc, &logger, 30.0).bind(&prop, &mut scope, &target);
    assert_eq!(target.get(), 9.0);

    let mut slots = SlotManager::new();
    slots.set_scalar("opacity", 42.0);
    PropertyBinder::new(&doc, &logger, 30.0)
        .with_slots(Some(&slots))
        .bind(&prop, &mut scope, &target);
    assert_eq!(target.get(), 42.0);
    assert!(logger.entries().is_empty());
}

#[test]
fn missing_slots_fall_back_to_the_literal() {
    let (doc, logger) = (json!({}), RecordingLogger::new());
    let mut scope = AnimatorScope::new();
    let target = Slot::new(0.0f32);

    PropertyBinder::new(&doc, &logger, 30.0).bind(
        &json!({"sid": "gone", "a": 0, "k": 3}),
        &mut scope,
        &target,
    );
    assert_eq!(target.get(), 3.0);
    assert!(logger.contains("gone"));
}

#[test]
fn expressions_replace_keyframes() {
    let (doc, logger) = (Value::Null, RecordingLogger::new());
    let manager = TestExpressions;
    let binder = PropertyBinder::new(&doc, &logger, 10.0).with_expressions(Some(&manager));
    let mut scope = AnimatorScope::new();
    let target = Slot::new(0.0f32);

    assert!(binder.bind(&json!({"x": "double_time", "a": 0, "k": 1}), &mut scope, &target));
    assert_eq!(scope.len(), 1);
    // Frame 20 at 10 fps is two seconds.
    seek_all(&mut scope, 20.0);
    assert_eq!(target.get(), 4.0);
}

#[test]
fn partial_array_expressions_keep_the_other_components() {
    let (doc, logger) = (Value::Null, RecordingLogger::new());
    let manager = TestExpressions;
    let binder = PropertyBinder::new(&doc, &logger, 1.0).with_expressions(Some(&manager));
    let mut scope = AnimatorScope::new();
    let target = Slot::new(Point::new(0.0, 8.0));

    assert!(binder.bind(&json!({"x": "x_only", "k": [0, 8]}), &mut scope, &target));
    seek_all(&mut scope, 3.0);
    assert_eq!(target.get(), Point::new(3.0, 8.0));
}

#[test]
fn expressions_without_a_manager_use_the_literal() {
    let (doc, logger) = (Value::Null, RecordingLogger::new());
    let binder = PropertyBinder::new(&doc, &logger, 30.0);
    let mut scope = AnimatorScope::new();
    let target = Slot::new(0.0f32);

    assert!(binder.bind(&json!({"x": "double_time", "a": 0, "k": 1}), &mut scope, &target));
    assert!(scope.is_empty());
    assert_eq!(target.get(), 1.0);
    assert!(logger.contains("no expression manager"));
}

#[test]
fn unsupported_expressions_use_the_literal() {
    let (doc, logger) = (Value::Null, RecordingLogger::new());
    let manager = TestExpressions;
    let binder = PropertyBinder::new(&doc, &logger, 30.0).with_expressions(Some(&manager));
    let mut scope = AnimatorScope::new();
    let target = Slot::new(0.0f32);

    assert!(binder.bind(&json!({"x": "wiggle(1, 2)", "k": 6}), &mut scope, &target));
    assert!(scope.is_empty());
    assert_eq!(target.get(), 6.0);
    assert_eq!(logger.count(LogLevel::Warning), 1);
}

#[test]
fn text_documents_bind_through_keyframes() {
    let (doc, logger) = (Value::Null, RecordingLogger::new());
    let binder = PropertyBinder::new(&doc, &logger, 30.0);
    let mut scope = AnimatorScope::new();
    let target = Slot::new(TextValue::default());

    let single = json!({"k": [{"t": 0, "s": {"t": "Hi", "s": 12}}]});
    assert!(binder.bind(&single, &mut scope, &target));
    assert!(scope.is_empty());
    assert_eq!(target.borrow().text, "Hi");

    let changing = json!({"k": [{"t": 0, "s": {"t": "A"}}, {"t": 10, "s": {"t": "B"}}]});
    assert!(binder.bind(&changing, &mut scope, &target));
    assert_eq!(scope.len(), 1);
    seek_all(&mut scope, 12.0);
    assert_eq!(target.borrow().text, "B");
}

#[test]
fn shape_paths_use_the_shape_encoding() {
    let (doc, logger) = (Value::Null, RecordingLogger::new());
    let binder = PropertyBinder::new(&doc, &logger, 30.0);
    let mut scope = AnimatorScope::new();
    let target = Slot::new(Vec::new());

    let prop = json!({"a": 0, "k": {"c": true, "v": [[0, 0], [10, 0], [10, 10]]}});
    assert!(binder.bind_shape(&prop, &mut scope, &target));
    assert_eq!(target.get().len(), 1 + 3 * 6);
    assert_eq!(target.get()[0], 1.0);
}
