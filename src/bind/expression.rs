use crate::animation::animator::{Animator, Slot};

/// Per-property expression program, evaluated once per tick.
pub trait ExpressionEvaluator<T> {
    /// Evaluate at composition time `seconds`.
    fn evaluate(&mut self, seconds: f32) -> T;
}

/// Factory for expression evaluators, provided by the embedder.
///
/// Returning `None` means the expression is not supported; the property then falls back to
/// its literal value.
pub trait ExpressionManager {
    fn create_number_evaluator(&self, expr: &str) -> Option<Box<dyn ExpressionEvaluator<f32>>>;

    fn create_array_evaluator(
        &self,
        expr: &str,
    ) -> Option<Box<dyn ExpressionEvaluator<Vec<f32>>>>;

    fn create_string_evaluator(&self, expr: &str)
    -> Option<Box<dyn ExpressionEvaluator<String>>>;
}

/// Drives a target slot from an expression evaluator instead of keyframes.
pub(crate) struct ExpressionAnimator<E, T> {
    evaluator: Box<dyn ExpressionEvaluator<E>>,
    target: Slot<T>,
    fps: f32,
    apply: fn(E, &T) -> T,
}

impl<E, T> ExpressionAnimator<E, T> {
    pub(crate) fn new(
        evaluator: Box<dyn ExpressionEvaluator<E>>,
        target: Slot<T>,
        fps: f32,
        apply: fn(E, &T) -> T,
    ) -> Self {
        Self {
            evaluator,
            target,
            fps,
            apply,
        }
    }
}

impl<E, T: PartialEq> Animator for ExpressionAnimator<E, T> {
    fn seek(&mut self, t: f32) -> bool {
        let value = self.evaluator.evaluate(t / self.fps);
        let next = (self.apply)(value, &self.target.borrow());
        self.target.set(next)
    }
}
