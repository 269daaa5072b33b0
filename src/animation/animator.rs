use std::{
    cell::{Ref, RefCell},
    rc::Rc,
};

use crate::{
    animation::{
        keyframe::KeyframeTrack,
        spatial::SpatialStore,
        store::{ScalarStore, TextStore, VectorStore},
        value::TextValue,
    },
    foundation::{core::Point, math::lerp},
};

/// Anything that reacts to a frame time and reports whether its output changed.
pub trait Animator {
    /// Update to frame time `t`; returns `true` when the bound value changed.
    fn seek(&mut self, t: f32) -> bool;
}

/// Destination list for animators created while binding a sub-tree.
pub type AnimatorScope = Vec<Box<dyn Animator>>;

/// Tick every animator in order. All of them run, the results are OR-ed.
pub fn seek_all(scope: &mut [Box<dyn Animator>], t: f32) -> bool {
    scope
        .iter_mut()
        .fold(false, |changed, animator| animator.seek(t) | changed)
}

/// Shared, externally owned value slot written by an animator and read by its adapter.
#[derive(Debug, Default)]
pub struct Slot<T>(Rc<RefCell<T>>);

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> Slot<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }
}

impl<T: Clone> Slot<T> {
    pub fn get(&self) -> T {
        self.0.borrow().clone()
    }
}

impl<T: PartialEq> Slot<T> {
    /// Store `value`, returning `true` if it differs from the current one.
    pub fn set(&self, value: T) -> bool {
        let mut cur = self.0.borrow_mut();
        if *cur == value {
            return false;
        }
        *cur = value;
        true
    }
}

pub(crate) struct ScalarAnimator {
    pub(crate) track: KeyframeTrack,
    pub(crate) store: ScalarStore,
    pub(crate) target: Slot<f32>,
}

impl ScalarAnimator {
    fn seek(&mut self, t: f32) -> bool {
        let seg = self.track.locate(t);
        let v0 = self.store.get(seg.v0);
        let v = if seg.weight == 0.0 {
            v0
        } else {
            lerp(v0, self.store.get(seg.v1), seg.weight)
        };
        self.target.set(v)
    }
}

pub(crate) struct VectorAnimator {
    pub(crate) track: KeyframeTrack,
    pub(crate) store: VectorStore,
    pub(crate) target: Slot<Vec<f32>>,
}

impl VectorAnimator {
    fn seek(&mut self, t: f32) -> bool {
        let seg = self.track.locate(t);
        let v0 = self.store.get(seg.v0);
        let v1 = self.store.get(seg.v1);

        let mut target = self.target.0.borrow_mut();
        let mut changed = target.len() != v0.len();
        target.resize(v0.len(), 0.0);

        for ((out, &a), &b) in target.iter_mut().zip(v0).zip(v1) {
            let v = if seg.weight == 0.0 {
                a
            } else {
                lerp(a, b, seg.weight)
            };
            changed |= *out != v;
            *out = v;
        }
        changed
    }
}

pub(crate) struct SpatialAnimator {
    pub(crate) track: KeyframeTrack,
    pub(crate) store: SpatialStore,
    pub(crate) target: Slot<Point>,
}

impl SpatialAnimator {
    fn seek(&mut self, t: f32) -> bool {
        let seg = self.track.locate(t);
        let start = self.store.get(seg.v0);
        let v = if seg.weight == 0.0 {
            start.point
        } else if let Some(path) = &start.path {
            path.point_at(seg.weight)
        } else {
            start
                .point
                .lerp(self.store.get(seg.v1).point, f64::from(seg.weight))
        };
        self.target.set(v)
    }
}

pub(crate) struct TextAnimator {
    pub(crate) track: KeyframeTrack,
    pub(crate) store: TextStore,
    pub(crate) target: Slot<TextValue>,
}

impl TextAnimator {
    fn seek(&mut self, t: f32) -> bool {
        let seg = self.track.locate(t);
        let value = self.store.get(seg.v0);
        if *self.target.borrow() == *value {
            return false;
        }
        *self.target.0.borrow_mut() = value.clone();
        true
    }
}

/// Keyframe animator for one concrete value type.
pub(crate) enum KeyframeAnimator {
    Scalar(ScalarAnimator),
    Vector(VectorAnimator),
    Spatial(SpatialAnimator),
    Text(TextAnimator),
}

impl KeyframeAnimator {
    fn track(&self) -> &KeyframeTrack {
        match self {
            Self::Scalar(a) => &a.track,
            Self::Vector(a) => &a.track,
            Self::Spatial(a) => &a.track,
            Self::Text(a) => &a.track,
        }
    }

    /// `true` when the keyframes collapsed to a single value.
    pub(crate) fn is_constant(&self) -> bool {
        self.track().is_constant()
    }

    #[cfg(test)]
    pub(crate) fn keyframe_count(&self) -> usize {
        self.track().records().len()
    }
}

impl Animator for KeyframeAnimator {
    fn seek(&mut self, t: f32) -> bool {
        match self {
            Self::Scalar(a) => a.seek(t),
            Self::Vector(a) => a.seek(t),
            Self::Spatial(a) => a.seek(t),
            Self::Text(a) => a.seek(t),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/animator.rs"]
mod tests;
