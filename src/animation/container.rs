use crate::animation::animator::{Animator, AnimatorScope, seek_all};

/// Pushes bound property values into scene nodes.
pub trait Adapter {
    /// Called after the container's animators ran and at least one changed, and always on the
    /// first tick.
    fn on_sync(&mut self);
}

/// Groups the animators bound for one scene node and syncs its adapter when any of them
/// changes.
pub struct PropertyContainer<A> {
    animators: AnimatorScope,
    adapter: A,
    has_synced: bool,
}

impl<A: Adapter> PropertyContainer<A> {
    pub fn new(animators: AnimatorScope, adapter: A) -> Self {
        Self {
            animators,
            adapter,
            has_synced: false,
        }
    }

    /// No time-varying children: one sync fully determines the adapter state.
    pub fn is_static(&self) -> bool {
        self.animators.is_empty()
    }

    #[cfg(test)]
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    #[cfg(test)]
    pub fn animator_count(&self) -> usize {
        self.animators.len()
    }
}

impl<A: Adapter + 'static> PropertyContainer<A> {
    /// Register into `scope`, unless static: then sync once at time 0 and drop.
    ///
    /// Returns `true` when the container was registered.
    pub fn attach_discardable(mut self, scope: &mut AnimatorScope) -> bool {
        if self.is_static() {
            self.seek(0.0);
            return false;
        }
        scope.push(Box::new(self));
        true
    }
}

impl<A: Adapter> Animator for PropertyContainer<A> {
    fn seek(&mut self, t: f32) -> bool {
        let changed = seek_all(&mut self.animators, t);
        if changed || !self.has_synced {
            self.adapter.on_sync();
            self.has_synced = true;
            return true;
        }
        false
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/container.rs"]
mod tests;
