use serde_json::Value;

use crate::{
    animation::animator::{Animator, AnimatorScope, Slot, seek_all},
    build::composition::{BuildContext, CompRange},
    json,
    scene::node::NodeRef,
};

/// Maps parent time into a precomp's local time, `(t - start) / stretch`, or through the
/// time remap property (seconds) when present.
pub(crate) struct TimeMapper {
    animators: AnimatorScope,
    start: f32,
    stretch: f32,
    remap: Option<Slot<f32>>,
    fps: f32,
}

impl TimeMapper {
    pub(crate) fn new(
        animators: AnimatorScope,
        start: f32,
        stretch: f32,
        remap: Option<Slot<f32>>,
        fps: f32,
    ) -> Self {
        Self {
            animators,
            start,
            stretch: if stretch != 0.0 { stretch } else { 1.0 },
            remap,
            fps,
        }
    }

    pub(crate) fn local_time(&self, t: f32) -> f32 {
        match &self.remap {
            Some(remap) => remap.get() * self.fps,
            None => (t - self.start) / self.stretch,
        }
    }
}

impl Animator for TimeMapper {
    fn seek(&mut self, t: f32) -> bool {
        let local = self.local_time(t);
        seek_all(&mut self.animators, local)
    }
}

impl<'a> BuildContext<'a> {
    pub(crate) fn attach_precomp_layer(
        &mut self,
        jlayer: &'a Value,
        scope: &mut AnimatorScope,
    ) -> Option<NodeRef> {
        let Some(ref_id) = jlayer["refId"].as_str() else {
            self.binder.warn("Precomp layer without a refId.", None);
            return None;
        };
        let Some(asset) = self.asset(ref_id) else {
            self.binder
                .warn(&format!("Could not find asset \"{ref_id}\"."), None);
            return None;
        };
        if self.nesting_depth() >= self.opts.max_precomp_depth {
            self.binder
                .error(&format!("Precomp \"{ref_id}\" nested too deeply."), None);
            return None;
        }
        if !self.begin_asset(ref_id) {
            self.binder
                .warn(&format!("Asset cycle detected for \"{ref_id}\"."), None);
            return None;
        }

        let mut inner = AnimatorScope::new();
        let node = self.attach_composition(&asset["layers"], &mut inner, CompRange::UNBOUNDED);
        self.end_asset(ref_id);
        self.counters.precomps += 1;

        // Bound ahead of the mapper so the mapper reads the current remap value.
        let remap = if jlayer["tm"].is_object() {
            let slot = Slot::new(0.0);
            self.binder
                .bind(&jlayer["tm"], scope, &slot)
                .then_some(slot)
        } else {
            None
        };

        if !inner.is_empty() {
            scope.push(Box::new(TimeMapper::new(
                inner,
                json::parse_or(&jlayer["st"], 0.0),
                json::parse_or(&jlayer["sr"], 1.0),
                remap,
                self.fps,
            )));
        }
        Some(node)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/build/precomp.rs"]
mod tests;
