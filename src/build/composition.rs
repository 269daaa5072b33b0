use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    rc::Rc,
};

use serde_json::Value;

use crate::{
    animation::animator::AnimatorScope,
    bind::binder::PropertyBinder,
    build::transform::TransformAdapter,
    json,
    player::animation::BuildOpts,
    scene::node::{Group, Matrix, MatrixRef, NodeRef},
};

/// Frame range of the composition being built, used to spot layers that are always visible.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CompRange {
    pub(crate) in_point: f32,
    pub(crate) out_point: f32,
}

impl CompRange {
    pub(crate) const UNBOUNDED: Self = Self {
        in_point: f32::NEG_INFINITY,
        out_point: f32::INFINITY,
    };
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct BuildCounters {
    pub(crate) layers: usize,
    pub(crate) precomps: usize,
}

/// State threaded through a single document build.
pub(crate) struct BuildContext<'a> {
    pub(crate) binder: PropertyBinder<'a>,
    pub(crate) opts: &'a BuildOpts,
    pub(crate) fps: f32,
    pub(crate) counters: BuildCounters,
    assets: HashMap<&'a str, &'a Value>,
    /// Precomp assets currently being attached, for cycle detection.
    attaching: HashSet<&'a str>,
}

impl<'a> BuildContext<'a> {
    pub(crate) fn new(
        binder: PropertyBinder<'a>,
        doc: &'a Value,
        opts: &'a BuildOpts,
        fps: f32,
    ) -> Self {
        let assets = doc["assets"]
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|a| Some((a["id"].as_str()?, a)))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            binder,
            opts,
            fps,
            counters: BuildCounters::default(),
            assets,
            attaching: HashSet::new(),
        }
    }

    pub(crate) fn asset(&self, id: &str) -> Option<&'a Value> {
        self.assets.get(id).copied()
    }

    /// Mark `id` as being attached; `false` if it already is (a reference cycle).
    pub(crate) fn begin_asset(&mut self, id: &'a str) -> bool {
        self.attaching.insert(id)
    }

    pub(crate) fn end_asset(&mut self, id: &str) {
        self.attaching.remove(id);
    }

    pub(crate) fn nesting_depth(&self) -> usize {
        self.attaching.len()
    }

    /// Build every layer of `jlayers`, registering their animators into `scope`.
    ///
    /// Layer transforms are bound first so parented layers always see up-to-date parent
    /// matrices, independently of the parents' own visibility.
    pub(crate) fn attach_composition(
        &mut self,
        jlayers: &'a Value,
        scope: &mut AnimatorScope,
        range: CompRange,
    ) -> NodeRef {
        let layers: &'a [Value] = jlayers.as_array().map(Vec::as_slice).unwrap_or_default();

        let matrices: Vec<MatrixRef> = layers
            .iter()
            .map(|jlayer| {
                let matrix = Matrix::new_ref();
                TransformAdapter::bind(&self.binder, &jlayer["ks"], Rc::clone(&matrix))
                    .attach_discardable(scope);
                matrix
            })
            .collect();
        self.link_parents(layers, &matrices);

        let mut nodes: Vec<NodeRef> = layers
            .iter()
            .zip(&matrices)
            .filter_map(|(jlayer, matrix)| {
                self.attach_layer(jlayer, Rc::clone(matrix), scope, range)
            })
            .collect();
        // The first layer is the top-most one.
        nodes.reverse();

        Rc::new(RefCell::new(Group::new(nodes)))
    }

    fn link_parents(&self, layers: &[Value], matrices: &[MatrixRef]) {
        let positions: HashMap<i32, usize> = layers
            .iter()
            .enumerate()
            .filter_map(|(pos, jlayer)| Some((json::parse::<i32>(&jlayer["ind"])?, pos)))
            .collect();
        let mut parent_of: Vec<Option<usize>> = vec![None; layers.len()];

        for (i, jlayer) in layers.iter().enumerate() {
            let Some(parent_ind) = json::parse::<i32>(&jlayer["parent"]) else {
                continue;
            };
            let Some(&parent) = positions.get(&parent_ind) else {
                self.binder
                    .warn(&format!("Could not find parent layer {parent_ind}."), None);
                continue;
            };

            // Established links are acyclic, so this walk terminates.
            let mut k = parent;
            let cyclic = loop {
                if k == i {
                    break true;
                }
                match parent_of[k] {
                    Some(next) => k = next,
                    None => break false,
                }
            };
            if cyclic {
                self.binder.warn("Layer parenting cycle detected.", Some(&jlayer["ind"]));
                continue;
            }

            parent_of[i] = Some(parent);
            matrices[i]
                .borrow_mut()
                .set_parent(Rc::clone(&matrices[parent]));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/build/composition.rs"]
mod tests;
