//! Scene Cache
//!
//! Best-effort map from layer index to its last built scene. The registry
//! length is the source of truth for iteration, so entries left behind by
//! removed layers are tolerated rather than purged.

use std::collections::BTreeMap;

use super::mesh::Scene;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneCache {
    scenes: BTreeMap<usize, Scene>,
}

impl SceneCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: usize, scene: Scene) {
        self.scenes.insert(index, scene);
    }

    pub fn get(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(&index)
    }

    pub fn clear(&mut self) {
        self.scenes.clear();
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.scenes.keys().copied()
    }
}

impl FromIterator<(usize, Scene)> for SceneCache {
    fn from_iter<I: IntoIterator<Item = (usize, Scene)>>(iter: I) -> Self {
        Self {
            scenes: iter.into_iter().collect(),
        }
    }
}
