use rustc_hash::FxHashMap;

use super::NodeId;

/// Document-wide map from `id` attribute to node.
///
/// One registry belongs to exactly one [`Document`](super::Document); it is
/// filled while the tree is built and dropped with it, so concurrent loads
/// never observe each other's ids.
#[derive(Debug, Default, Clone)]
pub struct IdRegistry {
    ids: FxHashMap<String, NodeId>,
}

impl IdRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `node` under `id`. The first registration wins; returns
    /// `false` if the id was already taken.
    pub fn register(&mut self, id: &str, node: NodeId) -> bool {
        if self.ids.contains_key(id) {
            return false;
        }
        self.ids.insert(id.to_string(), node);
        true
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_registration_wins() {
        let mut registry = IdRegistry::new();
        assert!(registry.register("mesh", NodeId::from_index(3)));
        assert!(!registry.register("mesh", NodeId::from_index(7)));
        assert_eq!(registry.get("mesh"), Some(NodeId::from_index(3)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn clear_empties_registry() {
        let mut registry = IdRegistry::new();
        registry.register("a", NodeId::from_index(0));
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.get("a"), None);
    }
}
