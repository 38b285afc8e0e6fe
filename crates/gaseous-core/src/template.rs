//! Template-keyed reconstruction.
//!
//! A template is a stored skeleton keyed by the frame header's template
//! id. Registration is explicit and additive-only; there is no removal.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

/// A stored skeleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub id: u16,
    pub skeleton: Vec<u8>,
}

impl Template {
    /// Combine the skeleton with decompressed parameters. This is plain
    /// concatenation: the skeleton carries the fixed prefix of the
    /// message and the payload supplies the tail.
    pub fn fill(&self, params: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.skeleton.len() + params.len());
        out.extend_from_slice(&self.skeleton);
        out.extend_from_slice(params);
        out
    }
}

/// Owned template map, safe for concurrent registration and lookup.
/// Pass it by reference into unpack calls; registry lifetime is the
/// caller's concern, not a process-wide global.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: RwLock<HashMap<u16, Arc<Template>>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a skeleton under `id`. Re-registering an id replaces the
    /// previous skeleton.
    pub fn register(&self, id: u16, skeleton: Vec<u8>) {
        self.templates
            .write()
            .insert(id, Arc::new(Template { id, skeleton }));
    }

    pub fn get(&self, id: u16) -> Option<Arc<Template>> {
        self.templates.read().get(&id).cloned()
    }

    pub fn contains(&self, id: u16) -> bool {
        self.templates.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.templates.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_concatenates() {
        let tmpl = Template {
            id: 7,
            skeleton: vec![1, 2, 3],
        };
        assert_eq!(tmpl.fill(&[4, 5]), vec![1, 2, 3, 4, 5]);
        assert_eq!(tmpl.fill(&[]), vec![1, 2, 3]);
    }

    #[test]
    fn register_and_get() {
        let registry = TemplateRegistry::new();
        assert!(registry.is_empty());
        registry.register(1, vec![0xAA]);
        assert!(registry.contains(1));
        assert_eq!(registry.get(1).unwrap().skeleton, vec![0xAA]);
        assert!(registry.get(2).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn reregistration_replaces() {
        let registry = TemplateRegistry::new();
        registry.register(1, vec![0xAA]);
        registry.register(1, vec![0xBB]);
        assert_eq!(registry.get(1).unwrap().skeleton, vec![0xBB]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn concurrent_registration_and_lookup() {
        let registry = Arc::new(TemplateRegistry::new());
        let writers: Vec<_> = (0..4u16)
            .map(|i| {
                let r = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for id in 0..64u16 {
                        r.register(id * 4 + i, vec![i as u8]);
                        let _ = r.get(id);
                    }
                })
            })
            .collect();
        for w in writers {
            w.join().unwrap();
        }
        assert_eq!(registry.len(), 256);
    }
}
