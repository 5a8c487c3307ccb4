use bytes::Bytes;
use tracing::debug;

use crate::key::ResourceKey;
use crate::registry::Registry;

/// A stored render script.
#[derive(Debug, Clone)]
pub struct Script {
    pub key: ResourceKey,
    pub bytecode: Bytes,
}

/// Scripts by key. A `put` with an existing key replaces the old script.
#[derive(Debug, Default)]
pub struct ScriptRegistry {
    scripts: Registry<Script>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bytecode` under `key`, dropping any previous script first.
    pub fn put(&mut self, key: ResourceKey, bytecode: impl Into<Bytes>) -> &Script {
        if self.scripts.remove(key.as_bytes()).is_some() {
            debug!(%key, "replacing script");
        }
        let bytecode = bytecode.into();
        let (script, _) = self.scripts.insert_if_absent(key.clone(), || Script { key, bytecode });
        script
    }

    pub fn get(&self, key: &[u8]) -> Option<&Script> {
        self.scripts.get(key)
    }

    /// Cheap shared handle to a script's bytecode, so the caller can run it
    /// while mutating other state.
    pub fn bytecode(&self, key: &[u8]) -> Option<Bytes> {
        self.scripts.get(key).map(|script| script.bytecode.clone())
    }

    /// Remove a script. No-op if absent.
    pub fn delete(&mut self, key: &[u8]) -> bool {
        self.scripts.remove(key).is_some()
    }

    pub fn reset(&mut self) {
        self.scripts.clear_with(|_, _| {});
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_twice_keeps_one_with_latest_content() {
        let mut scripts = ScriptRegistry::new();
        scripts.put("root".into(), vec![1, 2, 3, 4]);
        let stored = scripts.put("root".into(), vec![5, 6, 7, 8]);
        assert_eq!(stored.bytecode.as_ref(), &[5, 6, 7, 8]);
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts.get(b"root").unwrap().bytecode.as_ref(), &[5, 6, 7, 8]);
    }

    #[test]
    fn delete_is_noop_when_absent() {
        let mut scripts = ScriptRegistry::new();
        assert!(!scripts.delete(b"nope"));
        scripts.put("a".into(), Vec::new());
        assert!(scripts.delete(b"a"));
        assert!(scripts.get(b"a").is_none());
    }

    #[test]
    fn reset_clears_every_key() {
        let mut scripts = ScriptRegistry::new();
        for key in ["a", "b", "c"] {
            scripts.put(key.into(), vec![0; 4]);
        }
        scripts.reset();
        for key in ["a", "b", "c"] {
            assert!(scripts.get(key.as_bytes()).is_none());
        }
        assert!(scripts.is_empty());
    }

    #[test]
    fn bytecode_outlives_replacement() {
        let mut scripts = ScriptRegistry::new();
        scripts.put("s".into(), vec![1; 8]);
        let running = scripts.bytecode(b"s").unwrap();
        scripts.put("s".into(), vec![2; 4]);
        assert_eq!(running.as_ref(), &[1; 8]);
    }
}
