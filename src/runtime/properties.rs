//! String-keyed property stores.
//!
//! Used for network properties (readable and writable by every component),
//! runtime properties (set by the host, read-only for components) and
//! per-component properties. No schema: any key, any `Packet`.

use crate::runtime::packet::Packet;
use crate::runtime::sync::{read, write};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct Properties {
    inner: RwLock<HashMap<String, Packet>>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Packet> {
        read(&self.inner).get(key).cloned()
    }

    /// Set a property, returning the previous value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Packet>) -> Option<Packet> {
        write(&self.inner).insert(key.into(), value.into())
    }

    pub fn remove(&self, key: &str) -> Option<Packet> {
        write(&self.inner).remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        read(&self.inner).contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = read(&self.inner).keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        read(&self.inner).len()
    }

    pub fn is_empty(&self) -> bool {
        read(&self.inner).is_empty()
    }
}

impl std::fmt::Debug for Properties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Properties")
            .field("keys", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let props = Properties::new();
        assert!(props.is_empty());
        assert_eq!(props.set("rate", 10), None);
        assert_eq!(props.set("rate", 20), Some(Packet::Int(10)));
        assert_eq!(props.get("rate"), Some(Packet::Int(20)));
        assert_eq!(props.get("missing"), None);
        assert_eq!(props.len(), 1);
    }

    #[test]
    fn test_remove_and_keys() {
        let props = Properties::new();
        props.set("b", "two");
        props.set("a", true);
        assert_eq!(props.keys(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(props.remove("a"), Some(Packet::Bool(true)));
        assert!(!props.contains("a"));
    }
}
