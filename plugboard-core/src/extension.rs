//! Typed extension slots.
//!
//! Plugins publish capabilities (a logger, a client, a cache) under a string
//! name; any code holding the [`Context`](crate::Context) reads them back with
//! the concrete type. A capability becomes visible only once the plugin that
//! publishes it has been installed, so installation order decides what is
//! available to later plugins.

use std::{
    any::{Any, type_name},
    collections::HashMap,
    fmt,
    sync::Arc,
};

struct Slot {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

/// A mapping from capability name to a type-erased value.
#[derive(Default)]
pub struct Extensions {
    slots: HashMap<String, Slot>,
}

impl Extensions {
    /// Create an empty extension map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `name`.
    ///
    /// Returns `true` if an existing value was replaced.
    pub fn insert<T: Send + Sync + 'static>(&mut self, name: impl Into<String>, value: T) -> bool {
        self.insert_arc(name, Arc::new(value))
    }

    /// Store an already shared value under `name`.
    pub fn insert_arc<T: Send + Sync + 'static>(
        &mut self,
        name: impl Into<String>,
        value: Arc<T>,
    ) -> bool {
        let slot = Slot {
            value,
            type_name: type_name::<T>(),
        };
        self.slots.insert(name.into(), slot).is_some()
    }

    /// Get a shared handle to the value under `name`.
    ///
    /// Returns `None` when the slot is empty or holds a different type.
    pub fn get<T: Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        let slot = self.slots.get(name)?;
        Arc::clone(&slot.value).downcast::<T>().ok()
    }

    /// Borrow the value under `name`.
    pub fn get_ref<T: Send + Sync + 'static>(&self, name: &str) -> Option<&T> {
        self.slots.get(name)?.value.downcast_ref::<T>()
    }

    /// Name of the type stored under `name`.
    pub fn type_name_of(&self, name: &str) -> Option<&'static str> {
        self.slots.get(name).map(|slot| slot.type_name)
    }

    /// Check whether a slot exists.
    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Iterate over the slot names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Get the number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if there are no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.slots.iter().map(|(name, slot)| (name, slot.type_name)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_read() {
        let mut ext = Extensions::new();
        assert!(!ext.insert("answer", 42u32));

        assert_eq!(ext.get::<u32>("answer").as_deref(), Some(&42));
        assert_eq!(ext.get_ref::<u32>("answer"), Some(&42));
        assert_eq!(ext.type_name_of("answer"), Some("u32"));
    }

    #[test]
    fn test_wrong_type_reads_as_absent() {
        let mut ext = Extensions::new();
        ext.insert("answer", 42u32);
        assert!(ext.get::<String>("answer").is_none());
        assert!(ext.get_ref::<i64>("answer").is_none());
        assert!(ext.get::<u32>("missing").is_none());
    }

    #[test]
    fn test_overwrite_reports_replacement() {
        let mut ext = Extensions::new();
        ext.insert("x", 1i32);
        assert!(ext.insert("x", 2i32));
        assert_eq!(ext.get_ref::<i32>("x"), Some(&2));
        assert_eq!(ext.len(), 1);
    }

    #[test]
    fn test_function_capability() {
        type Shout = Box<dyn Fn(&str) -> String + Send + Sync>;

        let mut ext = Extensions::new();
        let shout: Shout = Box::new(|s| s.to_uppercase());
        ext.insert("shout", shout);

        let f = ext.get::<Shout>("shout").unwrap();
        assert_eq!((f.as_ref())("hi"), "HI");
    }
}
