use std::collections::HashMap;

/// Key-value persistence for scalar scores.
/// The browser bridge backs this with `localStorage`.
pub trait ScoreStore {
    fn get(&self, key: &str) -> Option<u32>;
    fn set(&mut self, key: &str, value: u32);
}

/// In-memory store. Used by tests and as the fallback when the host has no storage.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, u32>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: u32) -> Self {
        let mut store = Self::new();
        store.values.insert(key.to_string(), value);
        store
    }

    /// Number of `set` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl ScoreStore for MemoryStore {
    fn get(&self, key: &str) -> Option<u32> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: u32) {
        self.writes += 1;
        self.values.insert(key.to_string(), value);
    }
}

/// The persisted high score. Read once at construction, written only when beaten.
pub struct HighScore {
    key: String,
    value: u32,
    store: Box<dyn ScoreStore>,
}

impl HighScore {
    pub fn load(key: impl Into<String>, store: Box<dyn ScoreStore>) -> Self {
        let key = key.into();
        let value = store.get(&key).unwrap_or(0);
        Self { key, value, store }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Record a final score. Persists and returns true only for a new high score.
    pub fn record(&mut self, score: u32) -> bool {
        if score <= self.value {
            return false;
        }
        self.value = score;
        self.store.set(&self.key, score);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Store whose contents stay observable after being boxed.
    #[derive(Clone, Default)]
    struct SharedStore(Rc<RefCell<MemoryStore>>);

    impl ScoreStore for SharedStore {
        fn get(&self, key: &str) -> Option<u32> {
            self.0.borrow().get(key)
        }
        fn set(&mut self, key: &str, value: u32) {
            self.0.borrow_mut().set(key, value);
        }
    }

    #[test]
    fn missing_key_loads_as_zero() {
        let hs = HighScore::load("k", Box::new(MemoryStore::new()));
        assert_eq!(hs.value(), 0);
    }

    #[test]
    fn loads_existing_value() {
        let hs = HighScore::load("k", Box::new(MemoryStore::with_value("k", 120)));
        assert_eq!(hs.value(), 120);
    }

    #[test]
    fn only_higher_scores_are_written() {
        let shared = SharedStore::default();
        let mut hs = HighScore::load("k", Box::new(shared.clone()));
        assert!(hs.record(50));
        assert!(!hs.record(50));
        assert!(!hs.record(10));
        assert!(hs.record(80));
        assert_eq!(hs.value(), 80);
        assert_eq!(shared.0.borrow().get("k"), Some(80));
        assert_eq!(shared.0.borrow().writes(), 2);
    }
}
