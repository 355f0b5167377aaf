use spell_core::ScoreStore;
use web_sys::Storage;

/// High score persisted in `window.localStorage` as a decimal string.
///
/// Without storage (private mode, blocked cookies) reads return `None` and
/// writes are dropped, so the game still runs with a session-only record.
pub struct LocalStorageStore {
    storage: Option<Storage>,
}

impl LocalStorageStore {
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("storage: localStorage unavailable, high score will not persist");
        }
        Self { storage }
    }
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<u32> {
        let raw = self.storage.as_ref()?.get_item(key).ok().flatten()?;
        raw.trim().parse().ok()
    }

    fn set(&mut self, key: &str, value: u32) {
        if let Some(storage) = &self.storage {
            if let Err(err) = storage.set_item(key, &value.to_string()) {
                log::warn!("storage: failed to write {}: {:?}", key, err);
            }
        }
    }
}
