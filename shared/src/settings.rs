//! User settings as an explicitly owned store.
//!
//! The store is created by whoever owns the app (the shell, or a test) and
//! handed to consumers. Consumers hold a [`SettingsSubscription`]; dropping it
//! cancels the subscription. The synchronous API needs no async runtime.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default)]
    pub guest_mode: bool,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct SettingsStore {
    tx: watch::Sender<Settings>,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl SettingsStore {
    #[must_use]
    pub fn new(initial: Settings) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Restore from the JSON blob the shell persisted. Unknown fields are
    /// ignored; missing ones take their defaults.
    pub fn from_json(bytes: &[u8]) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_slice(bytes)?;
        Ok(Self::new(settings))
    }

    pub fn to_json(&self) -> Vec<u8> {
        // A struct of booleans always serializes.
        serde_json::to_vec(&self.get()).unwrap_or_default()
    }

    #[must_use]
    pub fn get(&self) -> Settings {
        *self.tx.borrow()
    }

    /// Apply `f`; subscribers are notified only if the value changed.
    pub fn update(&self, f: impl FnOnce(&mut Settings)) -> bool {
        let changed = self.tx.send_if_modified(|settings| {
            let before = *settings;
            f(settings);
            before != *settings
        });
        if changed {
            debug!(settings = ?self.get(), "settings changed");
        }
        changed
    }

    pub fn set_dark_mode(&self, enabled: bool) -> bool {
        self.update(|s| s.dark_mode = enabled)
    }

    pub fn set_guest_mode(&self, enabled: bool) -> bool {
        self.update(|s| s.guest_mode = enabled)
    }

    pub fn set_remember_me(&self, enabled: bool) -> bool {
        self.update(|s| s.remember_me = enabled)
    }

    #[must_use]
    pub fn subscribe(&self) -> SettingsSubscription {
        SettingsSubscription {
            rx: self.tx.subscribe(),
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A live view of the store. Intermediate values may be coalesced but the
/// latest one is always observed.
#[derive(Debug)]
pub struct SettingsSubscription {
    rx: watch::Receiver<Settings>,
}

impl SettingsSubscription {
    #[must_use]
    pub fn current(&self) -> Settings {
        *self.rx.borrow()
    }

    /// The latest value if it changed since the last call. `None` also once
    /// the store is gone.
    pub fn poll(&mut self) -> Option<Settings> {
        match self.rx.has_changed() {
            Ok(true) => Some(*self.rx.borrow_and_update()),
            Ok(false) | Err(_) => None,
        }
    }

    /// Wait for the next change. `None` once the store is dropped.
    pub async fn changed(&mut self) -> Option<Settings> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}
