//! Collaborator ports - the engine's view of the outside world.
//!
//! Asset loading, audio, animation playback and key-value persistence are all
//! provided by the embedding layer. The engine only talks to these traits, and
//! ships in-memory implementations for headless runs and tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::AssetError;
use crate::pool::CardHandle;
use crate::types::{AnimationTrigger, AudioCue};

/// Opaque handle to a loaded sprite. Must be handed back via `release_sprite`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteHandle(pub u64);

pub trait AssetLoader {
    fn load_sprite(&mut self, address: &str) -> Result<SpriteHandle, AssetError>;
    fn release_sprite(&mut self, handle: SpriteHandle);
}

/// Fire-and-forget sound playback.
pub trait AudioSink {
    fn play(&mut self, cue: AudioCue);
}

/// Fire-and-forget animation triggers, addressed per card.
pub trait AnimationDriver {
    fn set_trigger(&mut self, card: CardHandle, trigger: AnimationTrigger);
}

/// Key-value preference storage.
///
/// Implementations absorb their own I/O failures; the engine never sees them.
pub trait PreferenceStore {
    fn has_key(&self, key: &str) -> bool;
    fn get_int(&self, key: &str) -> Option<i64>;
    fn set_int(&mut self, key: &str, value: i64);
    fn get_string(&self, key: &str) -> Option<String>;
    fn set_string(&mut self, key: &str, value: &str);
    fn delete_key(&mut self, key: &str);
}

/// Everything the engine needs from its host, injected once at construction.
pub struct Services {
    pub assets: Box<dyn AssetLoader>,
    pub audio: Box<dyn AudioSink>,
    pub animation: Box<dyn AnimationDriver>,
    pub store: Box<dyn PreferenceStore>,
}

impl Services {
    pub fn new(
        assets: Box<dyn AssetLoader>,
        audio: Box<dyn AudioSink>,
        animation: Box<dyn AnimationDriver>,
        store: Box<dyn PreferenceStore>,
    ) -> Self {
        Self {
            assets,
            audio,
            animation,
            store,
        }
    }

    /// Accept-all assets, silent audio and animation, in-memory store.
    pub fn headless() -> Self {
        Self::new(
            Box::new(MemoryAssets::accept_all()),
            Box::new(NullAudio),
            Box::new(NullAnimation),
            Box::new(MemoryStore::default()),
        )
    }

    /// Dispatch visual and audio feedback for a card transition.
    pub(crate) fn feedback(&mut self, card: CardHandle, trigger: AnimationTrigger, cue: Option<AudioCue>) {
        self.animation.set_trigger(card, trigger);
        if let Some(cue) = cue {
            self.audio.play(cue);
        }
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::headless()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: AudioCue) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullAnimation;

impl AnimationDriver for NullAnimation {
    fn set_trigger(&mut self, _card: CardHandle, _trigger: AnimationTrigger) {}
}

/// Audio sink that appends every cue to a shared log.
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    log: Rc<RefCell<Vec<AudioCue>>>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared view of the log; stays valid after `self` is boxed into `Services`.
    pub fn log(&self) -> Rc<RefCell<Vec<AudioCue>>> {
        Rc::clone(&self.log)
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: AudioCue) {
        self.log.borrow_mut().push(cue);
    }
}

/// Animation driver that appends every trigger to a shared log.
#[derive(Debug, Clone, Default)]
pub struct RecordingAnimation {
    log: Rc<RefCell<Vec<(CardHandle, AnimationTrigger)>>>,
}

impl RecordingAnimation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Rc<RefCell<Vec<(CardHandle, AnimationTrigger)>>> {
        Rc::clone(&self.log)
    }
}

impl AnimationDriver for RecordingAnimation {
    fn set_trigger(&mut self, card: CardHandle, trigger: AnimationTrigger) {
        self.log.borrow_mut().push((card, trigger));
    }
}

#[derive(Debug, Default)]
struct AssetBook {
    next_handle: u64,
    live: HashSet<SpriteHandle>,
}

/// In-memory asset loader.
///
/// With `accept_all` every address resolves; otherwise only registered
/// addresses do. Tracks live handles so leaks are observable.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    known: Option<HashSet<String>>,
    book: Rc<RefCell<AssetBook>>,
}

impl MemoryAssets {
    pub fn accept_all() -> Self {
        Self::default()
    }

    pub fn with_addresses<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: Some(addresses.into_iter().map(Into::into).collect()),
            book: Rc::default(),
        }
    }

    /// Number of handles loaded but not yet released (shared across clones).
    pub fn live_handles(&self) -> usize {
        self.book.borrow().live.len()
    }
}

impl AssetLoader for MemoryAssets {
    fn load_sprite(&mut self, address: &str) -> Result<SpriteHandle, AssetError> {
        if address.is_empty() {
            return Err(AssetError::Invalid {
                address: address.to_string(),
            });
        }
        if let Some(known) = &self.known {
            if !known.contains(address) {
                return Err(AssetError::NotFound {
                    address: address.to_string(),
                });
            }
        }
        let mut book = self.book.borrow_mut();
        book.next_handle += 1;
        let handle = SpriteHandle(book.next_handle);
        book.live.insert(handle);
        Ok(handle)
    }

    fn release_sprite(&mut self, handle: SpriteHandle) {
        self.book.borrow_mut().live.remove(&handle);
    }
}

/// A stored preference value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    Int(i64),
    Str(String),
}

/// Preference store backed by an ordered map. Also the in-memory half of file stores.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, StoredValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: BTreeMap<String, StoredValue>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &BTreeMap<String, StoredValue> {
        &self.entries
    }
}

impl PreferenceStore for MemoryStore {
    fn has_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn get_int(&self, key: &str) -> Option<i64> {
        match self.entries.get(key)? {
            StoredValue::Int(v) => Some(*v),
            StoredValue::Str(_) => None,
        }
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.entries.insert(key.to_string(), StoredValue::Int(value));
    }

    fn get_string(&self, key: &str) -> Option<String> {
        match self.entries.get(key)? {
            StoredValue::Str(v) => Some(v.clone()),
            StoredValue::Int(_) => None,
        }
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.entries
            .insert(key.to_string(), StoredValue::Str(value.to_string()));
    }

    fn delete_key(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Shared-handle store so a test can keep inspecting what the engine wrote.
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Rc<RefCell<MemoryStore>>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MemoryStore {
        self.inner.borrow().clone()
    }
}

impl PreferenceStore for SharedStore {
    fn has_key(&self, key: &str) -> bool {
        self.inner.borrow().has_key(key)
    }

    fn get_int(&self, key: &str) -> Option<i64> {
        self.inner.borrow().get_int(key)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.inner.borrow_mut().set_int(key, value);
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.inner.borrow().get_string(key)
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.inner.borrow_mut().set_string(key, value);
    }

    fn delete_key(&mut self, key: &str) {
        self.inner.borrow_mut().delete_key(key);
    }
}
