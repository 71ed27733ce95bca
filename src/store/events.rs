//! Change notifications fanned out to UI listeners

use std::fmt;

use crate::asset::AssetId;
use crate::registry::Category;

/// What changed in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetEvent {
    /// Records were inserted or replaced (one event per commit, however many ids)
    Upserted { category: Category, ids: Vec<AssetId> },
    /// Records were removed
    Removed { category: Category, ids: Vec<AssetId> },
    /// The placed-block map was rewritten
    TerrainChanged,
    /// The placed-object list was rewritten
    EnvironmentChanged,
}

/// Handle returned by [`Subscribers::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&AssetEvent)>;

/// Synchronous listener list; delivery happens inside the mutating call
#[derive(Default)]
pub struct Subscribers {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&AssetEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the id was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &AssetEvent) {
        log::debug!("emit {:?} to {} listener(s)", event, self.listeners.len());
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
