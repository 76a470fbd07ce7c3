//! Per-collection load state shared by the client stores.

use fetchboard_core::models::query::Query;
use fetchboard_core::models::widget::DashboardWidget;

/// Where a collection stands relative to the server.
///
/// ```text
/// Idle --load--> Loading --ok--> Ready
///                        \--err-> Error
/// ```
///
/// A failed mutation also moves the collection to `Error`; the next
/// acknowledged operation moves it back to `Ready` (or `Idle` if it was never
/// loaded).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    /// The last operation failed with this message.
    Error(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Records addressable by id.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Query {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for DashboardWidget {
    fn key(&self) -> &str {
        &self.id
    }
}

/// A cached list of records plus its [`LoadState`].
///
/// Items only change on server acknowledgement; failures leave them intact.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Vec<T>,
    state: LoadState,
    loaded: bool,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            state: LoadState::Idle,
            loaded: false,
        }
    }
}

impl<T: Keyed> Collection<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.key() == id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.key() == id)
    }

    pub(crate) fn begin_load(&mut self) {
        self.state = LoadState::Loading;
    }

    /// Replace the whole list with a fresh server copy.
    pub(crate) fn loaded(&mut self, items: Vec<T>) {
        self.items = items;
        self.loaded = true;
        self.state = LoadState::Ready;
    }

    /// An operation other than a full load succeeded.
    pub(crate) fn acknowledged(&mut self) {
        self.state = if self.loaded {
            LoadState::Ready
        } else {
            LoadState::Idle
        };
    }

    pub(crate) fn failed(&mut self, message: String) {
        self.state = LoadState::Error(message);
    }

    /// Replace the record with the same id, or append it.
    pub(crate) fn upsert(&mut self, item: T) {
        match self.items.iter().position(|i| i.key() == item.key()) {
            Some(index) => self.items[index] = item,
            None => self.items.push(item),
        }
    }

    /// Replace the record with the same id if cached.
    pub(crate) fn replace(&mut self, item: T) -> bool {
        match self.get_mut(item.key()) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.key() != id);
        self.items.len() != before
    }

    pub(crate) fn sort_by_key<K: Ord>(&mut self, f: impl FnMut(&T) -> K) {
        self.items.sort_by_key(f);
    }
}
