//! Small reactive state containers.
//!
//! A [`Store`] holds one state struct. `set` applies a partial update and
//! notifies the watchers bound to the fields that actually changed. Feature
//! stores (navbar, sidebar, global) wrap a `Store` and add domain actions.
//!
//! [`Subscriptions`] is the bookkeeping every feature store uses for its
//! event listeners: it owns the tokens, makes re-initialization replace
//! (never accumulate) them, and makes cleanup idempotent.

pub mod global;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::events::SubscriptionToken;

pub use global::{GlobalField, GlobalPatch, GlobalState, GlobalStore};

/// State held by a [`Store`].
///
/// `Patch` names a subset of the fields with their new values; `apply`
/// writes them and reports the fields whose value actually changed.
pub trait StoreState: Clone + 'static {
    type Field: Copy + Eq + fmt::Debug + 'static;
    type Patch;

    fn apply(&mut self, patch: Self::Patch) -> Vec<Self::Field>;
}

/// Identifies a watcher registered with [`Store::watch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

type WatchFn<S> = dyn Fn(&S);

struct Watcher<S: StoreState> {
    id: WatchId,
    fields: Vec<S::Field>,
    callback: Rc<WatchFn<S>>,
}

struct StoreInner<S: StoreState> {
    name: &'static str,
    state: RefCell<S>,
    watchers: RefCell<Vec<Watcher<S>>>,
    next_watch: Cell<u64>,
}

/// Shared handle to a reactive state container.
pub struct Store<S: StoreState> {
    inner: Rc<StoreInner<S>>,
}

impl<S: StoreState> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: StoreState + fmt::Debug> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.inner.name)
            .field("state", &*self.inner.state.borrow())
            .finish()
    }
}

impl<S: StoreState> Store<S> {
    pub fn new(name: &'static str, initial: S) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                name,
                state: RefCell::new(initial),
                watchers: RefCell::new(Vec::new()),
                next_watch: Cell::new(0),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Current state snapshot.
    pub fn get(&self) -> S {
        self.inner.state.borrow().clone()
    }

    /// Read a value from the current state without cloning all of it.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&*self.inner.state.borrow())
    }

    /// Apply a partial update. Returns the fields that changed.
    ///
    /// Watchers run after the state borrow is released, so they may read
    /// or update the store again.
    pub fn set(&self, patch: S::Patch) -> Vec<S::Field> {
        let (changed, snapshot) = {
            let mut state = self.inner.state.borrow_mut();
            let changed = state.apply(patch);
            (changed, state.clone())
        };
        if !changed.is_empty() {
            log::debug!("[{}] changed {:?}", self.inner.name, changed);
            self.notify(&changed, &snapshot);
        }
        changed
    }

    /// Compute a patch from the current state and apply it.
    pub fn update(&self, f: impl FnOnce(&S) -> S::Patch) -> Vec<S::Field> {
        let patch = self.read(f);
        self.set(patch)
    }

    /// Call `callback` with the new snapshot whenever one of `fields` changes.
    /// An empty field list watches every field.
    pub fn watch(&self, fields: &[S::Field], callback: impl Fn(&S) + 'static) -> WatchId {
        let id = WatchId(self.inner.next_watch.get() + 1);
        self.inner.next_watch.set(id.0);
        self.inner.watchers.borrow_mut().push(Watcher {
            id,
            fields: fields.to_vec(),
            callback: Rc::new(callback),
        });
        id
    }

    /// Remove a watcher. Returns false if it was already gone.
    pub fn unwatch(&self, id: WatchId) -> bool {
        let mut watchers = self.inner.watchers.borrow_mut();
        let before = watchers.len();
        watchers.retain(|w| w.id != id);
        watchers.len() != before
    }

    /// A non-owning handle, for event handlers registered on the channel.
    pub fn downgrade(&self) -> WeakStore<S> {
        WeakStore {
            inner: Rc::downgrade(&self.inner),
        }
    }

    fn notify(&self, changed: &[S::Field], snapshot: &S) {
        let interested: Vec<Rc<WatchFn<S>>> = self
            .inner
            .watchers
            .borrow()
            .iter()
            .filter(|w| w.fields.is_empty() || w.fields.iter().any(|f| changed.contains(f)))
            .map(|w| Rc::clone(&w.callback))
            .collect();
        for callback in interested {
            callback(snapshot);
        }
    }
}

/// Weak counterpart of [`Store`]; the channel must never own a store.
pub struct WeakStore<S: StoreState> {
    inner: Weak<StoreInner<S>>,
}

impl<S: StoreState> Clone for WeakStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<S: StoreState> WeakStore<S> {
    pub fn upgrade(&self) -> Option<Store<S>> {
        self.inner.upgrade().map(|inner| Store { inner })
    }
}

/// Event-listener tokens owned by one feature store.
#[derive(Debug, Default)]
pub struct Subscriptions {
    tokens: RefCell<Vec<SubscriptionToken>>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Release any held tokens, then hold `tokens` instead.
    pub fn replace(&self, tokens: Vec<SubscriptionToken>) {
        let released = self.release();
        if released > 0 {
            log::debug!("released {released} stale subscription(s) before re-initializing");
        }
        *self.tokens.borrow_mut() = tokens;
    }

    /// Unsubscribe and discard every held token. Returns how many were held.
    pub fn release(&self) -> usize {
        let tokens: Vec<SubscriptionToken> = self.tokens.borrow_mut().drain(..).collect();
        let count = tokens.len();
        for token in tokens {
            token.unsubscribe();
        }
        count
    }

    pub fn is_active(&self) -> bool {
        !self.tokens.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.borrow().is_empty()
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        self.release();
    }
}

/// Write `value` into `slot`, recording `field` when it differs.
pub(crate) fn assign<T: PartialEq, F>(slot: &mut T, value: Option<T>, field: F, changed: &mut Vec<F>) {
    if let Some(value) = value {
        if *slot != value {
            *slot = value;
            changed.push(field);
        }
    }
}
