//! Channel registry: per channel, per action, an ordered list of listeners.
//!
//! The registry is the only owner of listeners. UI code never holds a
//! listener handle; it registers and removes by `(channel, action)` name.
//!
//! # Invariants
//!
//! - Insertion order is invocation order.
//! - Duplicate registrations are appended, not merged: registering the same
//!   closure twice means it runs twice per event.
//! - Once a channel table exists it keeps an entry (possibly empty) for every
//!   action ever registered on it, until the whole channel is cleared.
//! - A channel with no table receives nothing; removing the table is what
//!   detaches dispatch for that channel.
//! - A listener registered with a liveness check is dropped the first time the
//!   check fails. It is never invoked or counted after that.

use models::{Channel, Payload};

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, trace};
use parking_lot::Mutex;

/// A registered callback. Receives only the payload.
pub type Listener = Arc<dyn Fn(&Payload) + Send + Sync>;

type Liveness = Box<dyn Fn() -> bool + Send + Sync>;

struct Registered {
    listener: Listener,
    live: Option<Liveness>,
}

impl Registered {
    fn is_live(&self) -> bool {
        self.live.as_ref().is_none_or(|live| live())
    }
}

type ActionTable = HashMap<String, Vec<Registered>>;

#[derive(Default)]
pub struct ChannelRegistry {
    channels: Mutex<HashMap<Channel, ActionTable>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `listener` to the list for `(channel, action)`.
    ///
    /// Creates the channel table and the action entry on first use. Returns
    /// `false` only for an empty action name, which no sender can produce.
    pub fn register<F>(&self, channel: Channel, action: &str, listener: F) -> bool
    where
        F: Fn(&Payload) + Send + Sync + 'static,
    {
        self.insert(channel, action, Arc::new(listener), None)
    }

    /// Like [`register`](Self::register), but the listener is removed once
    /// `live` returns `false`.
    pub(crate) fn register_while<F, L>(
        &self,
        channel: Channel,
        action: &str,
        listener: F,
        live: L,
    ) -> bool
    where
        F: Fn(&Payload) + Send + Sync + 'static,
        L: Fn() -> bool + Send + Sync + 'static,
    {
        self.insert(channel, action, Arc::new(listener), Some(Box::new(live)))
    }

    fn insert(
        &self,
        channel: Channel,
        action: &str,
        listener: Listener,
        live: Option<Liveness>,
    ) -> bool {
        if action.is_empty() {
            debug!("Refusing listener with empty action on {channel}");
            return false;
        }

        let mut channels = self.channels.lock();
        let table = channels.entry(channel).or_insert_with(|| {
            debug!("Creating listener table for channel {channel}");
            HashMap::new()
        });
        let listeners = table.entry(action.to_string()).or_default();
        prune(channel, action, listeners);
        listeners.push(Registered { listener, live });

        trace!(
            "Registered listener #{} for {channel}/{action}",
            listeners.len()
        );
        true
    }

    /// Drop every listener on the given channels (all channels when `None`)
    /// and remove their tables.
    pub fn clear(&self, channels: Option<&[Channel]>) {
        let mut table = self.channels.lock();

        match channels {
            None => {
                debug!("Clearing all {} channel(s)", table.len());
                table.clear();
            }
            Some(names) => {
                for channel in names {
                    if table.remove(channel).is_some() {
                        debug!("Cleared channel {channel}");
                    }
                }
            }
        }
    }

    /// Empty the list for one action, keeping the channel and its other actions.
    ///
    /// A channel that was never registered is left alone; cleanup paths call
    /// this without tracking whether they ever subscribed.
    pub fn clear_action(&self, channel: Channel, action: &str) {
        let mut channels = self.channels.lock();

        match channels
            .get_mut(&channel)
            .and_then(|table| table.get_mut(action))
        {
            Some(listeners) => {
                debug!(
                    "Clearing {} listener(s) for {channel}/{action}",
                    listeners.len()
                );
                listeners.clear();
            }
            None => trace!("Nothing to clear for {channel}/{action}"),
        }
    }

    /// Snapshot of the listeners for `(channel, action)`, in registration order.
    ///
    /// `None` when the channel has no table. The snapshot lets the dispatcher
    /// run listeners without holding the lock. Dead listeners are pruned first.
    pub(crate) fn snapshot(&self, channel: Channel, action: &str) -> Option<Vec<Listener>> {
        let mut channels = self.channels.lock();
        let table = channels.get_mut(&channel)?;
        let Some(listeners) = table.get_mut(action) else {
            return Some(Vec::new());
        };
        prune(channel, action, listeners);
        Some(
            listeners
                .iter()
                .map(|entry| Arc::clone(&entry.listener))
                .collect(),
        )
    }

    /// Live listeners for `(channel, action)`.
    pub fn listener_count(&self, channel: Channel, action: &str) -> usize {
        self.channels
            .lock()
            .get(&channel)
            .and_then(|table| table.get(action))
            .map_or(0, |listeners| {
                listeners.iter().filter(|entry| entry.is_live()).count()
            })
    }

    pub fn has_channel(&self, channel: Channel) -> bool {
        self.channels.lock().contains_key(&channel)
    }

    /// Whether `action` has an entry on `channel`, even an empty one.
    pub fn has_action(&self, channel: Channel, action: &str) -> bool {
        self.channels
            .lock()
            .get(&channel)
            .is_some_and(|table| table.contains_key(action))
    }

    /// Channels that currently have a table, sorted.
    pub fn channels(&self) -> Vec<Channel> {
        let mut channels: Vec<Channel> = self.channels.lock().keys().copied().collect();
        channels.sort();
        channels
    }
}

fn prune(channel: Channel, action: &str, listeners: &mut Vec<Registered>) {
    let before = listeners.len();
    listeners.retain(Registered::is_live);
    let dropped = before - listeners.len();
    if dropped > 0 {
        trace!("Dropped {dropped} dead listener(s) for {channel}/{action}");
    }
}
