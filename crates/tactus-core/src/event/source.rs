// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Event source and listener contracts.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Receiver side of the push flow: something a source can notify.
///
/// Implementors must not call back into the source that is notifying
/// them, as the source is mutably borrowed for the whole broadcast.
pub trait Notifiable<E: Clone> {
    /// Called by a subscribed source for every event it emits.
    fn be_notified_of(&mut self, event: &E);
}

/// Stable identity handed out when a listener subscribes to a source.
///
/// Identifiers are unique per source and never reused, so a listener
/// can present its id later, typically when pulling state back from a
/// [`crate::mvc::Pollable`] counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// One subscription, kept weak so a listener can vanish freely.
struct Subscription<E: Clone + 'static> {
    id: ListenerId,
    /// Thin pointer to the listener allocation, used for identity checks.
    ptr: *const (),
    link: Weak<RefCell<dyn Notifiable<E>>>,
}

/// Emitter side of the push flow.
///
/// A source keeps an ordered list of weak listener links and notifies
/// them in subscription order. Listeners that were dropped without
/// unsubscribing are detached on the fly, with a warning, instead of
/// being followed into freed memory.
pub struct EventSource<E: Clone + 'static> {
    subscriptions: Vec<Subscription<E>>,
    next_id: u64,
}

impl<E: Clone + 'static> EventSource<E> {
    /// Creates a source with no listener.
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
            next_id: 0,
        }
    }

    /// Subscribes a listener to every future event of this source.
    ///
    /// Subscribing is idempotent: a listener already present keeps its
    /// original [`ListenerId`], which is returned again, and a warning
    /// is logged since a double subscription usually reveals a wiring
    /// mistake in the caller.
    ///
    /// ## Arguments
    /// * `listener` - Shared handle to the listener. Only a weak link
    ///   is retained, so this source never extends the listener's
    ///   lifetime.
    ///
    /// ## Returns
    /// The identity of this subscription.
    pub fn subscribe<L>(&mut self, listener: &Rc<RefCell<L>>) -> ListenerId
    where
        L: Notifiable<E> + 'static,
    {
        self.prune_dead();

        let ptr = Rc::as_ptr(listener) as *const ();
        if let Some(existing) = self.subscriptions.iter().find(|s| s.ptr == ptr) {
            log::warn!("Listener is already subscribed to this source; keeping the first subscription.");
            return existing.id;
        }

        let id = ListenerId(self.next_id);
        self.next_id += 1;
        let weak = Rc::downgrade(listener);
        let link: Weak<RefCell<dyn Notifiable<E>>> = weak;
        self.subscriptions.push(Subscription { id, ptr, link });
        log::trace!(
            "Listener subscribed; source now has {} listener(s).",
            self.subscriptions.len()
        );
        id
    }

    /// Detaches a listener from this source.
    ///
    /// Unsubscribing a listener that is not attached is harmless and
    /// only logs a warning.
    pub fn unsubscribe<L>(&mut self, listener: &Rc<RefCell<L>>)
    where
        L: Notifiable<E> + 'static,
    {
        self.prune_dead();

        let ptr = Rc::as_ptr(listener) as *const ();
        match self.subscriptions.iter().position(|s| s.ptr == ptr) {
            Some(index) => {
                self.subscriptions.remove(index);
                log::trace!(
                    "Listener unsubscribed; source now has {} listener(s).",
                    self.subscriptions.len()
                );
            }
            None => {
                log::warn!("Cannot unsubscribe: listener is not attached to this source.");
            }
        }
    }

    /// Broadcasts an event to all current listeners, in subscription
    /// order.
    ///
    /// Listeners found dead are detached with a warning. A listener
    /// whose cell is already borrowed is skipped with a warning rather
    /// than poisoning the broadcast, which points at a reentrant
    /// notification in the caller.
    pub fn notify_all(&mut self, event: &E) {
        let mut dead = Vec::new();

        for index in 0..self.subscriptions.len() {
            match self.subscriptions[index].link.upgrade() {
                Some(listener) => match listener.try_borrow_mut() {
                    Ok(mut listener) => listener.be_notified_of(event),
                    Err(_) => {
                        log::warn!(
                            "Listener {:?} is already borrowed; skipping its notification.",
                            self.subscriptions[index].id
                        );
                    }
                },
                None => {
                    log::warn!(
                        "Listener {:?} was dropped without unsubscribing; detaching it.",
                        self.subscriptions[index].id
                    );
                    dead.push(self.subscriptions[index].id);
                }
            }
        }

        if !dead.is_empty() {
            self.subscriptions.retain(|s| !dead.contains(&s.id));
        }
    }

    /// Number of listeners still alive.
    pub fn listener_count(&self) -> usize {
        self.subscriptions
            .iter()
            .filter(|s| s.link.strong_count() > 0)
            .count()
    }

    /// Tells whether the given listener is currently attached.
    pub fn is_subscribed<L>(&self, listener: &Rc<RefCell<L>>) -> bool
    where
        L: Notifiable<E> + 'static,
    {
        let ptr = Rc::as_ptr(listener) as *const ();
        self.subscriptions
            .iter()
            .any(|s| s.ptr == ptr && s.link.strong_count() > 0)
    }

    /// Drops subscriptions whose listener is gone.
    ///
    /// Running this before any pointer comparison also rules out a
    /// stale entry matching a newer allocation at the same address.
    fn prune_dead(&mut self) {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.link.strong_count() > 0);
        let removed = before - self.subscriptions.len();
        if removed > 0 {
            log::debug!("Pruned {removed} dead listener link(s).");
        }
    }
}

impl<E: Clone + 'static> Default for EventSource<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone + 'static> Drop for EventSource<E> {
    fn drop(&mut self) {
        let remaining = self.listener_count();
        if remaining > 0 {
            log::warn!(
                "Event source dropped while {remaining} listener(s) were still subscribed."
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum ProbeEvent {
        Ping,
        Value(u32),
    }

    /// Records every received event into a journal shared with the test.
    struct Recorder {
        name: &'static str,
        journal: Rc<RefCell<Vec<String>>>,
    }

    impl Recorder {
        fn new(name: &'static str, journal: &Rc<RefCell<Vec<String>>>) -> Rc<RefCell<Self>> {
            Rc::new(RefCell::new(Self {
                name,
                journal: journal.clone(),
            }))
        }
    }

    impl Notifiable<ProbeEvent> for Recorder {
        fn be_notified_of(&mut self, event: &ProbeEvent) {
            self.journal.borrow_mut().push(format!("{}:{event:?}", self.name));
        }
    }

    #[test]
    fn subscribe_then_notify_reaches_listener() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let recorder = Recorder::new("a", &journal);
        let mut source = EventSource::new();

        source.subscribe(&recorder);
        source.notify_all(&ProbeEvent::Value(7));

        assert_eq!(journal.borrow().as_slice(), ["a:Value(7)"]);
    }

    #[test]
    fn delivery_follows_subscription_order() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let first = Recorder::new("first", &journal);
        let second = Recorder::new("second", &journal);
        let mut source = EventSource::new();

        source.subscribe(&first);
        source.subscribe(&second);
        source.notify_all(&ProbeEvent::Ping);

        assert_eq!(
            journal.borrow().as_slice(),
            ["first:Ping", "second:Ping"],
            "Listeners must be notified in subscription order"
        );
    }

    #[test]
    fn subscribing_twice_is_idempotent() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let recorder = Recorder::new("a", &journal);
        let mut source = EventSource::new();

        let first_id = source.subscribe(&recorder);
        let second_id = source.subscribe(&recorder);
        source.notify_all(&ProbeEvent::Ping);

        assert_eq!(first_id, second_id, "Resubscribing must keep the original id");
        assert_eq!(source.listener_count(), 1);
        assert_eq!(
            journal.borrow().len(),
            1,
            "A double subscription must not cause a double delivery"
        );
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let recorder = Recorder::new("a", &journal);
        let mut source = EventSource::new();

        source.subscribe(&recorder);
        source.unsubscribe(&recorder);
        source.notify_all(&ProbeEvent::Ping);

        assert!(journal.borrow().is_empty());
        assert!(!source.is_subscribed(&recorder));
    }

    #[test]
    fn unsubscribing_unknown_listener_is_a_noop() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let attached = Recorder::new("attached", &journal);
        let stranger = Recorder::new("stranger", &journal);
        let mut source = EventSource::new();

        source.subscribe(&attached);
        source.unsubscribe(&stranger);

        assert_eq!(source.listener_count(), 1);
        assert!(source.is_subscribed(&attached));
    }

    #[test]
    fn dropped_listener_is_detached_on_notify() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let survivor = Recorder::new("survivor", &journal);
        let doomed = Recorder::new("doomed", &journal);
        let mut source = EventSource::new();

        source.subscribe(&doomed);
        source.subscribe(&survivor);
        drop(doomed);

        assert_eq!(source.listener_count(), 1, "Dead links must not be counted");

        source.notify_all(&ProbeEvent::Ping);

        assert_eq!(journal.borrow().as_slice(), ["survivor:Ping"]);
        assert_eq!(
            source.subscriptions.len(),
            1,
            "The dead subscription must be pruned during the broadcast"
        );
    }

    #[test]
    fn notify_without_listeners_is_harmless() {
        let mut source = EventSource::<ProbeEvent>::new();
        source.notify_all(&ProbeEvent::Ping);
        assert_eq!(source.listener_count(), 0);
    }

    #[test]
    fn listener_ids_are_distinct() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let first = Recorder::new("a", &journal);
        let second = Recorder::new("b", &journal);
        let mut source = EventSource::new();

        let first_id = source.subscribe(&first);
        let second_id = source.subscribe(&second);

        assert_ne!(first_id, second_id);
    }
}
