//! # warren_event - Deterministic Event Delivery
//!
//! Small event plumbing for the environment control core:
//! - [`EventDispatcher`]: an explicit subscriber list, delivering in
//!   subscribe order
//! - [`EventQueue`]: a single-type queue the owning component drains once
//!   per tick
//!
//! Dispatch order is part of the observable contract downstream, so both
//! types are strictly FIFO over their inputs.

use std::collections::VecDeque;

/// Subscriber ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub u64);

/// Boxed event handler
pub type Handler<E> = Box<dyn Fn(&E) + Send + Sync>;

/// Event dispatcher with an explicit subscriber list.
///
/// Handlers run synchronously on the caller's thread, in subscribe order.
pub struct EventDispatcher<E> {
    subscribers: Vec<(SubscriberId, Handler<E>)>,
    next_id: u64,
}

impl<E> EventDispatcher<E> {
    /// Create an empty dispatcher
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 1,
        }
    }

    /// Subscribe a handler, returning its ID for later removal
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriberId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    /// Remove a subscriber; returns false if the ID was unknown
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    /// Deliver an event to every subscriber, in subscribe order
    pub fn emit(&self, event: &E) {
        for (_, handler) in &self.subscribers {
            handler(event);
        }
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Check if nobody is listening
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<E> Default for EventDispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// FIFO queue of pending events, drained by the owning component each tick
#[derive(Debug)]
pub struct EventQueue<E> {
    queue: VecDeque<E>,
}

impl<E> EventQueue<E> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Append an event
    pub fn push(&mut self, event: E) {
        self.queue.push_back(event);
    }

    /// Take all pending events, preserving push order
    pub fn drain(&mut self) -> Vec<E> {
        self.queue.drain(..).collect()
    }

    /// Pending event count
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Prelude
pub mod prelude {
    pub use crate::{EventDispatcher, EventQueue, SubscriberId};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct TestEvent(i32);

    #[test]
    fn test_emit_reaches_subscribers() {
        let mut dispatcher = EventDispatcher::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        dispatcher.subscribe(move |e: &TestEvent| {
            seen_clone.lock().unwrap().push(e.0);
        });

        dispatcher.emit(&TestEvent(7));
        dispatcher.emit(&TestEvent(8));

        assert_eq!(*seen.lock().unwrap(), vec![7, 8]);
    }

    #[test]
    fn test_delivery_in_subscribe_order() {
        let mut dispatcher = EventDispatcher::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = order.clone();
            dispatcher.subscribe(move |_: &TestEvent| {
                order.lock().unwrap().push(tag);
            });
        }

        dispatcher.emit(&TestEvent(0));

        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut dispatcher = EventDispatcher::new();
        let count = Arc::new(Mutex::new(0u32));
        let count_clone = count.clone();

        let id = dispatcher.subscribe(move |_: &TestEvent| {
            *count_clone.lock().unwrap() += 1;
        });

        dispatcher.emit(&TestEvent(0));
        assert!(dispatcher.unsubscribe(id));
        assert!(!dispatcher.unsubscribe(id));
        dispatcher.emit(&TestEvent(0));

        assert_eq!(*count.lock().unwrap(), 1);
        assert!(dispatcher.is_empty());
    }

    #[test]
    fn test_queue_drains_in_push_order() {
        let mut queue = EventQueue::new();

        queue.push(TestEvent(1));
        queue.push(TestEvent(2));
        queue.push(TestEvent(3));
        assert_eq!(queue.len(), 3);

        let drained = queue.drain();
        assert_eq!(drained.iter().map(|e| e.0).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(queue.is_empty());
    }
}
