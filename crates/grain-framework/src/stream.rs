//! # Streams
//!
//! A small publish/subscribe layer for fan-out notifications. A stream is identified by a
//! namespace, a key and the event type, and is backed by a Tokio broadcast channel.
//! Publishing to a stream nobody listens to is a no-op.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;
use tracing::trace;

type StreamKey = (TypeId, String, String);

/// Registry of broadcast streams shared by the silo, its grains and its clients.
#[derive(Clone)]
pub struct StreamProvider {
    streams: Arc<Mutex<HashMap<StreamKey, Box<dyn Any + Send + Sync>>>>,
    capacity: usize,
}

impl Default for StreamProvider {
    fn default() -> Self {
        Self::new(256)
    }
}

impl StreamProvider {
    /// `capacity` bounds how far a slow subscriber may lag before it starts missing events.
    pub fn new(capacity: usize) -> Self {
        Self {
            streams: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Subscribes to `namespace/key`, creating the stream if needed.
    pub fn subscribe<E>(&self, namespace: &str, key: &str) -> broadcast::Receiver<E>
    where
        E: Clone + Send + Sync + 'static,
    {
        let mut streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = streams
            .entry((TypeId::of::<E>(), namespace.to_string(), key.to_string()))
            .or_insert_with(|| -> Box<dyn Any + Send + Sync> {
                Box::new(broadcast::channel::<E>(self.capacity).0)
            });
        match entry.downcast_ref::<broadcast::Sender<E>>() {
            Some(sender) => sender.subscribe(),
            // The key includes the TypeId, so the stored sender always has type E.
            None => broadcast::channel::<E>(1).1,
        }
    }

    /// Publishes `event` and returns the number of subscribers that received it.
    pub fn publish<E>(&self, namespace: &str, key: &str, event: E) -> usize
    where
        E: Clone + Send + Sync + 'static,
    {
        let streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
        let sender = streams
            .get(&(TypeId::of::<E>(), namespace.to_string(), key.to_string()))
            .and_then(|entry| entry.downcast_ref::<broadcast::Sender<E>>());
        let delivered = sender.map_or(0, |sender| sender.send(event).unwrap_or(0));
        trace!(namespace, key, delivered, "Published");
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Ping(u32);

    #[tokio::test]
    async fn publish_reaches_every_subscriber_of_the_key() {
        let streams = StreamProvider::default();
        let mut first = streams.subscribe::<Ping>("chat", "general");
        let mut second = streams.subscribe::<Ping>("chat", "general");
        let mut other = streams.subscribe::<Ping>("chat", "random");

        assert_eq!(streams.publish("chat", "general", Ping(1)), 2);

        assert_eq!(first.recv().await.unwrap(), Ping(1));
        assert_eq!(second.recv().await.unwrap(), Ping(1));
        assert!(other.try_recv().is_err());
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        let streams = StreamProvider::default();
        assert_eq!(streams.publish("chat", "general", Ping(7)), 0);
    }
}
