//! Per-key call coalescing so identical requests compute once.
//!
//! The first caller for a key leads the flight; later callers follow it and
//! receive the leader's value directly, without going back to the cache.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use tokio::sync::watch;

type FlightMap<T> = DashMap<String, watch::Receiver<Option<T>>>;

/// Table of in-flight calls keyed by cache key. An entry lives exactly as
/// long as its leader.
#[derive(Clone)]
pub struct SingleFlight<T> {
    flights: Arc<FlightMap<T>>,
}

impl<T> Default for SingleFlight<T> {
    fn default() -> Self {
        Self {
            flights: Arc::new(DashMap::new()),
        }
    }
}

/// A caller's role in the flight for one key.
pub enum Flight<T> {
    Leader(FlightLeader<T>),
    Follower(FlightWaiter<T>),
}

impl<T: Clone> SingleFlight<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins the flight for `key`, leading it when none is running.
    pub fn join(&self, key: &str) -> Flight<T> {
        match self.flights.entry(key.to_string()) {
            Entry::Occupied(entry) => Flight::Follower(FlightWaiter {
                rx: entry.get().clone(),
            }),
            Entry::Vacant(entry) => {
                let (tx, rx) = watch::channel(None);
                entry.insert(rx);
                Flight::Leader(FlightLeader {
                    key: key.to_string(),
                    flights: Arc::clone(&self.flights),
                    tx,
                })
            }
        }
    }

    /// Keys with a running leader.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.flights.len()
    }
}

/// The caller doing the work for a key. Dropping it closes the flight;
/// followers still waiting then see no value.
pub struct FlightLeader<T> {
    key: String,
    flights: Arc<FlightMap<T>>,
    tx: watch::Sender<Option<T>>,
}

impl<T> FlightLeader<T> {
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Hands `value` to every follower and closes the flight.
    pub fn complete(self, value: T) {
        self.tx.send_replace(Some(value));
    }
}

impl<T> Drop for FlightLeader<T> {
    fn drop(&mut self) {
        // Only the leader removes its entry, so the slot is still ours.
        self.flights.remove(&self.key);
    }
}

/// A caller waiting on someone else's flight.
pub struct FlightWaiter<T> {
    rx: watch::Receiver<Option<T>>,
}

impl<T: Clone> FlightWaiter<T> {
    /// The leader's value, or `None` if the leader went away without one.
    pub async fn wait(mut self) -> Option<T> {
        match self.rx.wait_for(Option::is_some).await {
            Ok(value) => value.clone(),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_first_caller_leads() {
        let flights = SingleFlight::<u32>::new();
        let leader = match flights.join("a") {
            Flight::Leader(leader) => leader,
            Flight::Follower(_) => panic!("expected leader"),
        };
        assert_eq!(leader.key(), "a");
        assert_eq!(flights.in_flight(), 1);
        leader.complete(7);
        assert_eq!(flights.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_distinct_keys_are_independent() {
        let flights = SingleFlight::<u32>::new();
        let a = flights.join("a");
        let b = flights.join("b");
        assert!(matches!(a, Flight::Leader(_)));
        assert!(matches!(b, Flight::Leader(_)));
        assert_eq!(flights.in_flight(), 2);
    }

    #[tokio::test]
    async fn test_followers_receive_leader_value() {
        let flights = SingleFlight::<String>::new();
        let Flight::Leader(leader) = flights.join("k") else {
            panic!("expected leader");
        };

        let joined = Arc::new(AtomicUsize::new(0));
        let followers: Vec<_> = (0..5)
            .map(|_| {
                let Flight::Follower(waiter) = flights.join("k") else {
                    panic!("expected follower");
                };
                joined.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(waiter.wait())
            })
            .collect();
        assert_eq!(joined.load(Ordering::SeqCst), 5);

        leader.complete("done".to_string());
        for follower in followers {
            assert_eq!(follower.await.unwrap().as_deref(), Some("done"));
        }
        assert_eq!(flights.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_late_follower_still_sees_value() {
        let flights = SingleFlight::<u32>::new();
        let Flight::Leader(leader) = flights.join("k") else {
            panic!("expected leader");
        };
        let Flight::Follower(waiter) = flights.join("k") else {
            panic!("expected follower");
        };
        leader.complete(3);
        assert_eq!(waiter.wait().await, Some(3));
    }

    #[tokio::test]
    async fn test_abandoned_flight_yields_none_and_frees_key() {
        let flights = SingleFlight::<u32>::new();
        let Flight::Leader(leader) = flights.join("k") else {
            panic!("expected leader");
        };
        let Flight::Follower(waiter) = flights.join("k") else {
            panic!("expected follower");
        };
        drop(leader);
        assert_eq!(waiter.wait().await, None);
        assert!(matches!(flights.join("k"), Flight::Leader(_)));
    }
}
