//! Broadcast subscribers notified whenever a namespace is activated.
//!
//! Subscribers are keyed by a monotonic [`SubscriptionId`] rather than by
//! position, so subscribing or unsubscribing from inside a callback never
//! shifts another subscriber out from under an in-flight notification.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// What a subscriber wants after handling a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberFlow {
	/// Stay subscribed.
	Keep,
	/// Unsubscribe right after this invocation.
	Remove,
}

/// Identity of one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Callback = Arc<dyn Fn(&str) -> SubscriberFlow + Send + Sync>;

#[derive(Default)]
struct HubState {
	next_id: u64,
	subscribers: BTreeMap<SubscriptionId, Callback>,
}

/// Ordered set of activation subscribers.
#[derive(Clone, Default)]
pub struct DepSubscriberHub {
	state: Arc<Mutex<HubState>>,
}

impl fmt::Debug for DepSubscriberHub {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DepSubscriberHub").field("subscribers", &self.len()).finish()
	}
}

impl DepSubscriberHub {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `callback` after every existing subscriber.
	pub fn subscribe<F>(&self, callback: F) -> Subscription
	where
		F: Fn(&str) -> SubscriberFlow + Send + Sync + 'static,
	{
		let mut state = self.state.lock();
		state.next_id = state.next_id.wrapping_add(1);
		let id = SubscriptionId(state.next_id);
		state.subscribers.insert(id, Arc::new(callback));
		tracing::trace!(subscription = id.0, subscribers = state.subscribers.len(), "hub.subscribe");

		Subscription {
			id,
			state: Arc::downgrade(&self.state),
		}
	}

	/// Invokes every subscriber registered when the notification started.
	///
	/// No lock is held while a callback runs. Subscribers removed by an
	/// earlier callback in the same round are skipped; subscribers added
	/// during the round first hear about the next activation.
	pub fn notify(&self, namespace: &str) {
		let snapshot: Vec<(SubscriptionId, Callback)> = {
			let state = self.state.lock();
			state.subscribers.iter().map(|(id, cb)| (*id, Arc::clone(cb))).collect()
		};
		tracing::trace!(namespace, subscribers = snapshot.len(), "hub.notify");

		for (id, callback) in snapshot {
			if !self.state.lock().subscribers.contains_key(&id) {
				continue;
			}
			if callback(namespace) == SubscriberFlow::Remove {
				remove(&self.state, id);
			}
		}
	}

	/// Number of live subscriptions.
	pub fn len(&self) -> usize {
		self.state.lock().subscribers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

fn remove(state: &Mutex<HubState>, id: SubscriptionId) -> bool {
	let removed = state.lock().subscribers.remove(&id).is_some();
	if removed {
		tracing::trace!(subscription = id.0, "hub.unsubscribe");
	}
	removed
}

/// Handle to one subscription.
///
/// Dropping the handle leaves the subscriber registered; call
/// [`Subscription::stop`] or convert it with [`Subscription::guard`].
#[derive(Debug)]
pub struct Subscription {
	id: SubscriptionId,
	state: Weak<Mutex<HubState>>,
}

impl Subscription {
	pub fn id(&self) -> SubscriptionId {
		self.id
	}

	/// Removes this subscriber. Idempotent; returns whether this call removed it.
	pub fn stop(&self) -> bool {
		self.state.upgrade().is_some_and(|state| remove(&state, self.id))
	}

	/// Returns a guard that stops the subscription when dropped.
	pub fn guard(self) -> SubscriptionGuard {
		SubscriptionGuard(self)
	}
}

/// Stops its subscription on drop.
#[derive(Debug)]
pub struct SubscriptionGuard(Subscription);

impl SubscriptionGuard {
	pub fn stop(&self) -> bool {
		self.0.stop()
	}
}

impl Drop for SubscriptionGuard {
	fn drop(&mut self) {
		self.0.stop();
	}
}
