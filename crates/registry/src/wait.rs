//! Waiting for a set of namespaces to become activated.
//!
//! A waiter owns its own pending set and its own hub subscription. The
//! `settled` flag is flipped exactly once, under the waiter's lock, by
//! whichever of the final activation or the deadline gets there first; the
//! subscription is stopped on every exit path. The one-shot sender lives in
//! the subscriber callback only, so a hub dropped mid-wait surfaces as
//! [`RegistryError::WaitAbandoned`] instead of a future that never resolves.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::error::{RegistryError, Result};
use crate::hub::{DepSubscriberHub, SubscriberFlow};
use crate::store::PackageStore;

struct WaitState {
	pending: Vec<String>,
	settled: bool,
}

/// Future returned by [`Registry::wait_for_deps`](crate::Registry::wait_for_deps).
///
/// Resolves with `Ok(())` once every requested namespace has an activated
/// package. Dropping it before it settles unsubscribes the waiter.
#[must_use = "futures do nothing unless polled"]
pub struct DepsReady {
	inner: Pin<Box<dyn Future<Output = Result<()>> + Send>>,
}

impl DepsReady {
	fn ready(outcome: Result<()>) -> Self {
		Self {
			inner: Box::pin(std::future::ready(outcome)),
		}
	}
}

impl fmt::Debug for DepsReady {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DepsReady").finish_non_exhaustive()
	}
}

impl Future for DepsReady {
	type Output = Result<()>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		self.inner.as_mut().poll(cx)
	}
}

pub(crate) fn wait_for_deps<I, S>(store: &RwLock<PackageStore>, hub: &DepSubscriberHub, namespaces: I, timeout: Option<Duration>) -> DepsReady
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut requested: Vec<String> = Vec::new();
	for namespace in namespaces {
		let namespace = namespace.as_ref();
		if namespace.is_empty() {
			return DepsReady::ready(Err(RegistryError::InvalidArgument("namespace must not be empty".into())));
		}
		if !requested.iter().any(|r| r == namespace) {
			requested.push(namespace.to_string());
		}
	}

	// The read lock keeps activations out until the subscriber is in place.
	let store = store.read();
	let pending: Vec<String> = requested.into_iter().filter(|ns| !store.is_activated(ns)).collect();
	if pending.is_empty() {
		tracing::trace!("wait.ready.immediate");
		return DepsReady::ready(Ok(()));
	}

	let (tx, rx) = oneshot::channel();
	let state = Arc::new(Mutex::new(WaitState { pending, settled: false }));
	let settle = Mutex::new(Some(tx));

	let for_callback = Arc::clone(&state);
	let subscription = hub.subscribe(move |activated| {
		let mut state = for_callback.lock();
		if state.settled {
			return SubscriberFlow::Remove;
		}
		state.pending.retain(|ns| ns != activated);
		if !state.pending.is_empty() {
			return SubscriberFlow::Keep;
		}
		state.settled = true;
		if let Some(settle) = settle.lock().take() {
			let _ = settle.send(());
		}
		SubscriberFlow::Remove
	});
	drop(store);

	tracing::debug!(pending = ?state.lock().pending, timeout = ?timeout, "wait.subscribe");

	// Guarded before the future exists so dropping it unpolled still unsubscribes.
	let guard = subscription.guard();
	// A limit past the clock's range never fires.
	let deadline = timeout.and_then(|limit| Instant::now().checked_add(limit).map(|at| (at, limit)));
	DepsReady {
		inner: Box::pin(async move {
			let outcome = match deadline {
				Some((at, limit)) => tokio::time::timeout_at(at, rx).await.map_err(|_| limit),
				None => Ok(rx.await),
			};
			guard.stop();

			let mut state = state.lock();
			match outcome {
				Ok(Ok(())) => {
					tracing::trace!("wait.ready");
					Ok(())
				}
				Ok(Err(_)) => Err(RegistryError::WaitAbandoned {
					pending: state.pending.clone(),
				}),
				// The final activation may have landed between the deadline and the stop above.
				Err(_) if state.settled => {
					tracing::trace!("wait.ready.at_deadline");
					Ok(())
				}
				Err(limit) => {
					state.settled = true;
					tracing::debug!(pending = ?state.pending, timeout = ?limit, "wait.timeout");
					Err(RegistryError::Timeout {
						timeout: limit,
						pending: state.pending.clone(),
					})
				}
			}
		}),
	}
}
