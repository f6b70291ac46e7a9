//! Minimal reactive cells and effects.
//!
//! An [`Effect`] re-runs whenever one of its explicitly listed dependencies
//! notifies. Notification never holds a lock while calling out, so callbacks
//! may subscribe, unsubscribe or trigger further notifications freely.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slab::Slab;

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Something an [`Effect`] can depend on.
pub trait Watchable: Send + Sync {
	/// Registers `callback` to run on every change until the guard is dropped.
	fn watch(&self, callback: Arc<dyn Fn() + Send + Sync>) -> Watch;
}

/// Subscriber list shared by watchable values.
#[derive(Clone, Default)]
pub struct Notifier {
	subscribers: Arc<Mutex<Slab<Callback>>>,
}

impl Notifier {
	/// Creates an empty notifier.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a subscriber.
	pub fn watch(&self, callback: Callback) -> Watch {
		let key = self.subscribers.lock().insert(callback);
		Watch {
			subscribers: Arc::downgrade(&self.subscribers),
			key,
		}
	}

	/// Calls every current subscriber.
	///
	/// The list is snapshotted first; subscribers added during the call are
	/// not invoked until the next notification.
	pub fn notify(&self) {
		let callbacks: Vec<Callback> = self.subscribers.lock().iter().map(|(_, cb)| cb.clone()).collect();
		for callback in callbacks {
			callback();
		}
	}

	/// Number of live subscriptions.
	pub fn subscriber_count(&self) -> usize {
		self.subscribers.lock().len()
	}
}

impl fmt::Debug for Notifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Notifier")
			.field("subscribers", &self.subscriber_count())
			.finish()
	}
}

/// Subscription guard. Unsubscribes on drop.
#[must_use = "dropping a Watch unsubscribes immediately"]
pub struct Watch {
	subscribers: Weak<Mutex<Slab<Callback>>>,
	key: usize,
}

impl Drop for Watch {
	fn drop(&mut self) {
		if let Some(subscribers) = self.subscribers.upgrade() {
			subscribers.lock().try_remove(self.key);
		}
	}
}

impl fmt::Debug for Watch {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Watch").field("key", &self.key).finish()
	}
}

/// Shared, observable value.
pub struct Observable<T> {
	inner: Arc<ObservableInner<T>>,
}

struct ObservableInner<T> {
	value: Mutex<T>,
	notifier: Notifier,
}

impl<T> Clone for Observable<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T: Clone + PartialEq + Send + 'static> Observable<T> {
	/// Creates a cell holding `value`.
	pub fn new(value: T) -> Self {
		Self {
			inner: Arc::new(ObservableInner {
				value: Mutex::new(value),
				notifier: Notifier::new(),
			}),
		}
	}

	/// Returns a clone of the current value.
	pub fn get(&self) -> T {
		self.inner.value.lock().clone()
	}

	/// Replaces the value, notifying watchers only if it changed.
	///
	/// Returns `true` if watchers were notified.
	pub fn set(&self, value: T) -> bool {
		{
			let mut current = self.inner.value.lock();
			if *current == value {
				return false;
			}
			*current = value;
		}
		self.inner.notifier.notify();
		true
	}

	/// Replaces the value and notifies unconditionally.
	pub fn set_always(&self, value: T) {
		*self.inner.value.lock() = value;
		self.inner.notifier.notify();
	}
}

impl<T: Send + 'static> Watchable for Observable<T> {
	fn watch(&self, callback: Callback) -> Watch {
		self.inner.notifier.watch(callback)
	}
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Observable").field(&*self.inner.value.lock()).finish()
	}
}

impl<T: Clone + PartialEq + Default + Send + 'static> Default for Observable<T> {
	fn default() -> Self {
		Self::new(T::default())
	}
}

/// Side effect re-run whenever a dependency changes.
pub struct Effect {
	inner: Arc<EffectInner>,
	watches: Mutex<Vec<Watch>>,
}

struct EffectInner {
	run: Mutex<Box<dyn FnMut() + Send>>,
	state: Mutex<EffectState>,
}

#[derive(Default)]
struct EffectState {
	running: bool,
	dirty: bool,
	disposed: bool,
}

impl EffectInner {
	fn trigger(&self) {
		{
			let mut state = self.state.lock();
			if state.disposed {
				return;
			}
			if state.running {
				state.dirty = true;
				return;
			}
			state.running = true;
		}

		loop {
			{
				let mut run = self.run.lock();
				(*run)();
			}

			let mut state = self.state.lock();
			if state.dirty && !state.disposed {
				state.dirty = false;
				continue;
			}
			state.running = false;
			state.dirty = false;
			break;
		}
	}
}

impl Effect {
	/// Runs `run` now and again after every change to any of `deps`.
	pub fn new(deps: &[&dyn Watchable], run: impl FnMut() + Send + 'static) -> Self {
		let inner = Arc::new(EffectInner {
			run: Mutex::new(Box::new(run)),
			state: Mutex::new(EffectState::default()),
		});

		let watches = deps
			.iter()
			.map(|dep| {
				let weak = Arc::downgrade(&inner);
				dep.watch(Arc::new(move || {
					if let Some(inner) = weak.upgrade() {
						inner.trigger();
					}
				}))
			})
			.collect();

		inner.trigger();

		Self {
			inner,
			watches: Mutex::new(watches),
		}
	}

	/// Stops the effect and unsubscribes from every dependency.
	pub fn dispose(&self) {
		self.inner.state.lock().disposed = true;
		let watches = std::mem::take(&mut *self.watches.lock());
		drop(watches);
	}

	/// Returns `true` once [`Self::dispose`] has run.
	pub fn is_disposed(&self) -> bool {
		self.inner.state.lock().disposed
	}
}

impl Drop for Effect {
	fn drop(&mut self) {
		self.dispose();
	}
}

impl fmt::Debug for Effect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Effect")
			.field("disposed", &self.is_disposed())
			.field("deps", &self.watches.lock().len())
			.finish()
	}
}

#[cfg(test)]
mod tests;
