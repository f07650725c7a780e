use std::fmt::Debug;
use std::rc::{Rc, Weak};

use crate::listener::{Listener, Subscription};

/// Read side of a model: derived state and subscriptions, nothing else.
pub trait Source<D> {
	/// The current derived state.
	fn state(&self) -> Rc<D>;

	/// Registers `listener`. Registering the same listener twice keeps a
	/// single entry.
	fn subscribe(&self, listener: &Listener) -> Subscription;

	/// Returns `false` if `listener` was not registered.
	fn unsubscribe(&self, listener: &Listener) -> bool;

	fn listener_count(&self) -> usize;
}

/// Consumer-facing handle to a model.
///
/// It hides the internal state type and offers no way to mutate, so it can
/// be handed to rendering code freely.
pub struct View<D> {
	source: Rc<dyn Source<D>>,
}

impl<D> Clone for View<D> {
	fn clone(&self) -> Self {
		View {
			source: self.source.clone(),
		}
	}
}

impl<D> View<D>
where
	D: 'static,
{
	pub fn new(source: Rc<dyn Source<D>>) -> Self {
		View { source }
	}

	#[inline]
	pub fn state(&self) -> Rc<D> {
		self.source.state()
	}

	#[inline]
	pub fn subscribe(&self, listener: &Listener) -> Subscription {
		self.source.subscribe(listener)
	}

	pub fn listen(&self, func: impl Fn() + 'static) -> Subscription {
		self.source.subscribe(&Listener::new(func))
	}

	#[inline]
	pub fn unsubscribe(&self, listener: &Listener) -> bool {
		self.source.unsubscribe(listener)
	}

	pub fn listener_count(&self) -> usize {
		self.source.listener_count()
	}

	pub fn downgrade(&self) -> WeakView<D> {
		WeakView {
			source: Rc::downgrade(&self.source),
		}
	}
}

/// Non-owning counterpart of [`View`], for listeners that read the view they
/// are subscribed through.
pub struct WeakView<D> {
	source: Weak<dyn Source<D>>,
}

impl<D> Clone for WeakView<D> {
	fn clone(&self) -> Self {
		WeakView {
			source: self.source.clone(),
		}
	}
}

impl<D> WeakView<D>
where
	D: 'static,
{
	pub fn upgrade(&self) -> Option<View<D>> {
		self.source.upgrade().map(View::new)
	}

	pub fn state(&self) -> Option<Rc<D>> {
		self.source.upgrade().map(|source| source.state())
	}
}

impl<D> Debug for View<D>
where
	D: 'static + Debug,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.state().fmt(f)
	}
}
