use std::fmt;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::addr::RcAddr;

/// A zero-argument callback invoked after every commit.
///
/// Identity is the allocation: clones of one `Listener` are the same
/// listener, two `Listener::new` calls are two listeners even when the
/// closures are identical.
#[derive(Clone, PartialEq, Eq)]
pub struct Listener {
	func: RcAddr<dyn Fn()>,
}

impl Listener {
	pub fn new(func: impl Fn() + 'static) -> Self {
		Listener {
			func: RcAddr::new(Rc::new(func)),
		}
	}

	pub(crate) fn call(&self) {
		(**self.func)()
	}
}

impl<F> From<Rc<F>> for Listener
where
	F: Fn() + 'static,
{
	fn from(func: Rc<F>) -> Self {
		Listener {
			func: RcAddr::new(func as Rc<dyn Fn()>),
		}
	}
}

impl fmt::Debug for Listener {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Listener")
			.field(&(Rc::as_ptr(&self.func) as *const ()))
			.finish()
	}
}

/// Something a listener can be removed from.
pub(crate) trait Detach {
	fn detach(&self, listener: &Listener) -> bool;
}

/// The unsubscribe capability handed out by `subscribe`.
///
/// It holds the model weakly but the listener strongly, like the model
/// itself does. A listener that captures a strong [`Model`](crate::Model)
/// clone therefore keeps its model alive; capture a
/// [`WeakModel`](crate::WeakModel) or [`WeakView`](crate::WeakView) instead.
#[derive(Clone)]
#[must_use = "dropping a Subscription does not unsubscribe; keep it to be able to unsubscribe"]
pub struct Subscription {
	source: Weak<dyn Detach>,
	listener: Listener,
}

impl Subscription {
	pub(crate) fn new(source: Weak<dyn Detach>, listener: Listener) -> Self {
		Subscription { source, listener }
	}

	/// Removes exactly this listener. Calling it again, or after the
	/// listener was removed some other way, does nothing.
	pub fn unsubscribe(&self) {
		if let Some(source) = self.source.upgrade() {
			source.detach(&self.listener);
		}
	}

	/// Whether the model is still alive. It does not check that the
	/// listener is still registered.
	pub fn is_active(&self) -> bool {
		self.source.strong_count() > 0
	}

	pub fn listener(&self) -> &Listener {
		&self.listener
	}
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("listener", &self.listener)
			.field("active", &self.is_active())
			.finish()
	}
}

/// Insertion-ordered set of listeners, unique by identity.
pub(crate) struct Listeners<const N: usize> {
	vec: SmallVec<[Listener; N]>,
}

impl<const N: usize> Listeners<N> {
	pub fn new() -> Self {
		Listeners {
			vec: SmallVec::new_const(),
		}
	}

	pub fn insert(&mut self, listener: Listener) -> bool {
		if self.contains(&listener) {
			return false;
		}

		self.vec.push(listener);
		true
	}

	pub fn remove(&mut self, listener: &Listener) -> bool {
		match self.vec.iter().position(|l| l == listener) {
			Some(index) => {
				self.vec.remove(index);
				true
			}
			None => false,
		}
	}

	pub fn contains(&self, listener: &Listener) -> bool {
		self.vec.iter().any(|l| l == listener)
	}

	pub fn len(&self) -> usize {
		self.vec.len()
	}

	/// Copy of the current members, detached from later changes.
	pub fn snapshot(&self) -> SmallVec<[Listener; N]> {
		self.vec.clone()
	}
}
