use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::fmt::Debug;
use std::rc::{Rc, Weak};

use crate::error::{BoxError, Error, Result};
use crate::listener::{Detach, Listener, Listeners, Subscription};
use crate::merge::Merge;
use crate::view::{Source, View};
use crate::Phase;

type Projector<S, D> = Box<dyn Fn(&Rc<S>) -> Result<Rc<D>, BoxError>>;

/// Owning handle of a piece of view-model state.
///
/// `S` is the internal state, `D` the derived state computed from it by the
/// projection given at construction. Consumers only ever see `D`.
///
/// A concrete view model keeps its `Model` in a private field and calls
/// `update`/`merge` from its own methods; everything it hands out to the
/// rendering side should be a [`View`].
pub struct Model<S, D = S> {
	body: Rc<ModelBody<S, D>>,
}

impl<S, D> Clone for Model<S, D> {
	fn clone(&self) -> Self {
		Self {
			body: self.body.clone(),
		}
	}
}

pub struct ModelBody<S, D> {
	project: Projector<S, D>,
	current: RefCell<Snapshot<S, D>>,
	inner: RefCell<ModelInner<S, D>>,
	depth: Cell<usize>,
	revision: Cell<u64>,
	name: Cell<&'static str>,
}

/// Non-owning handle to a model.
///
/// The model keeps its listeners alive, so a listener that reads the model it
/// is subscribed to should capture one of these instead of a [`Model`] clone.
pub struct WeakModel<S, D = S> {
	body: Weak<ModelBody<S, D>>,
}

impl<S, D> Clone for WeakModel<S, D> {
	fn clone(&self) -> Self {
		Self {
			body: self.body.clone(),
		}
	}
}

impl<S, D> WeakModel<S, D>
where
	S: 'static,
	D: 'static,
{
	pub fn upgrade(&self) -> Option<Model<S, D>> {
		self.body.upgrade().map(|body| Model { body })
	}

	/// The current derived state, or `None` once the model is gone.
	pub fn state(&self) -> Option<Rc<D>> {
		self.body.upgrade().map(|body| body.state())
	}
}

struct Snapshot<S, D> {
	internal: Rc<S>,
	derived: Rc<D>,
}

struct ModelInner<S, D> {
	listeners: Listeners<4>,
	this: Weak<ModelBody<S, D>>,
}

impl<S: 'static> Model<S, S> {
	/// A model whose derived state is its internal state.
	pub fn plain(initial: S) -> Self {
		let internal = Rc::new(initial);
		let derived = internal.clone();
		Model::build(
			internal,
			derived,
			Box::new(|s: &Rc<S>| -> Result<Rc<S>, BoxError> { Ok(s.clone()) }),
		)
	}
}

impl<S, D> Model<S, D>
where
	S: 'static,
	D: 'static,
{
	/// Creates a model and computes its derived state once.
	pub fn new(initial: S, project: impl Fn(&S) -> D + 'static) -> Self {
		let internal = Rc::new(initial);
		let derived = Rc::new(project(&*internal));
		Model::build(
			internal,
			derived,
			Box::new(move |s: &Rc<S>| -> Result<Rc<D>, BoxError> { Ok(Rc::new(project(&**s))) }),
		)
	}

	/// Like [`Model::new`] with a projection that can fail. A failure while
	/// computing the initial derived state is returned and no model exists.
	pub fn try_new<E>(initial: S, project: impl Fn(&S) -> Result<D, E> + 'static) -> Result<Self>
	where
		E: Into<BoxError>,
	{
		let internal = Rc::new(initial);
		let derived = project(&*internal).map_err(|e| Error::Projection(e.into()))?;
		Ok(Model::build(
			internal,
			Rc::new(derived),
			Box::new(move |s: &Rc<S>| -> Result<Rc<D>, BoxError> {
				project(&**s).map(Rc::new).map_err(Into::into)
			}),
		))
	}

	fn build(internal: Rc<S>, derived: Rc<D>, project: Projector<S, D>) -> Self {
		tracing::debug!(
			state = std::any::type_name::<S>(),
			derived = std::any::type_name::<D>(),
			"model created"
		);

		Model {
			body: Rc::new_cyclic(|this| ModelBody {
				project,
				current: RefCell::new(Snapshot { internal, derived }),
				inner: RefCell::new(ModelInner {
					listeners: Listeners::new(),
					this: this.clone(),
				}),
				depth: Cell::new(0),
				revision: Cell::new(0),
				name: Cell::new("<unnamed>"),
			}),
		}
	}

	/// Sets the name used in tracing events.
	#[must_use]
	pub fn named(self, name: &'static str) -> Self {
		self.body.name.set(name);
		self
	}

	pub fn name(&self) -> &'static str {
		self.body.name.get()
	}

	#[inline]
	pub fn state(&self) -> Rc<D> {
		self.body.state()
	}

	/// The authoritative internal state. Only the owner of the `Model`
	/// can read it; [`View`] does not expose it.
	#[inline]
	pub fn internal(&self) -> Rc<S> {
		self.body.internal()
	}

	#[inline]
	pub fn subscribe(&self, listener: &Listener) -> Subscription {
		self.body.subscribe(listener)
	}

	pub fn listen(&self, func: impl Fn() + 'static) -> Subscription {
		self.body.subscribe(&Listener::new(func))
	}

	#[inline]
	pub fn unsubscribe(&self, listener: &Listener) -> bool {
		self.body.detach(listener)
	}

	/// Replaces the internal state with whatever `func` returns.
	pub fn update(&self, func: impl FnOnce(&S) -> S) -> Result<()> {
		self.try_update(|s| Ok::<_, Infallible>(func(s)))
	}

	/// Replaces the internal state with the result of `func`. An error from
	/// `func` is returned as [`Error::Update`] and nothing is committed.
	pub fn try_update<E>(&self, func: impl FnOnce(&S) -> Result<S, E>) -> Result<()>
	where
		E: Into<BoxError>,
	{
		let _depth = Depth::enter(&self.body.depth);
		let current = self.body.internal();
		let next = match func(&*current) {
			Ok(next) => next,
			Err(e) => {
				let e: BoxError = e.into();
				tracing::debug!(model = self.name(), error = %e, "update rejected");
				return Err(Error::Update(e));
			}
		};

		std::mem::drop(current);
		self.body.commit(Rc::new(next))
	}

	/// Shallow-merges `patch` into the internal state.
	pub fn merge<P>(&self, patch: P) -> Result<()>
	where
		S: Merge<P>,
	{
		self.update(|s| s.merge(patch))
	}

	/// Replaces the internal state wholesale.
	pub fn set(&self, state: S) -> Result<()> {
		let _depth = Depth::enter(&self.body.depth);
		self.body.commit(Rc::new(state))
	}

	/// Number of commits since construction.
	pub fn revision(&self) -> u64 {
		self.body.revision.get()
	}

	pub fn listener_count(&self) -> usize {
		self.body.listener_count()
	}

	pub fn phase(&self) -> Phase {
		if self.body.depth.get() == 0 {
			Phase::Idle
		} else {
			Phase::Committing
		}
	}

	pub fn downgrade(&self) -> WeakModel<S, D> {
		WeakModel {
			body: Rc::downgrade(&self.body),
		}
	}

	/// Read-only handle for consumers.
	pub fn view(&self) -> View<D> {
		View::new(self.body.clone())
	}
}

impl<S, D> ModelBody<S, D>
where
	S: 'static,
	D: 'static,
{
	fn internal(&self) -> Rc<S> {
		self.current.borrow().internal.clone()
	}

	fn commit(&self, internal: Rc<S>) -> Result<()> {
		let derived = match (self.project)(&internal) {
			Ok(derived) => derived,
			Err(e) => {
				tracing::debug!(model = self.name.get(), error = %e, "projection failed");
				return Err(Error::Projection(e));
			}
		};

		let previous = std::mem::replace(
			&mut *self.current.borrow_mut(),
			Snapshot { internal, derived },
		);
		std::mem::drop(previous);

		let revision = self.revision.get() + 1;
		self.revision.set(revision);

		self.notify(revision);
		Ok(())
	}

	fn notify(&self, revision: u64) {
		let listeners = self.inner.borrow().listeners.snapshot();

		tracing::trace!(
			model = self.name.get(),
			revision,
			listeners = listeners.len(),
			depth = self.depth.get(),
			"commit"
		);

		for listener in listeners {
			// Removed after the snapshot was taken: skip it.
			let subscribed = self.inner.borrow().listeners.contains(&listener);
			if subscribed {
				listener.call();
			}
		}
	}
}

impl<S, D> Source<D> for ModelBody<S, D>
where
	S: 'static,
	D: 'static,
{
	fn state(&self) -> Rc<D> {
		self.current.borrow().derived.clone()
	}

	fn subscribe(&self, listener: &Listener) -> Subscription {
		let mut inner = self.inner.borrow_mut();
		if inner.listeners.insert(listener.clone()) {
			tracing::debug!(
				model = self.name.get(),
				listeners = inner.listeners.len(),
				"subscribed"
			);
		}

		let this = inner.this.clone() as Weak<dyn Detach>;
		Subscription::new(this, listener.clone())
	}

	fn unsubscribe(&self, listener: &Listener) -> bool {
		self.detach(listener)
	}

	fn listener_count(&self) -> usize {
		self.inner.borrow().listeners.len()
	}
}

impl<S, D> Detach for ModelBody<S, D> {
	fn detach(&self, listener: &Listener) -> bool {
		let mut inner = self.inner.borrow_mut();
		let removed = inner.listeners.remove(listener);
		if removed {
			tracing::debug!(
				model = self.name.get(),
				listeners = inner.listeners.len(),
				"unsubscribed"
			);
		}

		removed
	}
}

/// Tracks update nesting; restored on unwind so a panicking transform,
/// projection or listener does not leave the model stuck in `Committing`.
struct Depth<'a> {
	depth: &'a Cell<usize>,
}

impl<'a> Depth<'a> {
	fn enter(depth: &'a Cell<usize>) -> Self {
		depth.set(depth.get() + 1);
		Depth { depth }
	}
}

impl Drop for Depth<'_> {
	fn drop(&mut self) {
		self.depth.set(self.depth.get() - 1);
	}
}

impl<S, D> From<Model<S, D>> for View<D>
where
	S: 'static,
	D: 'static,
{
	fn from(model: Model<S, D>) -> Self {
		View::new(model.body)
	}
}

impl<S, D> Debug for Model<S, D>
where
	S: 'static,
	D: 'static + Debug,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Model")
			.field("name", &self.name())
			.field("revision", &self.revision())
			.field("state", &self.state())
			.finish()
	}
}
