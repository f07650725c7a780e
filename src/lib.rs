//! State holders for framework-agnostic view models.
//!
//! A [`Model`] owns an internal state `S`, derives a presentation state `D`
//! from it through a pure projection, and synchronously notifies its
//! listeners after every commit. Listeners take no arguments and read the
//! latest derived state through [`Model::state`] or [`View::state`].
//!
//! Everything runs on the calling thread: by the time `update` returns the
//! new state is committed, projected and every listener has run.

pub mod macros;

mod addr;
mod error;
mod listener;
mod merge;
mod model;
mod view;

pub use error::{BoxError, Error, Result};
pub use listener::{Listener, Subscription};
pub use merge::Merge;
pub use model::{Model, WeakModel};
pub use view::{Source, View, WeakView};

/// Where a model is in its commit cycle.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Phase {
	Idle,
	/// An update is running: its transform, projection or notification
	/// pass, possibly nested inside another update.
	Committing,
}
