use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure of a mutation. The previously committed state stays in place.
#[derive(Debug, Error)]
pub enum Error {
	#[error("projection failed: {0}")]
	Projection(#[source] BoxError),

	#[error("update failed: {0}")]
	Update(#[source] BoxError),
}
