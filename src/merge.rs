/// Shallow merge of a partial update into a state value.
///
/// Fields present in the patch replace the old ones wholesale, fields absent
/// from it keep their current value. Nothing is merged recursively.
///
/// Usually generated with [`state!`](crate::state).
pub trait Merge<P> {
	fn merge(&self, patch: P) -> Self;
}
