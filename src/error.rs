use thiserror::Error;

/// Everything that can go wrong while morphing or while driving widgets.
///
/// Note that hooks are not isolated: a hook that panics leaves the live tree partially patched,
/// and there is no rollback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
	/// The host could not build a tree from the given markup.
	#[error("malformed markup at byte {offset}: {message}")]
	Parse { offset: usize, message: String },
	/// The target markup didn't contain a single node.
	#[error("target markup produced no nodes")]
	EmptyMarkup,
	/// The host reported a failure, for example a DOM exception.
	#[error("host operation failed: {0}")]
	Host(String),
	/// A submitted field has no validator.
	#[error("no validator for field {0:?}")]
	MissingValidator(String),
	/// A widget operation was called on an element that isn't an upgraded widget.
	#[error("element is not a mounted widget")]
	NotMounted,
	/// A component with this tag name was defined before.
	#[error("component <{0}> is already defined")]
	AlreadyDefined(String),
}
