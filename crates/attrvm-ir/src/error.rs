use thiserror::Error;

/// Failure a hosted collaborator can raise while the decoder is calling
/// out through the `Runtime` boundary.
#[derive(Debug, Error, Clone)]
pub enum HostError {
	#[error("class not found: {0}")]
	ClassNotFound(String),
	#[error("field not found: {0}")]
	FieldNotFound(String),
	#[error("allocation failed")]
	Allocation,
}

/// The three error kinds of the decoder: a missing type, a
/// tag/declared-type mismatch, or a propagated host failure.
#[derive(Debug, Error, Clone)]
pub enum AttrError {
	#[error("java.lang.TypeNotPresentException: {pretty_name}")]
	TypeNotPresent { pretty_name: String },

	#[error("Invalid format: {expected} expected")]
	FormatError { expected: String },

	#[error(transparent)]
	Host(#[from] HostError),

	#[error(transparent)]
	Bytes(#[from] attrvm_bytes::BytesError),

	#[error("unknown attribute tag {0}")]
	UnknownTag(u8),

	#[error("stream was produced for a {expected}-byte pointer width, this process uses {found}")]
	AbiMismatch { expected: usize, found: usize },
}

impl AttrError {
	pub fn format(expected: impl Into<String>) -> Self {
		AttrError::FormatError { expected: expected.into() }
	}
}
