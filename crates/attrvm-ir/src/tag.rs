use crate::error::AttrError;

/// The eight attribute kinds carried in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AttributeTag {
	SourceFile = 1,
	Signature = 2,
	InnerClass = 3,
	EnclosingMethod = 4,
	Exceptions = 5,
	RuntimeVisibleAnnotations = 6,
	RuntimeVisibleParameterAnnotations = 7,
	AnnotationDefault = 8,
}

impl AttributeTag {
	/// A tag byte outside `1..=8` is a format error. Treated as a hard
	/// error that halts iteration rather than leaving the cursor
	/// un-advanced and corrupting the rest of the stream.
	pub fn from_u8(tag: u8) -> Result<Self, AttrError> {
		Ok(match tag {
			1 => AttributeTag::SourceFile,
			2 => AttributeTag::Signature,
			3 => AttributeTag::InnerClass,
			4 => AttributeTag::EnclosingMethod,
			5 => AttributeTag::Exceptions,
			6 => AttributeTag::RuntimeVisibleAnnotations,
			7 => AttributeTag::RuntimeVisibleParameterAnnotations,
			8 => AttributeTag::AnnotationDefault,
			other => return Err(AttrError::UnknownTag(other)),
		})
	}
}

/// A possibly-absent attribute stream. The wire format's null stream
/// pointer, denoting "no attributes", is `None`.
#[derive(Debug, Clone, Copy)]
pub struct AttributeStream<'a>(pub Option<&'a [u8]>);

impl<'a> AttributeStream<'a> {
	pub fn present(bytes: &'a [u8]) -> Self {
		AttributeStream(Some(bytes))
	}

	pub fn absent() -> Self {
		AttributeStream(None)
	}

	pub fn is_absent(&self) -> bool {
		self.0.is_none()
	}
}

impl<'a> From<Option<&'a [u8]>> for AttributeStream<'a> {
	fn from(value: Option<&'a [u8]>) -> Self {
		AttributeStream(value)
	}
}
