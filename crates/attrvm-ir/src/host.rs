//! The narrow seam to the surrounding runtime. Everything the decoder
//! needs from class loading, object allocation, string interning and
//! reflective method/field lookup is reached only through this trait —
//! the decoder itself allocates nothing and resolves nothing on its
//! own.

use crate::error::{AttrError, HostError};

/// The eight primitive element-value kinds, keyed by their JVM type
/// letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
	Boolean,
	Byte,
	Short,
	Char,
	Int,
	Long,
	Float,
	Double,
}

impl PrimitiveKind {
	pub fn tag_letter(self) -> char {
		match self {
			PrimitiveKind::Boolean => 'Z',
			PrimitiveKind::Byte => 'B',
			PrimitiveKind::Short => 'S',
			PrimitiveKind::Char => 'C',
			PrimitiveKind::Int => 'I',
			PrimitiveKind::Long => 'J',
			PrimitiveKind::Float => 'F',
			PrimitiveKind::Double => 'D',
		}
	}

	/// The name `throwFormatError` embeds in `"Invalid format: <name> expected"`.
	pub fn display_name(self) -> &'static str {
		match self {
			PrimitiveKind::Boolean => "boolean",
			PrimitiveKind::Byte => "byte",
			PrimitiveKind::Short => "short",
			PrimitiveKind::Char => "char",
			PrimitiveKind::Int => "int",
			PrimitiveKind::Long => "long",
			PrimitiveKind::Float => "float",
			PrimitiveKind::Double => "double",
		}
	}
}

/// A decoded primitive value prior to boxing. `Z/B/S/C/I` all travel
/// the wire as a 32-bit int and are narrowed here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveValue {
	Boolean(bool),
	Byte(i8),
	Short(i16),
	Char(u16),
	Int(i32),
	Long(i64),
	Float(f32),
	Double(f64),
}

/// What element-value dispatch needs to know about the member's
/// declared return type before it can pick a decode path. Produced by
/// `Runtime::classify`.
pub enum TypeClassification<R: Runtime + ?Sized> {
	Primitive(PrimitiveKind),
	StringMirror,
	ClassMirror,
	EnumClass,
	Array { component: R::Class },
	AnnotationInterface,
	/// Anything else is a format error at the dispatch site itself.
	Unsupported,
}

/// The hosted-runtime collaborator boundary.
///
/// A `Runtime` implementation owns class loading, object allocation,
/// string interning, and reflective method/field/annotation
/// construction. The decoder (this crate) never constructs a `Class`,
/// `Method`, or `Annotation` itself — it only asks `R` to.
pub trait Runtime {
	type Class: Clone;
	type Method: Clone;
	type Field: Clone;
	type ClassLoader: Clone;
	type AnnotationMember;
	/// The uniform "reflective result" type: a boxed primitive, an
	/// interned string, a class mirror, an annotation proxy, or an array
	/// of any of those. `From<AttrError>` implements the lazy
	/// member-error policy: a failure while decoding one annotation
	/// member becomes that member's value instead of aborting the whole
	/// annotation.
	type Value: From<AttrError> + Clone;

	fn find_class_by_descriptor(&self, descriptor: &str, loader: &Self::ClassLoader) -> Result<Self::Class, HostError>;

	fn find_class_using_loader(&self, binary_name: &str, loader: &Self::ClassLoader) -> Result<Self::Class, HostError>;

	/// The name the stream itself uses to name `class` (e.g. `Outer$1`),
	/// compared against `InnerClass`/`EnclosingMethod` name fields.
	fn class_name(&self, class: &Self::Class) -> String;

	fn class_loader_of(&self, class: &Self::Class) -> Self::ClassLoader;

	fn declaring_class_of_method(&self, method: &Self::Method) -> Self::Class;

	fn declaring_class_of_field(&self, field: &Self::Field) -> Self::Class;

	fn get_method(&self, class: &Self::Class, name: &str, descriptor: &str) -> Option<Self::Method>;

	fn classify(&self, class: &Self::Class) -> TypeClassification<Self>
	where
		Self: Sized;

	/// Slash-separated internal name of `class`, e.g. `pkg/Name`. Used for
	/// the nested-annotation type check.
	fn internal_name(&self, class: &Self::Class) -> String;

	/// Dotted binary name, e.g. `pkg.Name`. A pure string transform; kept
	/// as an associated function since it never needs a live `Runtime`
	/// instance.
	fn from_binary_class_name(internal_name: &str) -> String;

	fn get_class_field(&self, class: &Self::Class, name: &str, field_descriptor: &str) -> Option<Self::Field>;

	fn get_object_field_value(&self, class: &Self::Class, field: &Self::Field) -> Self::Value;

	fn declared_methods(&self, class: &Self::Class) -> Vec<Self::Method>;

	fn method_name(&self, method: &Self::Method) -> String;

	fn method_descriptor(&self, method: &Self::Method) -> String;

	fn new_string_utf(&self, bytes: &[u8]) -> Result<Self::Value, HostError>;

	fn class_value(&self, class: &Self::Class) -> Self::Value;

	fn wrap_primitive(&self, kind: PrimitiveKind, value: PrimitiveValue) -> Self::Value;

	fn new_array_value(&self, array_class: &Self::Class, elements: Vec<Self::Value>) -> Self::Value;

	fn new_method_mirror(&self, method: &Self::Method) -> Self::Value;

	fn new_annotation_member(
		&self,
		name: &str,
		value: Self::Value,
		declared_type: Option<Self::Class>,
		method_mirror: Self::Value,
	) -> Self::AnnotationMember;

	fn create_annotation(
		&self,
		interface: &Self::Class,
		members: Vec<Option<Self::AnnotationMember>>,
	) -> Result<Self::Value, HostError>;

	fn new_class_array(&self, elements: Vec<Self::Class>) -> Self::Value;

	fn new_annotation_array(&self, elements: Vec<Self::Value>) -> Self::Value;

	/// An array whose component type is itself an annotation array, used
	/// only by the parameter-annotations query.
	fn new_annotation_array_array(&self, elements: Vec<Self::Value>) -> Self::Value;

	/// The shared empty `Class[]` returned in lieu of a per-call
	/// allocation when a queried method has no `Exceptions` attribute.
	fn empty_exceptions_array(&self) -> Self::Value;

	/// The shared empty `Annotation[]`, used both for a missing
	/// `RuntimeVisibleAnnotations` attribute and (per the wire format's own
	/// absence rule) a missing `RuntimeVisibleParameterAnnotations` one.
	fn empty_annotations_array(&self) -> Self::Value;
}

/// Resolves a descriptor, translating a missing class into
/// `TypeNotPresentException` with its pretty binary name. Every path
/// here returns a value; there is no fallthrough case that leaves the
/// caller without one.
pub fn find_type<R: Runtime>(rt: &R, descriptor: &str, loader: &R::ClassLoader) -> Result<R::Class, AttrError> {
	match rt.find_class_by_descriptor(descriptor, loader) {
		Ok(class) => Ok(class),
		Err(HostError::ClassNotFound(_)) => {
			let pretty = R::from_binary_class_name(strip_object_descriptor(descriptor));
			Err(AttrError::TypeNotPresent { pretty_name: pretty })
		}
		Err(other) => Err(AttrError::Host(other)),
	}
}

/// Strips the `L`...`;` wrapper off an object type descriptor, leaving the
/// internal name untouched for any other descriptor shape (arrays,
/// primitives never fail to resolve, so this path is only ever hit for
/// `Lpkg/Name;`).
fn strip_object_descriptor(descriptor: &str) -> &str {
	if descriptor.starts_with('L') && descriptor.ends_with(';') && descriptor.len() >= 2 {
		&descriptor[1..descriptor.len() - 1]
	} else {
		descriptor
	}
}

/// Splits a method descriptor at its closing paren to find the return
/// type. A pure string operation — not a host collaborator.
pub fn return_type_descriptor(method_descriptor: &str) -> &str {
	match method_descriptor.rfind(')') {
		Some(idx) => &method_descriptor[idx + 1..],
		None => method_descriptor,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn return_type_descriptor_splits_after_close_paren() {
		assert_eq!(return_type_descriptor("(ILjava/lang/String;)Z"), "Z");
		assert_eq!(return_type_descriptor("()Ljava/lang/String;"), "Ljava/lang/String;");
	}

	#[test]
	fn strip_object_descriptor_removes_l_and_semicolon() {
		assert_eq!(strip_object_descriptor("Ljava/lang/String;"), "java/lang/String");
		assert_eq!(strip_object_descriptor("[I"), "[I");
	}
}
