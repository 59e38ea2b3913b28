//! The element-value decoder. Recursively parses an annotation member
//! value, driven by the member's *declared* type rather than the tag
//! embedded in the stream — the tag is then cross-checked, and a
//! mismatch is a format error.

use attrvm_bytes::Cursor;

use crate::error::{AttrError, HostError};
use crate::host::{find_type, return_type_descriptor, PrimitiveKind, PrimitiveValue, Runtime, TypeClassification};

fn expect_tag(tag: char, wanted: char, display_name: &str) -> Result<(), AttrError> {
	if tag != wanted {
		return Err(AttrError::format(display_name));
	}
	Ok(())
}

fn decode_primitive<R: Runtime>(cursor: &mut Cursor, kind: PrimitiveKind, rt: &R) -> Result<R::Value, AttrError> {
	let tag = cursor.read_u8() as char;
	expect_tag(tag, kind.tag_letter(), kind.display_name())?;

	let value = match kind {
		PrimitiveKind::Boolean => PrimitiveValue::Boolean(cursor.read_int() != 0),
		PrimitiveKind::Byte => PrimitiveValue::Byte(cursor.read_int() as i8),
		PrimitiveKind::Short => PrimitiveValue::Short(cursor.read_int() as i16),
		PrimitiveKind::Char => PrimitiveValue::Char(cursor.read_int() as u16),
		PrimitiveKind::Int => PrimitiveValue::Int(cursor.read_int()),
		PrimitiveKind::Long => PrimitiveValue::Long(cursor.read_long()),
		PrimitiveKind::Float => PrimitiveValue::Float(cursor.read_float()),
		PrimitiveKind::Double => PrimitiveValue::Double(cursor.read_double()),
	};

	Ok(rt.wrap_primitive(kind, value))
}

fn decode_string<R: Runtime>(cursor: &mut Cursor, rt: &R) -> Result<R::Value, AttrError> {
	let tag = cursor.read_u8() as char;
	expect_tag(tag, 's', "java.lang.String")?;
	let s = unsafe { cursor.read_cstr_ptr() }?;
	Ok(rt.new_string_utf(s.as_bytes())?)
}

fn decode_class<R: Runtime>(cursor: &mut Cursor, loader: &R::ClassLoader, rt: &R) -> Result<R::Value, AttrError> {
	let tag = cursor.read_u8() as char;
	expect_tag(tag, 'c', "java.lang.Class")?;
	let descriptor = unsafe { cursor.read_cstr_ptr() }?;
	let class = find_type(rt, descriptor, loader)?;
	Ok(rt.class_value(&class))
}

fn decode_enum<R: Runtime>(cursor: &mut Cursor, loader: &R::ClassLoader, rt: &R) -> Result<R::Value, AttrError> {
	let tag = cursor.read_u8() as char;
	expect_tag(tag, 'e', "java.lang.Enum")?;
	let type_descriptor = unsafe { cursor.read_cstr_ptr() }?;
	let const_name = unsafe { cursor.read_cstr_ptr() }?;

	let class = find_type(rt, type_descriptor, loader)?;
	// The field descriptor passed here is the enum type's own descriptor,
	// not the class name string reused as a descriptor.
	let field = rt
		.get_class_field(&class, const_name, type_descriptor)
		.ok_or_else(|| AttrError::Host(HostError::FieldNotFound(const_name.to_string())))?;
	Ok(rt.get_object_field_value(&class, &field))
}

fn decode_array<R: Runtime>(
	cursor: &mut Cursor,
	array_class: &R::Class,
	component: &R::Class,
	loader: &R::ClassLoader,
	rt: &R,
) -> Result<R::Value, AttrError> {
	let tag = cursor.read_u8() as char;
	expect_tag(tag, '[', "Array")?;

	// 16-bit array length, matching the skip path.
	let length = cursor.read_char() as usize;
	let mut values = Vec::with_capacity(length);
	for _ in 0..length {
		values.push(decode_element_value(cursor, component, loader, rt)?);
	}
	Ok(rt.new_array_value(array_class, values))
}

/// Dispatch is keyed by the *declared* type of the annotation member,
/// not the embedded tag byte.
pub fn decode_element_value<R: Runtime>(
	cursor: &mut Cursor,
	expected: &R::Class,
	loader: &R::ClassLoader,
	rt: &R,
) -> Result<R::Value, AttrError> {
	match rt.classify(expected) {
		TypeClassification::Primitive(kind) => decode_primitive(cursor, kind, rt),
		TypeClassification::StringMirror => decode_string(cursor, rt),
		TypeClassification::ClassMirror => decode_class(cursor, loader, rt),
		TypeClassification::EnumClass => decode_enum(cursor, loader, rt),
		TypeClassification::Array { component } => decode_array(cursor, expected, &component, loader, rt),
		TypeClassification::AnnotationInterface => decode_annotation_element(cursor, expected, loader, rt),
		TypeClassification::Unsupported => Err(AttrError::format("supported annotation element type")),
	}
}

fn decode_annotation_element<R: Runtime>(
	cursor: &mut Cursor,
	expected: &R::Class,
	loader: &R::ClassLoader,
	rt: &R,
) -> Result<R::Value, AttrError> {
	let tag = cursor.read_u8() as char;
	expect_tag(tag, '@', "Annotation")?;
	get_annotation_value(cursor, Some(expected), loader, rt)
}

/// Exact length-and-terminator check. A bare prefix comparison would
/// let `LFooBar;` match an expected `Foo`.
fn descriptor_names(descriptor: &str, expected_internal_name: &str) -> bool {
	descriptor.len() == expected_internal_name.len() + 2
		&& descriptor.starts_with('L')
		&& descriptor.ends_with(';')
		&& &descriptor[1..descriptor.len() - 1] == expected_internal_name
}

/// Reads the embedded annotation header and its members, delegating
/// construction of the final proxy object to `Runtime::create_annotation`.
/// Called both from the `@` element-value case (`expected` present) and
/// directly by the query surface for top-level `RuntimeVisibleAnnotations`
/// entries (`expected` absent).
pub fn get_annotation_value<R: Runtime>(
	cursor: &mut Cursor,
	expected: Option<&R::Class>,
	loader: &R::ClassLoader,
	rt: &R,
) -> Result<R::Value, AttrError> {
	let type_descriptor = unsafe { cursor.read_cstr_ptr() }?;

	if let Some(expected_class) = expected {
		let expected_internal_name = rt.internal_name(expected_class);
		if !descriptor_names(type_descriptor, &expected_internal_name) {
			log::debug!("annotation type mismatch: {type_descriptor} vs {expected_internal_name}");
			return Err(AttrError::format(R::from_binary_class_name(&expected_internal_name)));
		}
	}

	let annotation_class = match expected {
		Some(c) => c.clone(),
		None => find_type(rt, type_descriptor, loader)?,
	};

	let member_count = cursor.read_int() as usize;
	let declared_methods = rt.declared_methods(&annotation_class);
	let mut members = Vec::with_capacity(member_count);

	for _ in 0..member_count {
		let member_name = unsafe { cursor.read_cstr_ptr() }?;
		let method = declared_methods.iter().find(|m| rt.method_name(m) == member_name);

		let Some(method) = method else {
			// Unknown member name: forward-compatible with annotation
			// interface evolution, skip the value and leave the slot
			// empty.
			skip_element_value(cursor)?;
			members.push(None);
			continue;
		};

		let return_type_desc = return_type_descriptor(&rt.method_descriptor(method)).to_string();
		let (value, declared_type) = match find_type(rt, &return_type_desc, loader) {
			Ok(member_type) => match decode_element_value(cursor, &member_type, loader, rt) {
				Ok(v) => (v, Some(member_type)),
				// The failure becomes the member's value instead of
				// aborting the annotation.
				Err(e) => (R::Value::from(e), Some(member_type)),
			},
			Err(e) => (R::Value::from(e), None),
		};

		let method_mirror = rt.new_method_mirror(method);
		members.push(Some(rt.new_annotation_member(member_name, value, declared_type, method_mirror)));
	}

	Ok(rt.create_annotation(&annotation_class, members)?)
}

/// Decodes `count` consecutive annotations with no expected interface,
/// the shape shared by `RuntimeVisibleAnnotations` and each parameter
/// group of `RuntimeVisibleParameterAnnotations`.
pub fn decode_annotations<R: Runtime>(
	cursor: &mut Cursor,
	count: usize,
	loader: &R::ClassLoader,
	rt: &R,
) -> Result<Vec<R::Value>, AttrError> {
	let mut out = Vec::with_capacity(count);
	for _ in 0..count {
		out.push(get_annotation_value(cursor, None, loader, rt)?);
	}
	Ok(out)
}

/// Must advance the cursor by exactly the number of bytes the
/// corresponding `decode_element_value` call would have consumed for
/// the same bytes.
pub fn skip_element_value(cursor: &mut Cursor) -> Result<(), AttrError> {
	let tag = cursor.read_u8() as char;
	match tag {
		'Z' | 'B' | 'S' | 'C' | 'I' => {
			cursor.read_int();
		}
		'J' => {
			cursor.read_long();
		}
		'F' => {
			cursor.read_float();
		}
		'D' => {
			cursor.read_double();
		}
		's' | 'c' => cursor.skip_pointer(),
		'e' => {
			cursor.skip_pointer();
			cursor.skip_pointer();
		}
		'[' => {
			let length = cursor.read_char();
			for _ in 0..length {
				skip_element_value(cursor)?;
			}
		}
		'@' => skip_annotation(cursor)?,
		other => return Err(AttrError::UnknownTag(other as u8)),
	}
	Ok(())
}

/// Mirrors `get_annotation_value`'s layout without constructing anything.
pub fn skip_annotation(cursor: &mut Cursor) -> Result<(), AttrError> {
	cursor.skip_pointer(); // annotation type descriptor
	let member_count = cursor.read_int();
	for _ in 0..member_count {
		cursor.skip_pointer(); // member name
		skip_element_value(cursor)?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn skip_array_element_value_uses_16_bit_length() {
		let mut bytes = Vec::new();
		bytes.push(b'[');
		bytes.extend((2u16).to_ne_bytes());
		bytes.push(b'I');
		bytes.extend(7i32.to_ne_bytes());
		bytes.push(b'I');
		bytes.extend(8i32.to_ne_bytes());

		let mut cursor = Cursor::new(&bytes);
		skip_element_value(&mut cursor).expect("well formed stream");
		assert_eq!(cursor.remaining_hint(), 0);
	}

	#[test]
	fn skip_primitive_element_value_rejects_unknown_tag() {
		let bytes = [b'?'];
		let mut cursor = Cursor::new(&bytes);
		assert!(skip_element_value(&mut cursor).is_err());
	}
}
