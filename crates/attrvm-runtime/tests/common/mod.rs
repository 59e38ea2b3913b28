//! Hand-rolled synthetic attribute-stream encoder, used only by these
//! integration tests. The decoder never emits this wire format itself,
//! so the one place that writes it lives here, next to the tests that
//! need fixtures for it.

use std::ffi::CString;

/// Leaks a `CString` and returns its address as a wire-format pointer
/// slot. The decoder trusts every such slot to name a live,
/// already-interned string for the life of the process; a test process
/// that never frees it satisfies that trivially.
pub fn leak_ptr(s: &str) -> usize {
	CString::new(s).expect("no interior NUL in test fixture").into_raw() as usize
}

pub fn push_ptr(bytes: &mut Vec<u8>, s: &str) {
	bytes.extend(leak_ptr(s).to_ne_bytes());
}

pub fn push_ptr_opt(bytes: &mut Vec<u8>, s: Option<&str>) {
	match s {
		Some(s) => push_ptr(bytes, s),
		None => bytes.extend(0usize.to_ne_bytes()),
	}
}

pub fn push_i32(bytes: &mut Vec<u8>, v: i32) {
	bytes.extend(v.to_ne_bytes());
}

pub fn push_i16(bytes: &mut Vec<u8>, v: i16) {
	bytes.extend(v.to_ne_bytes());
}

/// `int32 count, (byte tag, body){count}` — the top-level stream shape,
/// built from already-encoded `(tag, body)` pairs.
pub fn stream(records: &[(u8, Vec<u8>)]) -> Vec<u8> {
	let mut bytes = (records.len() as i32).to_ne_bytes().to_vec();
	for (tag, body) in records {
		bytes.push(*tag);
		bytes.extend(body);
	}
	bytes
}

pub fn single_record(tag: u8, body: Vec<u8>) -> Vec<u8> {
	stream(&[(tag, body)])
}

pub fn inner_class_body(inner: &str, outer: Option<&str>, simple: Option<&str>, access: i32) -> Vec<u8> {
	let mut body = Vec::new();
	push_ptr(&mut body, inner);
	push_ptr_opt(&mut body, outer);
	push_ptr_opt(&mut body, simple);
	push_i32(&mut body, access);
	body
}

pub fn enclosing_method_body(class_name: &str, method_name: Option<&str>, method_desc: Option<&str>) -> Vec<u8> {
	let mut body = Vec::new();
	push_ptr(&mut body, class_name);
	push_ptr_opt(&mut body, method_name);
	push_ptr_opt(&mut body, method_desc);
	body
}

pub fn exceptions_body(names: &[&str]) -> Vec<u8> {
	let mut body = Vec::new();
	push_i32(&mut body, names.len() as i32);
	for name in names {
		push_ptr(&mut body, name);
	}
	body
}

/// `cstring* typeDescriptor, int32 memberCount` — the annotation header
/// members are appended after.
pub fn annotation_header(type_descriptor: &str, member_count: i32) -> Vec<u8> {
	let mut bytes = Vec::new();
	push_ptr(&mut bytes, type_descriptor);
	push_i32(&mut bytes, member_count);
	bytes
}

pub fn int_member(bytes: &mut Vec<u8>, name: &str, value: i32) {
	push_ptr(bytes, name);
	bytes.push(b'I');
	push_i32(bytes, value);
}

pub fn string_member(bytes: &mut Vec<u8>, name: &str, value: &str) {
	push_ptr(bytes, name);
	bytes.push(b's');
	push_ptr(bytes, value);
}
