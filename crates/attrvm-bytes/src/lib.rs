//! The cursor reader: layer 1 of the attribute decoder.
//!
//! The attribute stream is produced by an ahead-of-time compiler that has
//! already resolved every string reference to a live address. There is no
//! directory and no bounds information beyond what each attribute kind
//! declares about its own length, so reads here never bounds-check — the
//! stream is trusted, exactly like the source this crate is modeled on.

mod macros;

use macros::define_native_read;
use std::ffi::CStr;
use std::marker::PhantomData;
use std::os::raw::c_char;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BytesError {
	#[error("cstring pointer slot did not contain valid UTF-8")]
	InvalidCString,
}

/// A single mutable byte pointer advancing over a trusted, in-memory
/// attribute stream.
///
/// `Cursor` never performs a bounds check: every read advances the pointer
/// by exactly the scalar's native width, and the attribute iterator (layer
/// 2) is the only thing that knows how many bytes a given record holds.
/// `remaining_hint` is carried purely for `Debug`/logging output.
#[derive(Clone, Copy)]
pub struct Cursor<'a> {
	ptr: *const u8,
	remaining_hint: usize,
	_marker: PhantomData<&'a u8>,
}

impl<'a> Cursor<'a> {
	pub fn new(stream: &'a [u8]) -> Self {
		Self {
			ptr: stream.as_ptr(),
			remaining_hint: stream.len(),
			_marker: PhantomData,
		}
	}

	/// Byte offset this cursor would report if queried against its
	/// original buffer. Debug/logging only.
	pub fn remaining_hint(&self) -> usize {
		self.remaining_hint
	}

	unsafe fn advance(&mut self, n: usize) {
		self.ptr = self.ptr.add(n);
		self.remaining_hint = self.remaining_hint.saturating_sub(n);
	}

	define_native_read!(read_u8, u8, 1, |b: [u8; 1]| b[0]);
	define_native_read!(read_byte, i8, 1, |b: [u8; 1]| i8::from_ne_bytes(b));
	define_native_read!(read_short, i16, 2, |b: [u8; 2]| i16::from_ne_bytes(b));
	define_native_read!(read_char, u16, 2, |b: [u8; 2]| u16::from_ne_bytes(b));
	define_native_read!(read_int, i32, 4, |b: [u8; 4]| i32::from_ne_bytes(b));
	define_native_read!(read_long, i64, 8, |b: [u8; 8]| i64::from_ne_bytes(b));
	define_native_read!(read_float, f32, 4, |b: [u8; 4]| f32::from_ne_bytes(b));
	define_native_read!(read_double, f64, 8, |b: [u8; 8]| f64::from_ne_bytes(b));

	/// Advances past one pointer-width slot without dereferencing it. Used
	/// by the skip table, which never needs the string the slot names.
	pub fn skip_pointer(&mut self) {
		unsafe { self.advance(std::mem::size_of::<usize>()) }
	}

	/// Reads a pointer-width slot and reinterprets it as the address of an
	/// external, already-interned NUL-terminated string.
	///
	/// # Safety
	/// The caller must guarantee the stream came from the same
	/// AOT compiler that emitted it and that the pointed-to memory is a
	/// valid, live, NUL-terminated string for the duration of `'a`. This is
	/// the one place in the crate that must trust the producer outright;
	/// it exists because the wire format has no other way to name an
	/// external string.
	pub unsafe fn read_cstr_ptr(&mut self) -> Result<&'a str, BytesError> {
		let raw = self.read_pointer_word();
		let ptr = raw as *const c_char;
		let cstr = CStr::from_ptr(ptr);
		cstr.to_str().map_err(|_| BytesError::InvalidCString)
	}

	/// Like [`read_cstr_ptr`](Self::read_cstr_ptr), but a pointer slot
	/// holding the null address (several attribute fields are optional,
	/// e.g. `InnerClass`'s outer/simple name) decodes to `None` instead of
	/// being dereferenced.
	///
	/// # Safety
	/// Same trust requirement as `read_cstr_ptr` for any non-null slot.
	pub unsafe fn read_cstr_ptr_opt(&mut self) -> Result<Option<&'a str>, BytesError> {
		let raw = self.read_pointer_word();
		if raw == 0 {
			return Ok(None);
		}
		let ptr = raw as *const c_char;
		let cstr = CStr::from_ptr(ptr);
		cstr.to_str().map(Some).map_err(|_| BytesError::InvalidCString)
	}

	unsafe fn read_pointer_word(&mut self) -> usize {
		let width = std::mem::size_of::<usize>();
		let mut buf = [0u8; std::mem::size_of::<usize>()];
		std::ptr::copy_nonoverlapping(self.ptr, buf.as_mut_ptr(), width);
		self.advance(width);
		usize::from_ne_bytes(buf)
	}
}

impl std::fmt::Debug for Cursor<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Cursor")
			.field("remaining_hint", &self.remaining_hint)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn buf_from_parts(parts: &[&[u8]]) -> Vec<u8> {
		parts.concat()
	}

	#[test]
	fn read_int_advances_four_bytes() {
		let bytes = buf_from_parts(&[&7i32.to_ne_bytes(), &9i32.to_ne_bytes()]);
		let mut cursor = Cursor::new(&bytes);
		assert_eq!(cursor.read_int(), 7);
		assert_eq!(cursor.read_int(), 9);
	}

	#[test]
	fn read_long_and_double_use_native_width() {
		let bytes = buf_from_parts(&[&42i64.to_ne_bytes(), &3.5f64.to_ne_bytes()]);
		let mut cursor = Cursor::new(&bytes);
		assert_eq!(cursor.read_long(), 42);
		assert_eq!(cursor.read_double(), 3.5);
	}

	#[test]
	fn read_cstr_ptr_follows_native_pointer_width() {
		let s = std::ffi::CString::new("Lpkg/Name;").unwrap();
		let addr = s.as_ptr() as usize;
		let bytes = addr.to_ne_bytes().to_vec();
		let mut cursor = Cursor::new(&bytes);
		let read = unsafe { cursor.read_cstr_ptr() }.expect("valid utf8");
		assert_eq!(read, "Lpkg/Name;");
	}

	#[test]
	fn read_cstr_ptr_opt_treats_null_address_as_none() {
		let bytes = 0usize.to_ne_bytes().to_vec();
		let mut cursor = Cursor::new(&bytes);
		let read = unsafe { cursor.read_cstr_ptr_opt() }.expect("null slot is not an error");
		assert_eq!(read, None);
	}

	#[test]
	fn remaining_hint_never_underflows() {
		let bytes = [0u8; 1];
		let mut cursor = Cursor::new(&bytes);
		cursor.read_byte();
		assert_eq!(cursor.remaining_hint(), 0);
	}
}
