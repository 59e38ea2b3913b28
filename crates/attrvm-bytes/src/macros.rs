/// Generates a fixed-width, native-endian scalar reader on `Cursor`.
///
/// This cursor only ever reads an attribute stream emitted elsewhere; it
/// has no corresponding write half.
macro_rules! define_native_read {
	($name:ident, $ret:ty, $width:expr, $conv:expr) => {
		pub fn $name(&mut self) -> $ret {
			let mut buf = [0u8; $width];
			unsafe {
				std::ptr::copy_nonoverlapping(self.ptr, buf.as_mut_ptr(), $width);
				self.advance($width);
			}
			($conv)(buf)
		}
	};
}

pub(crate) use define_native_read;
