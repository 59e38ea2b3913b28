//! The attribute iterator. Walks the count-prefixed top-level stream,
//! handing each record to a visitor positioned at the body, then
//! re-deriving the body's length from the per-kind skip table regardless
//! of what the visitor consumed.

use std::ops::ControlFlow;

use attrvm_bytes::Cursor;

use crate::element::{skip_annotation, skip_element_value};
use crate::error::AttrError;
use crate::tag::{AttributeStream, AttributeTag};

/// Walks every attribute record in `stream`, calling `visit` once per
/// record.
///
/// `visit` receives an independent copy of the cursor positioned at the
/// record's body — it may read as much or as little as it likes. Once it
/// returns, the iterator repositions its own authoritative cursor using
/// the skip table, so a visitor that declines a record and one that
/// partially decodes it leave the stream in the same place afterward.
pub fn for_each_or_halt<'a, F>(stream: AttributeStream<'a>, mut visit: F) -> Result<(), AttrError>
where
	F: FnMut(AttributeTag, Cursor<'a>) -> Result<ControlFlow<()>, AttrError>,
{
	let Some(bytes) = stream.0 else {
		return Ok(());
	};

	let mut cursor = Cursor::new(bytes);
	let mut count = cursor.read_int();

	while count > 0 {
		let tag = AttributeTag::from_u8(cursor.read_u8())?;
		log::trace!("iterating attribute tag {tag:?}");

		let body_cursor = cursor;
		match visit(tag, body_cursor)? {
			ControlFlow::Break(()) => return Ok(()),
			ControlFlow::Continue(()) => {}
		}

		skip_body(tag, &mut cursor)?;
		count -= 1;
	}

	Ok(())
}

/// The per-kind skip rule: advances past a record's body without
/// decoding it, by shape alone.
fn skip_body(tag: AttributeTag, cursor: &mut Cursor) -> Result<(), AttrError> {
	match tag {
		AttributeTag::SourceFile | AttributeTag::Signature => cursor.skip_pointer(),
		AttributeTag::InnerClass => {
			cursor.skip_pointer(); // inner name
			cursor.skip_pointer(); // outer name
			cursor.skip_pointer(); // simple name
			cursor.read_int(); // access flags
		}
		AttributeTag::EnclosingMethod => {
			cursor.skip_pointer(); // class name
			cursor.skip_pointer(); // method name
			cursor.skip_pointer(); // method descriptor
		}
		AttributeTag::Exceptions => {
			let n = cursor.read_int();
			for _ in 0..n {
				cursor.skip_pointer();
			}
		}
		AttributeTag::RuntimeVisibleAnnotations => {
			let n = cursor.read_int();
			for _ in 0..n {
				skip_annotation(cursor)?;
			}
		}
		AttributeTag::RuntimeVisibleParameterAnnotations => {
			// Walks the declared shape, `numParams` groups of
			// `(length, annotation{length})`, so later attributes are
			// never skipped over.
			let num_params = cursor.read_int();
			for _ in 0..num_params {
				let n = cursor.read_int();
				for _ in 0..n {
					skip_annotation(cursor)?;
				}
			}
		}
		AttributeTag::AnnotationDefault => skip_element_value(cursor)?,
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn stream_with_two_source_file_records(ptr_a: usize, ptr_b: usize) -> Vec<u8> {
		let mut bytes = Vec::new();
		bytes.extend(2i32.to_ne_bytes());
		bytes.push(AttributeTag::SourceFile as u8);
		bytes.extend(ptr_a.to_ne_bytes());
		bytes.push(AttributeTag::SourceFile as u8);
		bytes.extend(ptr_b.to_ne_bytes());
		bytes
	}

	#[test]
	fn visits_every_record_when_visitor_always_continues() {
		let bytes = stream_with_two_source_file_records(0xAAAA, 0xBBBB);
		let stream = AttributeStream::present(&bytes);

		let mut seen = 0;
		for_each_or_halt(stream, |tag, _cursor| {
			assert_eq!(tag, AttributeTag::SourceFile);
			seen += 1;
			Ok(ControlFlow::Continue(()))
		})
		.unwrap();

		assert_eq!(seen, 2);
	}

	#[test]
	fn absent_stream_visits_nothing() {
		let stream = AttributeStream::absent();
		let mut seen = 0;
		for_each_or_halt(stream, |_, _| {
			seen += 1;
			Ok(ControlFlow::Continue(()))
		})
		.unwrap();
		assert_eq!(seen, 0);
	}

	#[test]
	fn visitor_declining_to_read_still_advances_past_the_record() {
		let bytes = stream_with_two_source_file_records(1, 2);
		let stream = AttributeStream::present(&bytes);

		let mut seen = 0;
		for_each_or_halt(stream, |_tag, _cursor| {
			// never touches the cursor it was given
			seen += 1;
			Ok(ControlFlow::Continue(()))
		})
		.unwrap();
		assert_eq!(seen, 2);
	}

	#[test]
	fn halt_stops_before_the_second_record() {
		let bytes = stream_with_two_source_file_records(1, 2);
		let stream = AttributeStream::present(&bytes);

		let mut seen = 0;
		for_each_or_halt(stream, |_tag, _cursor| {
			seen += 1;
			Ok(ControlFlow::Break(()))
		})
		.unwrap();
		assert_eq!(seen, 1);
	}
}
