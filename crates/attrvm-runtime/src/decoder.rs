//! The query surface: one function per public reflective query, each a
//! thin composition over the attribute iterator and (for `InnerClass`
//! and `EnclosingMethod`) a tag-filtered sub-visitor.

use std::ops::ControlFlow;

use attrvm_ir::{
	decode_annotations, decode_element_value, find_type, for_each_or_halt, return_type_descriptor, AttrError, AttributeStream, AttributeTag,
	Cursor, Runtime,
};

/// Propagates a loader failure as-is. Only `find_type` (descriptor-based
/// element-value resolution) translates `ClassNotFound` into
/// `TypeNotPresentException`; the query-level name lookups here surface
/// the raw host failure instead.
fn resolve_binary_name<R: Runtime>(rt: &R, binary_name: &str, loader: &R::ClassLoader) -> Result<R::Class, AttrError> {
	rt.find_class_using_loader(binary_name, loader).map_err(AttrError::Host)
}

struct InnerClassRecord<'a> {
	inner_name: Option<&'a str>,
	outer_name: Option<&'a str>,
	simple_name: Option<&'a str>,
}

fn read_inner_class<'a>(mut cursor: Cursor<'a>) -> Result<InnerClassRecord<'a>, AttrError> {
	let inner_name = unsafe { cursor.read_cstr_ptr_opt() }?;
	let outer_name = unsafe { cursor.read_cstr_ptr_opt() }?;
	let simple_name = unsafe { cursor.read_cstr_ptr_opt() }?;
	cursor.read_int(); // access flags: not surfaced by any of the eleven queries
	Ok(InnerClassRecord {
		inner_name,
		outer_name,
		simple_name,
	})
}

struct EnclosingMethodRecord<'a> {
	class_name: Option<&'a str>,
	method_name: Option<&'a str>,
	method_descriptor: Option<&'a str>,
}

fn read_enclosing_method<'a>(mut cursor: Cursor<'a>) -> Result<EnclosingMethodRecord<'a>, AttrError> {
	let class_name = unsafe { cursor.read_cstr_ptr_opt() }?;
	let method_name = unsafe { cursor.read_cstr_ptr_opt() }?;
	let method_descriptor = unsafe { cursor.read_cstr_ptr_opt() }?;
	Ok(EnclosingMethodRecord {
		class_name,
		method_name,
		method_descriptor,
	})
}

fn inner_classes<'a>(
	stream: AttributeStream<'a>,
	mut visit: impl FnMut(InnerClassRecord<'a>) -> Result<ControlFlow<()>, AttrError>,
) -> Result<(), AttrError> {
	for_each_or_halt(stream, |tag, cursor| {
		if tag != AttributeTag::InnerClass {
			return Ok(ControlFlow::Continue(()));
		}
		visit(read_inner_class(cursor)?)
	})
}

fn enclosing_methods<'a>(
	stream: AttributeStream<'a>,
	mut visit: impl FnMut(EnclosingMethodRecord<'a>) -> Result<ControlFlow<()>, AttrError>,
) -> Result<(), AttrError> {
	for_each_or_halt(stream, |tag, cursor| {
		if tag != AttributeTag::EnclosingMethod {
			return Ok(ControlFlow::Continue(()));
		}
		visit(read_enclosing_method(cursor)?)
	})
}

/// Bootstraps the two empty-array sentinels once, matching "write-once,
/// then read-only" shared state. Construct one per `Runtime`
/// implementation at startup and thread it through to the
/// absence-returning queries.
pub struct Bootstrap<R: Runtime> {
	empty_exceptions: R::Value,
	empty_annotations: R::Value,
}

impl<R: Runtime> Bootstrap<R> {
	/// Builds both sentinels and checks that this process's pointer width
	/// matches the one the attribute streams were compiled for — every
	/// `cstring*`/array-class slot the cursor reads assumes the two agree.
	pub fn init(rt: &R, config: crate::DecoderConfig) -> Result<Self, AttrError> {
		let native = std::mem::size_of::<usize>();
		if config.pointer_width() != native {
			return Err(AttrError::AbiMismatch {
				expected: config.pointer_width(),
				found: native,
			});
		}
		Ok(Self {
			empty_exceptions: rt.empty_exceptions_array(),
			empty_annotations: rt.empty_annotations_array(),
		})
	}

	pub fn empty_exceptions(&self) -> R::Value {
		self.empty_exceptions.clone()
	}

	pub fn empty_annotations(&self) -> R::Value {
		self.empty_annotations.clone()
	}
}

/// Declaring class of `class`: the `InnerClass` record whose inner name
/// equals `class`'s own name names the enclosing class by outer name.
pub fn get_declaring_class<R: Runtime>(rt: &R, class: &R::Class, stream: AttributeStream) -> Result<Option<R::Class>, AttrError> {
	let target = rt.class_name(class);
	let loader = rt.class_loader_of(class);
	let mut result = None;
	inner_classes(stream, |record| {
		if record.inner_name != Some(target.as_str()) {
			return Ok(ControlFlow::Continue(()));
		}
		if let Some(outer_name) = record.outer_name {
			result = Some(resolve_binary_name(rt, outer_name, &loader)?);
		}
		Ok(ControlFlow::Break(()))
	})?;
	Ok(result)
}

/// Enclosing class of `class`: the class named by the first
/// `EnclosingMethod` record's class name. A record with a null class
/// name slot is skipped rather than dereferenced.
pub fn get_enclosing_class<R: Runtime>(rt: &R, class: &R::Class, stream: AttributeStream) -> Result<Option<R::Class>, AttrError> {
	let loader = rt.class_loader_of(class);
	let mut result = None;
	enclosing_methods(stream, |record| {
		let Some(class_name) = record.class_name else {
			return Ok(ControlFlow::Continue(()));
		};
		result = Some(resolve_binary_name(rt, class_name, &loader)?);
		Ok(ControlFlow::Break(()))
	})?;
	Ok(result)
}

/// Enclosing method of `class`: only present when the first
/// `EnclosingMethod` record names both a method and a descriptor —
/// `EnclosingMethod` attributes on a method-less (e.g. static
/// initializer or top-level anonymous-in-constructor) context leave both
/// null.
pub fn get_enclosing_method<R: Runtime>(rt: &R, class: &R::Class, stream: AttributeStream) -> Result<Option<R::Method>, AttrError> {
	let loader = rt.class_loader_of(class);
	let mut result = None;
	enclosing_methods(stream, |record| {
		if let (Some(class_name), Some(name), Some(descriptor)) = (record.class_name, record.method_name, record.method_descriptor) {
			let enclosing_class = resolve_binary_name(rt, class_name, &loader)?;
			result = rt.get_method(&enclosing_class, name, descriptor);
		}
		Ok(ControlFlow::Break(()))
	})?;
	Ok(result)
}

/// True iff `class`'s `InnerClass` record exists and carries no simple
/// name. Defaults to false when no matching record is present.
pub fn is_anonymous_class<R: Runtime>(rt: &R, class: &R::Class, stream: AttributeStream) -> Result<bool, AttrError> {
	let target = rt.class_name(class);
	let mut anonymous = false;
	inner_classes(stream, |record| {
		if record.inner_name != Some(target.as_str()) {
			return Ok(ControlFlow::Continue(()));
		}
		anonymous = record.simple_name.is_none();
		Ok(ControlFlow::Break(()))
	})?;
	Ok(anonymous)
}

/// Shared by the class/method/field signature queries — all three read
/// the same shape out of their own attribute stream.
pub fn get_signature<R: Runtime>(rt: &R, stream: AttributeStream) -> Result<Option<R::Value>, AttrError> {
	let mut result = None;
	for_each_or_halt(stream, |tag, mut cursor| {
		if tag != AttributeTag::Signature {
			return Ok(ControlFlow::Continue(()));
		}
		let s = unsafe { cursor.read_cstr_ptr() }?;
		result = Some(rt.new_string_utf(s.as_bytes())?);
		Ok(ControlFlow::Break(()))
	})?;
	Ok(result)
}

/// Checked exception list of method `method`. Returns `bootstrap`'s
/// empty sentinel when the stream has no `Exceptions` record.
pub fn get_exceptions<R: Runtime>(rt: &R, method: &R::Method, stream: AttributeStream, bootstrap: &Bootstrap<R>) -> Result<R::Value, AttrError> {
	let loader = rt.class_loader_of(&rt.declaring_class_of_method(method));
	let mut result = None;
	for_each_or_halt(stream, |tag, mut cursor| {
		if tag != AttributeTag::Exceptions {
			return Ok(ControlFlow::Continue(()));
		}
		let n = cursor.read_int();
		let mut classes = Vec::with_capacity(n.max(0) as usize);
		for _ in 0..n {
			let name = unsafe { cursor.read_cstr_ptr() }?;
			classes.push(resolve_binary_name(rt, name, &loader)?);
		}
		result = Some(rt.new_class_array(classes));
		Ok(ControlFlow::Break(()))
	})?;
	Ok(result.unwrap_or_else(|| bootstrap.empty_exceptions()))
}

/// The default value of annotation element `method`, parsed against its
/// own declared return type.
pub fn get_annotation_default<R: Runtime>(rt: &R, method: &R::Method, stream: AttributeStream) -> Result<Option<R::Value>, AttrError> {
	let loader = rt.class_loader_of(&rt.declaring_class_of_method(method));
	let mut result = None;
	for_each_or_halt(stream, |tag, mut cursor| {
		if tag != AttributeTag::AnnotationDefault {
			return Ok(ControlFlow::Continue(()));
		}
		let return_descriptor = return_type_descriptor(&rt.method_descriptor(method)).to_string();
		let member_type = find_type(rt, &return_descriptor, &loader)?;
		result = Some(decode_element_value(&mut cursor, &member_type, &loader, rt)?);
		Ok(ControlFlow::Break(()))
	})?;
	Ok(result)
}

/// Shared by the class/method/field runtime-visible-annotations queries.
pub fn get_runtime_visible_annotations<R: Runtime>(
	rt: &R,
	loader: &R::ClassLoader,
	stream: AttributeStream,
	bootstrap: &Bootstrap<R>,
) -> Result<R::Value, AttrError> {
	let mut result = None;
	for_each_or_halt(stream, |tag, mut cursor| {
		if tag != AttributeTag::RuntimeVisibleAnnotations {
			return Ok(ControlFlow::Continue(()));
		}
		let n = cursor.read_int() as usize;
		let values = decode_annotations(&mut cursor, n, loader, rt)?;
		result = Some(rt.new_annotation_array(values));
		Ok(ControlFlow::Break(()))
	})?;
	Ok(result.unwrap_or_else(|| bootstrap.empty_annotations()))
}

/// Per-parameter runtime-visible annotations of method `method`: an
/// array whose component type is itself an `Annotation[]`, one per
/// declared parameter.
pub fn get_runtime_visible_parameter_annotations<R: Runtime>(
	rt: &R,
	method: &R::Method,
	stream: AttributeStream,
	bootstrap: &Bootstrap<R>,
) -> Result<R::Value, AttrError> {
	let loader = rt.class_loader_of(&rt.declaring_class_of_method(method));
	let mut result = None;
	for_each_or_halt(stream, |tag, mut cursor| {
		if tag != AttributeTag::RuntimeVisibleParameterAnnotations {
			return Ok(ControlFlow::Continue(()));
		}
		let num_params = cursor.read_int();
		let mut per_param = Vec::with_capacity(num_params.max(0) as usize);
		for _ in 0..num_params {
			let n = cursor.read_int() as usize;
			let values = decode_annotations(&mut cursor, n, &loader, rt)?;
			per_param.push(rt.new_annotation_array(values));
		}
		result = Some(rt.new_annotation_array_array(per_param));
		Ok(ControlFlow::Break(()))
	})?;
	Ok(result.unwrap_or_else(|| bootstrap.empty_annotations()))
}

pub fn get_class_runtime_visible_annotations<R: Runtime>(
	rt: &R,
	class: &R::Class,
	stream: AttributeStream,
	bootstrap: &Bootstrap<R>,
) -> Result<R::Value, AttrError> {
	let loader = rt.class_loader_of(class);
	get_runtime_visible_annotations(rt, &loader, stream, bootstrap)
}

pub fn get_method_runtime_visible_annotations<R: Runtime>(
	rt: &R,
	method: &R::Method,
	stream: AttributeStream,
	bootstrap: &Bootstrap<R>,
) -> Result<R::Value, AttrError> {
	let loader = rt.class_loader_of(&rt.declaring_class_of_method(method));
	get_runtime_visible_annotations(rt, &loader, stream, bootstrap)
}

pub fn get_field_runtime_visible_annotations<R: Runtime>(
	rt: &R,
	field: &R::Field,
	stream: AttributeStream,
	bootstrap: &Bootstrap<R>,
) -> Result<R::Value, AttrError> {
	let loader = rt.class_loader_of(&rt.declaring_class_of_field(field));
	get_runtime_visible_annotations(rt, &loader, stream, bootstrap)
}

/// Member classes declared directly inside `class`: every `InnerClass`
/// record whose outer name equals `class`'s own name.
pub fn get_declared_classes<R: Runtime>(rt: &R, class: &R::Class, stream: AttributeStream) -> Result<Option<R::Value>, AttrError> {
	let target = rt.class_name(class);
	let loader = rt.class_loader_of(class);
	let mut classes = Vec::new();
	inner_classes(stream, |record| {
		if record.outer_name == Some(target.as_str()) {
			if let Some(inner_name) = record.inner_name {
				classes.push(resolve_binary_name(rt, inner_name, &loader)?);
			}
		}
		Ok(ControlFlow::Continue(()))
	})?;
	if classes.is_empty() {
		Ok(None)
	} else {
		Ok(Some(rt.new_class_array(classes)))
	}
}
