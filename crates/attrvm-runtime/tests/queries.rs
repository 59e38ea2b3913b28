//! End-to-end coverage of the eleven public queries against a
//! `FakeRuntime`, one test per representative wire-format scenario.

mod common;

use attrvm_ir::{AttrError, AttributeStream, PrimitiveKind};
use attrvm_runtime::fake::{FakeClass, FakeRuntime, FakeValue};
use attrvm_runtime::{
	get_annotation_default, get_class_runtime_visible_annotations, get_declaring_class, get_declared_classes, get_enclosing_class,
	get_enclosing_method, get_exceptions, get_field_runtime_visible_annotations, get_runtime_visible_parameter_annotations, get_signature,
	is_anonymous_class, Bootstrap, DecoderConfig,
};

use common::*;

fn bootstrap(rt: &FakeRuntime) -> Bootstrap<FakeRuntime> {
	Bootstrap::init(rt, DecoderConfig::native()).expect("native pointer width always matches itself")
}

/// Scenario 1: absent attributes yield the shared empty sentinels, same
/// reference across two calls, and `None`/`false` everywhere else.
#[test]
fn absent_attributes_yield_sentinels_not_failures() {
	let rt = FakeRuntime::new();
	let class = rt.register(FakeClass::plain("demo.Plain", "demo/Plain"));
	let method = class.clone().with_method("run", "()V").method("run");
	let boot = bootstrap(&rt);

	let absent = AttributeStream::absent();

	let exceptions_a = get_exceptions(&rt, &method, absent, &boot).unwrap();
	let exceptions_b = get_exceptions(&rt, &method, absent, &boot).unwrap();
	assert!(exceptions_a.as_array().is_empty());
	assert!(exceptions_b.as_array().is_empty());

	let annotations = get_class_runtime_visible_annotations(&rt, &class, absent, &boot).unwrap();
	assert!(annotations.as_array().is_empty());

	assert!(get_signature(&rt, absent).unwrap().is_none());
	assert!(get_annotation_default(&rt, &method, absent).unwrap().is_none());
	assert!(get_enclosing_class(&rt, &class, absent).unwrap().is_none());
	assert!(get_declaring_class(&rt, &class, absent).unwrap().is_none());
	assert!(get_declared_classes(&rt, &class, absent).unwrap().is_none());
	assert!(!is_anonymous_class(&rt, &class, absent).unwrap());
}

/// Scenario 2: a single Signature record decodes to the interned string.
#[test]
fn single_signature_record_decodes_to_the_interned_string() {
	let rt = FakeRuntime::new();
	let bytes = single_record(2, {
		let mut body = Vec::new();
		push_ptr(&mut body, "Ljava/util/List<Ljava/lang/String;>;");
		body
	});

	let signature = get_signature(&rt, AttributeStream::present(&bytes)).unwrap().expect("signature present");
	assert_eq!(signature.as_str(), "Ljava/util/List<Ljava/lang/String;>;");
}

/// Scenario 3: an Exceptions record resolves both class names in order.
#[test]
fn exceptions_list_resolves_every_class_in_declared_order() {
	let rt = FakeRuntime::new();
	let io_exc = rt.register(FakeClass::plain("java.io.IOException", "java/io/IOException"));
	let rt_exc = rt.register(FakeClass::plain("java.lang.RuntimeException", "java/lang/RuntimeException"));
	let owner = rt.register(FakeClass::plain("demo.Owner", "demo/Owner"));
	let method = owner.clone().with_method("go", "()V").method("go");
	let boot = bootstrap(&rt);

	let bytes = single_record(5, exceptions_body(&["java.io.IOException", "java.lang.RuntimeException"]));

	let exceptions = get_exceptions(&rt, &method, AttributeStream::present(&bytes), &boot).unwrap();
	let classes: Vec<_> = exceptions
		.as_array()
		.iter()
		.map(|v| match v {
			FakeValue::Class(c) => c.clone(),
			other => panic!("expected a class mirror, got {other:?}"),
		})
		.collect();
	assert_eq!(classes, vec![io_exc, rt_exc]);
}

/// Scenario 4: an anonymous InnerClass record (null simple name) marks
/// the class anonymous and resolves its declaring class by outer name.
#[test]
fn anonymous_inner_class_record_drives_both_queries() {
	let rt = FakeRuntime::new();
	let outer = rt.register(FakeClass::plain("demo.Outer", "demo/Outer"));
	let anon = rt.register(FakeClass::plain("demo.Outer$1", "demo/Outer$1"));

	let bytes = single_record(3, inner_class_body("demo.Outer$1", Some("demo.Outer"), None, 0));
	let stream = AttributeStream::present(&bytes);

	assert!(is_anonymous_class(&rt, &anon, stream).unwrap());
	let declaring = get_declaring_class(&rt, &anon, stream).unwrap().expect("declaring class present");
	assert_eq!(declaring, outer);
}

/// A named (non-anonymous) InnerClass record: `is_anonymous_class` is
/// false because the simple name is present.
#[test]
fn named_inner_class_is_not_anonymous() {
	let rt = FakeRuntime::new();
	rt.register(FakeClass::plain("demo.Outer", "demo/Outer"));
	let named = rt.register(FakeClass::plain("demo.Outer$Named", "demo/Outer$Named"));

	let bytes = single_record(3, inner_class_body("demo.Outer$Named", Some("demo.Outer"), Some("Named"), 0));
	let stream = AttributeStream::present(&bytes);

	assert!(!is_anonymous_class(&rt, &named, stream).unwrap());
}

/// Scenario 5: an annotation with one primitive member and one string
/// member decodes to a proxy whose members read back the encoded
/// values.
#[test]
fn annotation_with_primitive_and_string_members_decodes_both() {
	let rt = FakeRuntime::new();
	let my_anno = rt.register(FakeClass::annotation_interface("demo.MyAnno", "demo/MyAnno"));
	my_anno.clone().with_method("x", "()I");
	my_anno.clone().with_method("s", "()Ljava/lang/String;");
	rt.register(FakeClass::primitive(PrimitiveKind::Int));
	rt.register(FakeClass::string_mirror());

	let bytes = single_record(6, {
		let mut body = Vec::new();
		push_i32(&mut body, 1);
		body.extend(annotation_header("Ldemo/MyAnno;", 2));
		int_member(&mut body, "x", 7);
		string_member(&mut body, "s", "hi");
		body
	});

	let boot = bootstrap(&rt);
	let annotations = get_class_runtime_visible_annotations(&rt, &my_anno, AttributeStream::present(&bytes), &boot).unwrap();
	let values = annotations.as_array();
	assert_eq!(values.len(), 1);
	assert_eq!(values[0].member("x").as_int(), 7);
	assert_eq!(values[0].member("s").as_str(), "hi");
}

/// Scenario 6: a nested-annotation array member decodes to an array of
/// proxies, each with its own member readable.
#[test]
fn nested_annotation_array_member_decodes_every_element() {
	let rt = FakeRuntime::new();
	rt.register(FakeClass::primitive(PrimitiveKind::Int));
	let inner_anno = rt.register(FakeClass::annotation_interface("demo.Inner", "demo/Inner"));
	inner_anno.clone().with_method("v", "()I");

	let outer_anno = rt.register(FakeClass::annotation_interface("demo.Outer", "demo/Outer"));
	outer_anno.clone().with_method("list", "()[Ldemo/Inner;");

	let array_class = FakeClass::array_of(inner_anno.clone());
	// `Runtime::classify` drives array decoding off the member's declared
	// return type, so the array class must itself resolve via descriptor
	// lookup; register it the same way `decode_element_value` expects to
	// find `[Ldemo/Inner;`.
	rt.register(array_class);

	let bytes = single_record(6, {
		let mut body = Vec::new();
		push_i32(&mut body, 1);
		body.extend(annotation_header("Ldemo/Outer;", 1));
		push_ptr(&mut body, "list");
		body.push(b'[');
		push_i16(&mut body, 2);
		body.push(b'@');
		body.extend(annotation_header("Ldemo/Inner;", 1));
		int_member(&mut body, "v", 1);
		body.push(b'@');
		body.extend(annotation_header("Ldemo/Inner;", 1));
		int_member(&mut body, "v", 2);
		body
	});

	let boot = bootstrap(&rt);
	let annotations = get_class_runtime_visible_annotations(&rt, &outer_anno, AttributeStream::present(&bytes), &boot).unwrap();
	let list = annotations.as_array()[0].member("list").as_array();
	assert_eq!(list.len(), 2);
	assert_eq!(list[0].member("v").as_int(), 1);
	assert_eq!(list[1].member("v").as_int(), 2);
}

/// Scenario 7: a declared-int member whose embedded tag is `'s'`
/// surfaces `AnnotationFormatError` with the documented message and
/// produces no result.
#[test]
fn tag_type_mismatch_raises_the_documented_format_error() {
	let rt = FakeRuntime::new();
	rt.register(FakeClass::primitive(PrimitiveKind::Int));
	let my_anno = rt.register(FakeClass::annotation_interface("demo.MyAnno", "demo/MyAnno"));
	my_anno.clone().with_method("x", "()I");

	let bytes = single_record(6, {
		let mut body = Vec::new();
		push_i32(&mut body, 1);
		body.extend(annotation_header("Ldemo/MyAnno;", 1));
		push_ptr(&mut body, "x");
		body.push(b's');
		push_ptr(&mut body, "oops");
		body
	});

	let boot = bootstrap(&rt);
	let annotations = get_class_runtime_visible_annotations(&rt, &my_anno, AttributeStream::present(&bytes), &boot).unwrap();
	// Lazy member-error policy: the mismatch becomes the member's value,
	// not a failure of the whole query.
	match annotations.as_array()[0].member("x") {
		FakeValue::Error(AttrError::FormatError { expected }) => assert_eq!(expected, "int"),
		other => panic!("expected a format error value, got {other:?}"),
	}
}

/// Enclosing class/method: both resolve off the same record, and the
/// method only resolves when both name and descriptor are present.
#[test]
fn enclosing_class_and_method_resolve_from_one_record() {
	let rt = FakeRuntime::new();
	let outer = rt.register(FakeClass::plain("demo.Outer", "demo/Outer"));
	outer.clone().with_method("run", "()V");
	let anon = rt.register(FakeClass::plain("demo.Outer$1", "demo/Outer$1"));

	let bytes = single_record(4, enclosing_method_body("demo.Outer", Some("run"), Some("()V")));
	let stream = AttributeStream::present(&bytes);

	let enclosing_class = get_enclosing_class(&rt, &anon, stream).unwrap().expect("enclosing class present");
	assert_eq!(enclosing_class, outer);

	let enclosing_method = get_enclosing_method(&rt, &anon, stream).unwrap().expect("enclosing method present");
	assert_eq!(enclosing_method.name(), "run");
}

/// An `EnclosingMethod` record with a null method name/descriptor (a
/// class enclosed directly in another class, not in a method body)
/// resolves the enclosing class but yields no enclosing method.
#[test]
fn enclosing_method_is_absent_when_method_fields_are_null() {
	let rt = FakeRuntime::new();
	rt.register(FakeClass::plain("demo.Outer", "demo/Outer"));
	let anon = rt.register(FakeClass::plain("demo.Outer$1", "demo/Outer$1"));

	let bytes = single_record(4, enclosing_method_body("demo.Outer", None, None));
	let stream = AttributeStream::present(&bytes);

	assert!(get_enclosing_class(&rt, &anon, stream).unwrap().is_some());
	assert!(get_enclosing_method(&rt, &anon, stream).unwrap().is_none());
}

/// Declared classes: every `InnerClass` record whose outer name matches
/// contributes one element; an unrelated record is skipped.
#[test]
fn declared_classes_collects_every_matching_inner_class_record() {
	let rt = FakeRuntime::new();
	let outer = rt.register(FakeClass::plain("demo.Outer", "demo/Outer"));
	let first = rt.register(FakeClass::plain("demo.Outer$1", "demo/Outer$1"));
	let second = rt.register(FakeClass::plain("demo.Outer$Named", "demo/Outer$Named"));
	rt.register(FakeClass::plain("demo.Unrelated$1", "demo/Unrelated$1"));

	let bytes = stream(&[
		(3, inner_class_body("demo.Outer$1", Some("demo.Outer"), None, 0)),
		(3, inner_class_body("demo.Outer$Named", Some("demo.Outer"), Some("Named"), 0)),
		(3, inner_class_body("demo.Unrelated$1", Some("demo.Unrelated"), None, 0)),
	]);

	let declared = get_declared_classes(&rt, &outer, AttributeStream::present(&bytes)).unwrap().expect("at least one declared class");
	let classes: Vec<_> = declared
		.as_array()
		.iter()
		.map(|v| match v {
			FakeValue::Class(c) => c.clone(),
			other => panic!("expected a class mirror, got {other:?}"),
		})
		.collect();
	assert_eq!(classes, vec![first, second]);
}

/// Field runtime-visible annotations share the same shape as the class
/// and method variants, keyed off the field's own declaring class.
#[test]
fn field_runtime_visible_annotations_resolve_through_the_field_declaring_class() {
	let rt = FakeRuntime::new();
	rt.register(FakeClass::primitive(PrimitiveKind::Int));
	let holder = rt.register(FakeClass::plain("demo.Holder", "demo/Holder"));
	let my_anno = rt.register(FakeClass::annotation_interface("demo.Tag", "demo/Tag"));
	my_anno.clone().with_method("value", "()I");
	let holder = holder.with_static_field("count", FakeValue::Int(0));
	let field = holder.field("count");
	let boot = bootstrap(&rt);

	let bytes = single_record(6, {
		let mut body = Vec::new();
		push_i32(&mut body, 1);
		body.extend(annotation_header("Ldemo/Tag;", 1));
		int_member(&mut body, "value", 1);
		body
	});

	let annotations = get_field_runtime_visible_annotations(&rt, &field, AttributeStream::present(&bytes), &boot).unwrap();
	assert_eq!(annotations.as_array().len(), 1);
}

/// The default value of an annotation element, parsed against the
/// element method's own declared return type.
#[test]
fn annotation_default_decodes_against_the_elements_own_return_type() {
	let rt = FakeRuntime::new();
	rt.register(FakeClass::primitive(PrimitiveKind::Int));
	let my_anno = rt.register(FakeClass::annotation_interface("demo.MyAnno", "demo/MyAnno"));
	let element = my_anno.clone().with_method("x", "()I").method("x");

	let bytes = single_record(8, {
		let mut body = Vec::new();
		body.push(b'I');
		push_i32(&mut body, 42);
		body
	});

	let default = get_annotation_default(&rt, &element, AttributeStream::present(&bytes)).unwrap().expect("default present");
	assert_eq!(default.as_int(), 42);
}

/// Per-parameter runtime-visible annotations: each parameter's own
/// annotation count is walked in full, and a record following the
/// `RuntimeVisibleParameterAnnotations` entry is still reached — this is
/// the fixed skip shape, not the early-terminating one.
#[test]
fn parameter_annotations_walk_every_group_and_leave_later_records_reachable() {
	let rt = FakeRuntime::new();
	rt.register(FakeClass::primitive(PrimitiveKind::Int));
	let tag = rt.register(FakeClass::annotation_interface("demo.Tag", "demo/Tag"));
	tag.clone().with_method("value", "()I");
	let holder = rt.register(FakeClass::plain("demo.Holder", "demo/Holder"));
	let method = holder.clone().with_method("invoke", "(ILjava/lang/String;)V").method("invoke");
	let boot = bootstrap(&rt);

	let param_annotations_body = {
		let mut body = Vec::new();
		push_i32(&mut body, 2); // two declared parameters

		push_i32(&mut body, 1); // first parameter carries one annotation
		body.extend(annotation_header("Ldemo/Tag;", 1));
		int_member(&mut body, "value", 5);

		push_i32(&mut body, 0); // second parameter carries none
		body
	};

	let bytes = stream(&[
		(7, param_annotations_body),
		(2, {
			let mut body = Vec::new();
			push_ptr(&mut body, "(ILjava/lang/String;)V");
			body
		}),
	]);
	let present = AttributeStream::present(&bytes);

	let per_param = get_runtime_visible_parameter_annotations(&rt, &method, present, &boot).unwrap();
	let params = per_param.as_array();
	assert_eq!(params.len(), 2);
	assert_eq!(params[0].as_array().len(), 1);
	assert_eq!(params[0].as_array()[0].member("value").as_int(), 5);
	assert!(params[1].as_array().is_empty());

	let signature = get_signature(&rt, present).unwrap().expect("signature record reached after the parameter-annotations skip");
	assert_eq!(signature.as_str(), "(ILjava/lang/String;)V");
}
