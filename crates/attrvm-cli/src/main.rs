//! Demonstration binary: builds a handful of synthetic attribute
//! streams in memory and walks every public query over them against a
//! [`FakeRuntime`]. There is no on-disk input here — the decoder only
//! ever reads a stream some other compiler already emitted, so this
//! crate's whole job is playing that compiler's part for the demo.

use std::ffi::CString;

use attrvm_ir::{AttributeStream, PrimitiveKind};
use attrvm_runtime::fake::{FakeClass, FakeRuntime, FakeValue};
use attrvm_runtime::{
	get_annotation_default, get_class_runtime_visible_annotations, get_declaring_class, get_declared_classes, get_enclosing_class,
	get_enclosing_method, get_exceptions, get_runtime_visible_parameter_annotations, get_signature, is_anonymous_class, Bootstrap, DecoderConfig,
};

/// Leaks a `CString` and returns its address as the wire format's
/// pointer-width slot value. The decoder trusts every such slot to name
/// a live, already-interned string for the life of the process — here
/// that's true by construction, since we never free it.
fn leak_ptr(s: &str) -> usize {
	CString::new(s).expect("no interior NUL in demo data").into_raw() as usize
}

fn push_ptr(bytes: &mut Vec<u8>, s: &str) {
	bytes.extend(leak_ptr(s).to_ne_bytes());
}

fn push_ptr_opt(bytes: &mut Vec<u8>, s: Option<&str>) {
	match s {
		Some(s) => push_ptr(bytes, s),
		None => bytes.extend(0usize.to_ne_bytes()),
	}
}

fn push_i32(bytes: &mut Vec<u8>, v: i32) {
	bytes.extend(v.to_ne_bytes());
}

/// A single-record stream: `int32 count=1, byte tag, body`. Every demo
/// below needs only one attribute at a time.
fn single_record(tag: u8, body: Vec<u8>) -> Vec<u8> {
	let mut bytes = 1i32.to_ne_bytes().to_vec();
	bytes.push(tag);
	bytes.extend(body);
	bytes
}

fn inner_class_body(inner: &str, outer: Option<&str>, simple: Option<&str>) -> Vec<u8> {
	let mut body = Vec::new();
	push_ptr(&mut body, inner);
	push_ptr_opt(&mut body, outer);
	push_ptr_opt(&mut body, simple);
	push_i32(&mut body, 0); // access flags, unused by every query in this demo
	body
}

fn annotation_header(type_descriptor: &str, member_count: i32) -> Vec<u8> {
	let mut bytes = Vec::new();
	push_ptr(&mut bytes, type_descriptor);
	push_i32(&mut bytes, member_count);
	bytes
}

fn int_member(bytes: &mut Vec<u8>, name: &str, value: i32) {
	push_ptr(bytes, name);
	bytes.push(b'I');
	push_i32(bytes, value);
}

fn main() -> eyre::Result<()> {
	pretty_env_logger::init();

	let rt = FakeRuntime::new();

	let outer = rt.register(FakeClass::plain("demo.Outer", "demo/Outer"));
	outer.clone().with_method("run", "()V");
	let anon = rt.register(FakeClass::plain("demo.Outer$1", "demo/Outer$1"));
	rt.register(FakeClass::plain("java.io.IOException", "java/io/IOException"));
	rt.register(FakeClass::plain("java.lang.RuntimeException", "java/lang/RuntimeException"));

	rt.register(FakeClass::primitive(PrimitiveKind::Int));
	let my_anno = rt.register(FakeClass::annotation_interface("demo.MyAnno", "demo/MyAnno"));
	my_anno.clone().with_method("value", "()I");

	let bootstrap = Bootstrap::init(&rt, DecoderConfig::native())?;

	println!("== InnerClass: anonymous detection and declaring class ==");
	let inner_class_stream = single_record(3, inner_class_body("demo.Outer$1", Some("demo.Outer"), None));
	let stream = AttributeStream::present(&inner_class_stream);
	println!("is_anonymous_class(Outer$1) = {}", is_anonymous_class(&rt, &anon, stream)?);
	println!("declaring_class(Outer$1) = {:?}", get_declaring_class(&rt, &anon, stream)?.map(|c| c.binary_name().to_string()));

	println!("\n== Signature ==");
	let signature_stream = single_record(2, {
		let mut body = Vec::new();
		push_ptr(&mut body, "Ljava/util/List<Ljava/lang/String;>;");
		body
	});
	let stream = AttributeStream::present(&signature_stream);
	let signature = get_signature(&rt, stream)?;
	println!("signature = {:?}", signature.as_ref().map(FakeValue::as_str));

	println!("\n== Exceptions ==");
	let exceptions_stream = single_record(5, {
		let mut body = Vec::new();
		push_i32(&mut body, 2);
		push_ptr(&mut body, "java.io.IOException");
		push_ptr(&mut body, "java.lang.RuntimeException");
		body
	});
	let stream = AttributeStream::present(&exceptions_stream);
	let exceptions = get_exceptions(&rt, &outer.method("run"), stream, &bootstrap)?;
	println!("exceptions = {:?}", exceptions.as_array());

	println!("\n== AnnotationDefault ==");
	let default_stream = single_record(8, {
		let mut body = Vec::new();
		body.push(b'I');
		push_i32(&mut body, 7);
		body
	});
	let stream = AttributeStream::present(&default_stream);
	let default_value = get_annotation_default(&rt, &my_anno.method("value"), stream)?;
	println!("annotation default = {:?}", default_value.map(|v| v.as_int()));

	println!("\n== RuntimeVisibleAnnotations (class) ==");
	let annotations_stream = single_record(6, {
		let mut body = Vec::new();
		push_i32(&mut body, 1);
		body.extend(annotation_header("Ldemo/MyAnno;", 1));
		int_member(&mut body, "value", 42);
		body
	});
	let stream = AttributeStream::present(&annotations_stream);
	let annotations = get_class_runtime_visible_annotations(&rt, &my_anno, stream, &bootstrap)?;
	println!("class annotations = {:?}", annotations.as_array());

	println!("\n== RuntimeVisibleParameterAnnotations ==");
	let param_annotations_stream = single_record(7, {
		let mut body = Vec::new();
		push_i32(&mut body, 2); // two declared parameters
		push_i32(&mut body, 0); // first parameter: no annotations
		push_i32(&mut body, 1); // second parameter: one annotation
		body.extend(annotation_header("Ldemo/MyAnno;", 1));
		int_member(&mut body, "value", 9);
		body
	});
	let stream = AttributeStream::present(&param_annotations_stream);
	let per_param = get_runtime_visible_parameter_annotations(&rt, &outer.method("run"), stream, &bootstrap)?;
	println!("per-parameter annotations = {:?}", per_param.as_array());

	println!("\n== EnclosingMethod ==");
	let enclosing_stream = single_record(4, {
		let mut body = Vec::new();
		push_ptr(&mut body, "demo.Outer");
		push_ptr_opt(&mut body, Some("run"));
		push_ptr_opt(&mut body, Some("()V"));
		body
	});
	let stream = AttributeStream::present(&enclosing_stream);
	println!("enclosing_class = {:?}", get_enclosing_class(&rt, &anon, stream)?.map(|c| c.binary_name().to_string()));
	println!("enclosing_method = {:?}", get_enclosing_method(&rt, &anon, stream)?.map(|m| m.name().to_string()));

	println!("\n== Declared classes ==");
	let declared_classes_stream = single_record(3, inner_class_body("demo.Outer$1", Some("demo.Outer"), None));
	let stream = AttributeStream::present(&declared_classes_stream);
	let declared = get_declared_classes(&rt, &outer, stream)?;
	println!(
		"declared_classes(Outer) = {:?}",
		declared.map(|v| v.as_array().iter().map(|c| format!("{c:?}")).collect::<Vec<_>>())
	);

	Ok(())
}
