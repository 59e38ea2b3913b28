//! A minimal, in-process `Runtime` implementation with no JNI, no class
//! loader, and no real object allocator behind it — just enough of a
//! reflective model to drive the eleven queries against hand-built
//! attribute streams. Used by this crate's own integration tests and by
//! `attrvm-cli`'s demonstration walk; never by anything claiming to be a
//! production collaborator.
//!
//! Classes here hold their declared methods/fields behind a `RefCell` so
//! a method or field can point back at the class that declares it —
//! that makes an `Rc` cycle, which in a real host would be a leak to
//! avoid. For a short-lived test/demo process it is harmless, so this
//! module doesn't bother breaking it with `Weak`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use attrvm_ir::{AttrError, HostError, PrimitiveKind, PrimitiveValue, Runtime, TypeClassification};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FakeLoader(pub &'static str);

impl Default for FakeLoader {
	fn default() -> Self {
		FakeLoader("system")
	}
}

pub struct FakeClassData {
	binary_name: String,
	stream_name: String,
	internal_name: String,
	kind: FakeKind,
	loader: FakeLoader,
	methods: RefCell<Vec<FakeMethod>>,
	fields: RefCell<Vec<FakeField>>,
}

#[derive(Clone)]
pub enum FakeKind {
	Primitive(PrimitiveKind),
	StringMirror,
	ClassMirror,
	EnumClass,
	Array(FakeClass),
	AnnotationInterface,
	Plain,
}

#[derive(Clone)]
pub struct FakeClass(Rc<FakeClassData>);

impl FakeClass {
	fn new(binary_name: &str, stream_name: &str, internal_name: &str, kind: FakeKind, loader: FakeLoader) -> Self {
		FakeClass(Rc::new(FakeClassData {
			binary_name: binary_name.to_string(),
			stream_name: stream_name.to_string(),
			internal_name: internal_name.to_string(),
			kind,
			loader,
			methods: RefCell::new(Vec::new()),
			fields: RefCell::new(Vec::new()),
		}))
	}

	/// A plain class/interface. `binary_name` is the dotted name used
	/// both for `class_name()` (what an `InnerClass`/`EnclosingMethod`
	/// record's name fields hold, since the AOT compiler pre-resolves
	/// them to binary form) and for loader lookups; `internal_name` is
	/// the slash form used only by the nested-annotation type check.
	pub fn plain(binary_name: &str, internal_name: &str) -> Self {
		Self::new(binary_name, binary_name, internal_name, FakeKind::Plain, FakeLoader::default())
	}

	/// Rebuilds this class with a different loader. Must be called before
	/// any method/field has been attached, since those clone `self` and
	/// would otherwise keep pointing at the old loader.
	pub fn with_loader(self, loader: FakeLoader) -> Self {
		FakeClass(Rc::new(FakeClassData {
			binary_name: self.0.binary_name.clone(),
			stream_name: self.0.stream_name.clone(),
			internal_name: self.0.internal_name.clone(),
			kind: self.0.kind.clone(),
			loader,
			methods: RefCell::new(Vec::new()),
			fields: RefCell::new(Vec::new()),
		}))
	}

	pub fn annotation_interface(binary_name: &str, internal_name: &str) -> Self {
		Self::new(binary_name, binary_name, internal_name, FakeKind::AnnotationInterface, FakeLoader::default())
	}

	pub fn enum_class(binary_name: &str, internal_name: &str) -> Self {
		Self::new(binary_name, binary_name, internal_name, FakeKind::EnumClass, FakeLoader::default())
	}

	pub fn string_mirror() -> Self {
		Self::new("java.lang.String", "java.lang.String", "java/lang/String", FakeKind::StringMirror, FakeLoader::default())
	}

	pub fn class_mirror() -> Self {
		Self::new("java.lang.Class", "java.lang.Class", "java/lang/Class", FakeKind::ClassMirror, FakeLoader::default())
	}

	pub fn primitive(kind: PrimitiveKind) -> Self {
		let name = kind.display_name();
		Self::new(name, name, name, FakeKind::Primitive(kind), FakeLoader::default())
	}

	/// `internal_name` for an array class is already the full descriptor
	/// (`[Ldemo/Inner;`, `[I`, ...), matching how the JVM spells array
	/// type names — there's no separate "internal" vs "descriptor" form
	/// to distinguish for arrays the way there is for object types.
	pub fn array_of(component: FakeClass) -> Self {
		let binary_name = format!("{}[]", component.0.binary_name);
		let internal_name = format!("[{}", component.descriptor());
		Self::new(&binary_name, &binary_name, &internal_name, FakeKind::Array(component), FakeLoader::default())
	}

	pub fn with_method(self, method_name: &str, descriptor: &str) -> Self {
		let method = FakeMethod(Rc::new(FakeMethodData {
			name: method_name.to_string(),
			descriptor: descriptor.to_string(),
			declaring_class: self.clone(),
		}));
		self.0.methods.borrow_mut().push(method);
		self
	}

	pub fn with_static_field(self, field_name: &str, value: FakeValue) -> Self {
		let field = FakeField(Rc::new(FakeFieldData {
			name: field_name.to_string(),
			declaring_class: self.clone(),
			value,
		}));
		self.0.fields.borrow_mut().push(field);
		self
	}

	pub fn method(&self, name: &str) -> FakeMethod {
		self.0
			.methods
			.borrow()
			.iter()
			.find(|m| m.0.name == name)
			.cloned()
			.unwrap_or_else(|| panic!("no method named {name} on {}", self.0.binary_name))
	}

	pub fn field(&self, name: &str) -> FakeField {
		self.0
			.fields
			.borrow()
			.iter()
			.find(|f| f.0.name == name)
			.cloned()
			.unwrap_or_else(|| panic!("no field named {name} on {}", self.0.binary_name))
	}

	/// JVM type descriptor, the key `find_class_by_descriptor` looks this
	/// class up with: a bare letter for a primitive, the internal name
	/// as-is for an array (already spelled `[Lpkg/Name;`/`[I`), otherwise
	/// the `Lpkg/Name;` wrapping of the internal name.
	pub fn descriptor(&self) -> String {
		match &self.0.kind {
			FakeKind::Primitive(kind) => kind.tag_letter().to_string(),
			FakeKind::Array(_) => self.0.internal_name.clone(),
			_ => format!("L{};", self.0.internal_name),
		}
	}

	pub fn binary_name(&self) -> &str {
		&self.0.binary_name
	}
}

impl std::fmt::Debug for FakeClass {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("FakeClass").field(&self.0.binary_name).finish()
	}
}

impl PartialEq for FakeClass {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

struct FakeMethodData {
	name: String,
	descriptor: String,
	declaring_class: FakeClass,
}

#[derive(Clone)]
pub struct FakeMethod(Rc<FakeMethodData>);

impl std::fmt::Debug for FakeMethod {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("FakeMethod").field(&self.0.name).finish()
	}
}

impl FakeMethod {
	pub fn name(&self) -> &str {
		&self.0.name
	}
}

impl PartialEq for FakeMethod {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

struct FakeFieldData {
	name: String,
	declaring_class: FakeClass,
	value: FakeValue,
}

#[derive(Clone)]
pub struct FakeField(Rc<FakeFieldData>);

impl std::fmt::Debug for FakeField {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("FakeField").field(&self.0.name).finish()
	}
}

#[derive(Clone)]
pub struct FakeAnnotationMember {
	pub name: String,
	pub value: FakeValue,
	pub declared_type: Option<FakeClass>,
	pub method_mirror: FakeValue,
}

impl std::fmt::Debug for FakeAnnotationMember {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FakeAnnotationMember").field("name", &self.name).field("value", &self.value).finish()
	}
}

/// The uniform reflective result type. `From<AttrError>` implements the
/// lazy member-error policy: a failure while decoding one annotation
/// member is stored as that member's value rather than aborting the
/// whole annotation.
#[derive(Clone, Debug)]
pub enum FakeValue {
	Bool(bool),
	Byte(i8),
	Short(i16),
	Char(u16),
	Int(i32),
	Long(i64),
	Float(f32),
	Double(f64),
	Str(String),
	Class(FakeClass),
	Method(FakeMethod),
	Array(Vec<FakeValue>),
	Annotation { interface: FakeClass, members: Vec<Option<FakeAnnotationMember>> },
	Error(AttrError),
}

impl From<AttrError> for FakeValue {
	fn from(err: AttrError) -> Self {
		FakeValue::Error(err)
	}
}

impl FakeValue {
	pub fn as_int(&self) -> i32 {
		match self {
			FakeValue::Int(v) => *v,
			other => panic!("not an int: {other:?}"),
		}
	}

	pub fn as_str(&self) -> &str {
		match self {
			FakeValue::Str(s) => s,
			other => panic!("not a string: {other:?}"),
		}
	}

	pub fn as_array(&self) -> &[FakeValue] {
		match self {
			FakeValue::Array(v) => v,
			other => panic!("not an array: {other:?}"),
		}
	}

	pub fn member(&self, name: &str) -> &FakeValue {
		match self {
			FakeValue::Annotation { members, .. } => members
				.iter()
				.flatten()
				.find(|m| m.name == name)
				.map(|m| &m.value)
				.unwrap_or_else(|| panic!("no member {name}")),
			other => panic!("not an annotation: {other:?}"),
		}
	}
}

/// Resolves classes by descriptor or binary name out of a flat registry
/// the test (or `attrvm-cli`) populates up front — the stand-in for a
/// real class loader's lookup path.
#[derive(Default)]
pub struct FakeRuntime {
	by_descriptor: RefCell<HashMap<String, FakeClass>>,
	by_binary_name: RefCell<HashMap<String, FakeClass>>,
}

impl FakeRuntime {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(&self, class: FakeClass) -> FakeClass {
		self.by_descriptor.borrow_mut().insert(class.descriptor(), class.clone());
		self.by_binary_name.borrow_mut().insert(class.binary_name().to_string(), class.clone());
		class
	}
}

impl Runtime for FakeRuntime {
	type Class = FakeClass;
	type Method = FakeMethod;
	type Field = FakeField;
	type ClassLoader = FakeLoader;
	type AnnotationMember = FakeAnnotationMember;
	type Value = FakeValue;

	fn find_class_by_descriptor(&self, descriptor: &str, _loader: &Self::ClassLoader) -> Result<Self::Class, HostError> {
		self.by_descriptor
			.borrow()
			.get(descriptor)
			.cloned()
			.ok_or_else(|| HostError::ClassNotFound(descriptor.to_string()))
	}

	fn find_class_using_loader(&self, binary_name: &str, _loader: &Self::ClassLoader) -> Result<Self::Class, HostError> {
		self.by_binary_name
			.borrow()
			.get(binary_name)
			.cloned()
			.ok_or_else(|| HostError::ClassNotFound(binary_name.to_string()))
	}

	fn class_name(&self, class: &Self::Class) -> String {
		class.0.stream_name.clone()
	}

	fn class_loader_of(&self, class: &Self::Class) -> Self::ClassLoader {
		class.0.loader.clone()
	}

	fn declaring_class_of_method(&self, method: &Self::Method) -> Self::Class {
		method.0.declaring_class.clone()
	}

	fn declaring_class_of_field(&self, field: &Self::Field) -> Self::Class {
		field.0.declaring_class.clone()
	}

	fn get_method(&self, class: &Self::Class, name: &str, descriptor: &str) -> Option<Self::Method> {
		class.0.methods.borrow().iter().find(|m| m.0.name == name && m.0.descriptor == descriptor).cloned()
	}

	fn classify(&self, class: &Self::Class) -> TypeClassification<Self>
	where
		Self: Sized,
	{
		match &class.0.kind {
			FakeKind::Primitive(kind) => TypeClassification::Primitive(*kind),
			FakeKind::StringMirror => TypeClassification::StringMirror,
			FakeKind::ClassMirror => TypeClassification::ClassMirror,
			FakeKind::EnumClass => TypeClassification::EnumClass,
			FakeKind::Array(component) => TypeClassification::Array { component: component.clone() },
			FakeKind::AnnotationInterface => TypeClassification::AnnotationInterface,
			FakeKind::Plain => TypeClassification::Unsupported,
		}
	}

	fn internal_name(&self, class: &Self::Class) -> String {
		class.0.internal_name.clone()
	}

	fn from_binary_class_name(internal_name: &str) -> String {
		internal_name.replace('/', ".")
	}

	fn get_class_field(&self, class: &Self::Class, name: &str, _field_descriptor: &str) -> Option<Self::Field> {
		class.0.fields.borrow().iter().find(|f| f.0.name == name).cloned()
	}

	fn get_object_field_value(&self, _class: &Self::Class, field: &Self::Field) -> Self::Value {
		field.0.value.clone()
	}

	fn declared_methods(&self, class: &Self::Class) -> Vec<Self::Method> {
		class.0.methods.borrow().clone()
	}

	fn method_name(&self, method: &Self::Method) -> String {
		method.0.name.clone()
	}

	fn method_descriptor(&self, method: &Self::Method) -> String {
		method.0.descriptor.clone()
	}

	fn new_string_utf(&self, bytes: &[u8]) -> Result<Self::Value, HostError> {
		let decoded = attrvm_mutf8::decode(bytes).unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned());
		Ok(FakeValue::Str(decoded))
	}

	fn class_value(&self, class: &Self::Class) -> Self::Value {
		FakeValue::Class(class.clone())
	}

	fn wrap_primitive(&self, _kind: PrimitiveKind, value: PrimitiveValue) -> Self::Value {
		match value {
			PrimitiveValue::Boolean(v) => FakeValue::Bool(v),
			PrimitiveValue::Byte(v) => FakeValue::Byte(v),
			PrimitiveValue::Short(v) => FakeValue::Short(v),
			PrimitiveValue::Char(v) => FakeValue::Char(v),
			PrimitiveValue::Int(v) => FakeValue::Int(v),
			PrimitiveValue::Long(v) => FakeValue::Long(v),
			PrimitiveValue::Float(v) => FakeValue::Float(v),
			PrimitiveValue::Double(v) => FakeValue::Double(v),
		}
	}

	fn new_array_value(&self, _array_class: &Self::Class, elements: Vec<Self::Value>) -> Self::Value {
		FakeValue::Array(elements)
	}

	fn new_method_mirror(&self, method: &Self::Method) -> Self::Value {
		FakeValue::Method(method.clone())
	}

	fn new_annotation_member(
		&self,
		name: &str,
		value: Self::Value,
		declared_type: Option<Self::Class>,
		method_mirror: Self::Value,
	) -> Self::AnnotationMember {
		FakeAnnotationMember {
			name: name.to_string(),
			value,
			declared_type,
			method_mirror,
		}
	}

	fn create_annotation(&self, interface: &Self::Class, members: Vec<Option<Self::AnnotationMember>>) -> Result<Self::Value, HostError> {
		Ok(FakeValue::Annotation {
			interface: interface.clone(),
			members,
		})
	}

	fn new_class_array(&self, elements: Vec<Self::Class>) -> Self::Value {
		FakeValue::Array(elements.into_iter().map(FakeValue::Class).collect())
	}

	fn new_annotation_array(&self, elements: Vec<Self::Value>) -> Self::Value {
		FakeValue::Array(elements)
	}

	fn new_annotation_array_array(&self, elements: Vec<Self::Value>) -> Self::Value {
		FakeValue::Array(elements)
	}

	fn empty_exceptions_array(&self) -> Self::Value {
		FakeValue::Array(Vec::new())
	}

	fn empty_annotations_array(&self) -> Self::Value {
		FakeValue::Array(Vec::new())
	}
}
