//! The `Runtime` collaborator boundary, the eleven public reflective
//! queries built on top of it, and the one-time bootstrap that builds
//! the shared empty-array sentinels.

mod config;
mod decoder;
pub mod fake;

pub use config::DecoderConfig;
pub use decoder::{
	get_annotation_default, get_class_runtime_visible_annotations, get_declaring_class, get_declared_classes, get_enclosing_class,
	get_enclosing_method, get_exceptions, get_field_runtime_visible_annotations, get_method_runtime_visible_annotations, get_signature,
	get_runtime_visible_parameter_annotations, is_anonymous_class, Bootstrap,
};

pub use attrvm_ir::{AttrError, AttributeStream, AttributeTag, HostError, Runtime};
