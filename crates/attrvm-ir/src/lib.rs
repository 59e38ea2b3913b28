//! The attribute stream grammar, iterator, and element-value decoder for
//! a compiled class's attached attributes: `SourceFile`, `Signature`,
//! `InnerClass`, `EnclosingMethod`, `Exceptions`, the runtime-visible
//! annotation attributes, and `AnnotationDefault`.

pub mod element;
pub mod error;
pub mod host;
pub mod iter;
pub mod tag;

pub use element::{decode_annotations, decode_element_value, get_annotation_value, skip_annotation, skip_element_value};
pub use error::{AttrError, HostError};
pub use host::{find_type, return_type_descriptor, PrimitiveKind, PrimitiveValue, Runtime, TypeClassification};
pub use iter::for_each_or_halt;
pub use tag::{AttributeStream, AttributeTag};

pub use attrvm_bytes::Cursor;
