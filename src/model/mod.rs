// Tue Jan 13 2026 - Alex

pub mod builder;
pub mod class;
pub mod decode;
pub mod error;
pub mod field;
pub mod object;
pub mod stack;
pub mod store;
pub mod symbols;

pub use builder::{HeapModel, HeapModelBuilder};
pub use class::{ClassLayout, ClassRecord, ClassTable};
pub use decode::FieldDecoder;
pub use error::ModelError;
pub use field::{DecodedField, FieldDescriptor, StaticField};
pub use object::{HeapObject, ObjectEntry, ObjectIndex, ObjectKind};
pub use stack::{StackContext, StackFrame};
pub use store::{primitive_array_name, ObjectStore};
pub use symbols::{normalize_class_name, package_of, StringTable};
