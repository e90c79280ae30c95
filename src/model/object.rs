// Tue Jan 13 2026 - Alex

use crate::hprof::{FieldType, Id};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectIndex(pub u32);

impl ObjectIndex {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ObjectIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub enum HeapObject {
    Class { class_id: Id },
    Instance { class_id: Id, data: Bytes },
    ObjectArray { array_class_id: Id, elements: Vec<Id> },
    PrimitiveArray {
        element_type: FieldType,
        length: u32,
        data: Option<Bytes>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Class,
    Instance,
    ObjectArray,
    PrimitiveArray,
}

impl HeapObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            HeapObject::Class { .. } => ObjectKind::Class,
            HeapObject::Instance { .. } => ObjectKind::Instance,
            HeapObject::ObjectArray { .. } => ObjectKind::ObjectArray,
            HeapObject::PrimitiveArray { .. } => ObjectKind::PrimitiveArray,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, HeapObject::ObjectArray { .. } | HeapObject::PrimitiveArray { .. })
    }

    pub fn array_length(&self) -> Option<usize> {
        match self {
            HeapObject::ObjectArray { elements, .. } => Some(elements.len()),
            HeapObject::PrimitiveArray { length, .. } => Some(*length as usize),
            _ => None,
        }
    }

    pub fn primitive_data(&self) -> Option<(FieldType, &[u8])> {
        match self {
            HeapObject::PrimitiveArray {
                element_type,
                data: Some(data),
                ..
            } => Some((*element_type, data.as_ref())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObjectEntry {
    pub id: Id,
    pub heap: u8,
    pub object: HeapObject,
}
