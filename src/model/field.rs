// Tue Jan 13 2026 - Alex

use crate::hprof::{FieldType, FieldValue, Id};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: Box<str>,
    field_type: FieldType,
    offset: usize,
    size: usize,
    declaring_class: Id,
}

impl FieldDescriptor {
    pub fn new(name: &str, field_type: FieldType, offset: usize, id_size: usize, declaring_class: Id) -> Self {
        Self {
            name: name.into(),
            field_type,
            offset,
            size: field_type.size(id_size),
            declaring_class,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn end(&self) -> usize {
        self.offset + self.size
    }

    pub fn declaring_class(&self) -> Id {
        self.declaring_class
    }

    pub fn is_reference(&self) -> bool {
        self.field_type.is_reference()
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}: {}", self.name, self.offset, self.field_type)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticField {
    pub name: Box<str>,
    pub value: FieldValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedField<'a> {
    pub descriptor: &'a FieldDescriptor,
    pub value: FieldValue,
}

impl DecodedField<'_> {
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }
}
