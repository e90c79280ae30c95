// Tue Jan 13 2026 - Alex

use crate::hprof::{decode_value, FieldValue, Id};
use crate::model::{ClassLayout, ClassTable, DecodedField, HeapObject, ModelError, ObjectIndex, ObjectStore};

#[derive(Clone, Copy)]
pub struct FieldDecoder<'a> {
    classes: &'a ClassTable,
    objects: &'a ObjectStore,
}

impl<'a> FieldDecoder<'a> {
    pub fn new(classes: &'a ClassTable, objects: &'a ObjectStore) -> Self {
        Self { classes, objects }
    }

    pub fn instance_layout(&self, index: ObjectIndex) -> Result<Option<(Id, &'a ClassLayout, &'a [u8])>, ModelError> {
        let entry = self.objects.get(index);
        let (class_id, data) = match &entry.object {
            HeapObject::Instance { class_id, data } => (*class_id, data),
            _ => return Ok(None),
        };
        let layout = match self.classes.layout(class_id) {
            Ok(layout) => layout,
            Err(ModelError::UnknownClass { class_id, .. }) => {
                return Err(ModelError::UnknownClass {
                    object_id: entry.id,
                    class_id,
                })
            }
            Err(e) => return Err(e),
        };
        if layout.size() != data.len() {
            return Err(ModelError::FieldLayoutMismatch {
                object_id: entry.id,
                expected: layout.size(),
                actual: data.len(),
            });
        }
        Ok(Some((class_id, layout, data.as_ref())))
    }

    pub fn decode_fields(&self, index: ObjectIndex) -> Result<Vec<DecodedField<'a>>, ModelError> {
        let (_, layout, data) = match self.instance_layout(index)? {
            Some(found) => found,
            None => return Ok(Vec::new()),
        };
        let id_size = self.objects.id_size();
        Ok(layout
            .fields()
            .iter()
            .filter_map(|descriptor| {
                decode_value(data, descriptor.offset(), descriptor.field_type(), id_size)
                    .map(|value| DecodedField { descriptor, value })
            })
            .collect())
    }

    pub fn read_field(&self, index: ObjectIndex, name: &str) -> Option<FieldValue> {
        let (_, layout, data) = self.instance_layout(index).ok().flatten()?;
        let descriptor = layout.field(name)?;
        decode_value(data, descriptor.offset(), descriptor.field_type(), self.objects.id_size())
    }

    pub fn read_int(&self, index: ObjectIndex, name: &str) -> Option<i64> {
        self.read_field(index, name)?.as_i64()
    }

    /// Resolved target of a reference field; `None` for null, dangling or
    /// missing fields.
    pub fn read_reference(&self, index: ObjectIndex, name: &str) -> Option<ObjectIndex> {
        let target = self.read_field(index, name)?.as_object()?;
        self.objects.resolve(target)
    }

    pub fn classes(&self) -> &'a ClassTable {
        self.classes
    }

    pub fn objects(&self) -> &'a ObjectStore {
        self.objects
    }
}
