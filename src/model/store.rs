// Tue Jan 13 2026 - Alex

use crate::hprof::{FieldType, Id};
use crate::model::{ClassTable, HeapObject, ModelError, ObjectEntry, ObjectIndex};
use ahash::AHashMap;

#[derive(Debug)]
pub struct ObjectStore {
    objects: Vec<ObjectEntry>,
    index: AHashMap<Id, ObjectIndex>,
    heap_names: Vec<String>,
    id_size: usize,
}

impl ObjectStore {
    pub fn new(id_size: usize) -> Self {
        Self {
            objects: Vec::new(),
            index: AHashMap::new(),
            heap_names: vec!["default".to_string()],
            id_size,
        }
    }

    pub fn insert(&mut self, id: Id, heap: u8, object: HeapObject) -> Result<ObjectIndex, ModelError> {
        if self.index.contains_key(&id) {
            return Err(ModelError::DuplicateObject(id));
        }
        let index = ObjectIndex(self.objects.len() as u32);
        self.objects.push(ObjectEntry { id, heap, object });
        self.index.insert(id, index);
        Ok(index)
    }

    pub fn heap_index(&mut self, name: &str) -> u8 {
        if let Some(pos) = self.heap_names.iter().position(|h| h == name) {
            return pos as u8;
        }
        if self.heap_names.len() >= u8::MAX as usize {
            return 0;
        }
        self.heap_names.push(name.to_string());
        (self.heap_names.len() - 1) as u8
    }

    pub fn heap_name(&self, heap: u8) -> &str {
        self.heap_names.get(heap as usize).map(|s| s.as_str()).unwrap_or("default")
    }

    pub fn resolve(&self, id: Id) -> Option<ObjectIndex> {
        self.index.get(&id).copied()
    }

    pub fn get(&self, index: ObjectIndex) -> &ObjectEntry {
        &self.objects[index.as_usize()]
    }

    pub fn try_get(&self, index: ObjectIndex) -> Option<&ObjectEntry> {
        self.objects.get(index.as_usize())
    }

    pub fn id_of(&self, index: ObjectIndex) -> Id {
        self.objects[index.as_usize()].id
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn id_size(&self) -> usize {
        self.id_size
    }

    pub fn indices(&self) -> impl Iterator<Item = ObjectIndex> + '_ {
        (0..self.objects.len() as u32).map(ObjectIndex)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectIndex, &ObjectEntry)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(i, e)| (ObjectIndex(i as u32), e))
    }

    pub fn shallow_size(&self, index: ObjectIndex, classes: &ClassTable) -> u64 {
        match &self.get(index).object {
            HeapObject::Instance { data, .. } => data.len() as u64,
            HeapObject::ObjectArray { elements, .. } => (elements.len() * self.id_size) as u64,
            HeapObject::PrimitiveArray {
                element_type,
                length,
                ..
            } => *length as u64 * element_type.size(self.id_size) as u64,
            HeapObject::Class { class_id } => classes
                .get(*class_id)
                .map(|c| {
                    c.statics
                        .iter()
                        .map(|s| s.value.field_type().size(self.id_size) as u64)
                        .sum()
                })
                .unwrap_or(0),
        }
    }

    pub fn class_name(&self, index: ObjectIndex, classes: &ClassTable) -> String {
        match &self.get(index).object {
            HeapObject::Instance { class_id, .. } => classes
                .name_of(*class_id)
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("<class {:#x}>", class_id)),
            HeapObject::ObjectArray { array_class_id, .. } => match classes.name_of(*array_class_id) {
                Some(name) if name.ends_with("[]") => name.to_string(),
                Some(name) => format!("{}[]", name),
                None => "java.lang.Object[]".to_string(),
            },
            HeapObject::PrimitiveArray { element_type, .. } => primitive_array_name(*element_type),
            HeapObject::Class { class_id } => format!(
                "class {}",
                classes.name_of(*class_id).unwrap_or("<unknown>")
            ),
        }
    }
}

pub fn primitive_array_name(element_type: FieldType) -> String {
    format!("{}[]", element_type.java_name())
}
