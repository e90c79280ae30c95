// Tue Jan 13 2026 - Alex

use crate::hprof::{ClassDumpRecord, FieldType, Id};
use crate::model::symbols::normalize_class_name;
use crate::model::{FieldDescriptor, ModelError, StaticField, StringTable};
use ahash::{AHashMap, AHashSet};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ClassRecord {
    pub class_id: Id,
    pub name: String,
    pub super_class_id: Option<Id>,
    pub class_loader_id: Id,
    pub instance_size: u32,
    pub declared_fields: Vec<(Box<str>, FieldType)>,
    pub statics: Vec<StaticField>,
}

impl ClassRecord {
    pub fn static_field(&self, name: &str) -> Option<&StaticField> {
        self.statics.iter().find(|s| &*s.name == name)
    }

    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

impl fmt::Display for ClassRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#x})", self.name, self.class_id)
    }
}

/// Flattened instance layout. Fields of the class itself come first,
/// followed by each superclass up to the root.
#[derive(Debug, Clone)]
pub struct ClassLayout {
    fields: Vec<FieldDescriptor>,
    size: usize,
    ancestors: Vec<Id>,
}

impl ClassLayout {
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn ancestors(&self) -> &[Id] {
        &self.ancestors
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn field_declared_by(&self, name: &str, class_id: Id) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.name() == name && f.declaring_class() == class_id)
    }

    pub fn reference_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_reference())
    }
}

#[derive(Debug, Clone)]
enum LayoutState {
    Pending,
    Resolved(Arc<ClassLayout>),
    Invalid(String),
}

#[derive(Debug, Default)]
pub struct ClassTable {
    classes: IndexMap<Id, ClassRecord>,
    layouts: Vec<LayoutState>,
    loaded_names: AHashMap<Id, Id>,
    resolved_names: AHashMap<Id, String>,
    by_name: AHashMap<String, Vec<Id>>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_load(&mut self, class_id: Id, name_id: Id) {
        self.loaded_names.insert(class_id, name_id);
    }

    pub fn record_dump(&mut self, dump: ClassDumpRecord, strings: &StringTable) -> Result<(), ModelError> {
        if self.classes.contains_key(&dump.class_id) {
            return Err(ModelError::DuplicateObject(dump.class_id));
        }
        let declared_fields = dump
            .fields
            .iter()
            .map(|f| (strings.get_or_placeholder(f.name_id).into_boxed_str(), f.field_type))
            .collect();
        let statics = dump
            .statics
            .iter()
            .map(|s| StaticField {
                name: strings.get_or_placeholder(s.name_id).into_boxed_str(),
                value: s.value,
            })
            .collect();
        let record = ClassRecord {
            class_id: dump.class_id,
            name: String::new(),
            super_class_id: (dump.super_class_id != 0).then_some(dump.super_class_id),
            class_loader_id: dump.class_loader_id,
            instance_size: dump.instance_size,
            declared_fields,
            statics,
        };
        self.classes.insert(dump.class_id, record);
        self.layouts.push(LayoutState::Pending);
        Ok(())
    }

    pub fn resolve(&mut self, strings: &StringTable, id_size: usize) -> Vec<ModelError> {
        for (&class_id, &name_id) in &self.loaded_names {
            let name = match strings.get(name_id) {
                Some(raw) => normalize_class_name(raw),
                None => format!("<class {:#x}>", class_id),
            };
            self.resolved_names.insert(class_id, name);
        }
        for (class_id, record) in self.classes.iter_mut() {
            record.name = match self.resolved_names.get(class_id) {
                Some(name) => name.clone(),
                None => format!("<class {:#x}>", class_id),
            };
        }

        self.by_name.clear();
        for (&class_id, record) in &self.classes {
            self.by_name.entry(record.name.clone()).or_default().push(class_id);
        }

        let mut errors = Vec::new();
        for index in 0..self.classes.len() {
            let state = match self.build_layout(index, id_size) {
                Ok(layout) => LayoutState::Resolved(Arc::new(layout)),
                Err(reason) => {
                    let class_id = *self.classes.get_index(index).map(|(id, _)| id).unwrap_or(&0);
                    log::debug!("class {:#x} rejected: {}", class_id, reason);
                    errors.push(ModelError::InvalidClassHierarchy {
                        class_id,
                        reason: reason.clone(),
                    });
                    LayoutState::Invalid(reason)
                }
            };
            self.layouts[index] = state;
        }
        errors
    }

    fn build_layout(&self, index: usize, id_size: usize) -> Result<ClassLayout, String> {
        let mut chain = Vec::new();
        let mut seen = AHashSet::new();
        let mut current = self.classes.get_index(index).map(|(id, _)| *id);

        while let Some(class_id) = current {
            if !seen.insert(class_id) {
                return Err(format!("cyclic superclass chain through {:#x}", class_id));
            }
            let record = self
                .classes
                .get(&class_id)
                .ok_or_else(|| format!("superclass {:#x} has no class dump", class_id))?;
            chain.push(record);
            current = record.super_class_id;
        }

        let mut fields = Vec::new();
        let mut offset = 0usize;
        for record in &chain {
            for (name, ty) in &record.declared_fields {
                let descriptor = FieldDescriptor::new(name, *ty, offset, id_size, record.class_id);
                offset = descriptor.end();
                fields.push(descriptor);
            }
        }

        Ok(ClassLayout {
            fields,
            size: offset,
            ancestors: chain.iter().skip(1).map(|r| r.class_id).collect(),
        })
    }

    pub fn get(&self, class_id: Id) -> Option<&ClassRecord> {
        self.classes.get(&class_id)
    }

    pub fn contains(&self, class_id: Id) -> bool {
        self.classes.contains_key(&class_id)
    }

    pub fn layout(&self, class_id: Id) -> Result<&ClassLayout, ModelError> {
        let index = self.classes.get_index_of(&class_id).ok_or(ModelError::UnknownClass {
            object_id: 0,
            class_id,
        })?;
        match &self.layouts[index] {
            LayoutState::Resolved(layout) => Ok(layout.as_ref()),
            LayoutState::Invalid(reason) => Err(ModelError::InvalidClassHierarchy {
                class_id,
                reason: reason.clone(),
            }),
            LayoutState::Pending => Err(ModelError::InvalidClassHierarchy {
                class_id,
                reason: "layout not resolved".to_string(),
            }),
        }
    }

    pub fn name_of(&self, class_id: Id) -> Option<&str> {
        self.classes
            .get(&class_id)
            .map(|r| r.name.as_str())
            .or_else(|| self.resolved_names.get(&class_id).map(|s| s.as_str()))
    }

    pub fn find_by_name(&self, name: &str) -> &[Id] {
        self.by_name.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn lineage(&self, class_id: Id) -> Vec<&ClassRecord> {
        let mut lineage = Vec::new();
        let mut seen = AHashSet::new();
        let mut current = Some(class_id);
        while let Some(id) = current {
            if !seen.insert(id) {
                break;
            }
            match self.classes.get(&id) {
                Some(record) => {
                    current = record.super_class_id;
                    lineage.push(record);
                }
                None => break,
            }
        }
        lineage
    }

    pub fn is_subclass_of(&self, class_id: Id, ancestor_name: &str) -> bool {
        self.lineage(class_id).iter().any(|r| r.name == ancestor_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassRecord> {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn invalid_count(&self) -> usize {
        self.layouts
            .iter()
            .filter(|s| matches!(s, LayoutState::Invalid(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn strings(entries: &[(Id, &str)]) -> StringTable {
        let mut table = StringTable::new();
        for (id, s) in entries {
            table.insert(*id, &Bytes::copy_from_slice(s.as_bytes()));
        }
        table
    }

    fn dump(class_id: Id, super_id: Id, fields: &[(Id, FieldType)]) -> ClassDumpRecord {
        ClassDumpRecord {
            class_id,
            stack_trace_serial: 0,
            super_class_id: super_id,
            class_loader_id: 0,
            instance_size: 0,
            constants: Vec::new(),
            statics: Vec::new(),
            fields: fields
                .iter()
                .map(|(name_id, field_type)| crate::hprof::FieldDeclRecord {
                    name_id: *name_id,
                    field_type: *field_type,
                })
                .collect(),
        }
    }

    #[test]
    fn test_layout_declaring_class_first() {
        let strings = strings(&[(1, "java.lang.Object"), (2, "Base"), (3, "Derived"), (10, "a"), (11, "b")]);
        let mut table = ClassTable::new();
        table.record_load(0x1, 1);
        table.record_load(0x2, 2);
        table.record_load(0x3, 3);
        table.record_dump(dump(0x1, 0, &[]), &strings).unwrap();
        table.record_dump(dump(0x2, 0x1, &[(10, FieldType::Int)]), &strings).unwrap();
        table.record_dump(dump(0x3, 0x2, &[(11, FieldType::Object)]), &strings).unwrap();

        assert!(table.resolve(&strings, 8).is_empty());
        let layout = table.layout(0x3).unwrap();
        assert_eq!(layout.size(), 12);
        assert_eq!(layout.field("b").unwrap().offset(), 0);
        assert_eq!(layout.field("a").unwrap().offset(), 8);
        assert_eq!(layout.ancestors(), &[0x2, 0x1]);
        assert!(table.is_subclass_of(0x3, "Base"));
        assert_eq!(table.find_by_name("Derived"), &[0x3]);
    }

    #[test]
    fn test_cyclic_hierarchy_is_scoped() {
        let strings = strings(&[(1, "A"), (2, "B"), (3, "Ok")]);
        let mut table = ClassTable::new();
        table.record_load(0xA, 1);
        table.record_load(0xB, 2);
        table.record_load(0xC, 3);
        table.record_dump(dump(0xA, 0xB, &[]), &strings).unwrap();
        table.record_dump(dump(0xB, 0xA, &[]), &strings).unwrap();
        table.record_dump(dump(0xC, 0, &[]), &strings).unwrap();

        let errors = table.resolve(&strings, 4);
        assert_eq!(errors.len(), 2);
        assert!(matches!(table.layout(0xA), Err(ModelError::InvalidClassHierarchy { .. })));
        assert!(table.layout(0xC).is_ok());
        assert_eq!(table.invalid_count(), 2);
    }

    #[test]
    fn test_missing_superclass() {
        let strings = strings(&[(1, "Orphan")]);
        let mut table = ClassTable::new();
        table.record_load(0x5, 1);
        table.record_dump(dump(0x5, 0x99, &[]), &strings).unwrap();
        let errors = table.resolve(&strings, 4);
        assert_eq!(errors.len(), 1);
        assert_eq!(table.name_of(0x5), Some("Orphan"));
    }
}
