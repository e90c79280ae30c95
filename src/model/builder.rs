// Tue Jan 13 2026 - Alex

use crate::hprof::{ClassDumpRecord, HprofHeader, Record, RootRecord, SubRecord};
use crate::model::{
    ClassTable, FieldDecoder, HeapObject, ModelError, ObjectIndex, ObjectStore, StackContext, StringTable,
};

#[derive(Debug)]
pub struct HeapModel {
    pub header: HprofHeader,
    pub strings: StringTable,
    pub classes: ClassTable,
    pub objects: ObjectStore,
    pub roots: Vec<RootRecord>,
    pub stacks: StackContext,
}

impl HeapModel {
    pub fn decoder(&self) -> FieldDecoder<'_> {
        FieldDecoder::new(&self.classes, &self.objects)
    }

    pub fn shallow_size(&self, index: ObjectIndex) -> u64 {
        self.objects.shallow_size(index, &self.classes)
    }

    pub fn class_name(&self, index: ObjectIndex) -> String {
        self.objects.class_name(index, &self.classes)
    }

    pub fn class_id_of(&self, index: ObjectIndex) -> Option<crate::hprof::Id> {
        match &self.objects.get(index).object {
            HeapObject::Instance { class_id, .. } => Some(*class_id),
            HeapObject::ObjectArray { array_class_id, .. } => Some(*array_class_id),
            _ => None,
        }
    }
}

/// Accumulates streamed records. Instances are stored raw and decoded only
/// after every class has been resolved, so record order does not matter.
pub struct HeapModelBuilder {
    header: HprofHeader,
    strings: StringTable,
    classes: ClassTable,
    objects: ObjectStore,
    roots: Vec<RootRecord>,
    stacks: StackContext,
    pending_class_dumps: Vec<ClassDumpRecord>,
    current_heap: u8,
    errors: Vec<ModelError>,
}

impl HeapModelBuilder {
    pub fn new(header: HprofHeader) -> Self {
        let id_size = header.id_size;
        Self {
            header,
            strings: StringTable::new(),
            classes: ClassTable::new(),
            objects: ObjectStore::new(id_size),
            roots: Vec::new(),
            stacks: StackContext::new(),
            pending_class_dumps: Vec::new(),
            current_heap: 0,
            errors: Vec::new(),
        }
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn accept(&mut self, record: Record) {
        match record {
            Record::String(s) => self.strings.insert(s.id, &s.utf8),
            Record::LoadClass(lc) => self.classes.record_load(lc.class_id, lc.name_id),
            Record::StackFrame(frame) => self.stacks.add_frame(frame),
            Record::StackTrace(trace) => self.stacks.add_trace(trace),
            Record::Heap(sub) => self.accept_sub_record(sub),
        }
    }

    fn accept_sub_record(&mut self, sub: SubRecord) {
        let heap = self.current_heap;
        let inserted = match sub {
            SubRecord::Root(root) => {
                self.roots.push(root);
                Ok(())
            }
            SubRecord::HeapDumpInfo { heap_id, name_id } => {
                let name = match self.strings.get(name_id) {
                    Some(name) => name.to_string(),
                    None => format!("heap-{:#x}", heap_id),
                };
                self.current_heap = self.objects.heap_index(&name);
                Ok(())
            }
            SubRecord::ClassDump(dump) => {
                let result = self
                    .objects
                    .insert(dump.class_id, heap, HeapObject::Class { class_id: dump.class_id })
                    .map(|_| ());
                self.pending_class_dumps.push(dump);
                result
            }
            SubRecord::Instance(instance) => self
                .objects
                .insert(
                    instance.object_id,
                    heap,
                    HeapObject::Instance {
                        class_id: instance.class_id,
                        data: instance.data,
                    },
                )
                .map(|_| ()),
            SubRecord::ObjectArray(array) => self
                .objects
                .insert(
                    array.object_id,
                    heap,
                    HeapObject::ObjectArray {
                        array_class_id: array.array_class_id,
                        elements: array.elements,
                    },
                )
                .map(|_| ()),
            SubRecord::PrimitiveArray(array) => self
                .objects
                .insert(
                    array.object_id,
                    heap,
                    HeapObject::PrimitiveArray {
                        element_type: array.element_type,
                        length: array.length,
                        data: array.data,
                    },
                )
                .map(|_| ()),
        };
        if let Err(e) = inserted {
            log::trace!("{}", e);
            self.errors.push(e);
        }
    }

    pub fn finish(mut self) -> (HeapModel, Vec<ModelError>) {
        for dump in std::mem::take(&mut self.pending_class_dumps) {
            if let Err(e) = self.classes.record_dump(dump, &self.strings) {
                self.errors.push(e);
            }
        }
        let id_size = self.header.id_size;
        let hierarchy_errors = self.classes.resolve(&self.strings, id_size);
        if !hierarchy_errors.is_empty() {
            log::warn!("{} classes rejected for invalid hierarchies", hierarchy_errors.len());
        }
        self.errors.extend(hierarchy_errors);
        self.stacks.resolve(&self.strings);

        let decoder = FieldDecoder::new(&self.classes, &self.objects);
        let mut undecodable = 0usize;
        for index in self.objects.indices() {
            match decoder.instance_layout(index) {
                Ok(_) => {}
                Err(ModelError::InvalidClassHierarchy { .. }) => undecodable += 1,
                Err(e) => {
                    undecodable += 1;
                    self.errors.push(e);
                }
            }
        }
        if undecodable > 0 {
            log::warn!("{} instances cannot be field-decoded", undecodable);
        }

        log::debug!(
            "model: {} strings, {} classes, {} objects, {} root bindings",
            self.strings.len(),
            self.classes.len(),
            self.objects.len(),
            self.roots.len()
        );

        let model = HeapModel {
            header: self.header,
            strings: self.strings,
            classes: self.classes,
            objects: self.objects,
            roots: self.roots,
            stacks: self.stacks,
        };
        (model, self.errors)
    }
}
