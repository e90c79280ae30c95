// Tue Jan 13 2026 - Alex

//! Byte-exact HPROF writer for building synthetic dumps in tests.

use crate::config::AnalysisConfig;
use crate::engine::{Engine, EngineError, HeapAnalysis};
use crate::hprof::{FieldType, FieldValue, Id, RecordTag, SubRecordTag};
use ahash::AHashMap;
use bytes::BufMut;

const FIRST_STRING_ID: Id = 0x7000_0000;

pub struct HprofWriter {
    id_size: usize,
    out: Vec<u8>,
    segment: Option<Vec<u8>>,
    strings: AHashMap<String, Id>,
    next_string_id: Id,
    next_class_serial: u32,
}

impl HprofWriter {
    pub fn new(id_size: usize) -> Self {
        Self::with_version("JAVA PROFILE 1.0.2", id_size)
    }

    pub fn with_version(version: &str, id_size: usize) -> Self {
        let mut out = Vec::new();
        out.put_slice(version.as_bytes());
        out.put_u8(0);
        out.put_u32(id_size as u32);
        out.put_u64(1_700_000_000_000);
        Self {
            id_size,
            out,
            segment: None,
            strings: AHashMap::new(),
            next_string_id: FIRST_STRING_ID,
            next_class_serial: 1,
        }
    }

    pub fn id_size(&self) -> usize {
        self.id_size
    }

    /// Interns `text` as a STRING record and returns its id. Repeated text
    /// reuses the first id.
    pub fn string(&mut self, text: &str) -> Id {
        if let Some(&id) = self.strings.get(text) {
            return id;
        }
        let id = self.next_string_id;
        self.next_string_id += 1;
        let mut body = Vec::new();
        put_id(&mut body, self.id_size, id);
        body.put_slice(text.as_bytes());
        self.record(RecordTag::String.as_u8(), &body);
        self.strings.insert(text.to_string(), id);
        id
    }

    pub fn load_class(&mut self, serial: u32, class_id: Id, name_id: Id) {
        let mut body = Vec::new();
        body.put_u32(serial);
        put_id(&mut body, self.id_size, class_id);
        body.put_u32(0);
        put_id(&mut body, self.id_size, name_id);
        self.record(RecordTag::LoadClass.as_u8(), &body);
    }

    pub fn stack_frame(&mut self, frame_id: Id, method: &str, source_file: &str, line: i32) {
        let method_id = self.string(method);
        let signature_id = self.string("()V");
        let source_id = self.string(source_file);
        let mut body = Vec::new();
        for id in [frame_id, method_id, signature_id, source_id] {
            put_id(&mut body, self.id_size, id);
        }
        body.put_u32(0);
        body.put_i32(line);
        self.record(RecordTag::StackFrame.as_u8(), &body);
    }

    pub fn stack_trace(&mut self, serial: u32, thread_serial: u32, frame_ids: &[Id]) {
        let mut body = Vec::new();
        body.put_u32(serial);
        body.put_u32(thread_serial);
        body.put_u32(frame_ids.len() as u32);
        for &id in frame_ids {
            put_id(&mut body, self.id_size, id);
        }
        self.record(RecordTag::StackTrace.as_u8(), &body);
    }

    pub fn raw_record(&mut self, tag: u8, body: &[u8]) {
        self.record(tag, body);
    }

    pub fn begin_segment(&mut self) {
        self.end_segment();
        self.segment = Some(Vec::new());
    }

    pub fn end_segment(&mut self) {
        if let Some(segment) = self.segment.take() {
            let tag = RecordTag::HeapDumpSegment.as_u8();
            self.put_record(tag, &segment);
        }
    }

    pub fn root_jni_global(&mut self, object_id: Id) {
        self.root(SubRecordTag::RootJniGlobal, object_id);
    }

    pub fn root(&mut self, tag: SubRecordTag, object_id: Id) {
        self.root_in_frame(tag, object_id, 0, 0);
    }

    pub fn root_in_frame(&mut self, tag: SubRecordTag, object_id: Id, thread_serial: u32, frame_index: u32) {
        let id_size = self.id_size;
        let mut body = Vec::new();
        body.put_u8(tag.as_u8());
        put_id(&mut body, id_size, object_id);
        match tag {
            SubRecordTag::RootJniGlobal => put_id(&mut body, id_size, 0),
            SubRecordTag::RootJniLocal | SubRecordTag::RootJavaFrame | SubRecordTag::RootJniMonitor => {
                body.put_u32(thread_serial);
                body.put_u32(frame_index);
            }
            SubRecordTag::RootNativeStack | SubRecordTag::RootThreadBlock => body.put_u32(thread_serial),
            SubRecordTag::RootThreadObject => {
                body.put_u32(thread_serial);
                body.put_u32(0);
            }
            _ => {}
        }
        self.sub_record(&body);
    }

    pub fn class_dump(&mut self, class_id: Id, super_id: Id, statics: &[(Id, FieldValue)], fields: &[(Id, FieldType)]) {
        let id_size = self.id_size;
        let instance_size: usize = fields.iter().map(|(_, ty)| ty.size(id_size)).sum();
        let mut body = Vec::new();
        body.put_u8(SubRecordTag::ClassDump.as_u8());
        put_id(&mut body, id_size, class_id);
        body.put_u32(0);
        put_id(&mut body, id_size, super_id);
        for _ in 0..5 {
            put_id(&mut body, id_size, 0);
        }
        body.put_u32(instance_size as u32);
        body.put_u16(0);
        body.put_u16(statics.len() as u16);
        for (name_id, value) in statics {
            put_id(&mut body, id_size, *name_id);
            body.put_u8(value.field_type().as_u8());
            put_value(&mut body, id_size, value);
        }
        body.put_u16(fields.len() as u16);
        for (name_id, ty) in fields {
            put_id(&mut body, id_size, *name_id);
            body.put_u8(ty.as_u8());
        }
        self.sub_record(&body);
    }

    pub fn define_class(&mut self, class_id: Id, name: &str, super_id: Id, fields: &[(&str, FieldType)]) {
        self.define_class_with_statics(class_id, name, super_id, &[], fields);
    }

    pub fn define_class_with_statics(
        &mut self,
        class_id: Id,
        name: &str,
        super_id: Id,
        statics: &[(&str, FieldValue)],
        fields: &[(&str, FieldType)],
    ) {
        let name_id = self.string(name);
        let serial = self.next_class_serial;
        self.next_class_serial += 1;
        self.load_class(serial, class_id, name_id);
        let statics: Vec<(Id, FieldValue)> = statics.iter().map(|(n, v)| (self.string(n), *v)).collect();
        let fields: Vec<(Id, FieldType)> = fields.iter().map(|(n, ty)| (self.string(n), *ty)).collect();
        self.class_dump(class_id, super_id, &statics, &fields);
    }

    pub fn instance(&mut self, object_id: Id, class_id: Id, data: &[u8]) {
        let id_size = self.id_size;
        let mut body = Vec::new();
        body.put_u8(SubRecordTag::InstanceDump.as_u8());
        put_id(&mut body, id_size, object_id);
        body.put_u32(0);
        put_id(&mut body, id_size, class_id);
        body.put_u32(data.len() as u32);
        body.put_slice(data);
        self.sub_record(&body);
    }

    pub fn instance_with(&mut self, object_id: Id, class_id: Id, values: &[FieldValue]) {
        let data = self.encode_values(values);
        self.instance(object_id, class_id, &data);
    }

    pub fn object_array(&mut self, object_id: Id, array_class_id: Id, elements: &[Id]) {
        let id_size = self.id_size;
        let mut body = Vec::new();
        body.put_u8(SubRecordTag::ObjectArrayDump.as_u8());
        put_id(&mut body, id_size, object_id);
        body.put_u32(0);
        body.put_u32(elements.len() as u32);
        put_id(&mut body, id_size, array_class_id);
        for &element in elements {
            put_id(&mut body, id_size, element);
        }
        self.sub_record(&body);
    }

    /// `data` must hold whole big-endian elements of `element_type`.
    pub fn primitive_array(&mut self, object_id: Id, element_type: FieldType, data: &[u8]) {
        let length = data.len() / element_type.size(self.id_size);
        let mut body = Vec::new();
        body.put_u8(SubRecordTag::PrimitiveArrayDump.as_u8());
        put_id(&mut body, self.id_size, object_id);
        body.put_u32(0);
        body.put_u32(length as u32);
        body.put_u8(element_type.as_u8());
        body.put_slice(data);
        self.sub_record(&body);
    }

    pub fn char_array(&mut self, object_id: Id, text: &str) {
        let data: Vec<u8> = text.encode_utf16().flat_map(|c| c.to_be_bytes()).collect();
        self.primitive_array(object_id, FieldType::Char, &data);
    }

    pub fn primitive_array_nodata(&mut self, object_id: Id, element_type: FieldType, length: u32) {
        let mut body = Vec::new();
        body.put_u8(SubRecordTag::PrimitiveArrayNoData.as_u8());
        put_id(&mut body, self.id_size, object_id);
        body.put_u32(0);
        body.put_u32(length);
        body.put_u8(element_type.as_u8());
        self.sub_record(&body);
    }

    pub fn heap_dump_info(&mut self, heap_id: u32, name_id: Id) {
        let mut body = Vec::new();
        body.put_u8(SubRecordTag::HeapDumpInfo.as_u8());
        body.put_u32(heap_id);
        put_id(&mut body, self.id_size, name_id);
        self.sub_record(&body);
    }

    /// Bytes of a sub-record, written verbatim into the open segment.
    pub fn raw_sub_record(&mut self, body: &[u8]) {
        self.sub_record(body);
    }

    pub fn encode_values(&self, values: &[FieldValue]) -> Vec<u8> {
        let mut data = Vec::new();
        for value in values {
            put_value(&mut data, self.id_size, value);
        }
        data
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.end_segment();
        self.out
    }

    fn record(&mut self, tag: u8, body: &[u8]) {
        self.end_segment();
        self.put_record(tag, body);
    }

    fn put_record(&mut self, tag: u8, body: &[u8]) {
        self.out.put_u8(tag);
        self.out.put_u32(0);
        self.out.put_u32(body.len() as u32);
        self.out.put_slice(body);
    }

    fn sub_record(&mut self, body: &[u8]) {
        self.segment.get_or_insert_with(Vec::new).put_slice(body);
    }
}

pub fn analyze(data: Vec<u8>) -> Result<HeapAnalysis, EngineError> {
    analyze_with(data, AnalysisConfig::default().with_threads(2))
}

pub fn analyze_with(data: Vec<u8>, config: AnalysisConfig) -> Result<HeapAnalysis, EngineError> {
    Engine::new(config)?.analyze_bytes(data)
}

fn put_id(out: &mut Vec<u8>, id_size: usize, id: Id) {
    if id_size == 4 {
        out.put_u32(id as u32);
    } else {
        out.put_u64(id);
    }
}

fn put_value(out: &mut Vec<u8>, id_size: usize, value: &FieldValue) {
    match *value {
        FieldValue::Boolean(v) => out.put_u8(v as u8),
        FieldValue::Byte(v) => out.put_i8(v),
        FieldValue::Char(v) => out.put_u16(v),
        FieldValue::Short(v) => out.put_i16(v),
        FieldValue::Int(v) => out.put_i32(v),
        FieldValue::Long(v) => out.put_i64(v),
        FieldValue::Float(v) => out.put_f32(v),
        FieldValue::Double(v) => out.put_f64(v),
        FieldValue::Object(id) => put_id(out, id_size, id),
    }
}
