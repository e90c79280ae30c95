// Tue Jan 13 2026 - Alex

use crate::hprof::FieldType;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type Id = u64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Boolean(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Object(Id),
}

impl FieldValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Boolean(_) => FieldType::Boolean,
            FieldValue::Byte(_) => FieldType::Byte,
            FieldValue::Char(_) => FieldType::Char,
            FieldValue::Short(_) => FieldType::Short,
            FieldValue::Int(_) => FieldType::Int,
            FieldValue::Long(_) => FieldType::Long,
            FieldValue::Float(_) => FieldType::Float,
            FieldValue::Double(_) => FieldType::Double,
            FieldValue::Object(_) => FieldType::Object,
        }
    }

    pub fn as_object(&self) -> Option<Id> {
        match *self {
            FieldValue::Object(id) if id != 0 => Some(id),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            FieldValue::Boolean(v) => Some(v as i64),
            FieldValue::Byte(v) => Some(v as i64),
            FieldValue::Char(v) => Some(v as i64),
            FieldValue::Short(v) => Some(v as i64),
            FieldValue::Int(v) => Some(v as i64),
            FieldValue::Long(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Boolean(v) => write!(f, "{}", v),
            FieldValue::Byte(v) => write!(f, "{}", v),
            FieldValue::Char(v) => match char::from_u32(*v as u32) {
                Some(c) => write!(f, "'{}'", c),
                None => write!(f, "\\u{:04x}", v),
            },
            FieldValue::Short(v) => write!(f, "{}", v),
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Long(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Double(v) => write!(f, "{}", v),
            FieldValue::Object(0) => write!(f, "null"),
            FieldValue::Object(id) => write!(f, "@{:#x}", id),
        }
    }
}

/// GC root categories. Declaration order is the tie-break order used by
/// path queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RootCategory {
    Unknown,
    JniGlobal,
    JniLocal,
    JavaFrame,
    NativeStack,
    StickyClass,
    ThreadBlock,
    MonitorUsed,
    ThreadObject,
    InternedString,
    Finalizing,
    Debugger,
    ReferenceCleanup,
    VmInternal,
    JniMonitor,
    Unreachable,
}

impl RootCategory {
    pub const ALL: [RootCategory; 16] = [
        RootCategory::Unknown,
        RootCategory::JniGlobal,
        RootCategory::JniLocal,
        RootCategory::JavaFrame,
        RootCategory::NativeStack,
        RootCategory::StickyClass,
        RootCategory::ThreadBlock,
        RootCategory::MonitorUsed,
        RootCategory::ThreadObject,
        RootCategory::InternedString,
        RootCategory::Finalizing,
        RootCategory::Debugger,
        RootCategory::ReferenceCleanup,
        RootCategory::VmInternal,
        RootCategory::JniMonitor,
        RootCategory::Unreachable,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RootCategory::Unknown => "Unknown",
            RootCategory::JniGlobal => "JNI Global",
            RootCategory::JniLocal => "JNI Local",
            RootCategory::JavaFrame => "Java Frame",
            RootCategory::NativeStack => "Native Stack",
            RootCategory::StickyClass => "Sticky Class",
            RootCategory::ThreadBlock => "Thread Block",
            RootCategory::MonitorUsed => "Monitor Used",
            RootCategory::ThreadObject => "Thread Object",
            RootCategory::InternedString => "Interned String",
            RootCategory::Finalizing => "Finalizing",
            RootCategory::Debugger => "Debugger",
            RootCategory::ReferenceCleanup => "Reference Cleanup",
            RootCategory::VmInternal => "VM Internal",
            RootCategory::JniMonitor => "JNI Monitor",
            RootCategory::Unreachable => "Unreachable",
        }
    }
}

impl fmt::Display for RootCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootRecord {
    pub category: RootCategory,
    pub object_id: Id,
    pub thread_serial: Option<u32>,
    pub frame_index: Option<u32>,
    pub jni_ref_id: Option<Id>,
}

impl RootRecord {
    pub fn new(category: RootCategory, object_id: Id) -> Self {
        Self {
            category,
            object_id,
            thread_serial: None,
            frame_index: None,
            jni_ref_id: None,
        }
    }

    pub fn with_thread(mut self, thread_serial: u32) -> Self {
        self.thread_serial = Some(thread_serial);
        self
    }

    pub fn with_frame(mut self, frame_index: u32) -> Self {
        self.frame_index = Some(frame_index);
        self
    }
}

#[derive(Debug, Clone)]
pub struct StringRecord {
    pub id: Id,
    pub utf8: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadClassRecord {
    pub serial: u32,
    pub class_id: Id,
    pub stack_trace_serial: u32,
    pub name_id: Id,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrameRecord {
    pub frame_id: Id,
    pub method_name_id: Id,
    pub signature_id: Id,
    pub source_file_id: Id,
    pub class_serial: u32,
    pub line: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackTraceRecord {
    pub serial: u32,
    pub thread_serial: u32,
    pub frame_ids: Vec<Id>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticFieldRecord {
    pub name_id: Id,
    pub value: FieldValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDeclRecord {
    pub name_id: Id,
    pub field_type: FieldType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDumpRecord {
    pub class_id: Id,
    pub stack_trace_serial: u32,
    pub super_class_id: Id,
    pub class_loader_id: Id,
    pub instance_size: u32,
    pub constants: Vec<(u16, FieldValue)>,
    pub statics: Vec<StaticFieldRecord>,
    pub fields: Vec<FieldDeclRecord>,
}

#[derive(Debug, Clone)]
pub struct InstanceDumpRecord {
    pub object_id: Id,
    pub stack_trace_serial: u32,
    pub class_id: Id,
    pub data: Bytes,
}

#[derive(Debug, Clone)]
pub struct ObjectArrayRecord {
    pub object_id: Id,
    pub stack_trace_serial: u32,
    pub array_class_id: Id,
    pub elements: Vec<Id>,
}

#[derive(Debug, Clone)]
pub struct PrimitiveArrayRecord {
    pub object_id: Id,
    pub stack_trace_serial: u32,
    pub element_type: FieldType,
    pub length: u32,
    pub data: Option<Bytes>,
}

#[derive(Debug, Clone)]
pub enum SubRecord {
    Root(RootRecord),
    ClassDump(ClassDumpRecord),
    Instance(InstanceDumpRecord),
    ObjectArray(ObjectArrayRecord),
    PrimitiveArray(PrimitiveArrayRecord),
    HeapDumpInfo { heap_id: u32, name_id: Id },
}

#[derive(Debug, Clone)]
pub enum Record {
    String(StringRecord),
    LoadClass(LoadClassRecord),
    StackFrame(StackFrameRecord),
    StackTrace(StackTraceRecord),
    Heap(SubRecord),
}
