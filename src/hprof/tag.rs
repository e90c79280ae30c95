// Tue Jan 13 2026 - Alex

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordTag {
    String,
    LoadClass,
    UnloadClass,
    StackFrame,
    StackTrace,
    AllocSites,
    HeapSummary,
    StartThread,
    EndThread,
    HeapDump,
    CpuSamples,
    ControlSettings,
    HeapDumpSegment,
    HeapDumpEnd,
}

impl RecordTag {
    pub fn from_u8(tag: u8) -> Option<Self> {
        Some(match tag {
            0x01 => RecordTag::String,
            0x02 => RecordTag::LoadClass,
            0x03 => RecordTag::UnloadClass,
            0x04 => RecordTag::StackFrame,
            0x05 => RecordTag::StackTrace,
            0x06 => RecordTag::AllocSites,
            0x07 => RecordTag::HeapSummary,
            0x0A => RecordTag::StartThread,
            0x0B => RecordTag::EndThread,
            0x0C => RecordTag::HeapDump,
            0x0D => RecordTag::CpuSamples,
            0x0E => RecordTag::ControlSettings,
            0x1C => RecordTag::HeapDumpSegment,
            0x2C => RecordTag::HeapDumpEnd,
            _ => return None,
        })
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            RecordTag::String => 0x01,
            RecordTag::LoadClass => 0x02,
            RecordTag::UnloadClass => 0x03,
            RecordTag::StackFrame => 0x04,
            RecordTag::StackTrace => 0x05,
            RecordTag::AllocSites => 0x06,
            RecordTag::HeapSummary => 0x07,
            RecordTag::StartThread => 0x0A,
            RecordTag::EndThread => 0x0B,
            RecordTag::HeapDump => 0x0C,
            RecordTag::CpuSamples => 0x0D,
            RecordTag::ControlSettings => 0x0E,
            RecordTag::HeapDumpSegment => 0x1C,
            RecordTag::HeapDumpEnd => 0x2C,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            RecordTag::UnloadClass
                | RecordTag::AllocSites
                | RecordTag::HeapSummary
                | RecordTag::StartThread
                | RecordTag::EndThread
                | RecordTag::CpuSamples
                | RecordTag::ControlSettings
                | RecordTag::HeapDumpEnd
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubRecordTag {
    RootUnknown,
    RootJniGlobal,
    RootJniLocal,
    RootJavaFrame,
    RootNativeStack,
    RootStickyClass,
    RootThreadBlock,
    RootMonitorUsed,
    RootThreadObject,
    RootInternedString,
    RootFinalizing,
    RootDebugger,
    RootReferenceCleanup,
    RootVmInternal,
    RootJniMonitor,
    RootUnreachable,
    ClassDump,
    InstanceDump,
    ObjectArrayDump,
    PrimitiveArrayDump,
    PrimitiveArrayNoData,
    HeapDumpInfo,
}

impl SubRecordTag {
    pub fn from_u8(tag: u8) -> Option<Self> {
        Some(match tag {
            0xFF => SubRecordTag::RootUnknown,
            0x01 => SubRecordTag::RootJniGlobal,
            0x02 => SubRecordTag::RootJniLocal,
            0x03 => SubRecordTag::RootJavaFrame,
            0x04 => SubRecordTag::RootNativeStack,
            0x05 => SubRecordTag::RootStickyClass,
            0x06 => SubRecordTag::RootThreadBlock,
            0x07 => SubRecordTag::RootMonitorUsed,
            0x08 => SubRecordTag::RootThreadObject,
            0x89 => SubRecordTag::RootInternedString,
            0x8A => SubRecordTag::RootFinalizing,
            0x8B => SubRecordTag::RootDebugger,
            0x8C => SubRecordTag::RootReferenceCleanup,
            0x8D => SubRecordTag::RootVmInternal,
            0x8E => SubRecordTag::RootJniMonitor,
            0x90 => SubRecordTag::RootUnreachable,
            0x20 => SubRecordTag::ClassDump,
            0x21 => SubRecordTag::InstanceDump,
            0x22 => SubRecordTag::ObjectArrayDump,
            0x23 => SubRecordTag::PrimitiveArrayDump,
            0xC3 => SubRecordTag::PrimitiveArrayNoData,
            0xFE => SubRecordTag::HeapDumpInfo,
            _ => return None,
        })
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            SubRecordTag::RootUnknown => 0xFF,
            SubRecordTag::RootJniGlobal => 0x01,
            SubRecordTag::RootJniLocal => 0x02,
            SubRecordTag::RootJavaFrame => 0x03,
            SubRecordTag::RootNativeStack => 0x04,
            SubRecordTag::RootStickyClass => 0x05,
            SubRecordTag::RootThreadBlock => 0x06,
            SubRecordTag::RootMonitorUsed => 0x07,
            SubRecordTag::RootThreadObject => 0x08,
            SubRecordTag::RootInternedString => 0x89,
            SubRecordTag::RootFinalizing => 0x8A,
            SubRecordTag::RootDebugger => 0x8B,
            SubRecordTag::RootReferenceCleanup => 0x8C,
            SubRecordTag::RootVmInternal => 0x8D,
            SubRecordTag::RootJniMonitor => 0x8E,
            SubRecordTag::RootUnreachable => 0x90,
            SubRecordTag::ClassDump => 0x20,
            SubRecordTag::InstanceDump => 0x21,
            SubRecordTag::ObjectArrayDump => 0x22,
            SubRecordTag::PrimitiveArrayDump => 0x23,
            SubRecordTag::PrimitiveArrayNoData => 0xC3,
            SubRecordTag::HeapDumpInfo => 0xFE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum FieldType {
    Object,
    Boolean,
    Char,
    Float,
    Double,
    Byte,
    Short,
    Int,
    Long,
}

impl FieldType {
    pub fn from_u8(code: u8) -> Option<Self> {
        Some(match code {
            2 => FieldType::Object,
            4 => FieldType::Boolean,
            5 => FieldType::Char,
            6 => FieldType::Float,
            7 => FieldType::Double,
            8 => FieldType::Byte,
            9 => FieldType::Short,
            10 => FieldType::Int,
            11 => FieldType::Long,
            _ => return None,
        })
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            FieldType::Object => 2,
            FieldType::Boolean => 4,
            FieldType::Char => 5,
            FieldType::Float => 6,
            FieldType::Double => 7,
            FieldType::Byte => 8,
            FieldType::Short => 9,
            FieldType::Int => 10,
            FieldType::Long => 11,
        }
    }

    pub fn size(&self, id_size: usize) -> usize {
        match self {
            FieldType::Boolean | FieldType::Byte => 1,
            FieldType::Char | FieldType::Short => 2,
            FieldType::Int | FieldType::Float => 4,
            FieldType::Long | FieldType::Double => 8,
            FieldType::Object => id_size,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, FieldType::Object)
    }

    pub fn java_name(&self) -> &'static str {
        match self {
            FieldType::Object => "object",
            FieldType::Boolean => "boolean",
            FieldType::Char => "char",
            FieldType::Float => "float",
            FieldType::Double => "double",
            FieldType::Byte => "byte",
            FieldType::Short => "short",
            FieldType::Int => "int",
            FieldType::Long => "long",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.java_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_codes() {
        for code in [2u8, 4, 5, 6, 7, 8, 9, 10, 11] {
            let ty = FieldType::from_u8(code).unwrap();
            assert_eq!(ty.as_u8(), code);
        }
        assert!(FieldType::from_u8(3).is_none());
        assert_eq!(FieldType::Object.size(4), 4);
        assert_eq!(FieldType::Object.size(8), 8);
        assert_eq!(FieldType::Char.size(8), 2);
    }

    #[test]
    fn test_sub_record_tags() {
        assert_eq!(SubRecordTag::from_u8(0xFF), Some(SubRecordTag::RootUnknown));
        assert_eq!(SubRecordTag::from_u8(0xC3), Some(SubRecordTag::PrimitiveArrayNoData));
        assert_eq!(SubRecordTag::RootJniMonitor.as_u8(), 0x8E);
        assert!(SubRecordTag::from_u8(0x42).is_none());
        assert!(RecordTag::from_u8(0x55).is_none());
        assert!(RecordTag::CpuSamples.is_skipped());
        assert!(!RecordTag::HeapDumpSegment.is_skipped());
    }
}
