// Tue Jan 13 2026 - Alex

use crate::hprof::{
    ClassDumpRecord, FieldDeclRecord, HprofError, HprofHeader, HprofReader, InstanceDumpRecord,
    LoadClassRecord, ObjectArrayRecord, PrimitiveArrayRecord, Record, RecordTag, RootCategory,
    RootRecord, StackFrameRecord, StackTraceRecord, StaticFieldRecord, StringRecord, SubRecord,
    SubRecordTag,
};
use bytes::Bytes;

#[derive(Debug, Clone, Default)]
pub struct ParserStats {
    pub top_level_records: usize,
    pub skipped_records: usize,
    pub heap_segments: usize,
    pub sub_records: usize,
}

/// Pull parser over a complete dump. Yields records in file order and fuses
/// after the first error, so the caller keeps everything decoded before it.
pub struct HprofParser {
    reader: HprofReader,
    header: HprofHeader,
    segment_end: Option<u64>,
    done: bool,
    stats: ParserStats,
}

impl HprofParser {
    pub fn new(data: Bytes, strict_version: bool) -> Result<Self, HprofError> {
        let mut reader = HprofReader::new(data);
        let header = HprofHeader::read(&mut reader, strict_version)?;
        log::debug!("HPROF header: {}", header);
        Ok(Self {
            reader,
            header,
            segment_end: None,
            done: false,
            stats: ParserStats::default(),
        })
    }

    pub fn header(&self) -> &HprofHeader {
        &self.header
    }

    pub fn stats(&self) -> &ParserStats {
        &self.stats
    }

    pub fn position(&self) -> u64 {
        self.reader.position()
    }

    pub fn total_len(&self) -> usize {
        self.reader.total_len()
    }

    fn next_record(&mut self) -> Result<Option<Record>, HprofError> {
        loop {
            if let Some(end) = self.segment_end {
                if self.reader.position() >= end {
                    self.segment_end = None;
                    continue;
                }
                let start = self.reader.position();
                let tag = self.reader.read_u8()?;
                if tag == 0 {
                    // zero padding up to the segment end
                    let pad = (end - self.reader.position()) as usize;
                    log::trace!("skipping {} padding bytes at {:#x}", pad + 1, start);
                    self.reader.skip(pad)?;
                    continue;
                }
                let sub = self.read_sub_record(tag, start)?;
                if self.reader.position() > end {
                    return Err(HprofError::malformed(
                        start,
                        format!("sub-record {:#04x} overruns heap dump segment ending at {:#x}", tag, end),
                    ));
                }
                self.stats.sub_records += 1;
                return Ok(Some(Record::Heap(sub)));
            }

            if self.reader.is_empty() {
                return Ok(None);
            }

            let start = self.reader.position();
            let tag = self.reader.read_u8()?;
            let _time_delta = self.reader.read_u32()?;
            let length = self.reader.read_u32()? as usize;
            self.stats.top_level_records += 1;

            let record_tag = RecordTag::from_u8(tag)
                .ok_or_else(|| HprofError::malformed(start, format!("unknown record tag {:#04x}", tag)))?;

            match record_tag {
                RecordTag::HeapDump | RecordTag::HeapDumpSegment => {
                    self.stats.heap_segments += 1;
                    self.segment_end = Some(self.reader.position() + length as u64);
                }
                RecordTag::String => return self.read_string(start, length).map(Some),
                RecordTag::LoadClass => return self.read_load_class(start, length).map(Some),
                RecordTag::StackFrame => return self.read_stack_frame(start, length).map(Some),
                RecordTag::StackTrace => return self.read_stack_trace(start, length).map(Some),
                skipped => {
                    debug_assert!(skipped.is_skipped());
                    self.stats.skipped_records += 1;
                    self.reader.skip(length)?;
                }
            }
        }
    }

    fn expect_length(&self, start: u64, tag: RecordTag, declared: usize, decoded: usize) -> Result<(), HprofError> {
        if declared != decoded {
            return Err(HprofError::malformed(
                start,
                format!("{:?} declares {} bytes but decodes {}", tag, declared, decoded),
            ));
        }
        Ok(())
    }

    fn read_string(&mut self, start: u64, length: usize) -> Result<Record, HprofError> {
        let id_size = self.reader.id_size();
        if length < id_size {
            return Err(HprofError::malformed(start, format!("string record shorter than an id ({} bytes)", length)));
        }
        let id = self.reader.read_id()?;
        let utf8 = self.reader.read_bytes(length - id_size)?;
        Ok(Record::String(StringRecord { id, utf8 }))
    }

    fn read_load_class(&mut self, start: u64, length: usize) -> Result<Record, HprofError> {
        let id_size = self.reader.id_size();
        self.expect_length(start, RecordTag::LoadClass, length, 8 + 2 * id_size)?;
        Ok(Record::LoadClass(LoadClassRecord {
            serial: self.reader.read_u32()?,
            class_id: self.reader.read_id()?,
            stack_trace_serial: self.reader.read_u32()?,
            name_id: self.reader.read_id()?,
        }))
    }

    fn read_stack_frame(&mut self, start: u64, length: usize) -> Result<Record, HprofError> {
        let id_size = self.reader.id_size();
        self.expect_length(start, RecordTag::StackFrame, length, 4 * id_size + 8)?;
        Ok(Record::StackFrame(StackFrameRecord {
            frame_id: self.reader.read_id()?,
            method_name_id: self.reader.read_id()?,
            signature_id: self.reader.read_id()?,
            source_file_id: self.reader.read_id()?,
            class_serial: self.reader.read_u32()?,
            line: self.reader.read_i32()?,
        }))
    }

    fn read_stack_trace(&mut self, start: u64, length: usize) -> Result<Record, HprofError> {
        let id_size = self.reader.id_size();
        if length < 12 {
            return Err(HprofError::malformed(start, "stack trace record shorter than its fixed part"));
        }
        let serial = self.reader.read_u32()?;
        let thread_serial = self.reader.read_u32()?;
        let count = self.reader.read_u32()? as usize;
        self.expect_length(start, RecordTag::StackTrace, length, 12 + count * id_size)?;
        let mut frame_ids = Vec::with_capacity(count);
        for _ in 0..count {
            frame_ids.push(self.reader.read_id()?);
        }
        Ok(Record::StackTrace(StackTraceRecord {
            serial,
            thread_serial,
            frame_ids,
        }))
    }

    fn read_sub_record(&mut self, tag: u8, start: u64) -> Result<SubRecord, HprofError> {
        let sub_tag = SubRecordTag::from_u8(tag)
            .ok_or_else(|| HprofError::malformed(start, format!("unknown heap sub-record tag {:#04x}", tag)))?;
        let r = &mut self.reader;

        let root = |category: RootCategory, object_id| RootRecord::new(category, object_id);
        Ok(match sub_tag {
            SubRecordTag::RootUnknown => SubRecord::Root(root(RootCategory::Unknown, r.read_id()?)),
            SubRecordTag::RootStickyClass => SubRecord::Root(root(RootCategory::StickyClass, r.read_id()?)),
            SubRecordTag::RootMonitorUsed => SubRecord::Root(root(RootCategory::MonitorUsed, r.read_id()?)),
            SubRecordTag::RootInternedString => SubRecord::Root(root(RootCategory::InternedString, r.read_id()?)),
            SubRecordTag::RootFinalizing => SubRecord::Root(root(RootCategory::Finalizing, r.read_id()?)),
            SubRecordTag::RootDebugger => SubRecord::Root(root(RootCategory::Debugger, r.read_id()?)),
            SubRecordTag::RootReferenceCleanup => {
                SubRecord::Root(root(RootCategory::ReferenceCleanup, r.read_id()?))
            }
            SubRecordTag::RootVmInternal => SubRecord::Root(root(RootCategory::VmInternal, r.read_id()?)),
            SubRecordTag::RootUnreachable => SubRecord::Root(root(RootCategory::Unreachable, r.read_id()?)),
            SubRecordTag::RootJniGlobal => {
                let object_id = r.read_id()?;
                let mut record = root(RootCategory::JniGlobal, object_id);
                record.jni_ref_id = Some(r.read_id()?);
                SubRecord::Root(record)
            }
            SubRecordTag::RootJniLocal | SubRecordTag::RootJavaFrame | SubRecordTag::RootJniMonitor => {
                let category = match sub_tag {
                    SubRecordTag::RootJniLocal => RootCategory::JniLocal,
                    SubRecordTag::RootJavaFrame => RootCategory::JavaFrame,
                    _ => RootCategory::JniMonitor,
                };
                let object_id = r.read_id()?;
                let thread = r.read_u32()?;
                let frame = r.read_u32()?;
                SubRecord::Root(root(category, object_id).with_thread(thread).with_frame(frame))
            }
            SubRecordTag::RootNativeStack | SubRecordTag::RootThreadBlock => {
                let category = if sub_tag == SubRecordTag::RootNativeStack {
                    RootCategory::NativeStack
                } else {
                    RootCategory::ThreadBlock
                };
                let object_id = r.read_id()?;
                let thread = r.read_u32()?;
                SubRecord::Root(root(category, object_id).with_thread(thread))
            }
            SubRecordTag::RootThreadObject => {
                let object_id = r.read_id()?;
                let thread = r.read_u32()?;
                let _stack_trace_serial = r.read_u32()?;
                SubRecord::Root(root(RootCategory::ThreadObject, object_id).with_thread(thread))
            }
            SubRecordTag::HeapDumpInfo => SubRecord::HeapDumpInfo {
                heap_id: r.read_u32()?,
                name_id: r.read_id()?,
            },
            SubRecordTag::ClassDump => SubRecord::ClassDump(Self::read_class_dump(r)?),
            SubRecordTag::InstanceDump => {
                let object_id = r.read_id()?;
                let stack_trace_serial = r.read_u32()?;
                let class_id = r.read_id()?;
                let size = r.read_u32()? as usize;
                let data = r.read_bytes(size)?;
                SubRecord::Instance(InstanceDumpRecord {
                    object_id,
                    stack_trace_serial,
                    class_id,
                    data,
                })
            }
            SubRecordTag::ObjectArrayDump => {
                let object_id = r.read_id()?;
                let stack_trace_serial = r.read_u32()?;
                let count = r.read_u32()? as usize;
                let array_class_id = r.read_id()?;
                let mut elements = Vec::with_capacity(count.min(r.remaining() / r.id_size().max(1)));
                for _ in 0..count {
                    elements.push(r.read_id()?);
                }
                SubRecord::ObjectArray(ObjectArrayRecord {
                    object_id,
                    stack_trace_serial,
                    array_class_id,
                    elements,
                })
            }
            SubRecordTag::PrimitiveArrayDump | SubRecordTag::PrimitiveArrayNoData => {
                let object_id = r.read_id()?;
                let stack_trace_serial = r.read_u32()?;
                let length = r.read_u32()?;
                let element_type = r.read_field_type()?;
                if element_type.is_reference() {
                    return Err(HprofError::malformed(start, "primitive array with object element type"));
                }
                let data = if sub_tag == SubRecordTag::PrimitiveArrayDump {
                    let byte_len = (length as usize)
                        .checked_mul(element_type.size(r.id_size()))
                        .ok_or_else(|| HprofError::malformed(start, "primitive array length overflows"))?;
                    Some(r.read_bytes(byte_len)?)
                } else {
                    None
                };
                SubRecord::PrimitiveArray(PrimitiveArrayRecord {
                    object_id,
                    stack_trace_serial,
                    element_type,
                    length,
                    data,
                })
            }
        })
    }

    fn read_class_dump(r: &mut HprofReader) -> Result<ClassDumpRecord, HprofError> {
        let class_id = r.read_id()?;
        let stack_trace_serial = r.read_u32()?;
        let super_class_id = r.read_id()?;
        let class_loader_id = r.read_id()?;
        let _signers = r.read_id()?;
        let _protection_domain = r.read_id()?;
        let _reserved1 = r.read_id()?;
        let _reserved2 = r.read_id()?;
        let instance_size = r.read_u32()?;

        let constant_count = r.read_u16()? as usize;
        let mut constants = Vec::with_capacity(constant_count);
        for _ in 0..constant_count {
            let index = r.read_u16()?;
            let ty = r.read_field_type()?;
            constants.push((index, r.read_value(ty)?));
        }

        let static_count = r.read_u16()? as usize;
        let mut statics = Vec::with_capacity(static_count);
        for _ in 0..static_count {
            let name_id = r.read_id()?;
            let ty = r.read_field_type()?;
            statics.push(StaticFieldRecord {
                name_id,
                value: r.read_value(ty)?,
            });
        }

        let field_count = r.read_u16()? as usize;
        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            let name_id = r.read_id()?;
            let field_type = r.read_field_type()?;
            fields.push(FieldDeclRecord { name_id, field_type });
        }

        Ok(ClassDumpRecord {
            class_id,
            stack_trace_serial,
            super_class_id,
            class_loader_id,
            instance_size,
            constants,
            statics,
            fields,
        })
    }
}

impl Iterator for HprofParser {
    type Item = Result<Record, HprofError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
