// Tue Jan 13 2026 - Alex

use crate::hprof::{Id, RootRecord, StackFrameRecord, StackTraceRecord};
use crate::model::StringTable;
use ahash::AHashMap;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackFrame {
    pub method: String,
    pub signature: String,
    pub source_file: String,
    pub line: i32,
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            line if line > 0 => write!(f, "{} ({}:{})", self.method, self.source_file, line),
            -2 => write!(f, "{} (compiled)", self.method),
            -3 => write!(f, "{} (native)", self.method),
            _ => write!(f, "{} ({})", self.method, self.source_file),
        }
    }
}

#[derive(Debug, Default)]
pub struct StackContext {
    raw_frames: Vec<StackFrameRecord>,
    frames: AHashMap<Id, StackFrame>,
    traces: AHashMap<u32, StackTraceRecord>,
    trace_by_thread: AHashMap<u32, u32>,
}

impl StackContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_frame(&mut self, frame: StackFrameRecord) {
        self.raw_frames.push(frame);
    }

    pub fn add_trace(&mut self, trace: StackTraceRecord) {
        self.trace_by_thread.insert(trace.thread_serial, trace.serial);
        self.traces.insert(trace.serial, trace);
    }

    pub fn resolve(&mut self, strings: &StringTable) {
        for raw in self.raw_frames.drain(..) {
            let frame = StackFrame {
                method: strings.get_or_placeholder(raw.method_name_id),
                signature: strings.get_or_placeholder(raw.signature_id),
                source_file: strings.get(raw.source_file_id).unwrap_or("Unknown Source").to_string(),
                line: raw.line,
            };
            self.frames.insert(raw.frame_id, frame);
        }
    }

    pub fn frame(&self, frame_id: Id) -> Option<&StackFrame> {
        self.frames.get(&frame_id)
    }

    pub fn trace(&self, serial: u32) -> Option<&StackTraceRecord> {
        self.traces.get(&serial)
    }

    pub fn frame_for_root(&self, root: &RootRecord) -> Option<&StackFrame> {
        let thread = root.thread_serial?;
        let frame_index = root.frame_index? as usize;
        let trace = self.traces.get(self.trace_by_thread.get(&thread)?)?;
        let frame_id = trace.frame_ids.get(frame_index)?;
        self.frames.get(frame_id)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn trace_count(&self) -> usize {
        self.traces.len()
    }
}
