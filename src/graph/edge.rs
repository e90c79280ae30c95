// Tue Jan 13 2026 - Alex

use crate::model::ObjectIndex;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeKind {
    InstanceField,
    ArrayElement,
    StaticField,
    ClassSuper,
}

impl EdgeKind {
    pub const ALL: [EdgeKind; 4] = [
        EdgeKind::InstanceField,
        EdgeKind::ArrayElement,
        EdgeKind::StaticField,
        EdgeKind::ClassSuper,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EdgeKind::InstanceField => "instance-field",
            EdgeKind::ArrayElement => "array-element",
            EdgeKind::StaticField => "static-field",
            EdgeKind::ClassSuper => "class-super",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Strength {
    Strong,
    Weak,
    Soft,
    Phantom,
    Finalizer,
}

impl Strength {
    pub const ALL: [Strength; 5] = [
        Strength::Strong,
        Strength::Weak,
        Strength::Soft,
        Strength::Phantom,
        Strength::Finalizer,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strength::Strong => "strong",
            Strength::Weak => "weak",
            Strength::Soft => "soft",
            Strength::Phantom => "phantom",
            Strength::Finalizer => "finalizer",
        }
    }

    pub fn flag(&self) -> StrengthFilter {
        match self {
            Strength::Strong => StrengthFilter::STRONG,
            Strength::Weak => StrengthFilter::WEAK,
            Strength::Soft => StrengthFilter::SOFT,
            Strength::Phantom => StrengthFilter::PHANTOM,
            Strength::Finalizer => StrengthFilter::FINALIZER,
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct StrengthFilter: u8 {
        const STRONG = 0b0000_0001;
        const WEAK = 0b0000_0010;
        const SOFT = 0b0000_0100;
        const PHANTOM = 0b0000_1000;
        const FINALIZER = 0b0001_0000;
    }
}

impl StrengthFilter {
    pub fn strong_only() -> Self {
        StrengthFilter::STRONG
    }

    pub fn from_strengths(strengths: &[Strength]) -> Self {
        strengths
            .iter()
            .fold(StrengthFilter::empty(), |acc, s| acc | s.flag())
    }

    pub fn allows(&self, strength: Strength) -> bool {
        self.contains(strength.flag())
    }

    pub fn strengths(&self) -> Vec<Strength> {
        Strength::ALL.iter().copied().filter(|s| self.allows(*s)).collect()
    }
}

impl Default for StrengthFilter {
    fn default() -> Self {
        StrengthFilter::strong_only()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum EdgeLabel {
    Field(Arc<str>),
    Element(u32),
    Static(Arc<str>),
    SuperClass,
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeLabel::Field(name) => write!(f, ".{}", name),
            EdgeLabel::Element(index) => write!(f, "[{}]", index),
            EdgeLabel::Static(name) => write!(f, "static {}", name),
            EdgeLabel::SuperClass => f.write_str("<super>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEdge {
    pub source: ObjectIndex,
    pub target: ObjectIndex,
    pub kind: EdgeKind,
    pub label: EdgeLabel,
    pub strength: Strength,
}

impl ReferenceEdge {
    pub fn new(source: ObjectIndex, target: ObjectIndex, kind: EdgeKind, label: EdgeLabel) -> Self {
        Self {
            source,
            target,
            kind,
            label,
            strength: Strength::Strong,
        }
    }

    pub fn with_strength(mut self, strength: Strength) -> Self {
        self.strength = strength;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub source: ObjectIndex,
    pub target_id: u64,
    pub label: EdgeLabel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_strengths() {
        let filter = StrengthFilter::from_strengths(&[Strength::Strong, Strength::Weak]);
        assert!(filter.allows(Strength::Strong));
        assert!(filter.allows(Strength::Weak));
        assert!(!filter.allows(Strength::Soft));
        assert_eq!(filter.strengths(), vec![Strength::Strong, Strength::Weak]);
    }

    #[test]
    fn test_default_is_strong_only() {
        let filter = StrengthFilter::default();
        assert_eq!(filter.strengths(), vec![Strength::Strong]);
    }

    #[test]
    fn test_label_display() {
        assert_eq!(EdgeLabel::Field(Arc::from("next")).to_string(), ".next");
        assert_eq!(EdgeLabel::Element(3).to_string(), "[3]");
        assert_eq!(EdgeLabel::SuperClass.to_string(), "<super>");
    }

    #[test]
    fn test_dangling_reference_serializes() {
        let dangling = DanglingReference {
            source: ObjectIndex(4),
            target_id: 0xbad,
            label: EdgeLabel::Field(Arc::from("next")),
        };
        let json = serde_json::to_value(&dangling).unwrap();
        assert_eq!(json["source"], 4);
        assert_eq!(json["target_id"], 0xbad);
        assert_eq!(json["label"]["Field"], "next");
    }
}
