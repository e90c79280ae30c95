// Tue Jan 13 2026 - Alex

use crate::hprof::{decode_value, FieldValue, Id};
use crate::graph::{DanglingReference, EdgeKind, EdgeLabel, ReferenceEdge, ReferenceGraph, Strength};
use crate::model::{ClassTable, HeapModel, HeapObject, ModelError, ObjectIndex};
use ahash::AHashMap;
use std::sync::Arc;

pub const REFERENT_FIELD: &str = "referent";

const STRENGTH_CLASSES: &[(&str, Strength)] = &[
    ("java.lang.ref.WeakReference", Strength::Weak),
    ("java.lang.ref.SoftReference", Strength::Soft),
    ("java.lang.ref.PhantomReference", Strength::Phantom),
    ("java.lang.ref.Finalizer", Strength::Finalizer),
    ("java.lang.ref.FinalizerReference", Strength::Finalizer),
];

pub fn classify_reference_class(classes: &ClassTable, class_id: Id) -> Option<Strength> {
    classes.lineage(class_id).iter().find_map(|record| {
        STRENGTH_CLASSES
            .iter()
            .find(|(name, _)| record.name == *name)
            .map(|(_, strength)| *strength)
    })
}

pub struct GraphBuilder<'a> {
    model: &'a HeapModel,
    strengths: AHashMap<Id, Option<Strength>>,
    labels: AHashMap<Box<str>, Arc<str>>,
    edges: Vec<ReferenceEdge>,
    dangling: Vec<DanglingReference>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(model: &'a HeapModel) -> Self {
        Self {
            model,
            strengths: AHashMap::new(),
            labels: AHashMap::new(),
            edges: Vec::new(),
            dangling: Vec::new(),
        }
    }

    pub fn build(mut self) -> (ReferenceGraph, Vec<ModelError>) {
        let model = self.model;
        let objects = &model.objects;
        for index in objects.indices() {
            match &objects.get(index).object {
                HeapObject::Instance { class_id, .. } => self.instance_edges(index, *class_id),
                HeapObject::ObjectArray { elements, .. } => {
                    for (i, &target) in elements.iter().enumerate() {
                        self.link(index, target, EdgeKind::ArrayElement, EdgeLabel::Element(i as u32), Strength::Strong);
                    }
                }
                HeapObject::Class { class_id } => self.class_edges(index, *class_id),
                HeapObject::PrimitiveArray { .. } => {}
            }
        }

        let errors = self
            .dangling
            .iter()
            .map(|d| ModelError::UnresolvedReference {
                source_id: objects.id_of(d.source),
                target_id: d.target_id,
            })
            .collect::<Vec<_>>();
        if !errors.is_empty() {
            log::warn!("{} references point outside the dump", errors.len());
        }
        log::debug!("graph: {} edges over {} nodes", self.edges.len(), objects.len());

        let graph = ReferenceGraph::from_edges(objects.len(), self.edges, self.dangling);
        (graph, errors)
    }

    fn instance_edges(&mut self, index: ObjectIndex, class_id: Id) {
        let model = self.model;
        let decoder = model.decoder();
        // Undecodable instances were reported while building the model.
        let (layout, data) = match decoder.instance_layout(index) {
            Ok(Some((_, layout, data))) => (layout, data),
            _ => return,
        };
        let referent_strength = self.reference_strength(class_id);
        let id_size = model.objects.id_size();
        for field in layout.reference_fields() {
            let target = match decode_value(data, field.offset(), field.field_type(), id_size).and_then(|v| v.as_object()) {
                Some(target) => target,
                None => continue,
            };
            let strength = match referent_strength {
                Some(strength) if field.name() == REFERENT_FIELD => strength,
                _ => Strength::Strong,
            };
            let label = EdgeLabel::Field(self.intern(field.name()));
            self.link(index, target, EdgeKind::InstanceField, label, strength);
        }
    }

    fn class_edges(&mut self, index: ObjectIndex, class_id: Id) {
        let model = self.model;
        let record = match model.classes.get(class_id) {
            Some(record) => record,
            None => return,
        };
        for field in &record.statics {
            if let Some(target) = field.value.as_object() {
                let label = EdgeLabel::Static(self.intern(&field.name));
                self.link(index, target, EdgeKind::StaticField, label, Strength::Strong);
            }
        }
        if let Some(super_id) = record.super_class_id {
            self.link(index, super_id, EdgeKind::ClassSuper, EdgeLabel::SuperClass, Strength::Strong);
        }
    }

    fn link(&mut self, source: ObjectIndex, target_id: Id, kind: EdgeKind, label: EdgeLabel, strength: Strength) {
        if target_id == 0 {
            return;
        }
        match self.model.objects.resolve(target_id) {
            Some(target) => self
                .edges
                .push(ReferenceEdge::new(source, target, kind, label).with_strength(strength)),
            None => {
                log::trace!("dangling {} from {} to {:#x}", label, source, target_id);
                self.dangling.push(DanglingReference {
                    source,
                    target_id,
                    label,
                });
            }
        }
    }

    fn reference_strength(&mut self, class_id: Id) -> Option<Strength> {
        let classes = &self.model.classes;
        *self
            .strengths
            .entry(class_id)
            .or_insert_with(|| classify_reference_class(classes, class_id))
    }

    fn intern(&mut self, name: &str) -> Arc<str> {
        if let Some(label) = self.labels.get(name) {
            return label.clone();
        }
        let label: Arc<str> = Arc::from(name);
        self.labels.insert(Box::from(name), label.clone());
        label
    }
}

pub fn static_target(model: &HeapModel, class_id: Id, field: &str) -> Option<ObjectIndex> {
    match model.classes.get(class_id)?.static_field(field)?.value {
        FieldValue::Object(id) if id != 0 => model.objects.resolve(id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::StrengthFilter;
    use crate::hprof::{FieldType, HprofParser};
    use crate::model::HeapModelBuilder;
    use crate::utils::testing::HprofWriter;
    use bytes::Bytes;

    const REFERENCE: Id = 0x10;
    const SOFT: Id = 0x11;
    const CACHE_REF: Id = 0x12;
    const HOLDER: Id = 0x13;
    const ARRAY: Id = 0x14;

    fn model(data: Vec<u8>) -> HeapModel {
        let parser = HprofParser::new(Bytes::from(data), true).unwrap();
        let mut builder = HeapModelBuilder::new(parser.header().clone());
        for record in parser {
            builder.accept(record.unwrap());
        }
        builder.finish().0
    }

    fn dump() -> Vec<u8> {
        let mut w = HprofWriter::new(4);
        w.define_class(
            REFERENCE,
            "java.lang.ref.Reference",
            0,
            &[("referent", FieldType::Object), ("queue", FieldType::Object)],
        );
        w.define_class(SOFT, "java.lang.ref.SoftReference", REFERENCE, &[]);
        w.define_class(CACHE_REF, "com.example.CacheRef", SOFT, &[("key", FieldType::Object)]);
        w.define_class_with_statics(
            HOLDER,
            "com.example.Holder",
            0,
            &[("INSTANCE", FieldValue::Object(0x3)), ("COUNT", FieldValue::Int(3))],
            &[("item", FieldType::Object)],
        );
        w.define_class(ARRAY, "com.example.Holder[]", 0, &[]);

        w.instance_with(
            0x1,
            CACHE_REF,
            &[FieldValue::Object(0x2), FieldValue::Object(0x3), FieldValue::Object(0x3)],
        );
        w.instance_with(0x2, HOLDER, &[FieldValue::Object(0)]);
        w.instance_with(0x3, HOLDER, &[FieldValue::Object(0xbad)]);
        w.object_array(0x4, ARRAY, &[0x2, 0, 0x3]);
        w.finish()
    }

    #[test]
    fn test_reference_family_classification() {
        let model = model(dump());
        assert_eq!(classify_reference_class(&model.classes, CACHE_REF), Some(Strength::Soft));
        assert_eq!(classify_reference_class(&model.classes, SOFT), Some(Strength::Soft));
        assert_eq!(classify_reference_class(&model.classes, REFERENCE), None);
        assert_eq!(classify_reference_class(&model.classes, HOLDER), None);
    }

    #[test]
    fn test_edges_by_kind() {
        let model = model(dump());
        let (graph, errors) = GraphBuilder::new(&model).build();
        let idx = |id: Id| model.objects.resolve(id).unwrap();

        let from_ref: Vec<(String, Strength)> = graph
            .outgoing(idx(0x1))
            .iter()
            .map(|e| (e.label.to_string(), e.strength))
            .collect();
        assert_eq!(
            from_ref,
            vec![
                (".key".to_string(), Strength::Strong),
                (".referent".to_string(), Strength::Soft),
                (".queue".to_string(), Strength::Strong),
            ]
        );

        let elements: Vec<String> = graph.outgoing(idx(0x4)).iter().map(|e| e.label.to_string()).collect();
        assert_eq!(elements, vec!["[0]", "[2]"]);
        assert!(graph.outgoing(idx(0x4)).iter().all(|e| e.kind == EdgeKind::ArrayElement));

        let statics: Vec<&ReferenceEdge> = graph.outgoing(idx(HOLDER)).iter().collect();
        assert_eq!(statics.len(), 1);
        assert_eq!(statics[0].kind, EdgeKind::StaticField);
        assert_eq!(statics[0].label.to_string(), "static INSTANCE");
        assert_eq!(static_target(&model, HOLDER, "INSTANCE"), Some(idx(0x3)));
        assert_eq!(static_target(&model, HOLDER, "COUNT"), None);

        let supers: Vec<ObjectIndex> = graph
            .outgoing(idx(CACHE_REF))
            .iter()
            .filter(|e| e.kind == EdgeKind::ClassSuper)
            .map(|e| e.target)
            .collect();
        assert_eq!(supers, vec![idx(SOFT)]);

        assert_eq!(errors.len(), 1);
        assert_eq!(graph.dangling().len(), 1);
        assert_eq!(graph.dangling()[0].target_id, 0xbad);
        assert_eq!(
            errors[0],
            ModelError::UnresolvedReference {
                source_id: 0x3,
                target_id: 0xbad,
            }
        );
        let strong: Vec<ObjectIndex> = graph.successors(idx(0x1), StrengthFilter::strong_only()).collect();
        assert_eq!(strong, vec![idx(0x2), idx(0x3)]);
    }
}
