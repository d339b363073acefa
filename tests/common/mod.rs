// Common fixtures for integration tests

#![allow(dead_code)]

use k8s_openapi::api::core::v1::{
    NodeSelector, NodeSelectorRequirement, NodeSelectorTerm, PersistentVolume,
    PersistentVolumeSpec, VolumeNodeAffinity,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde_json::Value;
use std::collections::BTreeMap;

/// Build a node selector requirement
pub fn requirement(key: &str, operator: &str, values: &[&str]) -> NodeSelectorRequirement {
    NodeSelectorRequirement {
        key: key.to_string(),
        operator: operator.to_string(),
        values: Some(values.iter().map(ToString::to_string).collect()),
    }
}

/// Build a required node affinity from lists of match expressions, one list per term
pub fn node_affinity(terms: Vec<Vec<NodeSelectorRequirement>>) -> VolumeNodeAffinity {
    VolumeNodeAffinity {
        required: Some(NodeSelector {
            node_selector_terms: terms
                .into_iter()
                .map(|expressions| NodeSelectorTerm {
                    match_expressions: Some(expressions),
                    match_fields: None,
                })
                .collect(),
        }),
    }
}

/// Build a `PersistentVolume` document with optional labels and node affinity
pub fn pv_document(
    name: &str,
    labels: &[(&str, &str)],
    affinity: Option<VolumeNodeAffinity>,
) -> Value {
    let labels: BTreeMap<String, String> = labels
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect();

    let pv = PersistentVolume {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: (!labels.is_empty()).then_some(labels),
            ..Default::default()
        },
        spec: Some(PersistentVolumeSpec {
            storage_class_name: Some("gp3".to_string()),
            node_affinity: affinity,
            ..Default::default()
        }),
        status: None,
    };

    serde_json::to_value(&pv).expect("fixture should serialize")
}
