// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `zone_labeler.rs`

#[cfg(test)]
mod tests {
    use crate::action::{BackupContext, BackupItemAction};
    use crate::errors::{ConversionDirection, ConversionError};
    use crate::labels::{ZONE_LABEL, ZONE_LABEL_DEPRECATED, ZONE_TOPOLOGY_KEY};
    use crate::zone_labeler::{zone_from_labels, zone_from_node_affinity, ZoneLabeler};
    use k8s_openapi::api::core::v1::PersistentVolumeSpec;
    use serde_json::{json, Value};
    use std::collections::BTreeMap;
    use tracing::Span;

    fn backup() -> BackupContext {
        BackupContext::new("nightly", "velero")
    }

    fn zone_expression(operator: &str, values: &[&str]) -> Value {
        json!({
            "key": ZONE_TOPOLOGY_KEY,
            "operator": operator,
            "values": values,
        })
    }

    fn affinity(terms: Value) -> Value {
        json!({ "required": { "nodeSelectorTerms": terms } })
    }

    fn create_test_pv(labels: Option<Value>, node_affinity: Option<Value>) -> Value {
        let mut pv = json!({
            "apiVersion": "v1",
            "kind": "PersistentVolume",
            "metadata": { "name": "pvc-0f1e2d3c" },
            "spec": {
                "capacity": { "storage": "10Gi" },
                "accessModes": ["ReadWriteOnce"],
                "persistentVolumeReclaimPolicy": "Delete",
                "storageClassName": "gp3",
                "csi": {
                    "driver": "ebs.csi.aws.com",
                    "volumeHandle": "vol-0123456789abcdef0",
                    "fsType": "ext4"
                }
            }
        });

        if let Some(labels) = labels {
            pv["metadata"]["labels"] = labels;
        }
        if let Some(node_affinity) = node_affinity {
            pv["spec"]["nodeAffinity"] = node_affinity;
        }
        pv
    }

    fn execute(item: Value) -> Result<Value, ConversionError> {
        let output = ZoneLabeler::with_span(Span::none()).execute(item, &backup())?;
        assert!(
            output.additional_items.is_empty(),
            "zone labeler must never request additional items"
        );
        Ok(output.item)
    }

    fn spec_from(node_affinity: Value) -> PersistentVolumeSpec {
        serde_json::from_value(json!({ "nodeAffinity": node_affinity }))
            .expect("test node affinity should decode")
    }

    // ------------------------------------------------------------------------
    // Existing labels
    // ------------------------------------------------------------------------

    #[test]
    fn test_existing_canonical_label_is_kept() {
        let pv = create_test_pv(
            Some(json!({ ZONE_LABEL: "us-east-1a", "app": "db" })),
            Some(affinity(json!([{
                "matchExpressions": [zone_expression("In", &["us-east-1c"])]
            }]))),
        );

        let result = execute(pv.clone()).unwrap();

        // Existing label wins even though node affinity points elsewhere
        assert_eq!(result, pv);
    }

    #[test]
    fn test_existing_deprecated_label_is_kept() {
        let pv = create_test_pv(
            Some(json!({ ZONE_LABEL_DEPRECATED: "us-east-1b" })),
            Some(affinity(json!([{
                "matchExpressions": [zone_expression("In", &["us-east-1c"])]
            }]))),
        );

        let result = execute(pv.clone()).unwrap();

        assert_eq!(result, pv);
        assert!(result["metadata"]["labels"].get(ZONE_LABEL).is_none());
    }

    #[test]
    fn test_processing_is_idempotent() {
        let pv = create_test_pv(
            None,
            Some(affinity(json!([{
                "matchExpressions": [zone_expression("In", &["us-west-2a"])]
            }]))),
        );

        let first = execute(pv).unwrap();
        let second = execute(first.clone()).unwrap();

        assert_eq!(first, second);
    }

    /// An empty canonical label falls back to the deprecated one for the check
    /// only. The deprecated value is not copied over and the canonical label
    /// stays empty, even when node affinity could supply a zone.
    #[test]
    fn test_empty_canonical_label_with_deprecated_label_is_left_empty() {
        let pv = create_test_pv(
            Some(json!({ ZONE_LABEL: "", ZONE_LABEL_DEPRECATED: "us-east-1d" })),
            Some(affinity(json!([{
                "matchExpressions": [zone_expression("In", &["us-west-2b"])]
            }]))),
        );

        let result = execute(pv.clone()).unwrap();

        assert_eq!(result, pv);
        assert_eq!(result["metadata"]["labels"][ZONE_LABEL], "");
        assert_eq!(result["metadata"]["labels"][ZONE_LABEL_DEPRECATED], "us-east-1d");
    }

    #[test]
    fn test_empty_canonical_label_is_overwritten_by_derived_zone() {
        let pv = create_test_pv(
            Some(json!({ ZONE_LABEL: "" })),
            Some(affinity(json!([{
                "matchExpressions": [zone_expression("In", &["us-west-2b"])]
            }]))),
        );

        let result = execute(pv).unwrap();

        assert_eq!(result["metadata"]["labels"][ZONE_LABEL], "us-west-2b");
    }

    #[test]
    fn test_empty_labels_on_both_keys_derive_zone() {
        let pv = create_test_pv(
            Some(json!({ ZONE_LABEL: "", ZONE_LABEL_DEPRECATED: "" })),
            Some(affinity(json!([{
                "matchExpressions": [zone_expression("In", &["ap-south-1a"])]
            }]))),
        );

        let result = execute(pv).unwrap();

        assert_eq!(result["metadata"]["labels"][ZONE_LABEL], "ap-south-1a");
        assert_eq!(result["metadata"]["labels"][ZONE_LABEL_DEPRECATED], "");
    }

    // ------------------------------------------------------------------------
    // Derivation
    // ------------------------------------------------------------------------

    #[test]
    fn test_zone_derived_from_first_value_of_matching_expression() {
        let pv = create_test_pv(
            None,
            Some(affinity(json!([{
                "matchExpressions": [zone_expression("In", &["us-west-2b", "us-west-2c"])]
            }]))),
        );

        let result = execute(pv.clone()).unwrap();

        let mut expected = pv;
        expected["metadata"]["labels"] = json!({ ZONE_LABEL: "us-west-2b" });
        assert_eq!(result, expected);
    }

    #[test]
    fn test_derived_zone_leaves_other_labels_untouched() {
        let pv = create_test_pv(
            Some(json!({ "app": "postgres", "team": "storage" })),
            Some(affinity(json!([{
                "matchExpressions": [zone_expression("In", &["eu-central-1a"])]
            }]))),
        );

        let result = execute(pv.clone()).unwrap();

        assert_eq!(
            result["metadata"]["labels"],
            json!({
                "app": "postgres",
                "team": "storage",
                ZONE_LABEL: "eu-central-1a"
            })
        );
        assert_eq!(result["spec"], pv["spec"]);
    }

    #[test]
    fn test_second_term_used_when_first_has_no_match() {
        let pv = create_test_pv(
            None,
            Some(affinity(json!([
                {
                    "matchExpressions": [
                        { "key": "kubernetes.io/hostname", "operator": "In", "values": ["node-a"] }
                    ]
                },
                {
                    "matchExpressions": [
                        { "key": "kubernetes.io/arch", "operator": "In", "values": ["arm64"] },
                        zone_expression("In", &["us-east-2c"]),
                        zone_expression("In", &["us-east-2a"])
                    ]
                }
            ]))),
        );

        let result = execute(pv).unwrap();

        assert_eq!(result["metadata"]["labels"][ZONE_LABEL], "us-east-2c");
    }

    #[test]
    fn test_terms_without_match_expressions_are_skipped() {
        let pv = create_test_pv(
            None,
            Some(affinity(json!([
                { "matchFields": [{ "key": "metadata.name", "operator": "In", "values": ["node-a"] }] },
                { "matchExpressions": [zone_expression("In", &["sa-east-1a"])] }
            ]))),
        );

        let result = execute(pv).unwrap();

        assert_eq!(result["metadata"]["labels"][ZONE_LABEL], "sa-east-1a");
    }

    // ------------------------------------------------------------------------
    // No-match no-ops
    // ------------------------------------------------------------------------

    #[test]
    fn test_different_key_is_noop() {
        let pv = create_test_pv(
            None,
            Some(affinity(json!([{
                "matchExpressions": [{
                    "key": "topology.kubernetes.io/zone",
                    "operator": "In",
                    "values": ["us-west-2b"]
                }]
            }]))),
        );

        assert_eq!(execute(pv.clone()).unwrap(), pv);
    }

    #[test]
    fn test_not_in_operator_is_noop() {
        let pv = create_test_pv(
            None,
            Some(affinity(json!([{
                "matchExpressions": [zone_expression("NotIn", &["us-west-2b"])]
            }]))),
        );

        assert_eq!(execute(pv.clone()).unwrap(), pv);
    }

    #[test]
    fn test_empty_values_is_noop() {
        let pv = create_test_pv(
            None,
            Some(affinity(json!([{
                "matchExpressions": [{ "key": ZONE_TOPOLOGY_KEY, "operator": "Exists" }]
            }]))),
        );

        assert_eq!(execute(pv.clone()).unwrap(), pv);
    }

    #[test]
    fn test_missing_node_affinity_is_noop() {
        let pv = create_test_pv(Some(json!({ "app": "db" })), None);

        assert_eq!(execute(pv.clone()).unwrap(), pv);
    }

    #[test]
    fn test_empty_node_affinity_is_noop() {
        let pv = create_test_pv(None, Some(json!({})));

        assert_eq!(execute(pv.clone()).unwrap(), pv);
    }

    #[test]
    fn test_empty_terms_is_noop() {
        let pv = create_test_pv(None, Some(affinity(json!([]))));

        assert_eq!(execute(pv.clone()).unwrap(), pv);
    }

    #[test]
    fn test_noop_preserves_fields_unknown_to_typed_model() {
        let mut pv = create_test_pv(None, None);
        pv["status"] = json!({ "phase": "Bound" });
        pv["metadata"]["annotations"] = json!({ "pv.kubernetes.io/provisioned-by": "ebs.csi.aws.com" });
        pv["x-backup-note"] = json!("kept verbatim");

        assert_eq!(execute(pv.clone()).unwrap(), pv);
    }

    #[test]
    fn test_pv_without_spec_is_noop() {
        let pv = json!({
            "apiVersion": "v1",
            "kind": "PersistentVolume",
            "metadata": { "name": "bare" }
        });

        assert_eq!(execute(pv.clone()).unwrap(), pv);
    }

    // ------------------------------------------------------------------------
    // Conversion failures
    // ------------------------------------------------------------------------

    #[test]
    fn test_missing_kind_is_decode_error() {
        let pv = json!({
            "apiVersion": "v1",
            "metadata": { "name": "pv-1" }
        });

        let err = execute(pv).unwrap_err();

        assert!(matches!(err, ConversionError::MissingTypeMeta { .. }));
        assert_eq!(err.direction(), ConversionDirection::Decode);
    }

    #[test]
    fn test_non_object_document_is_decode_error() {
        let err = execute(json!(["not", "a", "resource"])).unwrap_err();

        assert!(matches!(err, ConversionError::MissingTypeMeta { .. }));
    }

    #[test]
    fn test_other_kind_is_decode_error() {
        let pod = json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": { "name": "web-0" }
        });

        let err = execute(pod).unwrap_err();

        match err {
            ConversionError::UnexpectedKind { api_version, kind } => {
                assert_eq!(api_version, "v1");
                assert_eq!(kind, "Pod");
            }
            other => panic!("expected UnexpectedKind, got {other:?}"),
        }
    }

    #[test]
    fn test_mistyped_labels_is_decode_error() {
        let pv = create_test_pv(Some(json!(["topology.kubernetes.io/zone"])), None);

        let err = execute(pv).unwrap_err();

        assert!(matches!(err, ConversionError::Decode { .. }));
        assert!(err.to_string().starts_with("unable to convert unstructured to pv"));
    }

    #[test]
    fn test_mistyped_node_selector_terms_is_decode_error() {
        let pv = create_test_pv(None, Some(affinity(json!("us-west-2b"))));

        let err = execute(pv).unwrap_err();

        assert!(matches!(err, ConversionError::Decode { .. }));
    }

    // ------------------------------------------------------------------------
    // Selector
    // ------------------------------------------------------------------------

    #[test]
    fn test_applies_to_persistent_volumes_only() {
        let selector = ZoneLabeler::new().applies_to();

        assert_eq!(selector.included_resources, vec!["persistentvolumes"]);
        assert!(selector.matches("persistentvolumes", None));
        assert!(!selector.matches("persistentvolumeclaims", Some("default")));
        assert!(!selector.matches("pods", Some("default")));
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    #[test]
    fn test_zone_from_labels_precedence() {
        let canonical = BTreeMap::from([
            (ZONE_LABEL.to_string(), "a".to_string()),
            (ZONE_LABEL_DEPRECATED.to_string(), "b".to_string()),
        ]);
        assert_eq!(zone_from_labels(&canonical), Some("a"));

        let deprecated_only = BTreeMap::from([(ZONE_LABEL_DEPRECATED.to_string(), "b".to_string())]);
        assert_eq!(zone_from_labels(&deprecated_only), Some("b"));

        let empty_canonical = BTreeMap::from([
            (ZONE_LABEL.to_string(), String::new()),
            (ZONE_LABEL_DEPRECATED.to_string(), "b".to_string()),
        ]);
        assert_eq!(zone_from_labels(&empty_canonical), Some("b"));

        let both_empty = BTreeMap::from([
            (ZONE_LABEL.to_string(), String::new()),
            (ZONE_LABEL_DEPRECATED.to_string(), String::new()),
        ]);
        assert_eq!(zone_from_labels(&both_empty), None);

        assert_eq!(zone_from_labels(&BTreeMap::new()), None);
    }

    #[test]
    fn test_zone_from_node_affinity_stops_at_first_match() {
        let spec = spec_from(affinity(json!([
            { "matchExpressions": [zone_expression("In", &["", "us-west-1b"])] },
            { "matchExpressions": [zone_expression("In", &["us-west-1c"])] }
        ])));

        // The first match has an empty first value, so no zone is derived
        assert_eq!(zone_from_node_affinity(&spec), None);
    }

    #[test]
    fn test_zone_from_node_affinity_skips_non_matching_expressions() {
        let spec = spec_from(affinity(json!([{
            "matchExpressions": [
                zone_expression("NotIn", &["us-west-1a"]),
                zone_expression("In", &[]),
                zone_expression("In", &["us-west-1b"])
            ]
        }])));

        assert_eq!(zone_from_node_affinity(&spec), Some("us-west-1b"));
    }

    #[test]
    fn test_zone_from_node_affinity_without_affinity() {
        assert_eq!(zone_from_node_affinity(&PersistentVolumeSpec::default()), None);
    }
}
