// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Manifest reading and writing for the command-line driver.
//!
//! Lets the registered actions be run against resources exported with
//! `kubectl get -o yaml` (or `-o json`) without a backup host: documents are
//! parsed, routed through the [`ActionRegistry`] by kind, and rendered back out.

use crate::action::BackupContext;
use crate::constants::{KIND_LIST, STDIN_PATH};
use crate::errors::{ManifestError, RegistryError};
use crate::registry::ActionRegistry;
use kube::core::{ApiResource, GroupVersionKind};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

/// Output encoding for processed documents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// YAML documents separated by `---`
    #[default]
    Yaml,
    /// A single JSON object, or an array when there are several documents
    Json,
}

/// Parse a manifest holding one or more YAML documents.
///
/// JSON is read through the same YAML parser, so flow-style YAML and JSON
/// both work. Empty documents are skipped, a document that is a sequence
/// yields one document per element, and documents of kind `List` are
/// replaced by their `items`.
///
/// # Errors
///
/// Returns [`ManifestError::ParseYaml`] on malformed input and
/// [`ManifestError::InvalidList`] when a `List` has non-sequence `items`.
pub fn parse_documents(input: &str) -> Result<Vec<Value>, ManifestError> {
    let mut raw = Vec::new();
    for document in serde_yaml::Deserializer::from_str(input) {
        let value =
            Value::deserialize(document).map_err(|source| ManifestError::ParseYaml { source })?;
        match value {
            Value::Null => {}
            Value::Array(elements) => raw.extend(elements),
            value => raw.push(value),
        }
    }

    let mut documents = Vec::with_capacity(raw.len());
    for document in raw {
        if document.get("kind").and_then(Value::as_str) != Some(KIND_LIST) {
            documents.push(document);
            continue;
        }

        match document.get("items") {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => documents.extend(items.iter().cloned()),
            Some(_) => return Err(ManifestError::InvalidList),
        }
    }

    Ok(documents)
}

/// Render processed documents in `format`.
///
/// # Errors
///
/// Returns [`ManifestError::RenderJson`] or [`ManifestError::RenderYaml`] if a
/// document cannot be serialized.
pub fn render_documents(documents: &[Value], format: OutputFormat) -> Result<String, ManifestError> {
    match format {
        OutputFormat::Json => {
            let rendered = match documents {
                [single] => serde_json::to_string_pretty(single),
                _ => serde_json::to_string_pretty(documents),
            }
            .map_err(|source| ManifestError::RenderJson { source })?;
            Ok(format!("{rendered}\n"))
        }
        OutputFormat::Yaml => {
            let rendered = documents
                .iter()
                .map(serde_yaml::to_string)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| ManifestError::RenderYaml { source })?;
            Ok(rendered.join("---\n"))
        }
    }
}

/// Read and parse the manifest at `path`; `-` reads standard input.
///
/// # Errors
///
/// Returns [`ManifestError::Io`] if the input cannot be read, or any error
/// from [`parse_documents`].
pub fn read_documents(path: &Path) -> Result<Vec<Value>, ManifestError> {
    let input = if path == Path::new(STDIN_PATH) {
        std::io::read_to_string(std::io::stdin())
    } else {
        std::fs::read_to_string(path)
    }
    .map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_documents(&input)
}

/// Plural resource name for an `apiVersion`/`kind` pair.
///
/// The group is everything before the `/` in `apiVersion` (core resources
/// have none); pluralization is the one `kube` uses for dynamic resources.
///
/// # Example
///
/// ```rust
/// use pv_zone_labeler::manifest::resource_for_kind;
///
/// assert_eq!(resource_for_kind("v1", "PersistentVolume"), "persistentvolumes");
/// assert_eq!(resource_for_kind("v1", "Endpoints"), "endpoints");
/// ```
#[must_use]
pub fn resource_for_kind(api_version: &str, kind: &str) -> String {
    let (group, version) = api_version.split_once('/').unwrap_or(("", api_version));
    let gvk = GroupVersionKind::gvk(group, version, kind);
    ApiResource::from_gvk(&gvk).plural
}

/// Run every document through the applicable actions in `registry`.
///
/// Documents without an `apiVersion` or `kind` are passed through untouched.
/// Additional items requested by actions are logged but not fetched.
///
/// # Errors
///
/// Returns the first [`RegistryError`]; no partial output is produced.
pub fn process_documents(
    registry: &ActionRegistry,
    documents: Vec<Value>,
    backup: &BackupContext,
) -> Result<Vec<Value>, RegistryError> {
    let mut processed = Vec::with_capacity(documents.len());

    for document in documents {
        let api_version = document.get("apiVersion").and_then(Value::as_str);
        let kind = document.get("kind").and_then(Value::as_str);
        let (Some(api_version), Some(kind)) = (api_version, kind) else {
            warn!("Skipping document without apiVersion or kind");
            processed.push(document);
            continue;
        };

        let resource = resource_for_kind(api_version, kind);
        let namespace = document
            .pointer("/metadata/namespace")
            .and_then(Value::as_str)
            .map(str::to_owned);

        let output = registry.execute(&resource, namespace.as_deref(), document, backup)?;
        for extra in &output.additional_items {
            info!(
                resource = %extra.group_resource,
                namespace = ?extra.namespace,
                name = %extra.name,
                "Action requested an additional item"
            );
        }

        processed.push(output.item);
    }

    Ok(processed)
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod manifest_tests;
