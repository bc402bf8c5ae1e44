//! Legacy Terraform state documents
//!
//! Entries are written into the version 1 envelope
//! (`{version, serial, modules: [{path, outputs, resources}]}`). A base
//! document supplied for merging is kept as loosely-typed JSON wherever this
//! crate does not need to look inside it, so retained entries and unknown
//! fields survive a round trip untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

use super::attributes::AttributeMap;
use super::error::{ExportError, ExportResult};

/// Envelope version written for fresh documents
pub const STATE_VERSION: u64 = 1;

/// Envelope versions that share the `modules[].resources` layout
const SUPPORTED_VERSIONS: &[u64] = &[1, 2, 3];

/// Path of the root module
const ROOT_MODULE: &str = "root";

/// One resource in the state document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEntry {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub primary: PrimaryState,
}

/// Identity and observed attributes of a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryState {
    pub id: String,
    pub attributes: AttributeMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<BTreeMap<String, String>>,
}

/// Aggregate state document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    pub version: u64,
    #[serde(default)]
    pub serial: u64,
    #[serde(default)]
    pub modules: Vec<StateModule>,
    /// Top-level fields this crate does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateModule {
    pub path: Vec<String>,
    #[serde(default)]
    pub outputs: Map<String, Value>,
    #[serde(default)]
    pub resources: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StateModule {
    fn root() -> Self {
        Self {
            path: vec![ROOT_MODULE.to_string()],
            outputs: Map::new(),
            resources: Map::new(),
            extra: Map::new(),
        }
    }
}

impl StateDocument {
    /// Empty document with a single root module and serial 0
    pub fn skeleton() -> Self {
        Self {
            version: STATE_VERSION,
            serial: 0,
            modules: vec![StateModule::root()],
            extra: Map::new(),
        }
    }

    /// Parse a base document, rejecting layouts that cannot be merged into
    pub fn from_json(content: &str) -> ExportResult<Self> {
        let document: StateDocument = serde_json::from_str(content).map_err(|e| {
            ExportError::UnsupportedState(format!("not a legacy state document: {}", e))
        })?;

        if !SUPPORTED_VERSIONS.contains(&document.version) {
            return Err(ExportError::UnsupportedState(format!(
                "state version {} is not supported (expected one of {:?})",
                document.version, SUPPORTED_VERSIONS
            )));
        }

        Ok(document)
    }

    pub fn to_json_pretty(&self) -> ExportResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Resources of the first module
    pub fn resources(&self) -> Option<&Map<String, Value>> {
        self.modules.first().map(|m| &m.resources)
    }

    #[cfg(test)]
    pub fn resource(&self, key: &str) -> Option<&Value> {
        self.resources().and_then(|r| r.get(key))
    }

    pub fn resource_count(&self) -> usize {
        self.resources().map_or(0, Map::len)
    }

    fn root_resources_mut(&mut self) -> &mut Map<String, Value> {
        if self.modules.is_empty() {
            self.modules.push(StateModule::root());
        }
        &mut self.modules[0].resources
    }
}

/// Result of folding entries into a document
#[derive(Debug, Clone)]
pub struct AssembledState {
    pub document: StateDocument,
    /// Composite keys produced by more than one record of the same pass
    pub collisions: Vec<String>,
}

/// Keys seen more than once, each listed once in order of first repeat
pub fn repeated_keys<I, K>(keys: I) -> Vec<String>
where
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut repeated: Vec<String> = Vec::new();

    for key in keys {
        let key = key.as_ref();
        if !seen.insert(key.to_string()) && !repeated.iter().any(|r| r == key) {
            repeated.push(key.to_string());
        }
    }

    repeated
}

/// Folds keyed entries into a state document
pub struct StateAssembler;

impl StateAssembler {
    /// Merge `entries` into `base`, or into a fresh skeleton
    ///
    /// Entries replace base entries with the same key. Within `entries` the
    /// last occurrence of a key wins and the key is reported as a collision.
    pub fn assemble<I>(entries: I, base: Option<StateDocument>) -> ExportResult<AssembledState>
    where
        I: IntoIterator<Item = (String, StateEntry)>,
    {
        let entries: Vec<(String, StateEntry)> = entries.into_iter().collect();
        let collisions = repeated_keys(entries.iter().map(|(key, _)| key));

        let mut document = base.unwrap_or_else(StateDocument::skeleton);
        {
            let resources = document.root_resources_mut();
            for (key, entry) in entries {
                resources.insert(key, serde_json::to_value(&entry)?);
            }
        }

        document.serial += 1;

        Ok(AssembledState {
            document,
            collisions,
        })
    }
}
