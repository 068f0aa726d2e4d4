//! JSON file store
//!
//! Persists groups and subjects as a single JSON document:
//!
//! ```json
//! {
//!   "groups": [
//!     { "id": "mod", "weight": 10, "permission": { "grant": ["chat.mute"] } }
//!   ],
//!   "subjects": {
//!     "alice": { "groups": ["mod"], "overwrites": { "revoke": ["chat.mute"] } }
//!   }
//! }
//! ```
//!
//! A missing or empty file opens as an empty store. Group ids must be unique
//! within the document. Unknown keys are rejected unless
//! [`StoreOptions::allow_unknown`] is set.

use crate::error::{ProviderError, ProviderResult};
use crate::model::{FlagEntry, Group, RawList};
use crate::provider::memory::{MemoryProvider, StoreData};
use crate::provider::{GroupProvider, Provider};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default indentation used when saving
pub const DEFAULT_INDENT: &str = "\t";

/// Options for a JSON store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Reject every mutation and save
    pub read_only: bool,
    /// Indentation used when saving
    pub indent: String,
    /// Accept documents containing keys the store does not know
    pub allow_unknown: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            read_only: false,
            indent: DEFAULT_INDENT.to_string(),
            allow_unknown: false,
        }
    }
}

impl StoreOptions {
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Default::default()
        }
    }
}

/// On-disk document layout
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoreDocument {
    groups: Vec<Group>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    subjects: BTreeMap<String, RawList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_subject: Option<RawList>,
}

impl StoreDocument {
    fn parse(content: &str, allow_unknown: bool) -> ProviderResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut unknown = Vec::new();
        let mut deserializer = serde_json::Deserializer::from_str(content);
        let document: StoreDocument = serde_ignored::deserialize(&mut deserializer, |path| {
            unknown.push(path.to_string())
        })?;
        deserializer.end()?;

        if !unknown.is_empty() {
            if !allow_unknown {
                return Err(ProviderError::UnknownFields { paths: unknown });
            }
            debug!(fields = ?unknown, "Ignoring unknown store fields");
        }

        document.check_duplicates()?;
        Ok(document)
    }

    fn check_duplicates(&self) -> ProviderResult<()> {
        let mut seen = HashSet::with_capacity(self.groups.len());
        for group in &self.groups {
            if !seen.insert(group.id.as_str()) {
                return Err(ProviderError::DuplicateGroup {
                    id: group.id.clone(),
                });
            }
        }
        Ok(())
    }

    fn into_data(self) -> StoreData {
        StoreData {
            groups: self
                .groups
                .into_iter()
                .map(|g| (g.id.clone(), g))
                .collect(),
            subjects: self.subjects,
            default_subject: self.default_subject,
        }
    }

    fn from_data(data: StoreData) -> Self {
        Self {
            groups: data.groups.into_values().collect(),
            subjects: data.subjects,
            default_subject: data.default_subject,
        }
    }
}

/// Provider backed by a JSON document
#[derive(Debug)]
pub struct JsonStore {
    memory: MemoryProvider,
    path: Option<PathBuf>,
    options: StoreOptions,
}

impl JsonStore {
    /// Open a store backed by `path`
    pub fn open(path: impl AsRef<Path>, options: StoreOptions) -> ProviderResult<Self> {
        let path = path.as_ref().to_path_buf();
        let document = match fs::read_to_string(&path) {
            Ok(content) => StoreDocument::parse(&content, options.allow_unknown)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Store file missing, starting empty");
                StoreDocument::default()
            }
            Err(e) => return Err(e.into()),
        };

        let store = Self::from_document(document, Some(path), options);
        info!(
            path = ?store.path,
            groups = store.memory.len(),
            read_only = store.options.read_only,
            "Opened JSON store"
        );
        Ok(store)
    }

    /// Build a store from a JSON string, without a backing file
    pub fn from_json_str(json: &str, options: StoreOptions) -> ProviderResult<Self> {
        let document = StoreDocument::parse(json, options.allow_unknown)?;
        Ok(Self::from_document(document, None, options))
    }

    fn from_document(
        document: StoreDocument,
        path: Option<PathBuf>,
        options: StoreOptions,
    ) -> Self {
        let memory = MemoryProvider::new();
        memory.replace(document.into_data());
        Self {
            memory,
            path,
            options,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_read_only(&self) -> bool {
        self.options.read_only
    }

    /// Serialize the current state with the configured indentation
    pub fn to_json(&self) -> ProviderResult<String> {
        let document = StoreDocument::from_data(self.memory.snapshot());
        let mut buf = Vec::new();
        let formatter =
            serde_json::ser::PrettyFormatter::with_indent(self.options.indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        document.serialize(&mut serializer)?;
        String::from_utf8(buf).map_err(|e| ProviderError::Storage(e.to_string()))
    }

    /// Write the current state to the backing file, replacing its contents
    pub fn save(&self) -> ProviderResult<()> {
        self.ensure_writable()?;
        let path = self.backing_file()?;
        let mut json = self.to_json()?;
        json.push('\n');
        fs::write(path, json)?;
        debug!(path = %path.display(), "Saved JSON store");
        Ok(())
    }

    /// Re-read the backing file; on failure the current state is kept
    pub fn reload(&self) -> ProviderResult<()> {
        let path = self.backing_file()?;
        let content = fs::read_to_string(path)?;
        let document = StoreDocument::parse(&content, self.options.allow_unknown)?;
        self.memory.replace(document.into_data());
        debug!(path = %path.display(), "Reloaded JSON store");
        Ok(())
    }

    pub fn set_group(&self, group: Group) -> ProviderResult<()> {
        self.ensure_writable()?;
        self.memory.set_group(group);
        Ok(())
    }

    pub fn remove_group(&self, id: &str) -> ProviderResult<Group> {
        self.ensure_writable()?;
        self.memory.remove_group(id)
    }

    pub fn set_flag(&self, group_id: &str, flag_id: &str, flag: FlagEntry) -> ProviderResult<()> {
        self.ensure_writable()?;
        self.memory.set_flag(group_id, flag_id, flag)
    }

    pub fn remove_flag(&self, group_id: &str, flag_id: &str) -> ProviderResult<Option<FlagEntry>> {
        self.ensure_writable()?;
        self.memory.remove_flag(group_id, flag_id)
    }

    pub fn set_raw_list(&self, subject_id: impl Into<String>, raw: RawList) -> ProviderResult<()> {
        self.ensure_writable()?;
        self.memory.set_raw_list(subject_id, raw);
        Ok(())
    }

    pub fn remove_raw_list(&self, subject_id: &str) -> ProviderResult<Option<RawList>> {
        self.ensure_writable()?;
        Ok(self.memory.remove_raw_list(subject_id))
    }

    pub fn set_default_raw_list(&self, raw: Option<RawList>) -> ProviderResult<()> {
        self.ensure_writable()?;
        self.memory.set_default_raw_list(raw);
        Ok(())
    }

    /// All groups, ordered by id
    pub fn groups(&self) -> Vec<Group> {
        self.memory.groups()
    }

    pub fn flags(&self, group_id: &str) -> ProviderResult<BTreeMap<String, FlagEntry>> {
        self.memory.flags(group_id)
    }

    pub fn subjects(&self) -> Vec<String> {
        self.memory.subjects()
    }

    fn ensure_writable(&self) -> ProviderResult<()> {
        if self.options.read_only {
            return Err(ProviderError::ReadOnly);
        }
        Ok(())
    }

    fn backing_file(&self) -> ProviderResult<&Path> {
        self.path
            .as_deref()
            .ok_or_else(|| ProviderError::Storage("store has no backing file".to_string()))
    }
}

impl GroupProvider for JsonStore {
    fn group(&self, id: &str) -> ProviderResult<Group> {
        self.memory.group(id)
    }

    fn flag(&self, group_id: &str, flag_id: &str) -> ProviderResult<Option<FlagEntry>> {
        self.memory.flag(group_id, flag_id)
    }
}

impl Provider for JsonStore {
    fn raw_list(&self, subject_id: &str) -> ProviderResult<RawList> {
        self.memory.raw_list(subject_id)
    }

    fn version(&self) -> u64 {
        self.memory.version()
    }
}
