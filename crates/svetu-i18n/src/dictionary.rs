//! Nested message dictionaries and their merge rules.

use crate::error::{I18nError, I18nResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Tree of translation messages: object nodes map keys to nested nodes or
/// to string leaves. Leaves may carry ICU placeholders such as `{count}`.
///
/// Keys are addressed with dotted paths (`common.save`), so a key segment
/// never contains a dot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct MessageDictionary {
    root: Map<String, Value>,
}

impl MessageDictionary {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a bundle from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`I18nError::InvalidBundle`] for malformed JSON, a non-object
    /// root, or values that are neither strings nor objects.
    pub fn from_json_str(text: &str) -> I18nResult<Self> {
        let value: Value = serde_json::from_str(text).map_err(|e| I18nError::InvalidBundle {
            reason: e.to_string(),
        })?;
        Self::from_value(value)
    }

    /// Wraps an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// Same shape rules as [`MessageDictionary::from_json_str`].
    pub fn from_value(value: Value) -> I18nResult<Self> {
        match value {
            Value::Object(root) => {
                validate_node(&root, "")?;
                Ok(Self { root })
            }
            other => Err(I18nError::InvalidBundle {
                reason: format!("bundle root must be an object, found {}", kind(&other)),
            }),
        }
    }

    /// Merges `other` into `self`. Objects merge recursively; on any other
    /// collision the value from `other` wins.
    pub fn merge(&mut self, other: &Self) {
        merge_maps(&mut self.root, other.root.clone());
    }

    /// Merges dictionaries in iteration order; later ones win on collisions.
    pub fn merged<'a>(dictionaries: impl IntoIterator<Item = &'a Self>) -> Self {
        let mut result = Self::new();
        for dictionary in dictionaries {
            result.merge(dictionary);
        }
        result
    }

    /// Looks up a node by dotted path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut node = self.root.get(segments.next()?)?;
        for segment in segments {
            node = node.as_object()?.get(segment)?;
        }
        Some(node)
    }

    /// Looks up a message leaf by dotted path.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Whether a node exists at the dotted path.
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Top-level keys, in document order.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.root.keys().map(String::as_str)
    }

    /// Every leaf as a dotted path mapped to its message.
    pub fn flatten(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        flatten_into(&self.root, "", &mut out);
        out
    }

    /// Sorted dotted paths of every leaf.
    pub fn key_paths(&self) -> Vec<String> {
        self.flatten().into_keys().collect()
    }

    /// Number of message leaves.
    pub fn leaf_count(&self) -> usize {
        count_leaves(&self.root)
    }

    /// Whether the dictionary has no keys at all.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Borrow the underlying JSON object.
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.root
    }

    /// Pretty JSON rendering with a trailing newline.
    ///
    /// # Errors
    ///
    /// Only fails if serialization itself fails.
    pub fn to_json_pretty(&self) -> I18nResult<String> {
        let mut text =
            serde_json::to_string_pretty(&self.root).map_err(|e| I18nError::InvalidBundle {
                reason: e.to_string(),
            })?;
        text.push('\n');
        Ok(text)
    }
}

impl TryFrom<Value> for MessageDictionary {
    type Error = I18nError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<MessageDictionary> for Value {
    fn from(dictionary: MessageDictionary) -> Self {
        Self::Object(dictionary.root)
    }
}

/// Recursive last-writer-wins merge of owned values.
pub(crate) fn merge_maps(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, incoming) in source {
        match (target.get_mut(&key), incoming) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_maps(existing, incoming);
            }
            (_, incoming) => {
                target.insert(key, incoming);
            }
        }
    }
}

fn validate_node(map: &Map<String, Value>, prefix: &str) -> I18nResult<()> {
    for (key, value) in map {
        let path = join(prefix, key);
        if key.is_empty() || key.contains('.') {
            return Err(I18nError::InvalidBundle {
                reason: format!("invalid key '{path}': keys must be non-empty and contain no '.'"),
            });
        }
        match value {
            Value::String(_) => {}
            Value::Object(child) => validate_node(child, &path)?,
            other => {
                return Err(I18nError::InvalidBundle {
                    reason: format!("'{path}' must be a string or an object, found {}", kind(other)),
                })
            }
        }
    }
    Ok(())
}

fn flatten_into(map: &Map<String, Value>, prefix: &str, out: &mut BTreeMap<String, String>) {
    for (key, value) in map {
        let path = join(prefix, key);
        match value {
            Value::Object(child) => flatten_into(child, &path, out),
            Value::String(message) => {
                out.insert(path, message.clone());
            }
            _ => {}
        }
    }
}

fn count_leaves(map: &Map<String, Value>) -> usize {
    map.values()
        .map(|value| match value {
            Value::Object(child) => count_leaves(child),
            _ => 1,
        })
        .sum()
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
