use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured data attached to a completed transcript.
///
/// Engines report whatever they know; `duration`, `language` and `confidence`
/// are the well-known keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranscriptMetadata(Map<String, Value>);

impl TranscriptMetadata {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Returns `None` unless `value` is a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn duration(&self) -> Option<f64> {
        self.0.get("duration").and_then(Value::as_f64)
    }

    pub fn language(&self) -> Option<&str> {
        self.0.get("language").and_then(Value::as_str)
    }

    pub fn confidence(&self) -> Option<f64> {
        self.0.get("confidence").and_then(Value::as_f64)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for TranscriptMetadata {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// What a transcription engine hands back for one media asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub text: String,
    pub metadata: TranscriptMetadata,
}

impl Transcript {
    pub fn new(text: impl Into<String>, metadata: TranscriptMetadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }
}
