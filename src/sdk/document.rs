use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::SdkError;

/// Raw field data, in insertion order.
pub type Fields = IndexMap<String, String>;

/// A single document as handed to an index writer or returned by a searcher.
///
/// The charset is the one of the project the document was created for; backends
/// that talk to a daemon use it to transcode field values on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    charset: Option<String>,
    fields: Fields,
}

impl Document {
    pub fn new(charset: Option<&str>) -> Self {
        Self {
            charset: charset.map(str::to_owned),
            fields: Fields::new(),
        }
    }

    pub fn with_fields(fields: Fields, charset: Option<&str>) -> Self {
        Self {
            charset: charset.map(str::to_owned),
            fields,
        }
    }

    /// Build a document from a flat JSON object. Strings are taken as is,
    /// numbers and booleans are stringified, `null` fields are skipped.
    pub fn from_json(value: &Value, charset: Option<&str>) -> Result<Self, SdkError> {
        let obj = value
            .as_object()
            .ok_or_else(|| SdkError::invalid_argument("document must be a JSON object"))?;
        let mut doc = Self::new(charset);
        for (name, field) in obj {
            let text = match field {
                Value::Null => continue,
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(SdkError::invalid_argument(format!(
                        "field '{name}' must be a scalar value"
                    )))
                }
            };
            doc.set(name.clone(), text);
        }
        Ok(doc)
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}

/// What `update` / `add` accept: a ready document, or raw fields that still
/// need to be wrapped with the project's charset.
#[derive(Debug, Clone)]
pub enum DocumentData {
    Document(Document),
    Fields(Fields),
}

impl From<Document> for DocumentData {
    fn from(doc: Document) -> Self {
        DocumentData::Document(doc)
    }
}

impl From<Fields> for DocumentData {
    fn from(fields: Fields) -> Self {
        DocumentData::Fields(fields)
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for DocumentData
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        DocumentData::Fields(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K, V> From<Vec<(K, V)>> for DocumentData
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: Vec<(K, V)>) -> Self {
        DocumentData::Fields(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
