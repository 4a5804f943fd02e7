//! JSON document codec.
//!
//! Every top-level document is a JSON object tagged with `"__class__"`.
//! Lists of documents are JSON arrays of tagged objects. Decoding validates
//! the document (e.g. unique asset names in a portfolio), so anything that
//! decodes successfully is safe to store.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CodecError, CodecResult};
use crate::model::{Asset, Node, Portfolio, TimeSeries, Timegrid, Unit};

const CLASS_TAG: &str = "__class__";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__class__")]
pub enum Document {
    Node(Node),
    Unit(Unit),
    Timegrid(Timegrid),
    Asset(Asset),
    Portfolio(Portfolio),
    TimeSeries(TimeSeries),
}

impl Document {
    /// The `__class__` tag of this document.
    pub fn kind(&self) -> &'static str {
        match self {
            Document::Node(_) => Node::KIND,
            Document::Unit(_) => Unit::KIND,
            Document::Timegrid(_) => Timegrid::KIND,
            Document::Asset(_) => Asset::KIND,
            Document::Portfolio(_) => Portfolio::KIND,
            Document::TimeSeries(_) => TimeSeries::KIND,
        }
    }

    fn validate(&self) -> CodecResult<()> {
        match self {
            Document::Portfolio(p) => p.validate(),
            Document::Timegrid(t) => t.validate(),
            _ => Ok(()),
        }
    }
}

/// Conversion between a concrete model type and [`Document`].
pub trait Kind: Sized {
    const KIND: &'static str;

    fn into_document(self) -> Document;

    /// Unwraps the document, handing it back when it holds another kind.
    fn from_document(doc: Document) -> Result<Self, Document>;
}

macro_rules! document_kind {
    ($ty:ty, $variant:ident) => {
        impl Kind for $ty {
            const KIND: &'static str = stringify!($variant);

            fn into_document(self) -> Document {
                Document::$variant(self)
            }

            fn from_document(doc: Document) -> Result<Self, Document> {
                match doc {
                    Document::$variant(inner) => Ok(inner),
                    other => Err(other),
                }
            }
        }
    };
}

document_kind!(Node, Node);
document_kind!(Unit, Unit);
document_kind!(Timegrid, Timegrid);
document_kind!(Asset, Asset);
document_kind!(Portfolio, Portfolio);
document_kind!(TimeSeries, TimeSeries);

/// Decodes one tagged document from text.
pub fn decode(text: &str) -> CodecResult<Document> {
    decode_value(serde_json::from_str(text)?)
}

/// Decodes one tagged document from an already parsed JSON value.
pub fn decode_value(value: Value) -> CodecResult<Document> {
    let class = match &value {
        Value::Object(map) => match map.get(CLASS_TAG) {
            Some(Value::String(class)) => class.clone(),
            Some(_) => {
                return Err(CodecError::Malformed(format!(
                    "'{CLASS_TAG}' must be a string"
                )))
            }
            None => {
                return Err(CodecError::Malformed(format!(
                    "document has no '{CLASS_TAG}' tag"
                )))
            }
        },
        Value::Array(_) => {
            return Err(CodecError::Malformed(
                "expected a single document, found a list".to_string(),
            ))
        }
        _ => {
            return Err(CodecError::Malformed(
                "expected a JSON object".to_string(),
            ))
        }
    };

    let doc: Document = serde_json::from_value(value)
        .map_err(|e| CodecError::Malformed(format!("{class}: {e}")))?;
    doc.validate()?;
    Ok(doc)
}

/// Decodes a JSON array of tagged documents.
pub fn decode_list(text: &str) -> CodecResult<Vec<Document>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => items.into_iter().map(decode_value).collect(),
        _ => Err(CodecError::Malformed("expected a list of documents".to_string())),
    }
}

pub fn encode(doc: &Document) -> CodecResult<String> {
    Ok(serde_json::to_string(doc)?)
}

pub fn encode_list(docs: &[Document]) -> CodecResult<String> {
    Ok(serde_json::to_string(docs)?)
}

/// Decodes text and checks that it holds a `T`.
///
/// The error carries the kind that was found instead, so callers can tell
/// "unparseable" apart from "valid but the wrong kind".
pub fn decode_as<T: Kind>(text: &str) -> Result<T, KindMismatch> {
    let doc = decode(text).map_err(KindMismatch::Codec)?;
    T::from_document(doc).map_err(|other| KindMismatch::Wrong {
        expected: T::KIND,
        found: other.kind(),
    })
}

/// Decodes a list and checks every element holds a `T`.
pub fn decode_list_as<T: Kind>(text: &str) -> Result<Vec<T>, KindMismatch> {
    decode_list(text)
        .map_err(KindMismatch::Codec)?
        .into_iter()
        .map(|doc| {
            T::from_document(doc).map_err(|other| KindMismatch::Wrong {
                expected: T::KIND,
                found: other.kind(),
            })
        })
        .collect()
}

pub fn encode_list_of<T: Kind + Clone>(items: &[T]) -> CodecResult<String> {
    let docs: Vec<Document> = items.iter().cloned().map(Kind::into_document).collect();
    encode_list(&docs)
}

/// Failure of [`decode_as`].
#[derive(Debug, thiserror::Error)]
pub enum KindMismatch {
    #[error(transparent)]
    Codec(CodecError),

    #[error("expected a {expected} document, got a {found}")]
    Wrong {
        expected: &'static str,
        found: &'static str,
    },
}
