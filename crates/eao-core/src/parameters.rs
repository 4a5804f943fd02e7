//! Generic walker over the encoded form of a document.
//!
//! [`ParameterTree::read`] flattens a document into its parameter map and the
//! list of addressable leaf paths; [`ParameterTree::write`] replaces the value
//! at one existing path and re-validates the result as a document.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::codec::{self, Document};
use crate::error::{CodecResult, PathError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(i) => write!(f, "{i}"),
            PathSegment::Key(k) => f.write_str(k),
        }
    }
}

/// Address of a parameter: a single top-level key or a list of segments,
/// e.g. `"cap_in"` or `["assets", 1, "start"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterPath {
    Key(String),
    Segments(Vec<PathSegment>),
}

impl ParameterPath {
    pub fn segments(&self) -> Vec<PathSegment> {
        match self {
            ParameterPath::Key(k) => vec![PathSegment::Key(k.clone())],
            ParameterPath::Segments(s) => s.clone(),
        }
    }
}

impl fmt::Display for ParameterPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(&self.segments()))
    }
}

fn render(segments: &[PathSegment]) -> String {
    segments
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Debug, Clone, Serialize)]
pub struct ParameterDetails {
    /// The document's full parameter map.
    pub parameters: Value,
    /// Every editable leaf, as a path into `parameters`.
    pub parameter_tree: Vec<Vec<PathSegment>>,
}

pub struct ParameterTree;

impl ParameterTree {
    pub fn read(doc: &Document) -> CodecResult<ParameterDetails> {
        let parameters = serde_json::to_value(doc)?;
        let mut parameter_tree = Vec::new();
        collect_leaves(&parameters, &mut Vec::new(), &mut parameter_tree);
        Ok(ParameterDetails {
            parameters,
            parameter_tree,
        })
    }

    pub fn write(doc: &Document, path: &ParameterPath, value: Value) -> Result<Document, PathError> {
        let segments = path.segments();
        let Some(first) = segments.first() else {
            return Err(PathError::Empty);
        };
        if matches!(first, PathSegment::Key(k) if k == "__class__") {
            return Err(PathError::Protected(path.to_string()));
        }

        let mut encoded = serde_json::to_value(doc).map_err(|e| PathError::Rejected {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        let mut cursor = &mut encoded;
        for (depth, segment) in segments.iter().enumerate() {
            let next = match (segment, cursor) {
                (PathSegment::Key(k), Value::Object(map)) => map.get_mut(k),
                (PathSegment::Index(i), Value::Array(items)) => items.get_mut(*i),
                _ => None,
            };
            cursor = next.ok_or_else(|| PathError::Missing(render(&segments[..=depth])))?;
        }
        *cursor = value;

        codec::decode_value(encoded).map_err(|e| PathError::Rejected {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

fn collect_leaves(value: &Value, prefix: &mut Vec<PathSegment>, out: &mut Vec<Vec<PathSegment>>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                if prefix.is_empty() && key == "__class__" {
                    continue;
                }
                prefix.push(PathSegment::Key(key.clone()));
                collect_leaves(child, prefix, out);
                prefix.pop();
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (i, child) in items.iter().enumerate() {
                prefix.push(PathSegment::Index(i));
                collect_leaves(child, prefix, out);
                prefix.pop();
            }
        }
        _ => out.push(prefix.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Asset, AssetBase, Node, Storage};
    use serde_json::json;

    fn battery() -> Document {
        Document::Asset(Asset::Storage(Storage {
            base: AssetBase::new("battery", vec![Node::new("node_power").into()]),
            size: 4.0,
            cap_in: 1.0,
            cap_out: 1.0,
            start_level: 0.0,
            end_level: 0.0,
            eff_in: 0.9,
            eff_out: 1.0,
            block_size: Some("d".into()),
            no_simult_in_out: false,
            price: None,
        }))
    }

    #[test]
    fn read_lists_leaves_but_not_the_class_tag() {
        let details = ParameterTree::read(&battery()).unwrap();
        assert_eq!(details.parameters["cap_in"], json!(1.0));
        let tree = &details.parameter_tree;
        assert!(tree.contains(&vec![PathSegment::Key("cap_in".into())]));
        assert!(tree.contains(&vec![
            PathSegment::Key("nodes".into()),
            PathSegment::Index(0),
            PathSegment::Key("unit".into()),
            PathSegment::Key("factor".into()),
        ]));
        assert!(!tree.contains(&vec![PathSegment::Key("__class__".into())]));
    }

    #[test]
    fn write_replaces_an_existing_leaf() {
        let path: ParameterPath = serde_json::from_value(json!("cap_in")).unwrap();
        let updated = ParameterTree::write(&battery(), &path, json!(2)).unwrap();
        match updated {
            Document::Asset(Asset::Storage(s)) => assert_eq!(s.cap_in, 2.0),
            other => panic!("unexpected {other:?}"),
        }

        let nested: ParameterPath =
            serde_json::from_value(json!(["nodes", 0, "name"])).unwrap();
        let renamed = ParameterTree::write(&battery(), &nested, json!("node_heat")).unwrap();
        let Document::Asset(asset) = renamed else { panic!("not an asset") };
        assert_eq!(asset.nodes()[0].as_node().unwrap().name, "node_heat");
    }

    #[test]
    fn write_rejects_unknown_paths_and_bad_values() {
        let missing = ParameterPath::Segments(vec![
            PathSegment::Key("nodes".into()),
            PathSegment::Index(3),
        ]);
        assert_eq!(
            ParameterTree::write(&battery(), &missing, json!(1)),
            Err(PathError::Missing("nodes/3".into()))
        );

        let cap = ParameterPath::Key("cap_in".into());
        assert!(matches!(
            ParameterTree::write(&battery(), &cap, json!("lots")),
            Err(PathError::Rejected { .. })
        ));

        let class = ParameterPath::Key("__class__".into());
        assert!(matches!(
            ParameterTree::write(&battery(), &class, json!("Node")),
            Err(PathError::Protected(_))
        ));
        assert_eq!(
            ParameterTree::write(&battery(), &ParameterPath::Segments(vec![]), json!(1)),
            Err(PathError::Empty)
        );
    }
}
