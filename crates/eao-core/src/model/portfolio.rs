use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::asset::Asset;
use super::node::{Node, NodeRef};
use crate::error::{CodecError, CodecResult};

/// Ordered collection of uniquely named assets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Portfolio {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self { assets }
    }

    pub fn asset_names(&self) -> Vec<String> {
        self.assets.iter().map(|a| a.name().to_string()).collect()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.assets.iter().position(|a| a.name() == name)
    }

    pub fn asset(&self, name: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.name() == name)
    }

    /// Nodes referenced by the assets, deduplicated by name in order of
    /// first reference.
    pub fn nodes(&self) -> Vec<Node> {
        let mut seen = HashSet::new();
        self.assets
            .iter()
            .flat_map(|a| a.nodes().iter().filter_map(NodeRef::as_node))
            .filter(|n| seen.insert(n.name.clone()))
            .cloned()
            .collect()
    }

    pub(crate) fn validate(&self) -> CodecResult<()> {
        let mut names = HashSet::new();
        for asset in &self.assets {
            if !names.insert(asset.name()) {
                return Err(CodecError::Invalid(format!(
                    "duplicate asset name '{}' in portfolio",
                    asset.name()
                )));
            }
            if asset.nodes().is_empty() {
                return Err(CodecError::Invalid(format!(
                    "asset '{}' has no nodes",
                    asset.name()
                )));
            }
            if let Some(entry) = asset.nodes().iter().find(|n| !n.is_concrete()) {
                let what = match entry {
                    NodeRef::Name(name) => format!("unresolved node reference '{name}'"),
                    _ => "a malformed node entry".to_string(),
                };
                return Err(CodecError::Invalid(format!(
                    "asset '{}' has {what}; resolve node names before adding it to a portfolio",
                    asset.name()
                )));
            }
        }
        Ok(())
    }
}
