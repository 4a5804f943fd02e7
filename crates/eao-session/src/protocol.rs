//! Edit operations on the session store.
//!
//! Each operation decodes its input, checks the document kind, applies the
//! edit to a decoded copy of the stored value and writes the re-encoded
//! result back. Nothing is written when any step fails.

use eao_core::codec::{self, Kind};
use eao_core::{
    Asset, Document, Node, ParameterPath, ParameterTree, Portfolio, TimeSeries, TimeSeriesPayload,
    Timegrid,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::error::{Result, SessionError};
use crate::resolver::{self, NodeRegistry};
use crate::session::Session;
use crate::store::StoreKey;

/// Outcome of a delete-by-name; deleting something absent is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub found: bool,
    pub message: String,
}

impl Session {
    pub fn set_portfolio(&self, text: &str) -> Result<()> {
        let portfolio = codec::decode_as::<Portfolio>(text)?;
        self.store_portfolio(&portfolio)?;
        info!("Portfolio set with {} assets", portfolio.assets.len());
        Ok(())
    }

    /// Prepends `text`'s node to the standard nodes, replacing any node of the same name.
    pub fn add_node(&self, text: &str) -> Result<String> {
        let node = codec::decode_as::<Node>(text)?;
        let mut nodes = self.store.list_or_empty::<Node>(StoreKey::StdNodes)?;

        let before = nodes.len();
        nodes.retain(|n| n.name != node.name);
        let replaced = nodes.len() != before;
        let name = node.name.clone();
        nodes.insert(0, node);

        self.store
            .put(StoreKey::StdNodes, &codec::encode_list_of(&nodes)?)?;

        let message = if replaced {
            format!("Replaced standard node '{name}'")
        } else {
            format!("Added standard node '{name}'")
        };
        info!("{}", message);
        Ok(message)
    }

    pub fn delete_node(&self, name: &str) -> Result<DeleteOutcome> {
        let mut nodes = self.store.list_or_empty::<Node>(StoreKey::StdNodes)?;
        let before = nodes.len();
        nodes.retain(|n| n.name != name);

        if nodes.len() == before {
            return Ok(DeleteOutcome {
                found: false,
                message: format!("Standard node '{name}' not found, nothing deleted"),
            });
        }

        self.store
            .put(StoreKey::StdNodes, &codec::encode_list_of(&nodes)?)?;
        info!("Deleted standard node '{}'", name);
        Ok(DeleteOutcome {
            found: true,
            message: format!("Deleted standard node '{name}'"),
        })
    }

    pub fn set_timegrid(&self, text: &str) -> Result<()> {
        let timegrid = codec::decode_as::<Timegrid>(text)?;
        self.store
            .put(StoreKey::Timegrid, &codec::encode(&timegrid.into_document())?)?;
        info!("Timegrid set");
        Ok(())
    }

    /// Stores time series sent either as a document or as a bare name → values map.
    pub fn set_time_series(&self, payload: TimeSeriesPayload) -> Result<()> {
        let series = match payload {
            TimeSeriesPayload::Encoded(text) => match codec::decode_as::<TimeSeries>(&text) {
                Ok(series) => series,
                Err(err) => match serde_json::from_str::<BTreeMap<String, Vec<f64>>>(&text) {
                    Ok(raw) => TimeSeries::new(raw),
                    Err(_) => return Err(err.into()),
                },
            },
            TimeSeriesPayload::Raw(raw) => TimeSeries::new(raw),
            TimeSeriesPayload::Inline(value) => {
                TimeSeries::from_document(codec::decode_value(value)?).map_err(|other| {
                    SessionError::WrongKind {
                        expected: TimeSeries::KIND,
                        found: other.kind(),
                    }
                })?
            }
        };

        let count = series.series.len();
        self.store.put(
            StoreKey::TimeSeriesData,
            &codec::encode(&series.into_document())?,
        )?;
        info!("Stored {} time series", count);
        Ok(())
    }

    /// Appends an asset to the portfolio, starting one if none is stored.
    pub fn portf_add_asset(&self, text: &str) -> Result<String> {
        let asset = codec::decode_as::<Asset>(text)?;
        let mut portfolio = self.portfolio_or_empty()?;

        if portfolio.position(asset.name()).is_some() {
            warn!("Rejected duplicate asset '{}'", asset.name());
            return Err(SessionError::DuplicateAsset(asset.name().to_string()));
        }

        let message = format!("Added asset '{}' to portfolio", asset.name());
        portfolio.assets.push(asset);
        self.store_portfolio(&portfolio)?;
        info!("{}", message);
        Ok(message)
    }

    pub fn portf_delete_asset(&self, name: &str) -> Result<DeleteOutcome> {
        let mut portfolio = self.portfolio_or_empty()?;
        let Some(index) = portfolio.position(name) else {
            return Ok(DeleteOutcome {
                found: false,
                message: format!("Asset '{name}' not found in portfolio, nothing deleted"),
            });
        };

        portfolio.assets.remove(index);
        self.store_portfolio(&portfolio)?;
        info!("Deleted asset '{}' from portfolio", name);
        Ok(DeleteOutcome {
            found: true,
            message: format!("Deleted asset '{name}' from portfolio"),
        })
    }

    /// Replaces asset `name` wholesale; the replacement may be of another kind.
    pub fn set_all_asset_parameters(&self, name: &str, text: &str) -> Result<String> {
        let (mut portfolio, index) = self.locate_asset(name)?;
        let asset = codec::decode_as::<Asset>(text)?;
        self.replace_asset(&mut portfolio, index, asset)?;
        let message = format!("Replaced all parameters of asset '{name}'");
        info!("{}", message);
        Ok(message)
    }

    /// Writes `value` at `path` inside asset `name`.
    pub fn set_asset_parameter(&self, name: &str, path: &ParameterPath, value: Value) -> Result<String> {
        let (mut portfolio, index) = self.locate_asset(name)?;
        let doc = Document::Asset(portfolio.assets[index].clone());
        let edited = ParameterTree::write(&doc, path, value)?;
        let asset = Asset::from_document(edited).map_err(|other| SessionError::WrongKind {
            expected: Asset::KIND,
            found: other.kind(),
        })?;
        self.replace_asset(&mut portfolio, index, asset)?;
        let message = format!("Set parameter {path} of asset '{name}'");
        info!("{}", message);
        Ok(message)
    }

    /// Resolves the symbolic node references of an asset and returns it encoded.
    /// The store is not modified.
    pub fn resolve_asset_nodes(&self, text: &str) -> Result<String> {
        let asset = codec::decode_as::<Asset>(text)?;
        let registry = NodeRegistry::new(
            self.store.list_or_empty::<Node>(StoreKey::PortfNodes)?,
            self.store.list_or_empty::<Node>(StoreKey::StdNodes)?,
        );
        let resolved = resolver::resolve(&asset, &registry)?;
        Ok(codec::encode(&resolved.into_document())?)
    }

    fn store_portfolio(&self, portfolio: &Portfolio) -> Result<()> {
        self.store
            .put(StoreKey::Portf, &codec::encode(&portfolio.clone().into_document())?)
    }

    fn portfolio_or_empty(&self) -> Result<Portfolio> {
        match self.store.get_as::<Portfolio>(StoreKey::Portf) {
            Err(SessionError::NotFound(_)) => Ok(Portfolio::default()),
            other => other,
        }
    }

    fn locate_asset(&self, name: &str) -> Result<(Portfolio, usize)> {
        let portfolio = self.store.get_as::<Portfolio>(StoreKey::Portf)?;
        let index = portfolio
            .position(name)
            .ok_or_else(|| SessionError::NotFound(format!("asset '{name}'")))?;
        Ok((portfolio, index))
    }

    fn replace_asset(&self, portfolio: &mut Portfolio, index: usize, asset: Asset) -> Result<()> {
        let clash = portfolio
            .assets
            .iter()
            .enumerate()
            .any(|(i, a)| i != index && a.name() == asset.name());
        if clash {
            warn!("Rejected rename onto existing asset '{}'", asset.name());
            return Err(SessionError::DuplicateAsset(asset.name().to_string()));
        }
        portfolio.assets[index] = asset;
        self.store_portfolio(portfolio)
    }
}
