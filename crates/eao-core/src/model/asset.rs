use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::node::{one_or_many, NodeRef};
use super::timegrid::datetime;

/// A cost or price parameter: either a constant or the tag of a time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CostSpec {
    Value(f64),
    Tag(String),
}

impl Default for CostSpec {
    fn default() -> Self {
        CostSpec::Value(0.0)
    }
}

/// Fields every asset kind carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetBase {
    pub name: String,
    #[serde(deserialize_with = "one_or_many")]
    pub nodes: Vec<NodeRef>,
    #[serde(default, with = "datetime::option")]
    pub start: Option<NaiveDateTime>,
    #[serde(default, with = "datetime::option")]
    pub end: Option<NaiveDateTime>,
}

impl AssetBase {
    pub fn new(name: impl Into<String>, nodes: Vec<NodeRef>) -> Self {
        Self {
            name: name.into(),
            nodes,
            start: None,
            end: None,
        }
    }

    /// Whether `t` lies inside the asset's optional `[start, end)` window.
    pub fn is_active(&self, t: NaiveDateTime) -> bool {
        self.start.map_or(true, |s| t >= s) && self.end.map_or(true, |e| t < e)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleContract {
    #[serde(flatten)]
    pub base: AssetBase,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub min_cap: f64,
    #[serde(default)]
    pub max_cap: f64,
    #[serde(default)]
    pub extra_costs: CostSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Storage {
    #[serde(flatten)]
    pub base: AssetBase,
    pub size: f64,
    #[serde(default)]
    pub cap_in: f64,
    #[serde(default)]
    pub cap_out: f64,
    #[serde(default)]
    pub start_level: f64,
    #[serde(default)]
    pub end_level: f64,
    #[serde(default = "unity")]
    pub eff_in: f64,
    #[serde(default = "unity")]
    pub eff_out: f64,
    #[serde(default)]
    pub block_size: Option<String>,
    #[serde(default)]
    pub no_simult_in_out: bool,
    #[serde(default)]
    pub price: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiCommodityContract {
    #[serde(flatten)]
    pub base: AssetBase,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub min_cap: f64,
    #[serde(default)]
    pub max_cap: f64,
    #[serde(default)]
    pub extra_costs: CostSpec,
    #[serde(default)]
    pub factors_commodities: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transport {
    #[serde(flatten)]
    pub base: AssetBase,
    #[serde(default)]
    pub min_cap: f64,
    #[serde(default)]
    pub max_cap: f64,
    #[serde(default = "unity")]
    pub efficiency: f64,
    #[serde(default)]
    pub costs_const: f64,
}

/// Combined heat and power plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChpAsset {
    #[serde(flatten)]
    pub base: AssetBase,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub min_cap: f64,
    #[serde(default)]
    pub max_cap: f64,
    #[serde(default)]
    pub extra_costs: CostSpec,
    #[serde(default)]
    pub start_costs: f64,
    #[serde(default)]
    pub running_costs: f64,
    #[serde(default = "unity")]
    pub conversion_factor_power_heat: f64,
    #[serde(default)]
    pub max_share_heat: Option<f64>,
    #[serde(default)]
    pub start_fuel: f64,
    #[serde(default = "unity")]
    pub fuel_efficiency: f64,
    #[serde(default)]
    pub consumption_if_on: f64,
}

fn unity() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "asset_type")]
pub enum Asset {
    SimpleContract(SimpleContract),
    Storage(Storage),
    MultiCommodityContract(MultiCommodityContract),
    Transport(Transport),
    #[serde(rename = "CHPAsset")]
    Chp(ChpAsset),
}

impl Asset {
    pub fn base(&self) -> &AssetBase {
        match self {
            Asset::SimpleContract(a) => &a.base,
            Asset::Storage(a) => &a.base,
            Asset::MultiCommodityContract(a) => &a.base,
            Asset::Transport(a) => &a.base,
            Asset::Chp(a) => &a.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut AssetBase {
        match self {
            Asset::SimpleContract(a) => &mut a.base,
            Asset::Storage(a) => &mut a.base,
            Asset::MultiCommodityContract(a) => &mut a.base,
            Asset::Transport(a) => &mut a.base,
            Asset::Chp(a) => &mut a.base,
        }
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn nodes(&self) -> &[NodeRef] {
        &self.base().nodes
    }

    /// The `asset_type` tag of this asset.
    pub fn kind(&self) -> &'static str {
        match self {
            Asset::SimpleContract(_) => "SimpleContract",
            Asset::Storage(_) => "Storage",
            Asset::MultiCommodityContract(_) => "MultiCommodityContract",
            Asset::Transport(_) => "Transport",
            Asset::Chp(_) => "CHPAsset",
        }
    }

    /// Returns a copy of this asset with its node list replaced.
    pub fn with_nodes(&self, nodes: Vec<NodeRef>) -> Asset {
        let mut asset = self.clone();
        asset.base_mut().nodes = nodes;
        asset
    }
}
