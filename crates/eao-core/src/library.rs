use std::path::Path;
use tracing::info;

use crate::codec::{self, KindMismatch};
use crate::config_manager::{ConfigError, LibraryConfig};
use crate::error::CodecResult;
use crate::model::{
    Asset, AssetBase, ChpAsset, CostSpec, MultiCommodityContract, Node, SimpleContract, Storage,
    Transport, Unit,
};

/// Standard nodes and assets every session starts from.
#[derive(Debug, Clone)]
pub struct StandardLibrary {
    pub nodes: Vec<Node>,
    pub assets: Vec<Asset>,
}

/// Encoded standard library, validated once so that seeding cannot fail.
#[derive(Debug, Clone)]
pub struct SeedDocuments {
    std_nodes: String,
    std_assets: String,
}

impl SeedDocuments {
    pub fn std_nodes(&self) -> &str {
        &self.std_nodes
    }

    pub fn std_assets(&self) -> &str {
        &self.std_assets
    }
}

impl StandardLibrary {
    /// Library shipped with the server: four MW/MWh nodes and six assets.
    pub fn builtin() -> Self {
        let mw = Unit::default();
        let power = Node::new("node_power").with_commodity("power").with_unit(mw.clone());
        let heat = Node::new("node_heat").with_commodity("heat").with_unit(mw.clone());
        let gas = Node::new("gas").with_commodity("gas").with_unit(mw.clone());
        let power_2 = Node::new("node_power_2").with_commodity("power").with_unit(mw);

        let assets = vec![
            Asset::SimpleContract(SimpleContract {
                base: AssetBase::new("std_contract", vec![power.clone().into()]),
                price: Some("price_tag".into()),
                min_cap: -10.0,
                max_cap: 10.0,
                extra_costs: CostSpec::default(),
            }),
            Asset::Storage(Storage {
                base: AssetBase::new("battery", vec![power.clone().into()]),
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
            }),
            Asset::MultiCommodityContract(MultiCommodityContract {
                base: AssetBase::new("power_to_heat", vec![power.clone().into(), heat.clone().into()]),
                price: None,
                min_cap: 0.0,
                max_cap: 10.0,
                extra_costs: CostSpec::Value(0.0),
                factors_commodities: vec![-1.0, 4.0],
            }),
            Asset::Transport(Transport {
                base: AssetBase::new("transport", vec![power.clone().into(), power_2.clone().into()]),
                min_cap: 0.0,
                max_cap: 0.0,
                efficiency: 0.95,
                costs_const: 0.0,
            }),
            Asset::MultiCommodityContract(MultiCommodityContract {
                base: AssetBase::new("simple CHP", vec![power.clone().into(), heat.clone().into()]),
                price: None,
                min_cap: 0.0,
                max_cap: 1.0,
                extra_costs: CostSpec::Tag("CHP_costs_tag".into()),
                factors_commodities: vec![0.8, 2.2],
            }),
            Asset::Chp(ChpAsset {
                base: AssetBase::new(
                    "CHP with gas",
                    vec![power.clone().into(), heat.clone().into(), gas.clone().into()],
                ),
                price: None,
                min_cap: 1.0,
                max_cap: 10.0,
                extra_costs: CostSpec::default(),
                start_costs: 1.0,
                running_costs: 5.0,
                conversion_factor_power_heat: 0.2,
                max_share_heat: Some(1.0),
                start_fuel: 10.0,
                fuel_efficiency: 0.5,
                consumption_if_on: 0.1,
            }),
        ];

        Self {
            nodes: vec![power, heat, gas, power_2],
            assets,
        }
    }

    /// Builtin library, with either list replaced by a file when configured.
    pub fn from_config(config: &LibraryConfig) -> Result<Self, ConfigError> {
        let mut library = Self::builtin();
        if let Some(path) = &config.std_nodes_file {
            library.nodes = read_list(path)?;
            info!("Loaded {} standard nodes from {}", library.nodes.len(), path.display());
        }
        if let Some(path) = &config.std_assets_file {
            library.assets = read_list(path)?;
            info!("Loaded {} standard assets from {}", library.assets.len(), path.display());
        }
        Ok(library)
    }

    pub fn seed(&self) -> CodecResult<SeedDocuments> {
        Ok(SeedDocuments {
            std_nodes: codec::encode_list_of(&self.nodes)?,
            std_assets: codec::encode_list_of(&self.assets)?,
        })
    }
}

fn read_list<T: codec::Kind>(path: &Path) -> Result<Vec<T>, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ReadError(format!("{}: {e}", path.display())))?;
    codec::decode_list_as::<T>(&text).map_err(|e| match e {
        KindMismatch::Codec(err) => {
            ConfigError::ParseError(format!("{}: {err}", path.display()))
        }
        wrong => ConfigError::ValidationError(format!("{}: {wrong}", path.display())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_matches_the_standard_catalogue() {
        let lib = StandardLibrary::builtin();
        let names: Vec<_> = lib.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["node_power", "node_heat", "gas", "node_power_2"]);
        assert_eq!(lib.assets.len(), 6);
        assert_eq!(lib.assets[5].kind(), "CHPAsset");
    }

    #[test]
    fn seed_decodes_back_to_the_library() {
        let lib = StandardLibrary::builtin();
        let seed = lib.seed().unwrap();
        let nodes = codec::decode_list_as::<Node>(seed.std_nodes()).unwrap();
        let assets = codec::decode_list_as::<Asset>(seed.std_assets()).unwrap();
        assert_eq!(nodes, lib.nodes);
        assert_eq!(assets, lib.assets);
    }

    #[test]
    fn node_file_overrides_builtin_nodes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let text = codec::encode_list_of(&[Node::new("only")]).unwrap();
        file.write_all(text.as_bytes()).unwrap();

        let config = LibraryConfig {
            std_nodes_file: Some(file.path().to_path_buf()),
            std_assets_file: None,
        };
        let lib = StandardLibrary::from_config(&config).unwrap();
        assert_eq!(lib.nodes, vec![Node::new("only")]);
        assert_eq!(lib.assets.len(), 6);
    }

    #[test]
    fn asset_file_with_nodes_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let text = codec::encode_list_of(&[Node::new("oops")]).unwrap();
        file.write_all(text.as_bytes()).unwrap();

        let config = LibraryConfig {
            std_nodes_file: None,
            std_assets_file: Some(file.path().to_path_buf()),
        };
        assert!(matches!(
            StandardLibrary::from_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
