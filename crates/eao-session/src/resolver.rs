use eao_core::{Asset, Node, NodeRef};

use crate::error::{Result, SessionError};

/// Two-tier node lookup: portfolio nodes shadow standard nodes.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    local: Vec<Node>,
    standard: Vec<Node>,
}

impl NodeRegistry {
    pub fn new(local: Vec<Node>, standard: Vec<Node>) -> Self {
        Self { local, standard }
    }

    /// Exact, case-sensitive lookup.
    pub fn lookup(&self, name: &str) -> Option<&Node> {
        self.local
            .iter()
            .chain(self.standard.iter())
            .find(|n| n.name == name)
    }
}

/// Returns a copy of `asset` with every symbolic node reference replaced by
/// the registered node of that name.
pub fn resolve(asset: &Asset, registry: &NodeRegistry) -> Result<Asset> {
    let nodes = asset
        .nodes()
        .iter()
        .enumerate()
        .map(|(position, entry)| match entry {
            NodeRef::Node(_) => Ok(entry.clone()),
            NodeRef::Name(name) => registry
                .lookup(name)
                .cloned()
                .map(NodeRef::Node)
                .ok_or_else(|| SessionError::UnresolvedReference {
                    asset: asset.name().to_string(),
                    node: name.clone(),
                }),
            NodeRef::Malformed(_) => Err(SessionError::MalformedReference {
                asset: asset.name().to_string(),
                position,
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(asset.with_nodes(nodes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use eao_core::{AssetBase, CostSpec, SimpleContract};
    use serde_json::json;

    fn contract(nodes: Vec<NodeRef>) -> Asset {
        Asset::SimpleContract(SimpleContract {
            base: AssetBase::new("c", nodes),
            price: Some("price".into()),
            min_cap: -1.0,
            max_cap: 1.0,
            extra_costs: CostSpec::Value(0.5),
        })
    }

    fn registry() -> NodeRegistry {
        NodeRegistry::new(
            vec![Node::new("shared").with_commodity("local")],
            vec![
                Node::new("shared").with_commodity("standard"),
                Node::new("node_heat").with_commodity("heat"),
            ],
        )
    }

    #[test]
    fn local_nodes_shadow_standard_nodes() {
        let resolved = resolve(&contract(vec!["shared".into(), "node_heat".into()]), &registry()).unwrap();
        let commodities: Vec<_> = resolved
            .nodes()
            .iter()
            .map(|n| n.as_node().unwrap().commodity.clone().unwrap())
            .collect();
        assert_eq!(commodities, ["local", "heat"]);
    }

    #[test]
    fn resolution_keeps_everything_else() {
        let concrete = Node::new("x");
        let input = contract(vec![concrete.clone().into(), "node_heat".into()]);
        let resolved = resolve(&input, &registry()).unwrap();

        assert_eq!(resolved.nodes()[0], NodeRef::Node(concrete));
        assert_eq!(resolved.with_nodes(input.nodes().to_vec()), input);
        assert!(!input.nodes()[1].is_concrete());
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let err = resolve(&contract(vec!["Node_Heat".into()]), &registry()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::UnresolvedReference { ref node, .. } if node == "Node_Heat"
        ));
    }

    #[test]
    fn malformed_entries_report_their_position() {
        let input = contract(vec!["node_heat".into(), NodeRef::Malformed(json!(42))]);
        assert!(matches!(
            resolve(&input, &registry()),
            Err(SessionError::MalformedReference { position: 1, .. })
        ));
    }
}
