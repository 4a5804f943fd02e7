use eao_core::{NodeRef, Portfolio};
use petgraph::graph::{NodeIndex, UnGraph};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::f64::consts::PI;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VertexKind {
    Node,
    Asset,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphVertex {
    pub id: String,
    pub label: String,
    pub kind: VertexKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commodity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
}

/// Node/link/position view of a portfolio, ready for a front end to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkView {
    pub nodes: Vec<GraphVertex>,
    pub links: Vec<GraphLink>,
    pub positions: BTreeMap<String, [f64; 2]>,
}

pub trait GraphProjector: Send + Sync {
    fn project(&self, portfolio: &Portfolio) -> NetworkView;
}

/// Places every vertex on the unit circle in insertion order.
#[derive(Debug, Default, Clone, Copy)]
pub struct CircularLayout;

impl CircularLayout {
    fn asset_id(name: &str) -> String {
        format!("asset:{name}")
    }
}

impl GraphProjector for CircularLayout {
    fn project(&self, portfolio: &Portfolio) -> NetworkView {
        let mut graph: UnGraph<GraphVertex, ()> = UnGraph::new_undirected();
        let mut by_node: HashMap<String, NodeIndex> = HashMap::new();

        for node in portfolio.nodes() {
            let idx = graph.add_node(GraphVertex {
                id: node.name.clone(),
                label: node.name.clone(),
                kind: VertexKind::Node,
                commodity: node.commodity.clone(),
            });
            by_node.insert(node.name, idx);
        }

        for asset in &portfolio.assets {
            let idx = graph.add_node(GraphVertex {
                id: Self::asset_id(asset.name()),
                label: asset.name().to_string(),
                kind: VertexKind::Asset,
                commodity: None,
            });
            for node in asset.nodes().iter().filter_map(NodeRef::as_node) {
                if let Some(&target) = by_node.get(&node.name) {
                    graph.update_edge(idx, target, ());
                }
            }
        }

        let count = graph.node_count();
        let positions = graph
            .node_indices()
            .map(|idx| {
                let angle = 2.0 * PI * idx.index() as f64 / count.max(1) as f64;
                (graph[idx].id.clone(), [angle.cos(), angle.sin()])
            })
            .collect();

        // Edges are added from the asset end, so `a` is the asset.
        let links = graph
            .edge_indices()
            .filter_map(|e| graph.edge_endpoints(e))
            .map(|(a, b)| GraphLink {
                source: graph[a].id.clone(),
                target: graph[b].id.clone(),
            })
            .collect();

        NetworkView {
            nodes: graph.node_indices().map(|idx| graph[idx].clone()).collect(),
            links,
            positions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eao_core::{Asset, AssetBase, Node, Transport};

    fn transport(name: &str, from: &str, to: &str) -> Asset {
        Asset::Transport(Transport {
            base: AssetBase::new(
                name,
                vec![
                    Node::new(from).with_commodity("power").into(),
                    Node::new(to).with_commodity("power").into(),
                ],
            ),
            min_cap: 0.0,
            max_cap: 1.0,
            efficiency: 1.0,
            costs_const: 0.0,
        })
    }

    #[test]
    fn nodes_come_before_assets() {
        let portf = Portfolio::new(vec![transport("t1", "a", "b"), transport("t2", "b", "c")]);
        let view = CircularLayout.project(&portf);

        let ids: Vec<_> = view.nodes.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "asset:t1", "asset:t2"]);
        assert_eq!(view.links.len(), 4);
        assert_eq!(
            view.links[0],
            GraphLink {
                source: "asset:t1".into(),
                target: "a".into()
            }
        );
        assert_eq!(view.positions.len(), 5);
    }

    #[test]
    fn positions_lie_on_the_unit_circle() {
        let view = CircularLayout.project(&Portfolio::new(vec![transport("t", "a", "b")]));
        for [x, y] in view.positions.values() {
            assert!(((x * x + y * y) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn empty_portfolio_projects_to_empty_view() {
        let view = CircularLayout.project(&Portfolio::default());
        assert!(view.nodes.is_empty() && view.links.is_empty() && view.positions.is_empty());
    }
}
