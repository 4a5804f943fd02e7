use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Volume and flow units of a node, e.g. MWh and MW.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    #[serde(default = "Unit::default_volume")]
    pub volume: String,
    #[serde(default = "Unit::default_flow")]
    pub flow: String,
    #[serde(default = "Unit::default_factor")]
    pub factor: f64,
}

impl Unit {
    fn default_volume() -> String {
        "MWh".to_string()
    }

    fn default_flow() -> String {
        "MW".to_string()
    }

    fn default_factor() -> f64 {
        1.0
    }
}

impl Default for Unit {
    fn default() -> Self {
        Self {
            volume: Self::default_volume(),
            flow: Self::default_flow(),
            factor: Self::default_factor(),
        }
    }
}

/// A balancing point of the portfolio network, identified by its name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(default)]
    pub commodity: Option<String>,
    #[serde(default)]
    pub unit: Unit,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commodity: None,
            unit: Unit::default(),
        }
    }

    pub fn with_commodity(mut self, commodity: impl Into<String>) -> Self {
        self.commodity = Some(commodity.into());
        self
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }
}

/// One entry of an asset's node list.
///
/// Clients may reference a node by value or by name. Entries that are
/// neither survive decoding as [`NodeRef::Malformed`] so that the resolver
/// can report them with their position instead of failing the whole decode.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeRef {
    Node(Node),
    Name(String),
    Malformed(Value),
}

impl NodeRef {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            NodeRef::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn is_concrete(&self) -> bool {
        matches!(self, NodeRef::Node(_))
    }
}

impl From<Node> for NodeRef {
    fn from(node: Node) -> Self {
        NodeRef::Node(node)
    }
}

impl From<&str> for NodeRef {
    fn from(name: &str) -> Self {
        NodeRef::Name(name.to_string())
    }
}

impl Serialize for NodeRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NodeRef::Node(node) => node.serialize(serializer),
            NodeRef::Name(name) => serializer.serialize_str(name),
            NodeRef::Malformed(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for NodeRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_value(Value::deserialize(deserializer)?))
    }
}

impl NodeRef {
    fn from_value(value: Value) -> Self {
        match value {
            Value::String(name) => NodeRef::Name(name),
            Value::Object(_) => match serde_json::from_value::<Node>(value.clone()) {
                Ok(node) => NodeRef::Node(node),
                Err(_) => NodeRef::Malformed(value),
            },
            other => NodeRef::Malformed(other),
        }
    }
}

/// Accepts either a single node entry or a list of them.
pub(crate) fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<NodeRef>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items.into_iter().map(NodeRef::from_value).collect()),
        Value::Null => Err(de::Error::custom("asset needs at least one node")),
        single => Ok(vec![NodeRef::from_value(single)]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn node_ref_shapes() {
        let name: NodeRef = serde_json::from_value(json!("node_power")).unwrap();
        assert_eq!(name, NodeRef::Name("node_power".into()));

        let node: NodeRef =
            serde_json::from_value(json!({"name": "gas", "commodity": "gas"})).unwrap();
        assert_eq!(node, NodeRef::Node(Node::new("gas").with_commodity("gas")));

        let bad: NodeRef = serde_json::from_value(json!(42)).unwrap();
        assert!(matches!(bad, NodeRef::Malformed(_)));

        let nameless: NodeRef = serde_json::from_value(json!({"commodity": "gas"})).unwrap();
        assert!(matches!(nameless, NodeRef::Malformed(_)));
    }

    #[test]
    fn unit_defaults_to_megawatts() {
        let node: Node = serde_json::from_value(json!({"name": "a"})).unwrap();
        assert_eq!(node.unit, Unit::default());
        assert_eq!(node.unit.flow, "MW");
    }
}
