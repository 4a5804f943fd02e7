//! Static field tables for the document kinds clients can build.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ObjectDescriptor {
    pub kind: &'static str,
    pub doc: &'static str,
    pub fields: &'static [FieldDescriptor],
}

const fn field(name: &'static str, ty: &'static str, required: bool) -> FieldDescriptor {
    FieldDescriptor { name, ty, required }
}

const ASSET_BASE: [FieldDescriptor; 5] = [
    field("asset_type", "str", true),
    field("name", "str", true),
    field("nodes", "Node | str | list[Node | str]", true),
    field("start", "datetime", false),
    field("end", "datetime", false),
];

macro_rules! asset_fields {
    ($($extra:expr),* $(,)?) => {
        &[
            ASSET_BASE[0], ASSET_BASE[1], ASSET_BASE[2], ASSET_BASE[3], ASSET_BASE[4],
            $($extra),*
        ]
    };
}

static OBJECTS: &[ObjectDescriptor] = &[
    ObjectDescriptor {
        kind: "Node",
        doc: "Balancing point of the network. Assets connect to one or more nodes.",
        fields: &[
            field("name", "str", true),
            field("commodity", "str", false),
            field("unit", "Unit", false),
        ],
    },
    ObjectDescriptor {
        kind: "Unit",
        doc: "Volume and flow units of a node and the factor between them.",
        fields: &[
            field("volume", "str", false),
            field("flow", "str", false),
            field("factor", "float", false),
        ],
    },
    ObjectDescriptor {
        kind: "Timegrid",
        doc: "Optimisation horizon [start, end) split into steps of length freq.",
        fields: &[
            field("start", "datetime", true),
            field("end", "datetime", true),
            field("freq", "'15min' | '30min' | 'h' | 'd' | 'w'", false),
        ],
    },
    ObjectDescriptor {
        kind: "StartEndValueDict",
        doc: "Piecewise constant values, each valid from start to end.",
        fields: &[
            field("start", "list[datetime]", true),
            field("end", "list[datetime]", true),
            field("values", "list[float]", true),
        ],
    },
    ObjectDescriptor {
        kind: "TimeSeries",
        doc: "Named numeric series aligned to the timegrid.",
        fields: &[field("series", "dict[str, list[float]]", true)],
    },
    ObjectDescriptor {
        kind: "Portfolio",
        doc: "Ordered collection of uniquely named assets.",
        fields: &[field("assets", "list[Asset]", true)],
    },
    ObjectDescriptor {
        kind: "Asset",
        doc: "Common asset parameters. asset_type selects the concrete kind.",
        fields: &ASSET_BASE,
    },
    ObjectDescriptor {
        kind: "SimpleContract",
        doc: "Buy or sell at a price between min_cap and max_cap.",
        fields: asset_fields![
            field("price", "str", false),
            field("min_cap", "float", false),
            field("max_cap", "float", false),
            field("extra_costs", "float | str", false),
        ],
    },
    ObjectDescriptor {
        kind: "Storage",
        doc: "Storage of given size with charge and discharge capacities.",
        fields: asset_fields![
            field("size", "float", true),
            field("cap_in", "float", false),
            field("cap_out", "float", false),
            field("start_level", "float", false),
            field("end_level", "float", false),
            field("eff_in", "float", false),
            field("eff_out", "float", false),
            field("block_size", "str", false),
            field("no_simult_in_out", "bool", false),
            field("price", "str", false),
        ],
    },
    ObjectDescriptor {
        kind: "MultiCommodityContract",
        doc: "Contract dispatching several nodes at once, scaled by factors_commodities.",
        fields: asset_fields![
            field("price", "str", false),
            field("min_cap", "float", false),
            field("max_cap", "float", false),
            field("extra_costs", "float | str", false),
            field("factors_commodities", "list[float]", false),
        ],
    },
    ObjectDescriptor {
        kind: "Transport",
        doc: "Moves volume from the first node to the second with losses.",
        fields: asset_fields![
            field("min_cap", "float", false),
            field("max_cap", "float", false),
            field("efficiency", "float", false),
            field("costs_const", "float", false),
        ],
    },
    ObjectDescriptor {
        kind: "CHPAsset",
        doc: "Combined heat and power plant on power, heat and optional fuel nodes.",
        fields: asset_fields![
            field("price", "str", false),
            field("min_cap", "float", false),
            field("max_cap", "float", false),
            field("extra_costs", "float | str", false),
            field("start_costs", "float", false),
            field("running_costs", "float", false),
            field("conversion_factor_power_heat", "float", false),
            field("max_share_heat", "float", false),
            field("start_fuel", "float", false),
            field("fuel_efficiency", "float", false),
            field("consumption_if_on", "float", false),
        ],
    },
];

/// Kinds matched case-insensitively; everything else needs the exact name.
const CASE_INSENSITIVE: [&str; 4] = ["Node", "Unit", "Timegrid", "StartEndValueDict"];

pub fn lookup(key: &str) -> Option<&'static ObjectDescriptor> {
    OBJECTS.iter().find(|o| {
        o.kind == key || (CASE_INSENSITIVE.contains(&o.kind) && o.kind.eq_ignore_ascii_case(key))
    })
}

pub fn catalogue() -> Vec<&'static str> {
    OBJECTS.iter().map(|o| o.kind).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_kinds_match_any_case() {
        assert_eq!(lookup("node").map(|o| o.kind), Some("Node"));
        assert_eq!(lookup("STARTENDVALUEDICT").map(|o| o.kind), Some("StartEndValueDict"));
    }

    #[test]
    fn class_names_need_exact_case() {
        assert!(lookup("Storage").is_some());
        assert!(lookup("storage").is_none());
        assert!(lookup("Windmill").is_none());
    }

    #[test]
    fn asset_kinds_include_the_common_fields() {
        let storage = lookup("Storage").unwrap();
        assert_eq!(storage.fields[0].name, "asset_type");
        assert!(storage.fields.iter().any(|f| f.name == "cap_in" && f.ty == "float"));
        assert!(catalogue().contains(&"CHPAsset"));
    }
}
