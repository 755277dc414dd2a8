use vault_core::core_api::{GridNode, Item, Sockets};
use vault_core::spreadsheet::ExportRow;

// Filler nodes and plugs that say nothing about the roll. "* Chroma" nodes
// stay because nothing else shows Chroma.
const FILTER_NODE_NAMES: &[&str] = &[
    "Upgrade Defense",
    "Ascend",
    "Infuse",
    "Increase Intellect",
    "Increase Discipline",
    "Increase Strength",
    "Twist Fate",
    "The Life Exotic",
    "Reforge Artifact",
    "Reforge Shell",
    "Deactivate Chroma",
    "Kinetic Damage",
    "Solar Damage",
    "Arc Damage",
    "Void Damage",
    "Default Shader",
    "Default Ornament",
    "Empty Mod Socket",
    "No Projection",
];

fn is_filtered(name: &str) -> bool {
    FILTER_NODE_NAMES.contains(&name)
}

fn socket_names(sockets: &Sockets) -> Vec<String> {
    sockets
        .sockets
        .iter()
        .flat_map(|socket| {
            let plugged = socket.plug.as_ref().map(|plug| plug.hash);
            socket
                .plug_options
                .iter()
                .filter(|option| !is_filtered(&option.name))
                .map(move |option| {
                    if plugged == Some(option.hash) {
                        format!("{}*", option.name)
                    } else {
                        option.name.clone()
                    }
                })
        })
        .collect()
}

fn node_names(nodes: &[GridNode]) -> Vec<String> {
    nodes
        .iter()
        .filter(|node| !is_filtered(&node.name))
        .map(|node| {
            if node.activated {
                format!("{}*", node.name)
            } else {
                node.name.clone()
            }
        })
        .collect()
}

/// Perk names for an item; the active choice in each slot is starred.
pub fn perk_names(item: &Item) -> Vec<String> {
    if let Some(grid) = &item.talent_grid {
        return node_names(&grid.nodes);
    }
    match &item.sockets {
        Some(sockets) if item.is_destiny2() => socket_names(sockets),
        _ => Vec::new(),
    }
}

/// Widest perk list in the batch; every row gets this many perk columns.
pub fn max_perks(items: &[&Item]) -> usize {
    items
        .iter()
        .map(|item| perk_names(item).len())
        .max()
        .unwrap_or(0)
}

pub fn add_perks(row: &mut ExportRow, item: &Item, max_perks: usize) {
    let mut perks = perk_names(item).into_iter();
    for index in 0..max_perks {
        row.insert(format!("Perks {index}"), perks.next());
    }
}
