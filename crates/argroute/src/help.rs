//! Help listing derived from a route table

use crate::route::RouteKind;
use crate::table::RouteTable;

/// One line of help output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    /// Pattern without descriptions
    pub usage: String,
    pub description: Option<String>,
    pub kind: RouteKind,
    /// Usage lines of the route's aliases
    pub aliases: Vec<String>,
}

/// Every canonical route, aliases folded in, sorted by usage
pub fn help_entries(table: &RouteTable) -> Vec<HelpEntry> {
    let mut entries: Vec<HelpEntry> = table
        .routes()
        .iter()
        .filter(|route| !route.is_alias())
        .map(|route| {
            let mut aliases: Vec<_> = table
                .routes()
                .iter()
                .filter(|alias| alias.canonical_order == Some(route.order))
                .collect();
            aliases.sort_by_key(|alias| alias.order);

            HelpEntry {
                usage: route.usage(),
                description: route.metadata.description.clone(),
                kind: route.kind(),
                aliases: aliases.iter().map(|alias| alias.usage()).collect(),
            }
        })
        .collect();

    entries.sort_by(|a, b| a.usage.cmp(&b.usage));
    entries
}
