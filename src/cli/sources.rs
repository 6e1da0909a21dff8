//! Sources subcommand for strata CLI

use crate::resolved::ResolvedConfig;

/// One `path<TAB>source` line per resolved leaf, sorted by path.
pub fn render(resolved: &ResolvedConfig) -> String {
    resolved
        .sources()
        .iter()
        .map(|(path, source)| format!("{}\t{}\n", path, source))
        .collect()
}
