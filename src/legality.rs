//! Commander color-identity legality.
//!
//! A card is legal when its color identity is a subset of the commander's.
//! The checker only judges cards it has color data for: unresolved cards are
//! never flagged, and a missing commander (or missing commander color data)
//! disables the check entirely rather than blocking the turn.

use std::collections::HashSet;

use crate::resolver::Resolution;

/// Canonical names of resolved cards outside the commander's color identity.
///
/// Returns names sorted for stable warning output. The commander itself is
/// never flagged.
pub fn illegal_cards(resolution: &Resolution, commander_canonical: Option<&str>) -> Vec<String> {
    let Some(commander) = commander_canonical else {
        return Vec::new();
    };
    let Some(commander_colors) = resolution.colors.get(commander) else {
        return Vec::new();
    };

    let allowed: HashSet<&str> = commander_colors.iter().map(String::as_str).collect();

    let mut illegal: Vec<String> = resolution
        .colors
        .iter()
        .filter(|(name, _)| name.as_str() != commander)
        .filter(|(_, colors)| !colors.iter().all(|c| allowed.contains(c.as_str())))
        .map(|(name, _)| name.clone())
        .collect();

    illegal.sort();
    illegal
}
