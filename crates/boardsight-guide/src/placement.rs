//! Component placement list: the externally supplied build plan.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One component and the ordered grid coordinates of its pins.
///
/// Wire format: `{ "ref": "R1", "positions": [[row, col], ...] }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentPlacement {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "positions")]
    pub pins: Vec<(u32, u32)>,
}

#[derive(thiserror::Error, Debug)]
pub enum PlacementError {
    #[error("invalid placement JSON")]
    Parse(#[from] serde_json::Error),
}

/// A grid position claimed by more than one pin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicatePin {
    pub position: (u32, u32),
    /// Claiming component references, in encounter order.
    pub refs: Vec<String>,
}

/// Parse the placement list. Duplicate references are accepted; duplicate
/// pin positions are logged but never rejected.
pub fn load_placements(json: &str) -> Result<Vec<ComponentPlacement>, PlacementError> {
    let placements: Vec<ComponentPlacement> = serde_json::from_str(json)?;
    for dup in scan_duplicate_pins(&placements) {
        warn!(
            "position ({}, {}) claimed by multiple pins: {}",
            dup.position.0,
            dup.position.1,
            dup.refs.join(", ")
        );
    }
    Ok(placements)
}

/// Every position claimed by two or more pins, with all claiming refs.
pub fn scan_duplicate_pins(placements: &[ComponentPlacement]) -> Vec<DuplicatePin> {
    let mut claims: BTreeMap<(u32, u32), Vec<String>> = BTreeMap::new();
    for p in placements {
        for &pin in &p.pins {
            claims.entry(pin).or_default().push(p.reference.clone());
        }
    }
    claims
        .into_iter()
        .filter(|(_, refs)| refs.len() >= 2)
        .map(|(position, refs)| DuplicatePin { position, refs })
        .collect()
}
