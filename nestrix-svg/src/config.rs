use serde::{Deserialize, Serialize};

/// Configuration of a pack call.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct PackConfig {
    /// Added clearance around each part, applied as a dilation after ingest
    pub offset: f64,
    /// Discretization spacing; shapes are over-approximated by at most `3 × tolerance`
    pub tolerance: f64,
    /// If false and any part cannot be placed, the call returns no placements at all
    pub partial_solution: bool,
    /// Number of discrete rotations tried, uniformly spaced from 0° to 360°
    pub rotations: usize,
    /// Cache NFPs in the process-wide default state to speed up future pack calls
    pub persist: bool,
}

impl Default for PackConfig {
    fn default() -> Self {
        PackConfig {
            offset: 1.0,
            tolerance: 1.0,
            partial_solution: false,
            rotations: 4,
            persist: true,
        }
    }
}
