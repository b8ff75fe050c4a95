use crate::entities::Placement;

/// The outcome of a pack call.
///
/// `placed + failed` equals the number of parts presented to the driver; a part id
/// appears in at most one placement. With `partial_solution` disabled the placement
/// list is either complete or empty.
#[derive(Clone, Debug, Default)]
pub struct PackSolution {
    pub placements: Vec<Placement>,
    /// Number of parts that were successfully placed
    pub placed: usize,
    /// Number of parts for which no feasible placement was found
    pub failed: usize,
}
