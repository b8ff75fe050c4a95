mod part;
mod placement;
mod sheet;
mod solution;

#[doc(inline)]
pub use part::{Part, PartPose};
#[doc(inline)]
pub use placement::Placement;
#[doc(inline)]
pub use sheet::{Obstacle, ObstacleKey, Sheet};
#[doc(inline)]
pub use solution::PackSolution;
