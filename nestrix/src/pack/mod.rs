//! The first-fit-decreasing placement driver.
//!
//! Parts are sorted by descending bounding-box area (ties broken by original order) and
//! placed one at a time. For each part, every sheet and every rotation of the configured
//! rotation set is evaluated: the feasible region is the inner-fit rectangle of the
//! sheet minus the forbidden regions of all obstacles already on it, and the candidate
//! position is the feasible-region vertex minimizing `(y, x)` lexicographically
//! (bottom-left fill under the y-down screen convention). The cheapest candidate wins;
//! ties go to the lowest sheet index, then the smallest rotation index.

use std::cmp::Reverse;
use std::f64::consts::PI;

use anyhow::{Result, ensure};
use itertools::Itertools;
use log::{debug, info, warn};
use ordered_float::NotNan;

use crate::boolean;
use crate::entities::{PackSolution, Part, PartPose, Placement, Sheet};
use crate::fsize;
use crate::geometry::DTransformation;
use crate::geometry::geo_traits::Shape;
use crate::geometry::primitives::{Point, Polygon};
use crate::nfp::{NfpKey, NfpResult, RotKey, ShapeId, State, inner_fit_rect, no_fit_polygon, translate_region};
use crate::util::assertions;

/// Configuration of the placement driver.
#[derive(Clone, Copy, Debug)]
pub struct DriverConfig {
    /// If false and any part cannot be placed, the call returns no placements at all
    pub partial_solution: bool,
    /// Number of discrete rotations tried, uniformly spaced over 360°
    pub rotations: usize,
    /// Numeric epsilon used to post-validate placements (containment slack).
    /// Defaults to 1e-9 of the largest sheet dimension.
    pub epsilon: Option<fsize>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            partial_solution: false,
            rotations: 4,
            epsilon: None,
        }
    }
}

/// Places as many parts as possible onto the sheets, largest first.
///
/// Sheets are mutated: every successful placement appends the placed pose to the
/// corresponding sheet's obstacle set. The `state` collects all no-fit polygons
/// computed along the way and can be reused across calls.
pub fn pack_decreasing(
    sheets: &mut [Sheet],
    parts: &[Part],
    config: &DriverConfig,
    state: &mut State,
) -> Result<PackSolution> {
    ensure!(config.rotations > 0, "at least one rotation is required");

    let eps = config.epsilon.unwrap_or_else(|| {
        let max_dim = sheets
            .iter()
            .map(|s| fsize::max(s.rect.width(), s.rect.height()))
            .fold(1.0, fsize::max);
        1e-9 * max_dim
    });

    //first-fit decreasing: descending bbox area, stable on the original order
    let order = (0..parts.len())
        .sorted_by_key(|&i| {
            Reverse(NotNan::new(parts[i].shape.bbox().area()).expect("part area is NaN"))
        })
        .collect_vec();

    let mut placements: Vec<Placement> = Vec::with_capacity(parts.len());
    let mut failed = 0;

    for part_idx in order {
        let part = &parts[part_idx];
        let poses: Vec<PartPose> = (0..config.rotations)
            .map(|k| part.pose(2.0 * PI * k as fsize / config.rotations as fsize))
            .collect();

        let mut best: Option<(NotNan<fsize>, NotNan<fsize>, usize, usize, Point)> = None;

        for (sheet_idx, sheet) in sheets.iter().enumerate() {
            for (rot_idx, pose) in poses.iter().enumerate() {
                let region = match feasible_region(sheet, pose, part.fingerprint, state) {
                    Ok(region) => region,
                    Err(e) => {
                        warn!(
                            "[FFD] part {} sheet {sheet_idx} rotation {rot_idx} skipped: {e}",
                            part.id
                        );
                        continue;
                    }
                };
                let Some(q) = lowest_vertex(&region) else {
                    continue;
                };
                let cost = (
                    NotNan::new(q.1).expect("cost is NaN"),
                    NotNan::new(q.0).expect("cost is NaN"),
                );
                //strict improvement only: ties resolve to the lowest sheet index,
                //then the smallest rotation index
                let improves = match &best {
                    None => true,
                    Some((by, bx, _, _, _)) => cost < (*by, *bx),
                };
                if improves {
                    best = Some((cost.0, cost.1, sheet_idx, rot_idx, q));
                }
            }
        }

        match best {
            Some((_, _, sheet_idx, rot_idx, q)) => {
                let pose = &poses[rot_idx];
                let placed_shape = pose.shape.translated(q.0, q.1);

                //a placement that post-validates as infeasible is an internal invariant
                //violation and unrecoverable
                ensure!(
                    assertions::placement_within_sheet(&sheets[sheet_idx], &placed_shape, eps),
                    "placed part {} escapes sheet {sheet_idx}",
                    part.id
                );
                debug_assert!(
                    assertions::placement_is_disjoint(&sheets[sheet_idx], &placed_shape, eps),
                    "placed part {} overlaps an obstacle on sheet {sheet_idx}",
                    part.id
                );

                sheets[sheet_idx].add_placed(pose, q);
                info!(
                    "[FFD] placed part {} on sheet {sheet_idx} at ({:.3}, {:.3}) rotation {rot_idx}",
                    part.id, q.0, q.1
                );
                placements.push(Placement {
                    part_id: part.id,
                    sheet_index: sheet_idx,
                    rotation_index: rot_idx,
                    d_transf: DTransformation::new(pose.rotation, (q.0, q.1)),
                });
            }
            None => {
                failed += 1;
                if !config.partial_solution {
                    info!(
                        "[FFD] part {} cannot be placed and partial solutions are disabled",
                        part.id
                    );
                    return Ok(PackSolution {
                        placements: vec![],
                        placed: 0,
                        failed: parts.len(),
                    });
                }
                debug!("[FFD] part {} cannot be placed, continuing", part.id);
            }
        }
    }

    let (hits, misses) = state.stats();
    info!(
        "[FFD] finished: {} placed, {failed} failed ({hits} NFP cache hits, {misses} misses)",
        placements.len()
    );

    Ok(PackSolution {
        placed: placements.len(),
        placements,
        failed,
    })
}

/// The feasible region for placing `pose` on `sheet`: the inner-fit rectangle minus the
/// forbidden region of every obstacle, expressed in reference-vertex positions.
fn feasible_region(
    sheet: &Sheet,
    pose: &PartPose,
    part_fingerprint: ShapeId,
    state: &mut State,
) -> NfpResult<Vec<Polygon>> {
    let Some(ifp) = inner_fit_rect(&sheet.rect, &pose.shape) else {
        return Ok(vec![]);
    };

    //slivers below this area are numeric residue, not placeable positions
    let area_eps = 1e-9 * sheet.rect.area();

    let mut region = vec![Polygon::from(ifp)];
    for obstacle in sheet.obstacles() {
        let key = NfpKey {
            stationary: obstacle.shape_id,
            orbiter: part_fingerprint,
            orbiter_rot: RotKey::from_angle(pose.rotation),
        };
        let nfp = state.nfp_entry(key, || no_fit_polygon(&obstacle.shape, &pose.shape))?;
        let forbidden = translate_region(&nfp.regions, obstacle.position.0, obstacle.position.1);

        region = boolean::difference(&region, &forbidden);
        region.retain(|p| p.area() > area_eps);
        if region.is_empty() {
            return Ok(region);
        }
    }
    Ok(region)
}

/// The vertex of the feasible region minimizing `(y, x)` lexicographically. Vertices on
/// hole boundaries of the region are touching positions and therefore valid candidates.
fn lowest_vertex(region: &[Polygon]) -> Option<Point> {
    region
        .iter()
        .flat_map(|poly| poly.rings())
        .flat_map(|ring| ring.points.iter())
        .min_by(|a, b| (a.1, a.0).partial_cmp(&(b.1, b.0)).expect("NaN vertex"))
        .copied()
}
