//! Geometric invariants of complete pack runs, checked against the placed polygons
//! rather than the emitted documents.

use nestrix::boolean;
use nestrix::entities::{Part, Sheet};
use nestrix::geometry::geo_traits::Shape;
use nestrix::geometry::primitives::Polygon;
use nestrix::nfp::State;
use nestrix::offset::erode_ring;
use nestrix::pack::{DriverConfig, pack_decreasing};
use nestrix_svg::ingest;

const TOLERANCE: f64 = 0.1;
const OFFSET: f64 = 0.4;

fn shapes_doc() -> &'static str {
    r#"<svg viewBox="0 0 30 30">
        <rect width="7" height="4"/>
        <rect x="10" y="0" width="4" height="7"/>
        <circle cx="20" cy="5" r="2.5"/>
        <polygon points="0,10 6,10 3,16"/>
        <ellipse cx="20" cy="20" rx="3" ry="2"/>
    </svg>"#
}

fn sheet_doc() -> &'static str {
    r#"<svg viewBox="0 0 30 30"><rect x="25" y="25" width="5" height="5"/></svg>"#
}

fn run() -> (Vec<Sheet>, Vec<Part>, Vec<(usize, Polygon)>) {
    let ingested = ingest::extract_parts(shapes_doc(), TOLERANCE, OFFSET).unwrap();
    let mut sheets = vec![ingest::extract_sheet(sheet_doc(), TOLERANCE, OFFSET).unwrap()];
    let parts = ingested.parts;

    let config = DriverConfig {
        partial_solution: true,
        rotations: 2,
        epsilon: None,
    };
    let mut state = State::new();
    let solution = pack_decreasing(&mut sheets, &parts, &config, &mut state).unwrap();
    assert_eq!(solution.placed + solution.failed, parts.len());

    let placed = solution
        .placements
        .iter()
        .map(|p| {
            let (tx, ty) = p.d_transf.translation();
            let shape = parts[p.part_id]
                .pose(p.d_transf.rotation())
                .shape
                .translated(tx, ty);
            (p.sheet_index, shape)
        })
        .collect();
    (sheets, parts, placed)
}

#[test]
fn test_all_parts_placed() {
    let (_, parts, placed) = run();
    assert_eq!(placed.len(), parts.len(), "all five shapes fit the 30x30 sheet");
}

#[test]
fn test_containment() {
    let (sheets, _, placed) = run();
    for (sheet_idx, shape) in &placed {
        let rect = sheets[*sheet_idx].rect;
        assert!(
            rect.contains_rect(&shape.bbox(), 1e-6),
            "placed shape bbox {:?} escapes sheet {rect:?}",
            shape.bbox()
        );
    }
}

#[test]
fn test_no_overlap_after_tolerance_erosion() {
    //the conservativity contract: shapes eroded by 3*tolerance are pairwise disjoint
    //and disjoint from the sheet's forbidden regions
    let (sheets, _, placed) = run();
    let eroded: Vec<(usize, Vec<Polygon>)> = placed
        .iter()
        .map(|(s, shape)| (*s, erode_ring(&shape.outer, 3.0 * TOLERANCE)))
        .collect();

    for i in 0..eroded.len() {
        for j in (i + 1)..eroded.len() {
            if eroded[i].0 != eroded[j].0 {
                continue; //different sheets
            }
            let overlap = boolean::intersection(&eroded[i].1, &eroded[j].1);
            assert!(
                boolean::region_area(&overlap) < 1e-6,
                "placed shapes {i} and {j} overlap"
            );
        }
    }

    //forbidden region of the sheet: the 5x5 square at (25,25)
    for (sheet_idx, region) in &eroded {
        for obstacle in sheets[*sheet_idx].obstacles().take(1) {
            let obstacle_shape =
                obstacle.shape.translated(obstacle.position.0, obstacle.position.1);
            let overlap = boolean::intersection(region, &[obstacle_shape]);
            assert!(boolean::region_area(&overlap) < 1e-6);
        }
    }
}

#[test]
fn test_clearance_between_parts() {
    //with every part dilated by OFFSET, the true shapes keep at least
    //OFFSET - 3*TOLERANCE of clearance; eroding the dilated outlines by half the
    //offset each must therefore leave them disjoint as well
    let (_, _, placed) = run();
    let shrunk: Vec<(usize, Vec<Polygon>)> = placed
        .iter()
        .map(|(s, shape)| (*s, erode_ring(&shape.outer, OFFSET / 2.0)))
        .collect();

    for i in 0..shrunk.len() {
        for j in (i + 1)..shrunk.len() {
            if shrunk[i].0 != shrunk[j].0 {
                continue;
            }
            let overlap = boolean::intersection(&shrunk[i].1, &shrunk[j].1);
            assert!(boolean::region_area(&overlap) < 1e-6);
        }
    }
}

#[test]
fn test_part_ids_unique_in_solution() {
    let ingested = ingest::extract_parts(shapes_doc(), TOLERANCE, OFFSET).unwrap();
    let mut sheets = vec![ingest::extract_sheet(sheet_doc(), TOLERANCE, OFFSET).unwrap()];
    let config = DriverConfig {
        partial_solution: true,
        rotations: 1,
        epsilon: None,
    };
    let mut state = State::new();
    let solution = pack_decreasing(&mut sheets, &ingested.parts, &config, &mut state).unwrap();

    let mut ids: Vec<usize> = solution.placements.iter().map(|p| p.part_id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), solution.placements.len());
}

#[test]
fn test_warm_state_grows_monotonically() {
    let ingested = ingest::extract_parts(shapes_doc(), TOLERANCE, OFFSET).unwrap();
    let config = DriverConfig {
        partial_solution: true,
        rotations: 1,
        epsilon: None,
    };
    let mut state = State::new();

    let mut sheets = vec![ingest::extract_sheet(sheet_doc(), TOLERANCE, OFFSET).unwrap()];
    pack_decreasing(&mut sheets, &ingested.parts, &config, &mut state).unwrap();
    let after_first = state.len();
    assert!(after_first > 0);

    let mut sheets = vec![ingest::extract_sheet(sheet_doc(), TOLERANCE, OFFSET).unwrap()];
    pack_decreasing(&mut sheets, &ingested.parts, &config, &mut state).unwrap();
    assert_eq!(state.len(), after_first, "a repeat run computes nothing new");
}
