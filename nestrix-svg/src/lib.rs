//! SVG surface for the `nestrix` nesting engine: document ingest, result emission and
//! the high-level [`pack`] entry point.
//!
//! Parts and sheets are described as SVG documents. Closed shapes of the parts document
//! are conservatively approximated as polygons (over-approximated by at most
//! `3 × tolerance`), shapes on a sheet document are forbidden regions, and the result
//! is one output document per sheet containing the placed shapes with their original
//! presentation attributes and a `translate(..) rotate(..)` transform.

pub mod config;
pub mod ingest;
pub mod io;
pub mod output;
pub mod path_data;
pub mod shapes;

use anyhow::{Context, Result, ensure};
use itertools::Itertools;
use log::info;

use nestrix::entities::Sheet;
use nestrix::nfp::State;
use nestrix::pack::{DriverConfig, pack_decreasing};

use crate::config::PackConfig;

/// The result of a [`pack`] call: one output document per sheet (indexed), plus the
/// number of placed and unplaceable parts.
#[derive(Clone, Debug)]
pub struct PackOutput {
    /// `(sheet index, SVG document with the parts placed on that sheet)`
    pub sheets: Vec<(usize, String)>,
    pub placed: usize,
    pub failed: usize,
}

/// Packs the closed shapes of `shapes_doc` onto the given sheets.
///
/// State selection follows the original interface: an explicit `custom_state` is used
/// when persistence is enabled; otherwise the process-wide default state
/// ([`State::global`]) when `config.persist` is set, or a throwaway state when it is not.
pub fn pack(
    sheet_docs: &[&str],
    shapes_doc: &str,
    config: &PackConfig,
    custom_state: Option<&mut State>,
) -> Result<PackOutput> {
    match (config.persist, custom_state) {
        (true, Some(state)) => pack_with_state(sheet_docs, shapes_doc, config, state),
        (true, None) => {
            let mut guard = State::global()
                .lock()
                .map_err(|_| anyhow::anyhow!("default state poisoned"))?;
            pack_with_state(sheet_docs, shapes_doc, config, &mut guard)
        }
        (false, _) => pack_with_state(sheet_docs, shapes_doc, config, &mut State::new()),
    }
}

/// [`pack`] against an explicitly owned [`State`].
pub fn pack_with_state(
    sheet_docs: &[&str],
    shapes_doc: &str,
    config: &PackConfig,
    state: &mut State,
) -> Result<PackOutput> {
    let ingested = ingest::extract_parts(shapes_doc, config.tolerance, config.offset)
        .context("failed to ingest the parts document")?;

    let mut sheets: Vec<Sheet> = sheet_docs
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            ingest::extract_sheet(doc, config.tolerance, config.offset)
                .with_context(|| format!("failed to ingest sheet {i}"))
        })
        .try_collect()?;

    let driver_config = DriverConfig {
        partial_solution: config.partial_solution,
        rotations: config.rotations,
        epsilon: None,
    };
    let solution = pack_decreasing(&mut sheets, &ingested.parts, &driver_config, state)?;

    //sanity: no part is placed twice, and without partial solutions it is all or nothing
    debug_assert!(
        solution
            .placements
            .iter()
            .map(|p| p.part_id)
            .all_unique()
    );
    ensure!(
        config.partial_solution
            || solution.placements.is_empty()
            || solution.placements.len() == ingested.parts.len(),
        "incomplete solution although partial solutions are disabled"
    );

    let mut outputs = Vec::with_capacity(sheet_docs.len());
    for (i, doc) in sheet_docs.iter().enumerate() {
        let on_sheet = solution
            .placements
            .iter()
            .filter(|p| p.sheet_index == i)
            .cloned()
            .collect_vec();
        let out = output::sheet_document(doc, &on_sheet, &ingested.parts, &ingested.elements)
            .with_context(|| format!("failed to emit sheet {i}"))?;
        outputs.push((i, out));
    }

    info!(
        "[PACK] {} placed, {} failed across {} sheet(s)",
        solution.placed,
        solution.failed,
        sheet_docs.len()
    );

    Ok(PackOutput {
        sheets: outputs,
        placed: solution.placed,
        failed: solution.failed,
    })
}

/// An empty sheet document of the given dimensions.
pub fn blank_sheet(width: f64, height: f64) -> String {
    format!(r#"<svg viewBox="0 0 {width} {height}" width="{width}" height="{height}"></svg>"#)
}
