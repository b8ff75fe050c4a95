//! The persistent NFP cache ([`State`]).

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::f64::consts::PI;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, OnceLock};

use log::debug;

use crate::fsize;
use crate::geometry::primitives::Polygon;
use crate::nfp::{Nfp, NfpResult};

/// Translation-invariant identity of a shape: a content hash of its vertex coordinates
/// relative to its reference vertex. Identical shapes produce identical ids across pack
/// calls, which is what makes the cache effective on overlapping shape sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShapeId(pub u64);

/// A rotation quantized to microdegrees, so equal rotations from different rotation
/// sets (e.g. 180° out of 2 and out of 4) share cache entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RotKey(pub u32);

impl RotKey {
    pub fn from_angle(angle: fsize) -> Self {
        let normalized = angle.rem_euclid(2.0 * PI);
        RotKey((normalized.to_degrees() * 1000.0).round() as u32)
    }
}

/// Key of one cached no-fit polygon: the stationary shape, the orbiting shape and the
/// orbiter's rotation. Positions do not participate; NFPs are position-independent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NfpKey {
    pub stationary: ShapeId,
    pub orbiter: ShapeId,
    pub orbiter_rot: RotKey,
}

/// Computes the [`ShapeId`] of a polygon: a hash over all ring coordinates expressed
/// relative to the polygon's reference vertex.
pub fn shape_fingerprint(poly: &Polygon) -> ShapeId {
    let refp = poly.reference_point();
    let mut hasher = DefaultHasher::new();
    for ring in poly.rings() {
        ring.n_points().hash(&mut hasher);
        for p in &ring.points {
            (p.0 - refp.0).to_bits().hash(&mut hasher);
            (p.1 - refp.1).to_bits().hash(&mut hasher);
        }
    }
    ShapeId(hasher.finish())
}

/// Owns the memoized no-fit polygons. Monotonically growing; dropped as a whole.
///
/// A `State` is exclusively mutable by the pack call currently using it. The process-wide
/// default instance is reachable through [`State::global`] and must not be used from
/// multiple threads without the surrounding [`Mutex`].
#[derive(Default)]
pub struct State {
    cache: HashMap<NfpKey, Arc<Nfp>>,
    hits: usize,
    misses: usize,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached NFP for `key`, or computes, stores and returns it.
    /// Cached entries are immutable; a hit returns the identical rings as the original
    /// computation, so caching never changes placement results.
    pub fn nfp_entry(
        &mut self,
        key: NfpKey,
        compute: impl FnOnce() -> NfpResult<Nfp>,
    ) -> NfpResult<Arc<Nfp>> {
        if let Some(cached) = self.cache.get(&key) {
            self.hits += 1;
            return Ok(cached.clone());
        }
        self.misses += 1;
        let nfp = Arc::new(compute()?);
        debug!(
            "[NFP] cached entry for {key:?} ({} total)",
            self.cache.len() + 1
        );
        self.cache.insert(key, nfp.clone());
        Ok(nfp)
    }

    /// Number of distinct NFPs held by this state.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// (hits, misses) counters since creation.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }

    /// The process-wide default state, created on first use.
    pub fn global() -> &'static Mutex<State> {
        static GLOBAL: OnceLock<Mutex<State>> = OnceLock::new();
        GLOBAL.get_or_init(|| Mutex::new(State::new()))
    }
}
