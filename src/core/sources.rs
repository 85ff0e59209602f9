//! Collaborator interfaces
//!
//! Everything a region or projector needs from the surrounding system
//! arrives through one of these seams. A region holds at most one opaque
//! [`DataSource`]; the projector receives its collaborators explicitly at
//! construction. There is no ambient registry to consult.

use crate::core::coordsys::CoordinateSystem;
use crate::core::mapper::MappingResult;
use crate::core::region::Region;
use crate::core::strand::Strand;

/// An annotation attached to a reference sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub code: String,
    pub value: String,
}

impl Attribute {
    pub fn new(code: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            value: value.into(),
        }
    }
}

/// Sequence and attribute access behind a region's source handle
///
/// Coordinates are 1-based inclusive positions on the named reference.
/// Implementations are expected to return the reverse complement for
/// [`Strand::Reverse`] fetches.
pub trait DataSource: Send + Sync {
    /// Fetch the bases of `[start, end]` on `reference`
    fn fetch_sequence(&self, reference: &str, start: i64, end: i64, strand: Strand) -> String;

    /// Fetch attributes of `reference`, optionally narrowed to one code
    fn fetch_attributes(&self, reference: &str, code: Option<&str>) -> Vec<Attribute>;
}

/// Overlap queries against one category of feature
pub trait FeatureStore {
    /// The record type this store yields
    type Record;

    /// All records overlapping `[start, end]` on `reference`
    fn fetch_overlapping(&self, reference: &str, start: i64, end: i64) -> Vec<Self::Record>;
}

/// One component of an alias decomposition
///
/// `from_start`/`from_end` are 1-based offsets within the region that was
/// normalized; components are returned in left-to-right order and need
/// not cover the whole region.
#[derive(Debug, Clone)]
pub struct NormalizedComponent {
    pub from_start: i64,
    pub from_end: i64,
    pub region: Region,
}

/// Decomposes a region into its alias components
///
/// Haplotype and pseudo-autosomal references are reachable through more
/// than one coordinate path; normalization rewrites a region into the
/// components that can actually be mapped.
pub trait Normalizer: Sync {
    fn normalize(&self, region: &Region) -> Vec<NormalizedComponent>;
}

/// Pass-through decomposition for references with no aliases
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityNormalizer;

impl Normalizer for IdentityNormalizer {
    fn normalize(&self, region: &Region) -> Vec<NormalizedComponent> {
        vec![NormalizedComponent {
            from_start: 1,
            from_end: region.length(),
            region: region.clone(),
        }]
    }
}

/// Turns a mapped coordinate range into a concrete region
pub trait RegionResolver: Sync {
    fn resolve_region(
        &self,
        reference: &str,
        coord_system: &CoordinateSystem,
        start: i64,
        end: i64,
        strand: Strand,
    ) -> Option<Region>;
}

/// Maps intervals out of one coordinate system
///
/// Results come back in query order and account for every base of the
/// query: sub-ranges with no equivalent in the target system are explicit
/// [`MappingResult::Gap`]s, never silently dropped.
pub trait AssemblyMapper: Sync {
    fn map(
        &self,
        reference: &str,
        start: i64,
        end: i64,
        strand: Strand,
        source: &CoordinateSystem,
    ) -> Vec<MappingResult>;
}

/// Hands out mappers for pairs of coordinate systems
pub trait AssemblyMapperProvider: Sync {
    /// The mapper for `source` -> `target`, if one is known
    fn mapper_between(
        &self,
        source: &CoordinateSystem,
        target: &CoordinateSystem,
    ) -> Option<&dyn AssemblyMapper>;
}
