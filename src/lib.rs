//! Replimap - coordinate geometry for circular replicons
//!
//! Regions on bacterial chromosomes and plasmids may cross the origin of
//! their reference sequence, so a single logical interval can occupy two
//! disjoint ranges of linear storage. This crate provides the region
//! value type that makes the origin-crossing state explicit, the two-arc
//! decomposition used to serve per-base queries against linear backends,
//! and a projector that maps regions between assembly coordinate systems
//! through injected collaborators.
//!
//! # Features
//!
//! - Immutable, validated region values; `start > end` legally denotes an
//!   origin-crossing interval
//! - Sequence and feature queries that transparently split at the origin
//! - Gap-aware projection between coordinate systems, with an in-memory
//!   assembly map for standalone use
//! - Parallel batch projection with rayon
//!
//! # Example
//!
//! ```
//! use replimap::{Region, Strand};
//!
//! // A 21 bp interval crossing the origin of a 1 Mb circular chromosome.
//! let region = Region::new("chrom", 1_000_000, 999_990, 10, Strand::Forward)?;
//! assert!(region.wraps());
//! assert_eq!(region.length(), 21);
//!
//! // Per-base work is served by the two arcs.
//! let (first, second) = region.split();
//! assert_eq!((first.start(), first.end()), (999_990, 1_000_000));
//! assert_eq!((second.start(), second.end()), (1, 10));
//! # Ok::<(), replimap::RegionError>(())
//! ```

pub mod core;

// Re-export commonly used types
pub use core::{
    AlignmentBlock, AssemblyMap, AssemblyMapper, AssemblyMapperProvider, Attribute,
    CoordinateSystem, CoordinateSystemRegistry, CoordinateSystems, DataSource, FeatureStore,
    IdentityNormalizer, MapperSet, MappingResult, NormalizedComponent, Normalizer, ProjectError,
    ProjectResult, ProjectionSegment, Projector, Region, RegionError, RegionResult,
    RegionResolver, Strand,
};
