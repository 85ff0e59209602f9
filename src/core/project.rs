//! Coordinate projection
//!
//! Projects a region into another coordinate system by composing the
//! two-arc decomposition, alias normalization, and assembly mapping.
//! The result is an ordered list of segments pairing sub-ranges of the
//! query (in its own 1-based numbering) with regions in the target
//! system; query bases with no equivalent advance the numbering without
//! emitting a segment.

use rayon::prelude::*;

use crate::core::coordsys::{CoordinateSystem, CoordinateSystemRegistry};
use crate::core::error::{ProjectError, ProjectResult};
use crate::core::mapper::MappingResult;
use crate::core::region::Region;
use crate::core::sources::{AssemblyMapperProvider, Normalizer, RegionResolver};

/// A sub-range of the query region mapped into the target system
///
/// `from_start`/`from_end` are 1-based positions in the query region's
/// own numbering; across the ordered segment list they increase
/// monotonically but need not be contiguous, since gaps consume
/// numbering silently.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionSegment {
    from_start: i64,
    from_end: i64,
    to_region: Region,
}

impl ProjectionSegment {
    pub fn from_start(&self) -> i64 {
        self.from_start
    }

    pub fn from_end(&self) -> i64 {
        self.from_end
    }

    /// The region this sub-range maps to
    pub fn to_region(&self) -> &Region {
        &self.to_region
    }

    pub fn into_region(self) -> Region {
        self.to_region
    }
}

impl std::fmt::Display for ProjectionSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{} -> {}",
            self.from_start, self.from_end, self.to_region
        )
    }
}

/// Outcome of projecting one arc of the query
enum ArcProjection {
    Segments(Vec<ProjectionSegment>),
    /// A mapping degenerated to the component's own system; the whole
    /// projection collapses to the clip-to-bounds result.
    DegenerateIdentity,
}

/// Projects regions between coordinate systems
///
/// All collaborators are injected at construction; the projector holds
/// no ambient state and a single instance can serve many projections.
pub struct Projector<'a> {
    registry: &'a dyn CoordinateSystemRegistry,
    normalizer: &'a dyn Normalizer,
    mappers: &'a dyn AssemblyMapperProvider,
    resolver: &'a dyn RegionResolver,
}

impl<'a> Projector<'a> {
    pub fn new(
        registry: &'a dyn CoordinateSystemRegistry,
        normalizer: &'a dyn Normalizer,
        mappers: &'a dyn AssemblyMapperProvider,
        resolver: &'a dyn RegionResolver,
    ) -> Self {
        Self {
            registry,
            normalizer,
            mappers,
            resolver,
        }
    }

    /// Project `region` onto the named coordinate system
    ///
    /// An unknown target system is a hard fault. A region with no data
    /// source or no coordinate system of its own cannot be projected;
    /// that is a recoverable condition reported as a warning and an
    /// empty segment list, so batch callers can continue past it.
    pub fn project(
        &self,
        region: &Region,
        target_name: &str,
        target_version: Option<&str>,
    ) -> ProjectResult<Vec<ProjectionSegment>> {
        if !region.is_attached() {
            log::warn!("cannot project {}: no data source attached", region);
            return Ok(vec![]);
        }
        let Some(source_system) = region.coordinate_system() else {
            log::warn!("cannot project {}: no coordinate system attached", region);
            return Ok(vec![]);
        };

        let target = self
            .registry
            .resolve(target_name, target_version)
            .ok_or_else(|| {
                ProjectError::UnknownCoordinateSystem(match target_version {
                    Some(version) => format!("{}:{}", target_name, version),
                    None => target_name.to_string(),
                })
            })?;

        if source_system == &target {
            return Ok(clip_to_bounds(region).into_iter().collect());
        }

        let arcs = if region.wraps() {
            let (first, second) = region.split();
            vec![first, second]
        } else {
            vec![region.clone()]
        };

        let mut segments = Vec::new();
        let mut cursor = 1i64;
        for arc in &arcs {
            match self.project_arc(arc, cursor, &target) {
                ArcProjection::Segments(mut arc_segments) => {
                    segments.append(&mut arc_segments);
                }
                ArcProjection::DegenerateIdentity => {
                    return Ok(clip_to_bounds(region).into_iter().collect());
                }
            }
            cursor += arc.length();
        }

        Ok(segments)
    }

    /// Project many regions, fanning out across threads
    ///
    /// Results come back in input order; soft faults yield empty lists
    /// per region as in [`Projector::project`].
    pub fn project_batch(
        &self,
        regions: &[Region],
        target_name: &str,
        target_version: Option<&str>,
    ) -> Vec<ProjectResult<Vec<ProjectionSegment>>> {
        regions
            .par_iter()
            .map(|region| self.project(region, target_name, target_version))
            .collect()
    }

    /// Project one non-wrapping arc of the query
    ///
    /// `logical_base` is the position of the arc's first base in the
    /// query region's numbering.
    fn project_arc(
        &self,
        arc: &Region,
        logical_base: i64,
        target: &CoordinateSystem,
    ) -> ArcProjection {
        let mut segments = Vec::new();

        for component in self.normalizer.normalize(arc) {
            let mut cursor = logical_base + component.from_start - 1;

            let Some(component_system) = component.region.coordinate_system().cloned() else {
                log::warn!(
                    "component {} of {} has no coordinate system, leaving it unmapped",
                    component.region,
                    arc
                );
                continue;
            };

            let Some(mapper) = self.mappers.mapper_between(&component_system, target) else {
                log::warn!(
                    "no assembly mapper from {} to {}, {} stays unmapped",
                    component_system,
                    target,
                    component.region
                );
                continue;
            };

            let results = mapper.map(
                component.region.reference_name(),
                component.region.start(),
                component.region.end(),
                component.region.strand(),
                &component_system,
            );

            for result in results {
                match result {
                    MappingResult::Mapped {
                        reference,
                        coord_system,
                        start,
                        end,
                        strand,
                    } => {
                        if coord_system == component_system {
                            return ArcProjection::DegenerateIdentity;
                        }

                        let length = end - start + 1;
                        match self
                            .resolver
                            .resolve_region(&reference, &coord_system, start, end, strand)
                        {
                            Some(to_region) => {
                                segments.push(ProjectionSegment {
                                    from_start: cursor,
                                    from_end: cursor + length - 1,
                                    to_region,
                                });
                            }
                            None => {
                                log::warn!(
                                    "no region for {}:{}-{} in {}, demoting to a gap",
                                    reference,
                                    start,
                                    end,
                                    coord_system
                                );
                            }
                        }
                        cursor += length;
                    }
                    MappingResult::Gap { start, end } => {
                        cursor += end - start + 1;
                    }
                }
            }
        }

        ArcProjection::Segments(segments)
    }
}

impl std::fmt::Debug for Projector<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Projector").finish_non_exhaustive()
    }
}

/// The at-most-one segment produced when no cross-system mapping is
/// needed: the region clipped to the bounds of its reference
fn clip_to_bounds(region: &Region) -> Option<ProjectionSegment> {
    if region.wraps() {
        // an origin-crossing interval is within bounds by construction
        return Some(ProjectionSegment {
            from_start: 1,
            from_end: region.length(),
            to_region: region.clone(),
        });
    }

    let clipped_start = region.start().max(1);
    let clipped_end = region.end().min(region.reference_length());
    if clipped_start > clipped_end {
        return None;
    }

    Some(ProjectionSegment {
        from_start: clipped_start - region.start() + 1,
        from_end: clipped_end - region.start() + 1,
        to_region: region.derive(clipped_start, clipped_end, region.strand()),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;
    use crate::core::coordsys::CoordinateSystems;
    use crate::core::mapper::{AlignmentBlock, AssemblyMap, MapperSet};
    use crate::core::sources::{
        AssemblyMapper, Attribute, DataSource, IdentityNormalizer, NormalizedComponent, Normalizer,
    };
    use crate::core::strand::Strand;

    struct NullSource;

    impl DataSource for NullSource {
        fn fetch_sequence(&self, _: &str, start: i64, end: i64, _: Strand) -> String {
            crate::core::dna::unknown_run(end - start + 1)
        }

        fn fetch_attributes(&self, _: &str, _: Option<&str>) -> Vec<Attribute> {
            vec![]
        }
    }

    /// Resolver backed by a table of reference lengths
    struct LengthTable {
        lengths: HashMap<String, i64>,
    }

    impl LengthTable {
        fn new(entries: &[(&str, i64)]) -> Self {
            Self {
                lengths: entries
                    .iter()
                    .map(|(name, len)| (name.to_string(), *len))
                    .collect(),
            }
        }
    }

    impl RegionResolver for LengthTable {
        fn resolve_region(
            &self,
            reference: &str,
            coord_system: &CoordinateSystem,
            start: i64,
            end: i64,
            strand: Strand,
        ) -> Option<Region> {
            let length = *self.lengths.get(reference)?;
            Region::new(reference, length, start, end, strand)
                .ok()
                .map(|r| r.with_coordinate_system(coord_system.clone()))
        }
    }

    fn contig() -> CoordinateSystem {
        CoordinateSystem::new("contig")
    }

    fn chromosome() -> CoordinateSystem {
        CoordinateSystem::with_version("chromosome", "rel2")
    }

    fn registry() -> CoordinateSystems {
        let mut systems = CoordinateSystems::new();
        systems.register(chromosome());
        systems.register(contig());
        systems
    }

    fn mappers() -> MapperSet {
        let mut set = MapperSet::new();
        set.insert(AssemblyMap::new(
            contig(),
            chromosome(),
            vec![
                AlignmentBlock {
                    source_reference: "ctg1".into(),
                    source_start: 1,
                    source_end: 100,
                    target_reference: "chrI".into(),
                    target_start: 401,
                    target_end: 500,
                    orientation: Strand::Forward,
                },
                AlignmentBlock {
                    source_reference: "ctg1".into(),
                    source_start: 151,
                    source_end: 200,
                    target_reference: "chrI".into(),
                    target_start: 601,
                    target_end: 650,
                    orientation: Strand::Reverse,
                },
            ],
        ));
        set
    }

    fn ctg_region(start: i64, end: i64) -> Region {
        Region::new("ctg1", 200, start, end, Strand::Forward)
            .unwrap()
            .with_coordinate_system(contig())
            .with_source(Arc::new(NullSource))
    }

    #[test]
    fn test_unknown_target_is_a_hard_fault() {
        let registry = registry();
        let normalizer = IdentityNormalizer;
        let mappers = mappers();
        let resolver = LengthTable::new(&[("chrI", 1000)]);
        let projector = Projector::new(&registry, &normalizer, &mappers, &resolver);

        let err = projector
            .project(&ctg_region(1, 10), "supercontig", None)
            .unwrap_err();
        assert_eq!(
            err,
            ProjectError::UnknownCoordinateSystem("supercontig".into())
        );

        let err = projector
            .project(&ctg_region(1, 10), "chromosome", Some("rel9"))
            .unwrap_err();
        assert_eq!(
            err,
            ProjectError::UnknownCoordinateSystem("chromosome:rel9".into())
        );
    }

    #[test]
    fn test_detached_region_is_a_soft_fault() {
        let registry = registry();
        let normalizer = IdentityNormalizer;
        let mappers = mappers();
        let resolver = LengthTable::new(&[("chrI", 1000)]);
        let projector = Projector::new(&registry, &normalizer, &mappers, &resolver);

        let detached = Region::new("ctg1", 200, 1, 10, Strand::Forward)
            .unwrap()
            .with_coordinate_system(contig());
        assert_eq!(
            projector.project(&detached, "chromosome", None).unwrap(),
            vec![]
        );

        let no_system = Region::new("ctg1", 200, 1, 10, Strand::Forward)
            .unwrap()
            .with_source(Arc::new(NullSource));
        assert_eq!(
            projector.project(&no_system, "chromosome", None).unwrap(),
            vec![]
        );
    }

    #[test]
    fn test_identity_projection_clips_to_bounds() {
        let registry = registry();
        let normalizer = IdentityNormalizer;
        let mappers = mappers();
        let resolver = LengthTable::new(&[("chrI", 1000)]);
        let projector = Projector::new(&registry, &normalizer, &mappers, &resolver);

        let region = ctg_region(10, 50);
        let segments = projector.project(&region, "contig", None).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].from_start(), 1);
        assert_eq!(segments[0].from_end(), region.length());
        assert_eq!(segments[0].to_region(), &region);

        // out-of-bounds edges are trimmed
        let overhanging = ctg_region(-9, 30);
        let segments = projector.project(&overhanging, "contig", None).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].from_start(), 11);
        assert_eq!(segments[0].from_end(), 40);
        assert_eq!(segments[0].to_region().start(), 1);
        assert_eq!(segments[0].to_region().end(), 30);

        // a region entirely off its reference projects to nothing
        let lost = ctg_region(300, 400);
        assert!(projector.project(&lost, "contig", None).unwrap().is_empty());
    }

    #[test]
    fn test_projection_with_gap_advances_numbering() {
        let registry = registry();
        let normalizer = IdentityNormalizer;
        let mappers = mappers();
        let resolver = LengthTable::new(&[("chrI", 1000)]);
        let projector = Projector::new(&registry, &normalizer, &mappers, &resolver);

        // [50, 160]: block to 450-500, gap over 101-150, block to 641-650
        let segments = projector
            .project(&ctg_region(50, 160), "chromosome", None)
            .unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].from_start(), 1);
        assert_eq!(segments[0].from_end(), 51);
        assert_eq!(segments[0].to_region().start(), 450);
        assert_eq!(segments[0].to_region().end(), 500);

        // the 50-base gap consumed numbering without a segment
        assert_eq!(segments[1].from_start(), 102);
        assert_eq!(segments[1].from_end(), 111);
        assert_eq!(segments[1].to_region().start(), 641);
        assert_eq!(segments[1].to_region().end(), 650);
        assert_eq!(segments[1].to_region().strand(), Strand::Reverse);
    }

    #[test]
    fn test_wrapped_region_projects_arc_by_arc() {
        let registry = registry();
        let normalizer = IdentityNormalizer;
        let mappers = mappers();
        let resolver = LengthTable::new(&[("chrI", 1000)]);
        let projector = Projector::new(&registry, &normalizer, &mappers, &resolver);

        // wraps: [190, 200] then [1, 10], both inside mapped blocks
        let segments = projector
            .project(&ctg_region(190, 10), "chromosome", None)
            .unwrap();

        assert_eq!(segments.len(), 2);
        // first arc: contig 190-200 -> reverse block
        assert_eq!(segments[0].from_start(), 1);
        assert_eq!(segments[0].from_end(), 11);
        assert_eq!(segments[0].to_region().start(), 601);
        assert_eq!(segments[0].to_region().end(), 611);
        // second arc: contig 1-10 -> forward block, numbering continues
        assert_eq!(segments[1].from_start(), 12);
        assert_eq!(segments[1].from_end(), 21);
        assert_eq!(segments[1].to_region().start(), 401);
        assert_eq!(segments[1].to_region().end(), 410);
    }

    #[test]
    fn test_missing_mapper_leaves_region_unmapped() {
        let registry = registry();
        let normalizer = IdentityNormalizer;
        let mappers = MapperSet::new();
        let resolver = LengthTable::new(&[("chrI", 1000)]);
        let projector = Projector::new(&registry, &normalizer, &mappers, &resolver);

        let segments = projector
            .project(&ctg_region(1, 10), "chromosome", None)
            .unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn test_unresolvable_target_region_demotes_to_gap() {
        let registry = registry();
        let normalizer = IdentityNormalizer;
        let mappers = mappers();
        let resolver = LengthTable::new(&[]);
        let projector = Projector::new(&registry, &normalizer, &mappers, &resolver);

        let segments = projector
            .project(&ctg_region(1, 10), "chromosome", None)
            .unwrap();
        assert!(segments.is_empty());
    }

    /// Mapper that hands every query back in its own coordinate system
    struct EchoMapper;

    impl AssemblyMapper for EchoMapper {
        fn map(
            &self,
            reference: &str,
            start: i64,
            end: i64,
            strand: Strand,
            source: &CoordinateSystem,
        ) -> Vec<MappingResult> {
            vec![MappingResult::Mapped {
                reference: reference.to_string(),
                coord_system: source.clone(),
                start,
                end,
                strand,
            }]
        }
    }

    struct EchoProvider;

    impl AssemblyMapperProvider for EchoProvider {
        fn mapper_between(
            &self,
            _: &CoordinateSystem,
            _: &CoordinateSystem,
        ) -> Option<&dyn AssemblyMapper> {
            Some(&EchoMapper)
        }
    }

    #[test]
    fn test_degenerate_identity_mapping_falls_back_to_clip() {
        let registry = registry();
        let normalizer = IdentityNormalizer;
        let resolver = LengthTable::new(&[("chrI", 1000)]);
        let projector = Projector::new(&registry, &normalizer, &EchoProvider, &resolver);

        let region = ctg_region(10, 50);
        let segments = projector.project(&region, "chromosome", None).unwrap();

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].from_start(), 1);
        assert_eq!(segments[0].from_end(), region.length());
        assert_eq!(segments[0].to_region(), &region);
    }

    /// Normalizer splitting a region into two components with a hole
    struct HoleNormalizer;

    impl Normalizer for HoleNormalizer {
        fn normalize(&self, region: &Region) -> Vec<NormalizedComponent> {
            let length = region.length();
            let first_end = length / 2 - 5;
            vec![
                NormalizedComponent {
                    from_start: 1,
                    from_end: first_end,
                    region: region.sub_region(1, first_end, Strand::Forward).unwrap(),
                },
                NormalizedComponent {
                    from_start: length / 2 + 6,
                    from_end: length,
                    region: region
                        .sub_region(length / 2 + 6, length, Strand::Forward)
                        .unwrap(),
                },
            ]
        }
    }

    #[test]
    fn test_normalized_components_keep_their_offsets() {
        let registry = registry();
        let mappers = mappers();
        let resolver = LengthTable::new(&[("chrI", 1000)]);
        let projector = Projector::new(&registry, &HoleNormalizer, &mappers, &resolver);

        // [1, 60]: components [1, 25] and [36, 60], all within the forward block
        let segments = projector
            .project(&ctg_region(1, 60), "chromosome", None)
            .unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!((segments[0].from_start(), segments[0].from_end()), (1, 25));
        assert_eq!(segments[0].to_region().start(), 401);
        assert_eq!(segments[0].to_region().end(), 425);
        assert_eq!((segments[1].from_start(), segments[1].from_end()), (36, 60));
        assert_eq!(segments[1].to_region().start(), 436);
        assert_eq!(segments[1].to_region().end(), 460);
    }

    #[test]
    fn test_project_batch_matches_serial_projection() {
        let registry = registry();
        let normalizer = IdentityNormalizer;
        let mappers = mappers();
        let resolver = LengthTable::new(&[("chrI", 1000)]);
        let projector = Projector::new(&registry, &normalizer, &mappers, &resolver);

        let regions = vec![ctg_region(1, 10), ctg_region(50, 160), ctg_region(190, 10)];
        let batched = projector.project_batch(&regions, "chromosome", None);

        assert_eq!(batched.len(), regions.len());
        for (region, batch_result) in regions.iter().zip(batched) {
            let serial = projector.project(region, "chromosome", None).unwrap();
            assert_eq!(batch_result.unwrap(), serial);
        }
    }
}
