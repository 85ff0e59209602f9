//! In-memory assembly mapping
//!
//! An [`AssemblyMap`] holds the alignment blocks relating two coordinate
//! systems and answers interval queries with an ordered, gap-explicit
//! account of the query range. Blocks are indexed with rust-lapper for
//! O(log n + k) overlap lookup.

use std::collections::HashMap;

use rust_lapper::{Interval, Lapper};

use crate::core::coordsys::CoordinateSystem;
use crate::core::sources::{AssemblyMapper, AssemblyMapperProvider};
use crate::core::strand::Strand;

/// One result of mapping an interval between coordinate systems
///
/// Matched exhaustively by consumers; a gap is as much a result as a
/// resolved range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingResult {
    /// A sub-range that resolved to a location in the target system
    Mapped {
        reference: String,
        coord_system: CoordinateSystem,
        start: i64,
        end: i64,
        strand: Strand,
    },
    /// A sub-range of the query with no equivalent in the target system,
    /// in source coordinates
    Gap { start: i64, end: i64 },
}

impl MappingResult {
    /// Number of bases this result accounts for
    pub fn length(&self) -> i64 {
        match self {
            MappingResult::Mapped { start, end, .. } => end - start + 1,
            MappingResult::Gap { start, end } => end - start + 1,
        }
    }

    pub fn is_gap(&self) -> bool {
        matches!(self, MappingResult::Gap { .. })
    }
}

/// A contiguous alignment between a source range and a target range
///
/// Both ranges are 1-based inclusive and must span the same number of
/// bases. `orientation` is the target strand relative to the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentBlock {
    pub source_reference: String,
    pub source_start: i64,
    pub source_end: i64,
    pub target_reference: String,
    pub target_start: i64,
    pub target_end: i64,
    pub orientation: Strand,
}

/// Target-side payload stored in the interval index
#[derive(Debug, Clone, PartialEq, Eq)]
struct BlockTarget {
    reference: String,
    start: i64,
    end: i64,
    orientation: Strand,
}

/// Alignment blocks between one pair of coordinate systems
pub struct AssemblyMap {
    source: CoordinateSystem,
    target: CoordinateSystem,
    /// Source reference -> interval index over that reference
    blocks: HashMap<String, Lapper<u64, BlockTarget>>,
}

impl AssemblyMap {
    /// Build a map from alignment blocks
    ///
    /// Blocks whose source and target ranges disagree in length are
    /// dropped with a warning.
    pub fn new(
        source: CoordinateSystem,
        target: CoordinateSystem,
        blocks: Vec<AlignmentBlock>,
    ) -> Self {
        let mut by_reference: HashMap<String, Vec<Interval<u64, BlockTarget>>> = HashMap::new();

        for block in blocks {
            if block.source_end - block.source_start != block.target_end - block.target_start {
                log::warn!(
                    "dropping alignment block {}:{}-{}: source and target spans differ",
                    block.source_reference,
                    block.source_start,
                    block.source_end
                );
                continue;
            }

            // Lapper is half-open; ranges here are 1-based inclusive.
            let interval = Interval {
                start: block.source_start.max(1) as u64,
                stop: (block.source_end + 1).max(1) as u64,
                val: BlockTarget {
                    reference: block.target_reference,
                    start: block.target_start,
                    end: block.target_end,
                    orientation: block.orientation,
                },
            };

            by_reference
                .entry(block.source_reference)
                .or_default()
                .push(interval);
        }

        let blocks = by_reference
            .into_iter()
            .map(|(reference, intervals)| (reference, Lapper::new(intervals)))
            .collect();

        Self {
            source,
            target,
            blocks,
        }
    }

    pub fn source(&self) -> &CoordinateSystem {
        &self.source
    }

    pub fn target(&self) -> &CoordinateSystem {
        &self.target
    }

    /// Total number of alignment blocks in the map
    pub fn block_count(&self) -> usize {
        self.blocks.values().map(|l| l.len()).sum()
    }
}

impl AssemblyMapper for AssemblyMap {
    fn map(
        &self,
        reference: &str,
        start: i64,
        end: i64,
        strand: Strand,
        source: &CoordinateSystem,
    ) -> Vec<MappingResult> {
        if end < start {
            return vec![];
        }

        if source != &self.source {
            log::debug!(
                "assembly map {} -> {} queried with source {}",
                self.source,
                self.target,
                source
            );
            return vec![MappingResult::Gap { start, end }];
        }

        let Some(lapper) = self.blocks.get(reference) else {
            return vec![MappingResult::Gap { start, end }];
        };

        let mut hits: Vec<&Interval<u64, BlockTarget>> = lapper
            .find(start.max(1) as u64, (end + 1).max(1) as u64)
            .collect();
        hits.sort_by_key(|iv| iv.start);

        let mut results = Vec::with_capacity(hits.len() + 1);
        let mut cursor = start;

        for hit in hits {
            let block_start = hit.start as i64;
            let block_end = hit.stop as i64 - 1;

            let piece_start = block_start.max(cursor);
            let piece_end = block_end.min(end);
            if piece_end < piece_start {
                continue;
            }

            if piece_start > cursor {
                results.push(MappingResult::Gap {
                    start: cursor,
                    end: piece_start - 1,
                });
            }

            let left_offset = piece_start - block_start;
            let size = piece_end - piece_start + 1;

            let (target_start, target_end) = match hit.val.orientation {
                Strand::Forward => {
                    let target_start = hit.val.start + left_offset;
                    (target_start, target_start + size - 1)
                }
                Strand::Reverse => {
                    let target_end = hit.val.end - left_offset;
                    (target_end - size + 1, target_end)
                }
            };

            results.push(MappingResult::Mapped {
                reference: hit.val.reference.clone(),
                coord_system: self.target.clone(),
                start: target_start,
                end: target_end,
                strand: strand.combine(hit.val.orientation),
            });

            cursor = piece_end + 1;
        }

        if cursor <= end {
            results.push(MappingResult::Gap { start: cursor, end });
        }

        results
    }
}

impl std::fmt::Debug for AssemblyMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssemblyMap")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("blocks", &self.block_count())
            .finish()
    }
}

/// A collection of assembly maps keyed by coordinate-system pair
#[derive(Debug, Default)]
pub struct MapperSet {
    mappers: HashMap<(CoordinateSystem, CoordinateSystem), AssemblyMap>,
}

impl MapperSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a map; replaces any existing map for the same pair
    pub fn insert(&mut self, map: AssemblyMap) {
        self.mappers
            .insert((map.source().clone(), map.target().clone()), map);
    }

    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}

impl AssemblyMapperProvider for MapperSet {
    fn mapper_between(
        &self,
        source: &CoordinateSystem,
        target: &CoordinateSystem,
    ) -> Option<&dyn AssemblyMapper> {
        self.mappers
            .get(&(source.clone(), target.clone()))
            .map(|m| m as &dyn AssemblyMapper)
    }
}
