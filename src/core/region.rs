//! Regions on linear and circular references
//!
//! A [`Region`] is an immutable 1-based inclusive interval `[start, end]`
//! on a named reference sequence. On a circular reference the interval may
//! cross the origin, in which case `start > end` and the region covers
//! `[start, reference_length]` followed by `[1, end]`. `start == end + 1`
//! is the zero-length insertion point between two adjacent bases.
//!
//! Regions never mutate: every reshaping operation builds a new value from
//! the old one's fields. A region optionally holds a non-owning handle to a
//! [`DataSource`] for sequence and attribute lookups; without one, sequence
//! operations fall back to `N` padding.

use std::sync::{Arc, OnceLock};

use crate::core::coordsys::CoordinateSystem;
use crate::core::dna::{revcomp, revcomp_inplace, unknown_run};
use crate::core::error::RegionError;
use crate::core::sources::{Attribute, DataSource, FeatureStore};
use crate::core::strand::Strand;

/// Attribute code marking a reference sequence as circular
const CIRCULAR_ATTRIBUTE: &str = "circular";

/// An immutable interval on a reference sequence
pub struct Region {
    reference_name: String,
    reference_length: i64,
    start: i64,
    end: i64,
    strand: Strand,
    coord_system: Option<CoordinateSystem>,
    sequence: Option<Arc<str>>,
    source: Option<Arc<dyn DataSource>>,
    circular: OnceLock<bool>,
}

impl Region {
    /// Create a region after validating its construction arguments
    ///
    /// `start > end` is legal and means the interval crosses the origin of
    /// a circular reference.
    ///
    /// # Examples
    /// ```
    /// use replimap::{Region, Strand};
    ///
    /// let region = Region::new("pCT100", 1000, 990, 10, Strand::Forward)?;
    /// assert!(region.wraps());
    /// assert_eq!(region.length(), 21);
    /// # Ok::<(), replimap::RegionError>(())
    /// ```
    pub fn new(
        reference_name: impl Into<String>,
        reference_length: i64,
        start: i64,
        end: i64,
        strand: Strand,
    ) -> Result<Region, RegionError> {
        let reference_name = reference_name.into();
        if reference_name.is_empty() {
            return Err(RegionError::EmptyReferenceName);
        }
        if reference_length <= 0 {
            return Err(RegionError::NonPositiveLength(reference_length));
        }

        Ok(Region {
            reference_name,
            reference_length,
            start,
            end,
            strand,
            coord_system: None,
            sequence: None,
            source: None,
            circular: OnceLock::new(),
        })
    }

    /// Create a region whose reference length defaults to `end`
    pub fn spanning(
        reference_name: impl Into<String>,
        start: i64,
        end: i64,
        strand: Strand,
    ) -> Result<Region, RegionError> {
        Region::new(reference_name, end, start, end, strand)
    }

    /// Attach a data source for delegated sequence and attribute lookups
    pub fn with_source(mut self, source: Arc<dyn DataSource>) -> Region {
        self.source = Some(source);
        self.circular = OnceLock::new();
        self
    }

    /// Attach a coordinate-system identity
    pub fn with_coordinate_system(mut self, coord_system: CoordinateSystem) -> Region {
        self.coord_system = Some(coord_system);
        self
    }

    /// Attach a literal sequence covering the whole region
    ///
    /// The sequence is returned verbatim by [`Region::sequence`] and makes
    /// the region unresizable.
    pub fn with_sequence(mut self, sequence: impl Into<String>) -> Result<Region, RegionError> {
        let sequence = sequence.into();
        let expected = self.length();
        if sequence.len() as i64 != expected {
            return Err(RegionError::SequenceLengthMismatch {
                expected,
                actual: sequence.len(),
            });
        }
        self.sequence = Some(Arc::from(sequence));
        Ok(self)
    }

    pub fn reference_name(&self) -> &str {
        &self.reference_name
    }

    pub fn reference_length(&self) -> i64 {
        self.reference_length
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn coordinate_system(&self) -> Option<&CoordinateSystem> {
        self.coord_system.as_ref()
    }

    /// Whether a data source is attached
    pub fn is_attached(&self) -> bool {
        self.source.is_some()
    }

    /// Whether a literal sequence is attached
    pub fn has_attached_sequence(&self) -> bool {
        self.sequence.is_some()
    }

    /// Whether the interval crosses the origin of its reference
    pub fn wraps(&self) -> bool {
        self.start > self.end
    }

    /// Whether the interval is the zero-length point between two bases
    pub fn is_insertion_point(&self) -> bool {
        self.start == self.end + 1
    }

    /// Number of bases covered by the interval
    ///
    /// # Examples
    /// ```
    /// use replimap::{Region, Strand};
    ///
    /// let linear = Region::new("pCT100", 1000, 5, 48, Strand::Forward)?;
    /// assert_eq!(linear.length(), 44);
    ///
    /// let wrapped = Region::new("pCT100", 1000, 990, 10, Strand::Forward)?;
    /// assert_eq!(wrapped.length(), 21);
    /// # Ok::<(), replimap::RegionError>(())
    /// ```
    pub fn length(&self) -> i64 {
        let length = if self.wraps() {
            (self.reference_length - self.start) + self.end + 1
        } else {
            self.end - self.start + 1
        };
        length.max(0)
    }

    /// Center of the interval, possibly on a half-base boundary
    ///
    /// For an origin-crossing interval the midpoint is computed along the
    /// two arcs and wrapped back into `[1, reference_length]`.
    pub fn midpoint(&self) -> f64 {
        if self.wraps() {
            let arcs = (self.reference_length - self.start) as f64 + self.end as f64;
            let midpoint = self.start as f64 + arcs / 2.0;
            if midpoint > self.reference_length as f64 {
                midpoint - self.reference_length as f64
            } else {
                midpoint
            }
        } else {
            (self.start + self.end) as f64 / 2.0
        }
    }

    /// The bases covered by the region
    ///
    /// - the insertion point yields an empty string;
    /// - an attached literal sequence is returned verbatim;
    /// - an origin-crossing interval is served as two delegated fetches,
    ///   origin-side half last;
    /// - with no data source the result is a run of `N`.
    pub fn sequence(&self) -> String {
        if self.is_insertion_point() {
            return String::new();
        }

        if let Some(sequence) = &self.sequence {
            return sequence.to_string();
        }

        match &self.source {
            Some(source) => {
                if self.wraps() {
                    let (first, second) = self.split();
                    let mut seq = source.fetch_sequence(
                        &self.reference_name,
                        first.start(),
                        first.end(),
                        self.strand,
                    );
                    seq.push_str(&source.fetch_sequence(
                        &self.reference_name,
                        second.start(),
                        second.end(),
                        self.strand,
                    ));
                    seq
                } else {
                    source.fetch_sequence(&self.reference_name, self.start, self.end, self.strand)
                }
            }
            None => {
                log::debug!("{} has no data source, serving N padding", self);
                unknown_run(self.length())
            }
        }
    }

    /// The bases of a window given in the region's own 1-based numbering
    ///
    /// `rel_start == rel_end + 1` is the insertion point and yields an
    /// empty string. A window whose end precedes its start by more than
    /// one signals a fetch that wraps the reference origin at the storage
    /// layer and is served as two delegated fetches. Without a data
    /// source, positions outside `[1, length()]` are padded with `N` and
    /// the result is reverse complemented for a reverse-strand request.
    pub fn subsequence(&self, rel_start: i64, rel_end: i64, strand: Strand) -> String {
        if rel_start == rel_end + 1 {
            return String::new();
        }

        if self.sequence.is_none() {
            if let Some(source) = &self.source {
                if rel_end < rel_start {
                    let mut seq = source.fetch_sequence(
                        &self.reference_name,
                        rel_start,
                        self.reference_length,
                        strand,
                    );
                    seq.push_str(&source.fetch_sequence(&self.reference_name, 1, rel_end, strand));
                    return seq;
                }

                let effective = self.strand.combine(strand);
                let (abs_start, abs_end) = self.to_absolute(rel_start, rel_end);
                if abs_start > abs_end {
                    // the window straddles the origin of a wrapped parent
                    let mut seq = source.fetch_sequence(
                        &self.reference_name,
                        abs_start,
                        self.reference_length,
                        effective,
                    );
                    seq.push_str(&source.fetch_sequence(
                        &self.reference_name,
                        1,
                        abs_end,
                        effective,
                    ));
                    return seq;
                }
                return source.fetch_sequence(&self.reference_name, abs_start, abs_end, effective);
            }
        }

        self.padded_window(rel_start, rel_end, strand)
    }

    /// Slice `[rel_start, rel_end]` out of the region's own sequence,
    /// padding out-of-range positions with `N`
    fn padded_window(&self, rel_start: i64, rel_end: i64, strand: Strand) -> String {
        let length = self.length();
        let mut bytes: Vec<u8> = Vec::new();

        if rel_start < 1 {
            bytes.resize((1 - rel_start) as usize, b'N');
        }

        let window_start = rel_start.max(1);
        let window_end = rel_end.min(length);
        if window_start <= window_end {
            let whole = self.sequence();
            let lo = (window_start - 1) as usize;
            let hi = window_end as usize;
            if let Some(window) = whole.as_bytes().get(lo..hi) {
                bytes.extend_from_slice(window);
            }
        }

        if rel_end > length {
            let padded = bytes.len() + (rel_end - length) as usize;
            bytes.resize(padded, b'N');
        }

        if strand.is_reverse() {
            revcomp_inplace(&mut bytes);
        }

        bytes.into_iter().map(|b| b as char).collect()
    }

    /// Grow or shrink the region by signed basepair deltas
    ///
    /// Deltas are biological: the five-prime delta moves the upstream edge
    /// and the three-prime delta the downstream edge, so on the reverse
    /// strand they apply to the numeric `end` and `start` respectively.
    /// No floor is imposed; a caller can produce an inverted interval that
    /// is not a legal wrap, and it is the caller's responsibility to avoid
    /// that.
    ///
    /// Fails with [`RegionError::AttachedSequence`] if a literal sequence
    /// is attached; the original region is unaffected.
    pub fn expand(&self, five_prime: i64, three_prime: i64) -> Result<Region, RegionError> {
        if self.sequence.is_some() {
            return Err(RegionError::AttachedSequence);
        }

        let (start_delta, end_delta) = match self.strand {
            Strand::Forward => (-five_prime, three_prime),
            Strand::Reverse => (-three_prime, five_prime),
        };

        Ok(self.derive(self.start + start_delta, self.end + end_delta, self.strand))
    }

    /// A sub-region addressed in the region's own 1-based numbering
    ///
    /// Returns `None` when the window falls outside `[1, length()]` or is
    /// inverted; this is a non-overlapping request, not a fault. The
    /// requested strand composes with the parent's strand.
    pub fn sub_region(&self, rel_start: i64, rel_end: i64, strand: Strand) -> Option<Region> {
        let length = self.length();
        if rel_start < 1 || rel_start > length || rel_end < rel_start || rel_end > length {
            return None;
        }

        let (new_start, new_end) = self.to_absolute(rel_start, rel_end);
        Some(self.derive(new_start, new_end, self.strand.combine(strand)))
    }

    /// The whole reference this region lives on, forward strand
    ///
    /// Fails with [`RegionError::AttachedSequence`] if a literal sequence
    /// is attached.
    pub fn whole_reference(&self) -> Result<Region, RegionError> {
        if self.sequence.is_some() {
            return Err(RegionError::AttachedSequence);
        }
        Ok(self.derive(1, self.reference_length, Strand::Forward))
    }

    /// The same interval on the opposite strand
    ///
    /// An attached literal sequence is carried over reverse complemented.
    pub fn invert(&self) -> Region {
        let mut inverted = self.derive(self.start, self.end, self.strand.complement());
        if let Some(sequence) = &self.sequence {
            inverted.sequence = Some(Arc::from(revcomp(sequence)));
        }
        inverted
    }

    /// Whether the reference sequence carries the circular annotation
    ///
    /// The attribute is loaded through the data source once per instance
    /// and never refreshed; a detached region reports `false`.
    pub fn is_circular(&self) -> bool {
        *self.circular.get_or_init(|| match &self.source {
            Some(source) => !source
                .fetch_attributes(&self.reference_name, Some(CIRCULAR_ATTRIBUTE))
                .is_empty(),
            None => false,
        })
    }

    /// Attributes of the reference sequence, optionally narrowed to a code
    ///
    /// A detached region yields no attributes.
    pub fn attributes(&self, code: Option<&str>) -> Vec<Attribute> {
        match &self.source {
            Some(source) => source.fetch_attributes(&self.reference_name, code),
            None => {
                log::debug!("{} has no data source, serving no attributes", self);
                Vec::new()
            }
        }
    }

    /// All records of `store` overlapping this region
    ///
    /// An origin-crossing interval queries its two arcs and concatenates
    /// the results, origin-side arc last.
    pub fn overlapping_features<S: FeatureStore>(&self, store: &S) -> Vec<S::Record> {
        if self.wraps() {
            let (first, second) = self.split();
            let mut records =
                store.fetch_overlapping(&self.reference_name, first.start(), first.end());
            records.extend(store.fetch_overlapping(
                &self.reference_name,
                second.start(),
                second.end(),
            ));
            records
        } else {
            store.fetch_overlapping(&self.reference_name, self.start, self.end)
        }
    }

    /// Whether an absolute reference position falls inside the interval
    pub fn contains_position(&self, position: i64) -> bool {
        if position < 1 || position > self.reference_length {
            return false;
        }
        if self.wraps() {
            position >= self.start || position <= self.end
        } else {
            position >= self.start && position <= self.end
        }
    }

    /// Whether two intervals on the same reference share any base
    pub fn overlaps(&self, other: &Region) -> bool {
        if self.reference_name != other.reference_name {
            return false;
        }
        self.arcs()
            .into_iter()
            .any(|(a1, b1)| other.arcs().into_iter().any(|(a2, b2)| a1 <= b2 && a2 <= b1))
    }

    /// The non-wrapping arcs covered by the interval, in region order
    fn arcs(&self) -> Vec<(i64, i64)> {
        if self.wraps() {
            vec![(self.start, self.reference_length), (1, self.end)]
        } else {
            vec![(self.start, self.end)]
        }
    }

    /// Translate a window in region numbering to absolute coordinates,
    /// wrapping through the origin when the parent does
    fn to_absolute(&self, rel_start: i64, rel_end: i64) -> (i64, i64) {
        let (abs_start, abs_end) = match self.strand {
            Strand::Forward => (self.start + rel_start - 1, self.start + rel_end - 1),
            Strand::Reverse => (self.end - rel_end + 1, self.end - rel_start + 1),
        };
        if self.wraps() {
            (self.wrap_position(abs_start), self.wrap_position(abs_end))
        } else {
            (abs_start, abs_end)
        }
    }

    /// Fold a position back into `[1, reference_length]`
    fn wrap_position(&self, position: i64) -> i64 {
        if position > self.reference_length {
            position - self.reference_length
        } else if position < 1 {
            position + self.reference_length
        } else {
            position
        }
    }

    /// Build a new region from this one's fields with a different interval
    ///
    /// The literal sequence is not carried over: it describes the parent's
    /// interval, not the derived one.
    pub(crate) fn derive(&self, start: i64, end: i64, strand: Strand) -> Region {
        Region {
            reference_name: self.reference_name.clone(),
            reference_length: self.reference_length,
            start,
            end,
            strand,
            coord_system: self.coord_system.clone(),
            sequence: None,
            source: self.source.clone(),
            circular: OnceLock::new(),
        }
    }
}

impl Clone for Region {
    fn clone(&self) -> Self {
        Region {
            reference_name: self.reference_name.clone(),
            reference_length: self.reference_length,
            start: self.start,
            end: self.end,
            strand: self.strand,
            coord_system: self.coord_system.clone(),
            sequence: self.sequence.clone(),
            source: self.source.clone(),
            circular: self.circular.clone(),
        }
    }
}

impl PartialEq for Region {
    /// Positional identity: the data-source handle and the memoized
    /// circular flag do not participate.
    fn eq(&self, other: &Self) -> bool {
        self.reference_name == other.reference_name
            && self.reference_length == other.reference_length
            && self.start == other.start
            && self.end == other.end
            && self.strand == other.strand
            && self.coord_system == other.coord_system
            && self.sequence == other.sequence
    }
}

impl Eq for Region {}

impl std::fmt::Debug for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Region")
            .field("reference_name", &self.reference_name)
            .field("reference_length", &self.reference_length)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("strand", &self.strand)
            .field("coord_system", &self.coord_system)
            .field("sequence", &self.sequence)
            .field("attached", &self.source.is_some())
            .finish()
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}-{}({})",
            self.reference_name, self.start, self.end, self.strand
        )
    }
}
