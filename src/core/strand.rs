//! Strand orientation
//!
//! Regions and mapping results carry an orientation relative to their
//! reference sequence. Orientations compose multiplicatively when a
//! region is derived from another region or mapped across assemblies.

use crate::core::error::RegionError;

/// Orientation of an interval on its reference sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Strand {
    #[default]
    Forward,
    Reverse,
}

impl Strand {
    /// Get the opposite strand
    ///
    /// # Examples
    /// ```
    /// use replimap::Strand;
    /// assert_eq!(Strand::Forward.complement(), Strand::Reverse);
    /// assert_eq!(Strand::Reverse.complement(), Strand::Forward);
    /// ```
    pub fn complement(&self) -> Self {
        match self {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
        }
    }

    /// Compose two strands multiplicatively
    ///
    /// A derived region's absolute orientation is the parent orientation
    /// combined with the requested relative orientation:
    /// two reversals cancel out.
    ///
    /// # Examples
    /// ```
    /// use replimap::Strand;
    /// assert_eq!(Strand::Forward.combine(Strand::Forward), Strand::Forward);
    /// assert_eq!(Strand::Forward.combine(Strand::Reverse), Strand::Reverse);
    /// assert_eq!(Strand::Reverse.combine(Strand::Reverse), Strand::Forward);
    /// ```
    pub fn combine(&self, other: Strand) -> Strand {
        match (self, other) {
            (Strand::Forward, Strand::Forward) => Strand::Forward,
            (Strand::Forward, Strand::Reverse) => Strand::Reverse,
            (Strand::Reverse, Strand::Forward) => Strand::Reverse,
            (Strand::Reverse, Strand::Reverse) => Strand::Forward,
        }
    }

    /// Check whether this is the reverse strand
    pub fn is_reverse(&self) -> bool {
        matches!(self, Strand::Reverse)
    }

    /// Convert to the `+1`/`-1` convention
    ///
    /// # Examples
    /// ```
    /// use replimap::Strand;
    /// assert_eq!(Strand::Forward.to_i8(), 1);
    /// assert_eq!(Strand::Reverse.to_i8(), -1);
    /// ```
    pub fn to_i8(&self) -> i8 {
        match self {
            Strand::Forward => 1,
            Strand::Reverse => -1,
        }
    }

    /// Parse strand from char
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Strand::Forward),
            '-' => Some(Strand::Reverse),
            _ => None,
        }
    }

    /// Convert to char
    pub fn to_char(&self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl TryFrom<i8> for Strand {
    type Error = RegionError;

    /// Accepts the `+1`/`-1` convention; anything else is an
    /// invalid-argument fault.
    ///
    /// # Examples
    /// ```
    /// use replimap::Strand;
    /// assert_eq!(Strand::try_from(1), Ok(Strand::Forward));
    /// assert_eq!(Strand::try_from(-1), Ok(Strand::Reverse));
    /// assert!(Strand::try_from(0).is_err());
    /// ```
    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Strand::Forward),
            -1 => Ok(Strand::Reverse),
            other => Err(RegionError::InvalidStrand(other)),
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}
