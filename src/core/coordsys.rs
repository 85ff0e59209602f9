//! Coordinate system identities
//!
//! A coordinate system is a named, optionally versioned space of
//! positions (chromosome-level vs. contig-level, or two releases of the
//! same assembly). Positions are only comparable within one system;
//! crossing systems requires an assembly mapper.

/// Identity of a coordinate system
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoordinateSystem {
    name: String,
    version: Option<String>,
}

impl CoordinateSystem {
    /// Create an unversioned coordinate system
    ///
    /// # Examples
    /// ```
    /// use replimap::CoordinateSystem;
    ///
    /// let contig = CoordinateSystem::new("contig");
    /// assert_eq!(contig.name(), "contig");
    /// assert_eq!(contig.version(), None);
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    /// Create a versioned coordinate system
    ///
    /// # Examples
    /// ```
    /// use replimap::CoordinateSystem;
    ///
    /// let chromosome = CoordinateSystem::with_version("chromosome", "R64-1-1");
    /// assert_eq!(chromosome.version(), Some("R64-1-1"));
    /// ```
    pub fn with_version(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

impl std::fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}:{}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Resolves coordinate-system names to identities
///
/// Callers never compare raw name strings; they resolve once and compare
/// the returned identities.
pub trait CoordinateSystemRegistry: Sync {
    /// Look up a coordinate system by name and optional version.
    ///
    /// A version-less query matches the first registered system of that
    /// name, whatever its version.
    fn resolve(&self, name: &str, version: Option<&str>) -> Option<CoordinateSystem>;
}

/// An owned catalog of known coordinate systems
///
/// Registration order matters: a version-less `resolve` returns the
/// first match, so register default versions first.
#[derive(Debug, Clone, Default)]
pub struct CoordinateSystems {
    systems: Vec<CoordinateSystem>,
}

impl CoordinateSystems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a coordinate system to the catalog
    pub fn register(&mut self, system: CoordinateSystem) {
        if !self.systems.contains(&system) {
            self.systems.push(system);
        }
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

impl CoordinateSystemRegistry for CoordinateSystems {
    fn resolve(&self, name: &str, version: Option<&str>) -> Option<CoordinateSystem> {
        self.systems
            .iter()
            .find(|cs| {
                cs.name() == name
                    && match version {
                        Some(v) => cs.version() == Some(v),
                        None => true,
                    }
            })
            .cloned()
    }
}
