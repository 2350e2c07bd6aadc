//! Semantic versioning of abilities, assignments, and positions.
//!
//! Every edit to one of these records is classified by the author with a
//! `version_type`. Creation picks the starting version from how finished the
//! record is; an update bumps exactly one component and resets the lower
//! ones. Versions are never decremented.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::validation::{FieldErrors, MSG_BLANK};

/// Attribute name that version-type errors are attached to.
pub const FIELD_VERSION_TYPE: &str = "version_type";

/* --------------------------------------------------------------------------
Version types
-------------------------------------------------------------------------- */

/// Record is complete and ready for use.
pub const VERSION_READY: &str = "ready";

/// Record is mostly done.
pub const VERSION_NEARLY_READY: &str = "nearly_ready";

/// Record is an early draft.
pub const VERSION_EARLY_DRAFT: &str = "early_draft";

/// Change alters the meaning of the record.
pub const VERSION_FUNDAMENTAL: &str = "fundamental";

/// Change clarifies without altering meaning.
pub const VERSION_CLARIFYING: &str = "clarifying";

/// Typo-level change.
pub const VERSION_INSIGNIFICANT: &str = "insignificant";

/// Reported when the component a bump targets is already at its maximum.
pub const MSG_VERSION_EXHAUSTED: &str = "can't be bumped any further";

/// Values accepted when creating a record.
pub const CREATE_VERSION_TYPES: &[&str] =
    &[VERSION_READY, VERSION_NEARLY_READY, VERSION_EARLY_DRAFT];

/// Values accepted when updating a record.
pub const UPDATE_VERSION_TYPES: &[&str] =
    &[VERSION_FUNDAMENTAL, VERSION_CLARIFYING, VERSION_INSIGNIFICANT];

/* --------------------------------------------------------------------------
SemanticVersion
-------------------------------------------------------------------------- */

/// A `major.minor.patch` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SemanticVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SemanticVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a stored `"X.Y.Z"` string.
    pub fn parse(value: &str) -> Result<Self, String> {
        let parts: Vec<&str> = value.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(format!(
                "Invalid semantic version '{value}'. Expected MAJOR.MINOR.PATCH"
            ));
        }

        let mut numbers = [0u32; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| format!("Invalid semantic version '{value}'. Segment '{part}' is not a number"))?;
        }

        Ok(Self::new(numbers[0], numbers[1], numbers[2]))
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SemanticVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for SemanticVersion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SemanticVersion {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/* --------------------------------------------------------------------------
Policy
-------------------------------------------------------------------------- */

fn blank_version_type() -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.add(FIELD_VERSION_TYPE, MSG_BLANK);
    errors
}

/// Version assigned to a newly created record.
///
/// Anything other than one of [`CREATE_VERSION_TYPES`] (including a missing
/// value) is reported as a blank `version_type`.
pub fn initial_version(version_type: Option<&str>) -> Result<SemanticVersion, FieldErrors> {
    match version_type.map(str::trim) {
        Some(VERSION_READY) => Ok(SemanticVersion::new(1, 0, 0)),
        Some(VERSION_NEARLY_READY) => Ok(SemanticVersion::new(0, 1, 0)),
        Some(VERSION_EARLY_DRAFT) => Ok(SemanticVersion::new(0, 0, 1)),
        _ => Err(blank_version_type()),
    }
}

/// Version after an edit classified by `version_type`.
pub fn next_version(
    current: SemanticVersion,
    version_type: Option<&str>,
) -> Result<SemanticVersion, FieldErrors> {
    let SemanticVersion {
        major,
        minor,
        patch,
    } = current;

    let bumped = match version_type.map(str::trim) {
        Some(VERSION_FUNDAMENTAL) => major.checked_add(1).map(|m| SemanticVersion::new(m, 0, 0)),
        Some(VERSION_CLARIFYING) => minor
            .checked_add(1)
            .map(|m| SemanticVersion::new(major, m, 0)),
        Some(VERSION_INSIGNIFICANT) => patch
            .checked_add(1)
            .map(|p| SemanticVersion::new(major, minor, p)),
        _ => return Err(blank_version_type()),
    };

    bumped.ok_or_else(|| {
        let mut errors = FieldErrors::new();
        errors.add(FIELD_VERSION_TYPE, MSG_VERSION_EXHAUSTED);
        errors
    })
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
