use crate::error::ValidationError;
use crate::ids::CourtId;
use serde::{Deserialize, Serialize};

/// Authority level of a court, 1 (lowest) to 5 (apex).
///
/// Display and tiebreak attribute only. Binding force is computed from
/// hierarchy paths, never from levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AuthorityLevel(u8);

impl AuthorityLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(level: u8) -> Result<Self, ValidationError> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Self(level))
        } else {
            Err(ValidationError::InvalidAuthorityLevel(level))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn is_apex(&self) -> bool {
        self.0 == Self::MAX
    }
}

impl TryFrom<u8> for AuthorityLevel {
    type Error = ValidationError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<AuthorityLevel> for u8 {
    fn from(level: AuthorityLevel) -> Self {
        level.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Court {
    pub court_id: CourtId,
    pub name: String,
    pub authority_level: AuthorityLevel,
}

impl Court {
    pub fn new(
        court_id: CourtId,
        name: impl Into<String>,
        authority_level: u8,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            court_id,
            name: name.into(),
            authority_level: AuthorityLevel::new(authority_level)?,
        })
    }
}

/// Result of resolving a precedent court against a deciding court.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Authority {
    Binding,
    Persuasive,
    /// One of the courts is missing from the hierarchy.
    Unknown,
}

impl Authority {
    pub fn is_binding(&self) -> bool {
        matches!(self, Self::Binding)
    }
}
