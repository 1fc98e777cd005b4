use crate::ids::LogicalId;
use crate::temporal::ValidityWindow;
use bytes::Bytes;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of versioned legal entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Statute,
    Section,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Statute => write!(f, "Statute"),
            Self::Section => write!(f, "Section"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VersionStatus {
    Active,
    Repealed,
    Superseded,
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Repealed => write!(f, "Repealed"),
            Self::Superseded => write!(f, "Superseded"),
        }
    }
}

/// One immutable version of a logical entity.
///
/// Versions are never edited in place. An amendment appends version N+1 and
/// closes version N's `effective_to`; a repeal is a version with
/// `status = Repealed`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityVersion {
    pub logical_id: LogicalId,
    pub entity_kind: EntityKind,
    /// Positive, strictly increasing per logical id.
    pub version_number: u32,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    /// Opaque payload, e.g. the section text.
    pub content: Bytes,
    pub status: VersionStatus,
}

impl EntityVersion {
    /// An open-ended `Active` version.
    pub fn new(
        logical_id: LogicalId,
        entity_kind: EntityKind,
        version_number: u32,
        effective_from: NaiveDate,
        content: impl Into<Bytes>,
    ) -> Self {
        Self {
            logical_id,
            entity_kind,
            version_number,
            effective_from,
            effective_to: None,
            content: content.into(),
            status: VersionStatus::Active,
        }
    }

    pub fn with_effective_to(mut self, effective_to: NaiveDate) -> Self {
        self.effective_to = Some(effective_to);
        self
    }

    pub fn with_status(mut self, status: VersionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn window(&self) -> ValidityWindow {
        ValidityWindow {
            effective_from: self.effective_from,
            effective_to: self.effective_to,
        }
    }

    pub fn is_open(&self) -> bool {
        self.effective_to.is_none()
    }

    pub fn is_in_force_at(&self, date: NaiveDate) -> bool {
        self.window().contains(date)
    }

    /// A copy of this version bounded at `effective_to`; the status is kept.
    pub fn closed_at(&self, effective_to: NaiveDate) -> Self {
        Self {
            effective_to: Some(effective_to),
            ..self.clone()
        }
    }

    /// Content as UTF-8 text, if it is valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }
}
