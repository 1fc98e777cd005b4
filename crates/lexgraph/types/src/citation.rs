use crate::ids::CaseId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Formal legal category of a citation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CitationKind {
    Followed,
    Distinguished,
    Overruled,
    Approved,
    Neutral,
}

impl CitationKind {
    pub const ALL: [CitationKind; 5] = [
        Self::Followed,
        Self::Distinguished,
        Self::Overruled,
        Self::Approved,
        Self::Neutral,
    ];

    /// Influence weight of one incoming citation of this kind.
    pub fn weight(&self) -> f64 {
        match self {
            Self::Followed => 1.0,
            Self::Approved => 1.0,
            Self::Neutral => 0.5,
            Self::Distinguished => 0.3,
            Self::Overruled => 0.0,
        }
    }

    pub fn default_treatment(&self) -> Treatment {
        match self {
            Self::Followed | Self::Approved => Treatment::Positive,
            Self::Neutral | Self::Distinguished => Treatment::Neutral,
            Self::Overruled => Treatment::Negative,
        }
    }

    /// Kinds that can reinstate an overruled precedent.
    pub fn is_endorsement(&self) -> bool {
        matches!(self, Self::Followed | Self::Approved)
    }
}

impl fmt::Display for CitationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Followed => write!(f, "Followed"),
            Self::Distinguished => write!(f, "Distinguished"),
            Self::Overruled => write!(f, "Overruled"),
            Self::Approved => write!(f, "Approved"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Directional sentiment of a citation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Treatment {
    Positive,
    Neutral,
    Negative,
}

impl Treatment {
    /// Positive against Negative, in either order.
    pub fn disagrees_with(&self, other: &Treatment) -> bool {
        matches!(
            (self, other),
            (Self::Positive, Self::Negative) | (Self::Negative, Self::Positive)
        )
    }
}

impl fmt::Display for Treatment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => write!(f, "Positive"),
            Self::Neutral => write!(f, "Neutral"),
            Self::Negative => write!(f, "Negative"),
        }
    }
}

/// Directed citation `from` (citing) -> `to` (cited).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationEdge {
    pub from: CaseId,
    pub to: CaseId,
    pub kind: CitationKind,
    pub treatment: Treatment,
}

impl CitationEdge {
    pub fn new(from: CaseId, to: CaseId, kind: CitationKind) -> Self {
        Self {
            from,
            to,
            kind,
            treatment: kind.default_treatment(),
        }
    }

    pub fn with_treatment(mut self, treatment: Treatment) -> Self {
        self.treatment = treatment;
        self
    }

    /// Derived from the kind, never stored per edge.
    pub fn weight(&self) -> f64 {
        self.kind.weight()
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

impl fmt::Display for CitationEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -[{}]-> {}", self.from, self.kind, self.to)
    }
}
