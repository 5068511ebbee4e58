//! Actor roster records
//!
//! The labeled and unlabeled rosters share one record type; the label is the
//! only thing that tells the two apart once they are concatenated.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a labeled actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Human,
    Robot,
}

impl Label {
    /// Parse the roster's `outcome` field (`0`, `1`, `0.0`, `1.0`)
    pub fn from_outcome(value: f64) -> Option<Self> {
        if value == 0.0 {
            Some(Label::Human)
        } else if value == 1.0 {
            Some(Label::Robot)
        } else {
            None
        }
    }

    /// Numeric target used by the classifier
    pub fn target(self) -> f64 {
        match self {
            Label::Human => 0.0,
            Label::Robot => 1.0,
        }
    }

    pub fn is_robot(self) -> bool {
        matches!(self, Label::Robot)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Human => write!(f, "human"),
            Label::Robot => write!(f, "robot"),
        }
    }
}

/// One roster row as read from CSV. `outcome` is absent in the unlabeled roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRosterRecord {
    pub bidder_id: String,
    #[serde(default)]
    pub payment_account: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub outcome: Option<f64>,
}

/// A roster actor with an optional outcome label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRecord {
    pub bidder_id: String,
    pub payment_account: String,
    pub address: String,
    pub label: Option<Label>,
}

impl RosterRecord {
    pub fn labeled(&self) -> bool {
        self.label.is_some()
    }
}
