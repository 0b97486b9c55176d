// Records exchanged with the scoring platform.
//
// Field names follow the CTFd v1 REST API. Scoreboard rows use `pos` and
// `account_id` upstream, so those are accepted as aliases for `place` and
// `id`. Unknown fields on challenges, awards, and team details are kept in
// `extra` so pass-through consumers see everything upstream sent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Participants and teams
// ---------------------------------------------------------------------------

/// A single registered user on the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Free-text organisation field. Used as the grouping key when the
    /// platform has no native team concept.
    #[serde(default)]
    pub affiliation: Option<String>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub solves: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<u64>,
}

impl Participant {
    /// The affiliation, if present and non-empty.
    pub fn group_key(&self) -> Option<&str> {
        self.affiliation.as_deref().filter(|a| !a.is_empty())
    }

    pub fn score_or_zero(&self) -> i64 {
        self.score.unwrap_or(0)
    }

    pub fn solves_or_zero(&self) -> u64 {
        self.solves.unwrap_or(0)
    }
}

/// A ranked team: either a scoreboard row from upstream or a group of
/// participants sharing an affiliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(alias = "account_id")]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub solves: u64,
    /// 1-based rank position.
    #[serde(default, alias = "pos")]
    pub place: u64,
    #[serde(default)]
    pub members: Vec<Participant>,
}

// ---------------------------------------------------------------------------
// Pass-through records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub value: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Award {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub value: i64,
    #[serde(default)]
    pub team_id: Option<u64>,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of `/teams/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamDetail {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub place: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
