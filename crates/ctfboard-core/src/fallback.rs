// Placeholder data for when the platform cannot be reached.
//
// `FallbackSource` wraps another source and, on failure or when the payload
// does not have the shape its endpoint promises, answers with a fixed
// dataset chosen by endpoint. The scoreboard placeholder is empty so
// rankings are derived from the placeholder participants, which keeps the
// podium populated with a consistent set of teams.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::endpoint::Endpoint;
use crate::error::FetchError;
use crate::model::{Award, Challenge, Participant, Team, TeamDetail};
use crate::ranking::group_by_affiliation;
use crate::source::ScoreSource;

// ---------------------------------------------------------------------------
// FallbackSource
// ---------------------------------------------------------------------------

/// A source that never fails for users, scoreboard, challenges, or awards.
pub struct FallbackSource<S> {
    inner: S,
}

impl<S> FallbackSource<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: ScoreSource> ScoreSource for FallbackSource<S> {
    async fn fetch(&self, endpoint: Endpoint) -> Result<Value, FetchError> {
        let live = self
            .inner
            .fetch(endpoint)
            .await
            .and_then(|data| check_shape(endpoint, &data).map(|()| data));
        match live {
            Ok(data) => Ok(data),
            Err(err) => match placeholder(endpoint) {
                Some(data) => {
                    info!(%endpoint, error = %err, "serving placeholder data");
                    Ok(data)
                }
                None => Err(err),
            },
        }
    }
}

/// Fails with `FetchError::Payload` unless `data` decodes as the records
/// `endpoint` serves.
fn check_shape(endpoint: Endpoint, data: &Value) -> Result<(), FetchError> {
    match endpoint {
        Endpoint::Users => conforms::<Vec<Participant>>(endpoint, data),
        Endpoint::Scoreboard => conforms::<Vec<Team>>(endpoint, data),
        Endpoint::Challenges => conforms::<Vec<Challenge>>(endpoint, data),
        Endpoint::Awards => conforms::<Vec<Award>>(endpoint, data),
        Endpoint::Team(_) => conforms::<TeamDetail>(endpoint, data),
    }
}

fn conforms<T: DeserializeOwned>(endpoint: Endpoint, data: &Value) -> Result<(), FetchError> {
    <T as Deserialize>::deserialize(data)
        .map(|_| ())
        .map_err(|e| FetchError::Payload {
            endpoint: endpoint.path(),
            message: e.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Placeholder dataset
// ---------------------------------------------------------------------------

/// Placeholder payload for `endpoint`, shaped like the live data payload.
///
/// `Team(id)` resolves against the teams ranked from the placeholder
/// participants; ids outside that ranking have no placeholder.
pub fn placeholder(endpoint: Endpoint) -> Option<Value> {
    match endpoint {
        Endpoint::Users => serde_json::to_value(placeholder_users()).ok(),
        Endpoint::Scoreboard => Some(Value::Array(Vec::new())),
        Endpoint::Challenges => serde_json::to_value(placeholder_challenges()).ok(),
        Endpoint::Awards => serde_json::to_value(placeholder_awards()).ok(),
        Endpoint::Team(id) => group_by_affiliation(&placeholder_users())
            .into_iter()
            .find(|team| team.id == id)
            .and_then(|team| serde_json::to_value(team).ok()),
    }
}

fn participant(
    id: u64,
    name: &str,
    affiliation: Option<&str>,
    score: i64,
    solves: u64,
) -> Participant {
    Participant {
        id,
        name: name.to_string(),
        email: None,
        affiliation: affiliation.map(str::to_string),
        score: Some(score),
        solves: Some(solves),
        place: None,
    }
}

pub fn placeholder_users() -> Vec<Participant> {
    vec![
        participant(1, "alice", Some("Null Pointers"), 500, 5),
        participant(2, "bob", Some("Null Pointers"), 350, 4),
        participant(3, "carol", Some("Stack Smashers"), 700, 6),
        participant(4, "dave", Some("Heap Hoppers"), 300, 3),
        participant(5, "erin", Some("Stack Smashers"), 100, 1),
        participant(6, "frank", None, 250, 2),
        participant(7, "grace", Some("Bit Flippers"), 420, 4),
        participant(8, "heidi", Some("Heap Hoppers"), 90, 1),
    ]
}

fn challenge(id: u64, name: &str, category: &str, value: i64, description: &str) -> Challenge {
    Challenge {
        id,
        name: name.to_string(),
        category: category.to_string(),
        value,
        description: Some(description.to_string()),
        state: Some("visible".to_string()),
        extra: Map::new(),
    }
}

pub fn placeholder_challenges() -> Vec<Challenge> {
    vec![
        challenge(1, "Warmup", "misc", 50, "Find the flag in the rules page."),
        challenge(2, "Cookie Monster", "web", 100, "The admin trusts its cookies."),
        challenge(3, "XOR Madness", "crypto", 150, "One key, many messages."),
        challenge(4, "Baby ROP", "pwn", 200, "Return to where it all began."),
    ]
}

pub fn placeholder_awards() -> Vec<Award> {
    vec![
        Award {
            id: 1,
            name: "First Blood".to_string(),
            description: Some("First solve of Baby ROP".to_string()),
            category: Some("bonus".to_string()),
            value: 50,
            team_id: None,
            user_id: Some(3),
            extra: Map::new(),
        },
        Award {
            id: 2,
            name: "Hint".to_string(),
            description: Some("Unlocked a hint for XOR Madness".to_string()),
            category: Some("hint".to_string()),
            value: -10,
            team_id: None,
            user_id: Some(2),
            extra: Map::new(),
        },
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
