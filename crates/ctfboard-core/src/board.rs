// Leaderboard queries built on a `ScoreSource`.
//
// Team rankings are the one thing allowed to fail: without a scoreboard or a
// user list there is nothing to show. Challenge and award lists degrade to
// empty on any failure.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::endpoint::Endpoint;
use crate::error::{BoardError, FetchError};
use crate::model::{Award, Challenge, Participant, Team, TeamDetail};
use crate::ranking::{compute_ranked_teams, mid_band, top_band};
use crate::source::{decode, ScoreSource};

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// Every ranked team. Prefers the upstream scoreboard; the user list is only
/// fetched when the scoreboard failed or came back empty.
pub async fn all_teams<S: ScoreSource + ?Sized>(source: &S) -> Result<Vec<Team>, BoardError> {
    let scoreboard = source
        .fetch(Endpoint::Scoreboard)
        .await
        .and_then(|data| decode::<Vec<Team>>(Endpoint::Scoreboard, data));

    let scoreboard_err = match scoreboard {
        Ok(entries) if !entries.is_empty() => {
            debug!(teams = entries.len(), "ranking from scoreboard");
            return Ok(compute_ranked_teams(Some(entries), &[]));
        }
        Ok(_) => None,
        Err(e) => Some(e),
    };

    let users = source
        .fetch(Endpoint::Users)
        .await
        .and_then(|data| decode::<Vec<Participant>>(Endpoint::Users, data))
        .map_err(|users| BoardError::TeamsUnavailable {
            scoreboard: scoreboard_err,
            users,
        })?;

    debug!(users = users.len(), "ranking from user affiliations");
    Ok(compute_ranked_teams(None, &users))
}

/// Podium teams (ranks 1-3).
pub async fn top_three<S: ScoreSource + ?Sized>(source: &S) -> Result<Vec<Team>, BoardError> {
    let teams = all_teams(source).await?;
    Ok(top_band(&teams).to_vec())
}

/// Standings under the podium (ranks 4-13).
pub async fn ranked_four_to_thirteen<S: ScoreSource + ?Sized>(
    source: &S,
) -> Result<Vec<Team>, BoardError> {
    let teams = all_teams(source).await?;
    Ok(mid_band(&teams).to_vec())
}

// ---------------------------------------------------------------------------
// Pass-through lists
// ---------------------------------------------------------------------------

pub async fn all_challenges<S: ScoreSource + ?Sized>(source: &S) -> Vec<Challenge> {
    list_or_empty(source, Endpoint::Challenges).await
}

pub async fn all_awards<S: ScoreSource + ?Sized>(source: &S) -> Vec<Award> {
    list_or_empty(source, Endpoint::Awards).await
}

async fn list_or_empty<S, T>(source: &S, endpoint: Endpoint) -> Vec<T>
where
    S: ScoreSource + ?Sized,
    T: serde::de::DeserializeOwned + Send,
{
    let result = source
        .fetch(endpoint)
        .await
        .and_then(|data| decode::<Vec<T>>(endpoint, data));
    match result {
        Ok(items) => items,
        Err(e) if e.is_permission() => {
            warn!(%endpoint, "endpoint requires higher permissions, using empty list");
            Vec::new()
        }
        Err(e) => {
            warn!(%endpoint, error = %e, "using empty list");
            Vec::new()
        }
    }
}

pub async fn team_detail<S: ScoreSource + ?Sized>(
    source: &S,
    id: u64,
) -> Result<TeamDetail, FetchError> {
    let endpoint = Endpoint::Team(id);
    let data = source.fetch(endpoint).await?;
    decode(endpoint, data)
}

// ---------------------------------------------------------------------------
// Poll cycle
// ---------------------------------------------------------------------------

/// Everything the dashboard shows, from one poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoardSnapshot {
    pub top: Vec<Team>,
    pub mid: Vec<Team>,
    pub challenges: Vec<Challenge>,
    pub awards: Vec<Award>,
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Run one poll cycle: podium, standings, challenges, and awards fetched
/// concurrently. Fails only when team rankings could not be produced.
pub async fn fetch_board<S: ScoreSource + ?Sized>(source: &S) -> Result<BoardSnapshot, BoardError> {
    let (top, mid, challenges, awards) = tokio::join!(
        top_three(source),
        ranked_four_to_thirteen(source),
        all_challenges(source),
        all_awards(source),
    );

    Ok(BoardSnapshot {
        top: top?,
        mid: mid?,
        challenges,
        awards,
        fetched_at: Some(Utc::now()),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    /// Answers from a table; endpoints not in the table fail with a
    /// transport error. Records every endpoint requested.
    struct TableSource {
        answers: HashMap<Endpoint, Result<Value, FetchError>>,
        calls: Mutex<Vec<Endpoint>>,
    }

    impl TableSource {
        fn new(answers: Vec<(Endpoint, Result<Value, FetchError>)>) -> Self {
            Self {
                answers: answers.into_iter().collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Endpoint> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ScoreSource for TableSource {
        async fn fetch(&self, endpoint: Endpoint) -> Result<Value, FetchError> {
            self.calls.lock().unwrap().push(endpoint);
            self.answers.get(&endpoint).cloned().unwrap_or_else(|| {
                Err(FetchError::Transport {
                    endpoint: endpoint.path(),
                    message: "unreachable".into(),
                })
            })
        }
    }

    fn users_ab() -> Value {
        json!([
            {"id": 1, "name": "a1", "affiliation": "A", "score": 10, "solves": 1},
            {"id": 2, "name": "b1", "affiliation": "B", "score": 5, "solves": 1},
            {"id": 3, "name": "a2", "affiliation": "A", "score": 20, "solves": 2}
        ])
    }

    fn permission_error(endpoint: Endpoint) -> FetchError {
        FetchError::Permission {
            endpoint: endpoint.path(),
            message: "You don't have the permission".into(),
        }
    }

    #[tokio::test]
    async fn users_are_grouped_when_scoreboard_is_empty() {
        let source = TableSource::new(vec![
            (Endpoint::Scoreboard, Ok(json!([]))),
            (Endpoint::Users, Ok(users_ab())),
        ]);
        let teams = all_teams(&source).await.unwrap();
        let summary: Vec<(&str, i64, u64)> = teams
            .iter()
            .map(|t| (t.name.as_str(), t.score, t.place))
            .collect();
        assert_eq!(summary, vec![("A", 30, 1), ("B", 5, 2)]);
    }

    #[tokio::test]
    async fn scoreboard_skips_user_fetch() {
        let board = json!([
            {"id": 8, "name": "Upstream First", "score": 100, "solves": 3, "place": 1},
            {"id": 3, "name": "Upstream Second", "score": 90, "solves": 2, "place": 2}
        ]);
        let source = TableSource::new(vec![
            (Endpoint::Scoreboard, Ok(board)),
            (Endpoint::Users, Ok(users_ab())),
        ]);
        let teams = all_teams(&source).await.unwrap();
        assert_eq!(teams[0].id, 8);
        assert_eq!(teams[1].name, "Upstream Second");
        assert_eq!(source.calls(), vec![Endpoint::Scoreboard]);
    }

    #[tokio::test]
    async fn both_team_sources_failing_is_an_error() {
        let source = TableSource::new(vec![]);
        let err = all_teams(&source).await.unwrap_err();
        match err {
            BoardError::TeamsUnavailable { scoreboard, users } => {
                assert!(scoreboard.is_some());
                assert_eq!(users.endpoint(), "/users");
            }
        }
    }

    #[tokio::test]
    async fn challenges_and_awards_degrade_to_empty() {
        let source = TableSource::new(vec![(
            Endpoint::Challenges,
            Err(permission_error(Endpoint::Challenges)),
        )]);
        assert!(all_challenges(&source).await.is_empty());
        assert!(all_awards(&source).await.is_empty());
    }

    #[tokio::test]
    async fn malformed_challenge_list_degrades_to_empty() {
        let source = TableSource::new(vec![(Endpoint::Challenges, Ok(json!({"not": "a list"})))]);
        assert!(all_challenges(&source).await.is_empty());
    }

    #[tokio::test]
    async fn fetch_board_partial_failure_is_silent() {
        let source = TableSource::new(vec![
            (Endpoint::Scoreboard, Ok(json!([]))),
            (Endpoint::Users, Ok(users_ab())),
        ]);
        let snapshot = fetch_board(&source).await.unwrap();
        assert_eq!(snapshot.top.len(), 2);
        assert!(snapshot.mid.is_empty());
        assert!(snapshot.challenges.is_empty());
        assert!(snapshot.awards.is_empty());
        assert!(snapshot.fetched_at.is_some());
    }

    #[tokio::test]
    async fn fetch_board_fails_without_teams() {
        let source = TableSource::new(vec![(Endpoint::Challenges, Ok(json!([])))]);
        assert!(fetch_board(&source).await.is_err());
    }

    #[tokio::test]
    async fn team_detail_decodes_payload() {
        let source = TableSource::new(vec![(
            Endpoint::Team(4),
            Ok(json!({"id": 4, "name": "Heap Hoppers", "place": "2nd", "website": null})),
        )]);
        let detail = team_detail(&source, 4).await.unwrap();
        assert_eq!(detail.name, "Heap Hoppers");
        assert_eq!(detail.place, Some(json!("2nd")));
        assert!(detail.extra.contains_key("website"));

        assert!(team_detail(&source, 5).await.is_err());
    }
}
