// Team ranking: turn a scoreboard or a participant list into ranked teams
// and slice the result into display bands.
//
// Two inputs satisfy the same contract. A non-empty scoreboard from upstream
// is already ranked and is used as-is. Otherwise participants are grouped by
// affiliation, their scores and solves summed, and the groups sorted by
// score. Places are always the dense sequence 1..=N.

use std::collections::HashMap;

use crate::model::{Participant, Team};

/// Number of teams on the podium.
pub const TOP_BAND_LEN: usize = 3;

/// Last rank (inclusive) shown in the standings under the podium.
pub const MID_BAND_LAST_RANK: usize = 13;

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Rank teams from whichever input is usable.
///
/// A non-empty `scoreboard` wins and is returned unchanged in content and
/// order. Otherwise the participants are grouped by affiliation.
pub fn compute_ranked_teams(
    scoreboard: Option<Vec<Team>>,
    participants: &[Participant],
) -> Vec<Team> {
    match scoreboard {
        Some(entries) if !entries.is_empty() => entries,
        _ => group_by_affiliation(participants),
    }
}

/// Group participants sharing an affiliation into teams, ranked by total score.
///
/// Participants without an affiliation are left out. Members keep the order
/// they were encountered in; equal scores keep first-seen group order.
pub fn group_by_affiliation(participants: &[Participant]) -> Vec<Team> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<Participant>)> = Vec::new();

    for participant in participants {
        let Some(key) = participant.group_key() else {
            continue;
        };
        match index.get(key) {
            Some(&i) => groups[i].1.push(participant.clone()),
            None => {
                index.insert(key, groups.len());
                groups.push((key, vec![participant.clone()]));
            }
        }
    }

    let mut teams: Vec<Team> = groups
        .into_iter()
        .map(|(name, members)| Team {
            id: 0,
            name: name.to_string(),
            score: team_score(&members),
            solves: team_solves(&members),
            place: 0,
            members,
        })
        .collect();

    // Stable: ties keep first-seen group order.
    teams.sort_by(|a, b| b.score.cmp(&a.score));
    assign_places(&mut teams);
    teams
}

/// Number teams 1..=N in their current order. Derived teams have no
/// upstream identity, so the id follows the place.
pub fn assign_places(teams: &mut [Team]) {
    for (i, team) in teams.iter_mut().enumerate() {
        let place = i as u64 + 1;
        team.place = place;
        team.id = place;
    }
}

pub fn team_score(members: &[Participant]) -> i64 {
    members.iter().map(Participant::score_or_zero).sum()
}

pub fn team_solves(members: &[Participant]) -> u64 {
    members.iter().map(Participant::solves_or_zero).sum()
}

/// Name to display for a team, substituting a label for blank names.
pub fn display_name(name: &str) -> &str {
    if name.trim().is_empty() {
        "Unknown Team"
    } else {
        name
    }
}

// ---------------------------------------------------------------------------
// Bands
// ---------------------------------------------------------------------------

/// Ranks 1..=3. Shorter when fewer teams exist.
pub fn top_band(teams: &[Team]) -> &[Team] {
    &teams[..teams.len().min(TOP_BAND_LEN)]
}

/// Ranks 4..=13. Empty or short when fewer teams exist.
pub fn mid_band(teams: &[Team]) -> &[Team] {
    let start = teams.len().min(TOP_BAND_LEN);
    let end = teams.len().min(MID_BAND_LAST_RANK);
    &teams[start..end]
}

/// The three podium positions, `None` where no team holds the place.
pub fn podium_slots(top: &[Team]) -> [Option<&Team>; TOP_BAND_LEN] {
    [top.first(), top.get(1), top.get(2)]
}

/// Both display bands cut from one ranked list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bands {
    pub top: Vec<Team>,
    pub mid: Vec<Team>,
}

impl Bands {
    pub fn from_ranked(teams: &[Team]) -> Self {
        Bands {
            top: top_band(teams).to_vec(),
            mid: mid_band(teams).to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
