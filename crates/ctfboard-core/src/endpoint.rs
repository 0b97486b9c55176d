// The fixed set of upstream resources the board reads.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    #[error("unknown endpoint: {0}")]
    Unknown(String),
}

/// An upstream REST resource, relative to the API base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Users,
    Scoreboard,
    Challenges,
    Awards,
    Team(u64),
}

impl Endpoint {
    /// Path appended to the API base URL, always with a leading slash.
    pub fn path(&self) -> String {
        match self {
            Endpoint::Users => "/users".to_string(),
            Endpoint::Scoreboard => "/scoreboard".to_string(),
            Endpoint::Challenges => "/challenges".to_string(),
            Endpoint::Awards => "/awards".to_string(),
            Endpoint::Team(id) => format!("/teams/{id}"),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for Endpoint {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('/').trim_end_matches('/');
        let mut parts = trimmed.split('/');
        let endpoint = match (parts.next(), parts.next(), parts.next()) {
            (Some("users"), None, _) => Endpoint::Users,
            (Some("scoreboard"), None, _) => Endpoint::Scoreboard,
            (Some("challenges"), None, _) => Endpoint::Challenges,
            (Some("awards"), None, _) => Endpoint::Awards,
            (Some("teams"), Some(id), None) => match id.parse() {
                Ok(id) => Endpoint::Team(id),
                Err(_) => return Err(EndpointError::Unknown(s.to_string())),
            },
            _ => return Err(EndpointError::Unknown(s.to_string())),
        };
        Ok(endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths() {
        assert_eq!(Endpoint::Users.path(), "/users");
        assert_eq!(Endpoint::Scoreboard.path(), "/scoreboard");
        assert_eq!(Endpoint::Team(12).to_string(), "/teams/12");
    }

    #[test]
    fn parse_tolerates_slashes() {
        assert_eq!("/users".parse::<Endpoint>(), Ok(Endpoint::Users));
        assert_eq!("awards/".parse::<Endpoint>(), Ok(Endpoint::Awards));
        assert_eq!(" /teams/9 ".parse::<Endpoint>(), Ok(Endpoint::Team(9)));
    }

    #[test]
    fn parse_rejects_unknown_paths() {
        assert!("/flags".parse::<Endpoint>().is_err());
        assert!("/users/1".parse::<Endpoint>().is_err());
        assert!("/teams/abc".parse::<Endpoint>().is_err());
        assert!("/teams/1/solves".parse::<Endpoint>().is_err());
        assert!("".parse::<Endpoint>().is_err());
    }
}
