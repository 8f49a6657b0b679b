//! Leaderboard records shared by the wasm client and the REST service.

use serde::{Deserialize, Serialize};

/// Longest accepted username, counted in characters after trimming.
pub const USERNAME_MAX_LEN: usize = 15;
/// Number of rows returned by the ranked query.
pub const LEADERBOARD_LIMIT: usize = 10;

/// A persisted leaderboard row. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub id: i64,
    pub username: String,
    pub score: i64,
    /// Unix seconds.
    #[serde(default)]
    pub created_at: i64,
}

/// Body of `POST /scores`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScore {
    pub username: String,
    pub score: i64,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("Username is required")]
    EmptyUsername,
    #[error("Username must be at most 15 characters")]
    UsernameTooLong,
    #[error("Score must be a non-negative integer")]
    NegativeScore,
}

impl ScoreError {
    /// Name of the offending request field.
    pub fn field(&self) -> &'static str {
        match self {
            ScoreError::EmptyUsername | ScoreError::UsernameTooLong => "username",
            ScoreError::NegativeScore => "score",
        }
    }
}

/// Trim and check a username; returns the trimmed form.
pub fn validate_username(raw: &str) -> Result<String, ScoreError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ScoreError::EmptyUsername);
    }
    if name.chars().count() > USERNAME_MAX_LEN {
        return Err(ScoreError::UsernameTooLong);
    }
    Ok(name.to_string())
}

impl NewScore {
    pub fn new(username: impl Into<String>, score: i64) -> Self {
        Self { username: username.into(), score }
    }

    /// Returns a normalized copy (trimmed username) or the first failing rule.
    pub fn validated(&self) -> Result<NewScore, ScoreError> {
        let username = validate_username(&self.username)?;
        if self.score < 0 {
            return Err(ScoreError::NegativeScore);
        }
        Ok(NewScore { username, score: self.score })
    }
}

/// Highest score first; ties keep the older (lower id) row first.
pub fn rank(scores: &mut Vec<Score>) {
    scores.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));
    scores.truncate(LEADERBOARD_LIMIT);
}
