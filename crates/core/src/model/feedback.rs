use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FeedbackError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("message cannot be empty")]
    EmptyMessage,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("invalid submission kind: {0}")]
    InvalidKind(String),

    #[error("invalid submission status: {0}")]
    InvalidStatus(String),
}

//
// ─── KIND & STATUS ─────────────────────────────────────────────────────────────
//

/// What a feedback submission is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Suggestion,
    Donation,
    General,
}

impl FeedbackKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackKind::Suggestion => "suggestion",
            FeedbackKind::Donation => "donation",
            FeedbackKind::General => "general",
        }
    }
}

impl FromStr for FeedbackKind {
    type Err = FeedbackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "suggestion" => Ok(FeedbackKind::Suggestion),
            "donation" => Ok(FeedbackKind::Donation),
            "general" => Ok(FeedbackKind::General),
            _ => Err(FeedbackError::InvalidKind(s.to_owned())),
        }
    }
}

/// Review state of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    Pending,
    Reviewed,
    Resolved,
}

impl FeedbackStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackStatus::Pending => "pending",
            FeedbackStatus::Reviewed => "reviewed",
            FeedbackStatus::Resolved => "resolved",
        }
    }
}

impl FromStr for FeedbackStatus {
    type Err = FeedbackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(FeedbackStatus::Pending),
            "reviewed" => Ok(FeedbackStatus::Reviewed),
            "resolved" => Ok(FeedbackStatus::Resolved),
            _ => Err(FeedbackError::InvalidStatus(s.to_owned())),
        }
    }
}

impl fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── SUBMISSION ────────────────────────────────────────────────────────────────
//

/// Raw submission fields as the presentation layer collects them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackDraft {
    pub kind: FeedbackKind,
    pub name: String,
    pub email: String,
    pub message: String,
    pub category: Option<String>,
    pub donation_willing: bool,
}

impl FeedbackDraft {
    /// Validates the draft into a pending submission.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError` for an empty name or message, or an email
    /// without the `local@domain.tld` shape.
    pub fn validate(self, now: DateTime<Utc>) -> Result<FeedbackSubmission, FeedbackError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(FeedbackError::EmptyName);
        }
        let message = self.message.trim().to_owned();
        if message.is_empty() {
            return Err(FeedbackError::EmptyMessage);
        }
        let email = self.email.trim().to_owned();
        if !is_plausible_email(&email) {
            return Err(FeedbackError::InvalidEmail(email));
        }
        let category = self
            .category
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty());

        Ok(FeedbackSubmission {
            kind: self.kind,
            name,
            email,
            message,
            category,
            donation_willing: self.donation_willing,
            status: FeedbackStatus::Pending,
            submitted_at: now,
        })
    }
}

/// Same shape the original contact form enforced: non-empty local part,
/// one `@`, and a dot inside the domain.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// A validated feedback submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackSubmission {
    pub kind: FeedbackKind,
    pub name: String,
    pub email: String,
    pub message: String,
    pub category: Option<String>,
    pub donation_willing: bool,
    pub status: FeedbackStatus,
    pub submitted_at: DateTime<Utc>,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
