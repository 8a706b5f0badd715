//! Validated candidate contact values.

use super::{ParseApplicationSourceError, PipelineDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mail domains of throwaway inbox services that may not apply.
const DISPOSABLE_DOMAINS: [&str; 9] = [
    "tempmail.com",
    "10minutemail.com",
    "guerrillamail.com",
    "mailinator.com",
    "throwaway.email",
    "temp-mail.org",
    "fakeinbox.com",
    "getnada.com",
    "trashmail.com",
];

/// Candidate display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateName(String);

impl CandidateName {
    /// Longest name accepted by the `applications` schema.
    pub const MAX_LENGTH: usize = 200;

    /// Creates a validated candidate name.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::EmptyCandidateName`] when the trimmed
    /// value is empty, or [`PipelineDomainError::CandidateNameTooLong`] when
    /// it exceeds [`Self::MAX_LENGTH`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, PipelineDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PipelineDomainError::EmptyCandidateName);
        }
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(PipelineDomainError::CandidateNameTooLong(trimmed.to_owned()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalized candidate email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateEmail(String);

impl CandidateEmail {
    /// Creates a validated email address.
    ///
    /// The address must have the shape `local@domain.tld` with no
    /// whitespace. The domain is lowercased.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::InvalidEmail`] for malformed input and
    /// [`PipelineDomainError::DisposableEmail`] for throwaway domains.
    pub fn new(value: impl Into<String>) -> Result<Self, PipelineDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(PipelineDomainError::InvalidEmail(raw));
        };
        if !is_valid_local_part(local) || !is_valid_domain(domain) {
            return Err(PipelineDomainError::InvalidEmail(raw));
        }

        let normalized_domain = domain.to_ascii_lowercase();
        if DISPOSABLE_DOMAINS.contains(&normalized_domain.as_str()) {
            return Err(PipelineDomainError::DisposableEmail(normalized_domain));
        }

        Ok(Self(format!("{local}@{normalized_domain}")))
    }

    /// Returns the address as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the part before `@`.
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.0.split_once('@').map_or("", |(local, _)| local)
    }
}

impl fmt::Display for CandidateEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_valid_local_part(local: &str) -> bool {
    !local.is_empty() && !local.chars().any(|ch| ch.is_whitespace() || ch == '@')
}

fn is_valid_domain(domain: &str) -> bool {
    if domain.chars().any(|ch| ch.is_whitespace() || ch == '@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty()
}

/// Candidate phone number as entered on the application form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Creates a validated phone number.
    ///
    /// An optional leading `+` may be followed by digits, spaces, `-`, `(`
    /// and `)`. At least one digit is required.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::InvalidPhone`] on any other input.
    pub fn new(value: impl Into<String>) -> Result<Self, PipelineDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
        let allowed = body
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, ' ' | '-' | '(' | ')'));
        let has_digit = body.chars().any(|ch| ch.is_ascii_digit());
        if !allowed || !has_digit {
            return Err(PipelineDomainError::InvalidPhone(raw));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the phone number as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Channel an application arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationSource {
    /// Submitted through the public job portal.
    Portal,
    /// Imported by HR through bulk resume upload.
    BulkUpload,
    /// Seeded demonstration data; never screened or notified.
    Demo,
}

impl ApplicationSource {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Portal => "portal",
            Self::BulkUpload => "bulk_upload",
            Self::Demo => "demo",
        }
    }
}

impl TryFrom<&str> for ApplicationSource {
    type Error = ParseApplicationSourceError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "portal" => Ok(Self::Portal),
            "bulk_upload" => Ok(Self::BulkUpload),
            "demo" => Ok(Self::Demo),
            _ => Err(ParseApplicationSourceError(value.to_owned())),
        }
    }
}
