//! CV activation and access-credential types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

/// How long a CV stays viewable after its window opens.
pub const CV_VALIDITY_MONTHS: u32 = 6;

/// Number of digits in a CV access PIN.
pub const PIN_LEN: usize = 4;

/// Maximum username length in characters.
pub const USERNAME_MAX_LEN: usize = 32;

/// Activation state of a CV record.
///
/// Wire/storage format: `"pending" | "active" | "deactive"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CvState {
    Pending,
    Active,
    Deactive,
}

impl CvState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Deactive => "deactive",
        }
    }
}

impl fmt::Display for CvState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown cv state: {0}")]
pub struct UnknownCvState(pub String);

impl FromStr for CvState {
    type Err = UnknownCvState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "deactive" => Ok(Self::Deactive),
            other => Err(UnknownCvState(other.to_owned())),
        }
    }
}

/// Period during which an active CV may be viewed publicly.
///
/// Expiry is checked when the CV is read; nothing transitions the stored
/// state when `end` passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ValidityWindow {
    /// Window of [`CV_VALIDITY_MONTHS`] opening at `start`.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        let end = start
            .checked_add_months(Months::new(CV_VALIDITY_MONTHS))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { start, end }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Usernames are the public access handle: ASCII alphanumerics, `-` and `_`.
///
/// Callers lower-case before validating; upper-case input is rejected here.
pub fn validate_username(username: &str) -> bool {
    if username.is_empty() || username.len() > USERNAME_MAX_LEN {
        return false;
    }
    username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

/// A PIN is exactly [`PIN_LEN`] ASCII digits.
pub fn validate_pin(pin: &str) -> bool {
    pin.len() == PIN_LEN && pin.chars().all(|c| c.is_ascii_digit())
}
