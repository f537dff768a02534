//! Payment lifecycle types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cv::CvState;

/// Status string stored on a freshly created payment.
pub const PENDING_STATUS: &str = "PENDING";

/// Payment status reported by the gateway, parsed once at the boundary.
///
/// Matching is case-insensitive; the raw string is kept by the caller for
/// storage. Anything unrecognised lands in `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Confirmed,
    Failed,
    Cancelled,
    Unknown(String),
}

impl PaymentStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "confirmed" => Self::Confirmed,
            "failed" => Self::Failed,
            "cancelled" => Self::Cancelled,
            _ => Self::Unknown(raw.to_owned()),
        }
    }

    /// Trimmed, lower-cased form used for duplicate checks and ledger keys.
    pub fn normalized(&self) -> String {
        match self {
            Self::Pending => "pending".to_owned(),
            Self::Confirmed => "confirmed".to_owned(),
            Self::Failed => "failed".to_owned(),
            Self::Cancelled => "cancelled".to_owned(),
            Self::Unknown(raw) => raw.trim().to_ascii_lowercase(),
        }
    }

    /// CV state implied by this payment outcome, if any.
    pub fn target_cv_state(&self) -> Option<CvState> {
        match self {
            Self::Confirmed => Some(CvState::Active),
            Self::Failed | Self::Cancelled => Some(CvState::Deactive),
            Self::Pending | Self::Unknown(_) => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }
}

/// Which payment outcomes trigger a credentials email to the CV owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyPolicy {
    /// Only cancelled payments notify. Matches the historical behaviour.
    #[default]
    Cancelled,
    Confirmed,
    /// Confirmed or cancelled.
    Terminal,
    Never,
}

impl NotifyPolicy {
    pub fn should_notify(self, status: &PaymentStatus) -> bool {
        match self {
            Self::Cancelled => matches!(status, PaymentStatus::Cancelled),
            Self::Confirmed => matches!(status, PaymentStatus::Confirmed),
            Self::Terminal => matches!(
                status,
                PaymentStatus::Confirmed | PaymentStatus::Cancelled
            ),
            Self::Never => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::Confirmed => "confirmed",
            Self::Terminal => "terminal",
            Self::Never => "never",
        }
    }
}

impl fmt::Display for NotifyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown notify policy: {0}")]
pub struct UnknownNotifyPolicy(pub String);

impl FromStr for NotifyPolicy {
    type Err = UnknownNotifyPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cancelled" => Ok(Self::Cancelled),
            "confirmed" => Ok(Self::Confirmed),
            "terminal" => Ok(Self::Terminal),
            "never" => Ok(Self::Never),
            _ => Err(UnknownNotifyPolicy(s.to_owned())),
        }
    }
}
