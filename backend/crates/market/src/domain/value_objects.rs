//! Domain Value Objects
//!
//! Immutable value types for the market domain.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MarketError;

/// Outcome recorded on a settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Successful,
    Failed,
}

impl TransactionStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Successful => "successful",
            TransactionStatus::Failed => "failed",
        }
    }

    pub const fn is_successful(self) -> bool {
        matches!(self, TransactionStatus::Successful)
    }
}

impl FromStr for TransactionStatus {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "successful" => Ok(TransactionStatus::Successful),
            "failed" => Ok(TransactionStatus::Failed),
            _ => Err(MarketError::InvalidStatus),
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feedback rating, 1 to 5 stars
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(stars: u8) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&stars) {
            Some(Self(stars))
        } else {
            None
        }
    }

    pub fn stars(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::new(value).ok_or_else(|| format!("rating must be between 1 and 5, got {value}"))
    }
}

impl From<Rating> for u8 {
    fn from(r: Rating) -> Self {
        r.0
    }
}

/// Ordered screenshot locations, at most `max` of them
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Screenshots(Vec<String>);

impl Screenshots {
    pub fn new(urls: Vec<String>, max: usize) -> Result<Self, MarketError> {
        if urls.len() > max {
            return Err(MarketError::Validation(format!(
                "A project can have at most {max} screenshots"
            )));
        }
        let urls: Vec<String> = urls.into_iter().map(|u| u.trim().to_string()).collect();
        if urls.iter().any(String::is_empty) {
            return Err(MarketError::Validation("Screenshot location cannot be empty".into()));
        }
        Ok(Self(urls))
    }

    pub fn from_db(urls: Vec<String>) -> Self {
        Self(urls)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
