//! Session Marker
//!
//! Per-account record of the single live session: the refresh credential
//! most recently issued, or nothing when signed out.

use platform::crypto::constant_time_eq;
use std::fmt;

#[derive(Clone, PartialEq, Eq, Default)]
pub enum SessionMarker {
    #[default]
    None,
    Active(String),
}

impl SessionMarker {
    pub fn from_db(token: Option<String>) -> Self {
        match token {
            Some(token) => SessionMarker::Active(token),
            None => SessionMarker::None,
        }
    }

    pub fn as_db(&self) -> Option<&str> {
        match self {
            SessionMarker::None => None,
            SessionMarker::Active(token) => Some(token),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SessionMarker::Active(_))
    }

    /// 提示されたリフレッシュトークンが現在のマーカーと一致するか (定数時間比較)
    pub fn matches(&self, presented: &str) -> bool {
        match self {
            SessionMarker::None => false,
            SessionMarker::Active(token) => constant_time_eq(token.as_bytes(), presented.as_bytes()),
        }
    }
}

impl fmt::Debug for SessionMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMarker::None => f.write_str("SessionMarker::None"),
            SessionMarker::Active(_) => f.write_str("SessionMarker::Active([REDACTED])"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_matches_only_current_token() {
        let marker = SessionMarker::Active("abc.def.ghi".into());
        assert!(marker.matches("abc.def.ghi"));
        assert!(!marker.matches("abc.def.ghx"));
        assert!(!SessionMarker::None.matches(""));
    }

    #[test]
    fn test_marker_db_round_trip() {
        assert_eq!(SessionMarker::from_db(None), SessionMarker::None);
        let active = SessionMarker::from_db(Some("t".into()));
        assert_eq!(active.as_db(), Some("t"));
        assert!(active.is_active());
    }

    #[test]
    fn test_marker_debug_redacted() {
        let marker = SessionMarker::Active("secret-token".into());
        assert!(!format!("{marker:?}").contains("secret-token"));
    }
}
