//! Account Password Value Objects
//!
//! Domain wrappers around `platform::password`: `RawPassword` for user input
//! and `UserPassword` for the stored Argon2id hash. Policy failures become
//! user-facing `AppError`s here.

use kernel::error::app_error::{AppError, AppResult};
use platform::crypto::{sha256, to_base64url};
use platform::password::{
    ClearTextPassword, HashedPassword, PasswordCost, PasswordHashError, PasswordPolicyError,
};
use std::fmt;

/// Bytes of the hash digest kept in a password fingerprint
const FINGERPRINT_BYTES: usize = 12;

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// 入力されたパスワード (drop 時にゼロクリア)
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// 新規設定用 (サインアップ / リセット): ポリシー検査あり
    pub fn new(raw: String) -> AppResult<Self> {
        let clear_text = ClearTextPassword::new(raw).map_err(policy_error)?;
        Ok(Self(clear_text))
    }

    /// サインイン用: 正規化のみ
    pub fn for_sign_in(raw: String) -> Self {
        Self(ClearTextPassword::for_verification(raw))
    }

    /// 漏洩パスワード判定 (k-Anonymity, 失敗は呼び出し側で非致命扱い)
    pub async fn is_compromised(&self) -> AppResult<bool> {
        self.0
            .check_breach()
            .await
            .map_err(|e| AppError::service_unavailable(e.to_string()))
    }

    /// 漏洩済みなら拒否する。判定 API の障害時は警告のみで通す。
    pub async fn reject_if_compromised(&self) -> AppResult<()> {
        match self.is_compromised().await {
            Ok(true) => Err(policy_error(PasswordPolicyError::Compromised)),
            Ok(false) => Ok(()),
            Err(e) => {
                tracing::warn!(error = %e, "Breach check unavailable, continuing");
                Ok(())
            }
        }
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

fn policy_error(e: PasswordPolicyError) -> AppError {
    match e {
        PasswordPolicyError::TooShort { min, actual } => AppError::bad_request(format!(
            "Password must be at least {min} characters (got {actual})"
        ))
        .with_action("Please choose a longer password"),

        PasswordPolicyError::TooLong { max, actual } => AppError::bad_request(format!(
            "Password must be at most {max} characters (got {actual})"
        ))
        .with_action("Please choose a shorter password"),

        PasswordPolicyError::Compromised => {
            AppError::bad_request("This password has been found in a data breach")
                .with_action("Please choose a different password that hasn't been compromised")
        }

        PasswordPolicyError::EmptyOrWhitespace => {
            AppError::bad_request("Password cannot be empty").with_action("Please enter a password")
        }

        PasswordPolicyError::InvalidCharacter => {
            AppError::bad_request("Password contains invalid characters")
                .with_action("Please remove any special control characters")
        }

        PasswordPolicyError::CommonPattern => {
            AppError::bad_request("Password is too common or follows a predictable pattern")
                .with_action("Please choose a more unique password")
        }
    }
}

// ============================================================================
// User Password (Stored Hash)
// ============================================================================

/// 保存済みパスワードハッシュ (PHC 文字列)
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    pub fn from_raw(raw: &RawPassword, pepper: Option<&[u8]>, cost: PasswordCost) -> AppResult<Self> {
        raw.0
            .hash(pepper, cost)
            .map(Self)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
    }

    pub fn from_db(phc: impl Into<String>) -> AppResult<Self> {
        HashedPassword::from_phc_string(phc).map(Self).map_err(|e| match e {
            PasswordHashError::InvalidHashFormat => {
                AppError::internal("Stored password hash is malformed")
            }
            other => AppError::internal(other.to_string()),
        })
    }

    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(&raw.0, pepper)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_phc_string()
    }

    /// ハッシュから導出した短い指紋。パスワードが変わると変化する。
    pub fn fingerprint(&self) -> String {
        let digest = sha256(self.as_str().as_bytes());
        to_base64url(&digest[..FINGERPRINT_BYTES])
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserPassword").field(&"[REDACTED]").finish()
    }
}
