//! Error Kind - Classification of errors
//!
//! Defines the [`ErrorKind`] enum that maps to HTTP status codes, and the
//! [`Severity`] that decides how loudly a failure is logged.

use serde::Serialize;

/// エラー種別の列挙体
///
/// マーケットプレイスの各モジュールが返す失敗を、HTTP ステータスコードに
/// 対応する分類へまとめます。
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// let kind = ErrorKind::PaymentRequired;
/// assert_eq!(kind.status_code(), 402);
/// assert_eq!(kind.as_str(), "Payment Required");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// 400 - 入力値の検証に失敗
    BadRequest,
    /// 401 - 資格情報が無い、または検証できない
    Unauthorized,
    /// 402 - ウォレット残高不足
    PaymentRequired,
    /// 403 - ロールが許可されていない
    Forbidden,
    /// 404 - アカウント/プロジェクト/取引が存在しない
    NotFound,
    /// 409 - 重複登録、またはセッションが既に有効
    Conflict,
    /// 422 - 形式は正しいが処理できない
    UnprocessableEntity,
    /// 429 - レート制限超過
    TooManyRequests,
    /// 500 - サーバー内部エラー
    InternalServerError,
    /// 503 - データベース等が利用不可
    ServiceUnavailable,
}

/// ログ出力の重要度
///
/// クライアント起因の失敗は `Info`、セキュリティ上注目すべき拒否は
/// `Warning`、サーバー側の障害は `Error` として記録します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl ErrorKind {
    /// HTTP ステータスコードを取得
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::PaymentRequired => 402,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::UnprocessableEntity => 422,
            ErrorKind::TooManyRequests => 429,
            ErrorKind::InternalServerError => 500,
            ErrorKind::ServiceUnavailable => 503,
        }
    }

    /// HTTP ステータスの理由フレーズ
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::PaymentRequired => "Payment Required",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::UnprocessableEntity => "Unprocessable Entity",
            ErrorKind::TooManyRequests => "Too Many Requests",
            ErrorKind::InternalServerError => "Internal Server Error",
            ErrorKind::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// 種別ごとの既定の重要度
    #[inline]
    pub const fn severity(&self) -> Severity {
        match self {
            ErrorKind::InternalServerError | ErrorKind::ServiceUnavailable => Severity::Error,
            ErrorKind::Unauthorized | ErrorKind::Forbidden | ErrorKind::TooManyRequests => {
                Severity::Warning
            }
            _ => Severity::Info,
        }
    }

    /// 5xx 系かどうか
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// 4xx 系かどうか
    #[inline]
    pub const fn is_client_error(&self) -> bool {
        let code = self.status_code();
        code >= 400 && code < 500
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
