//! Error types.
//!
//! `ValidationError` never reaches the network layer; `BackendError` is what
//! a [`QuizBackend`](crate::traits::QuizBackend) reports; `QuizError` is what
//! the workflow operations return at their boundary. The `Display` text of
//! validation and server errors is the message shown to the user.

use thiserror::Error;

/// Shown when a failed response carries no usable `{error}` message.
pub const GENERIC_SERVER_MESSAGE: &str = "サーバーでエラーが発生しました";

/// Local, pre-network rejection of the settings form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("教科を選択してください")]
    MissingSubject,

    #[error("学年を選択してください")]
    MissingGrade,

    #[error("単元を選択してください")]
    MissingUnit,

    #[error("問題形式を選択してください")]
    MissingProblemType,

    #[error("問題数は数値で入力してください")]
    CountNotANumber,

    #[error("問題数は{min}から{max}の間で指定してください")]
    CountOutOfRange { min: u32, max: u32 },

    #[error("段落数は{min}から{max}の間で指定してください")]
    ParagraphCountOutOfRange { min: u32, max: u32 },

    #[error("出力する問題がありません。先に問題を生成してください")]
    NothingToExport,

    #[error("編集する問題がありません")]
    NothingToEdit,
}

/// Failures talking to one of the remote endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Transport failure; no response was received.
    #[error("通信エラー: {0}")]
    Network(String),

    /// Non-2xx response.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// 2xx response whose body was not the expected shape.
    #[error("応答の解析に失敗しました: {0}")]
    Decode(String),
}

impl BackendError {
    /// Build a server error, falling back to the generic message when the
    /// server supplied none.
    pub fn server(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_SERVER_MESSAGE.to_string());
        BackendError::Server { status, message }
    }

    /// HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Error returned by a workflow operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A generation or export is already in flight.
    #[error("処理中です。しばらくお待ちください")]
    Busy,
}
