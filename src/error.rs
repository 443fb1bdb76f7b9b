// Operation-boundary error taxonomy
//
// Failures are classified once, at the operation that triggered them,
// and flattened into a single user-facing Turkish message. No structured
// error crosses further than the workspace boundary.

use thiserror::Error;

use crate::timefmt::format_seconds;

#[derive(Debug, Error)]
pub enum OperationError {
    /// A required input was not provided; the message is already
    /// user-facing.
    #[error("{0}")]
    Validation(String),

    /// Missing or rejected API credential; fatal to the operation.
    #[error("API Key is missing")]
    MissingApiKey,

    /// Domain precondition: the ledger cannot cover the estimate.
    /// Recoverable by purchasing a plan.
    #[error("insufficient balance: need {required_secs}s, have {remaining_secs}s")]
    InsufficientBalance {
        required_secs: u64,
        remaining_secs: u64,
    },

    /// The model returned nothing, something unparseable, or refused the
    /// content. The message keeps the upstream wording for substring
    /// classification.
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// Payment backend or network failure; retryable by the user.
    #[error("payment failure: {0}")]
    Payment(String),
}

impl OperationError {
    /// Seconds still missing for an insufficient-balance failure.
    pub fn shortfall_secs(&self) -> Option<u64> {
        match self {
            OperationError::InsufficientBalance {
                required_secs,
                remaining_secs,
            } => Some(required_secs.saturating_sub(*remaining_secs)),
            _ => None,
        }
    }

    /// Flatten to the Turkish message shown in the UI banner.
    ///
    /// Upstream failures are classified by substring because the model
    /// SDK does not expose structured error kinds.
    pub fn user_message(&self) -> String {
        match self {
            OperationError::Validation(message) => message.clone(),
            OperationError::MissingApiKey => "API Anahtarı eksik veya hatalı.".to_string(),
            OperationError::InsufficientBalance {
                required_secs,
                remaining_secs,
            } => format!(
                "Yetersiz bakiye. Bu işlem için {} gerekli, ancak bakiyeniz {}.",
                format_seconds(*required_secs as f64),
                format_seconds(*remaining_secs as f64)
            ),
            OperationError::Upstream(detail) => {
                if detail.contains("API Key") {
                    "API Anahtarı eksik veya hatalı.".to_string()
                } else if detail.contains("candidate") {
                    "Model bu sesi işleyemedi.".to_string()
                } else if detail.contains("JSON") {
                    "Yapay zeka çıktısı işlenemedi. Lütfen tekrar deneyin.".to_string()
                } else {
                    "Bir hata oluştu. Lütfen tekrar deneyin.".to_string()
                }
            }
            OperationError::Payment(_) => {
                "Ödeme işlemi tamamlanamadı. Lütfen tekrar deneyin.".to_string()
            }
        }
    }

    /// Whether the UI should offer the plan-upgrade call to action.
    pub fn is_insufficient_balance(&self) -> bool {
        matches!(self, OperationError::InsufficientBalance { .. })
    }
}

impl From<anyhow::Error> for OperationError {
    fn from(err: anyhow::Error) -> Self {
        OperationError::Upstream(format!("{:#}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_balance_message() {
        let err = OperationError::InsufficientBalance {
            required_secs: 400,
            remaining_secs: 300,
        };
        assert_eq!(err.shortfall_secs(), Some(100));
        assert_eq!(
            err.user_message(),
            "Yetersiz bakiye. Bu işlem için 06:40 gerekli, ancak bakiyeniz 05:00."
        );
    }

    #[test]
    fn test_upstream_classification() {
        let cases = [
            ("API Key is missing", "API Anahtarı eksik veya hatalı."),
            ("no candidate returned", "Model bu sesi işleyemedi."),
            (
                "invalid JSON at line 1",
                "Yapay zeka çıktısı işlenemedi. Lütfen tekrar deneyin.",
            ),
            ("connection reset", "Bir hata oluştu. Lütfen tekrar deneyin."),
        ];
        for (detail, expected) in cases {
            assert_eq!(
                OperationError::Upstream(detail.to_string()).user_message(),
                expected
            );
        }
    }
}
