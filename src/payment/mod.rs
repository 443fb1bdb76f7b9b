//! Payment gateway port
//!
//! Card data never touches this process: the backend gateway returns
//! either an embedded checkout page (iyzico/PayTR style iframe HTML) or
//! a redirect URL (Stripe style), and the checkout page later signals
//! completion back with a plain string token. Until a real gateway is
//! wired up, [`MockGateway`] simulates the whole flow.

mod mock;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use mock::MockGateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Success,
    Failure,
}

/// What the gateway hands back when a checkout is initiated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInitiation {
    pub status: PaymentStatus,

    /// Checkout form HTML to embed, for iframe-based processors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,

    /// Redirect URL, for hosted checkout pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_page_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// The completion token the checkout page posts back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionToken {
    Success,
    Failed,
}

impl CompletionToken {
    /// Parse the message-event token. Unknown tokens are ignored rather
    /// than treated as failures, since the checkout iframe may post
    /// unrelated messages.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "payment-success" => Some(CompletionToken::Success),
            "payment-failed" => Some(CompletionToken::Failed),
            _ => None,
        }
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Start a checkout for the given plan. A transport-level failure
    /// surfaces as `status: failure` with an error message, not as an
    /// `Err` — the caller shows it and offers a retry.
    async fn initiate(&self, plan: &str, price: &str, email: &str) -> Result<PaymentInitiation>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_token_parse() {
        assert_eq!(
            CompletionToken::parse("payment-success"),
            Some(CompletionToken::Success)
        );
        assert_eq!(
            CompletionToken::parse("payment-failed"),
            Some(CompletionToken::Failed)
        );
        assert_eq!(CompletionToken::parse("resize-event"), None);
    }
}
