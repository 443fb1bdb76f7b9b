use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

use super::{PaymentGateway, PaymentInitiation, PaymentStatus};

/// Simulated virtual-POS gateway.
///
/// Returns a checkout page that offers a "success" and a "fail" button,
/// each posting the corresponding completion token, after a short delay
/// that stands in for the real gateway round trip.
pub struct MockGateway {
    delay: Duration,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            delay: Duration::from_millis(1500),
        }
    }

    /// Zero-delay variant for tests.
    pub fn instant() -> Self {
        Self {
            delay: Duration::ZERO,
        }
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn initiate(&self, plan: &str, price: &str, email: &str) -> Result<PaymentInitiation> {
        info!("Initiating mock payment: plan={}, price={}, email={}", plan, price, email);

        tokio::time::sleep(self.delay).await;

        let html_content = format!(
            r#"<div style="width:100%; height:100%; display:flex; flex-direction:column; align-items:center; justify-content:center; background:#f8fafc; color:#334155; font-family:sans-serif;">
  <div style="padding:20px; border:1px solid #e2e8f0; background:white; border-radius:10px; text-align:center;">
    <h3 style="margin-bottom:10px; color:#4f46e5;">Sanal POS Simülasyonu</h3>
    <p>Burası Iyzico / PayTR Ödeme Ekranı Olacak</p>
    <p><strong>Paket:</strong> {plan}</p>
    <p><strong>Tutar:</strong> {price}</p>
    <br/>
    <button onclick="window.parent.postMessage('payment-success', '*')" style="background:#16a34a; color:white; border:none; padding:10px 20px; border-radius:5px; cursor:pointer; font-weight:bold;">
      Başarılı Ödeme Simüle Et
    </button>
    <button onclick="window.parent.postMessage('payment-failed', '*')" style="background:#dc2626; color:white; border:none; padding:10px 20px; border-radius:5px; cursor:pointer; margin-left:10px;">
      Başarısız
    </button>
  </div>
  <p style="font-size:12px; margin-top:20px; color:#94a3b8;">Bu alan Backend'den gelen HTML/Iframe içeriğidir.</p>
</div>"#
        );

        Ok(PaymentInitiation {
            status: PaymentStatus::Success,
            html_content: Some(html_content),
            payment_page_url: None,
            error_message: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_checkout_page_embeds_plan_and_tokens() {
        let gateway = MockGateway::instant();
        let initiation = gateway
            .initiate("Standart", "₺499", "test@demo.com")
            .await
            .unwrap();

        assert_eq!(initiation.status, PaymentStatus::Success);
        assert!(initiation.payment_page_url.is_none());

        let html = initiation.html_content.unwrap();
        assert!(html.contains("Standart"));
        assert!(html.contains("₺499"));
        assert!(html.contains("payment-success"));
        assert!(html.contains("payment-failed"));
    }
}
