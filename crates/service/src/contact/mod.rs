//! Public contact form: validation, per-client rate limiting and mail dispatch.
//!
//! Independent of the catalog; shares no state with it.

pub mod form;
pub mod mailer;
pub mod rate_limiter;

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{info, warn};

use common::metrics;
use models::FieldErrors;

use self::form::mask_email;

pub use form::ContactForm;
pub use mailer::{Email, LogMailer, Mailer};
pub use rate_limiter::{FixedWindowLimiter, RateDecision};

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("too many requests; retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
    #[error("{0}")]
    Invalid(FieldErrors),
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Addresses used for outgoing mail.
#[derive(Debug, Clone)]
pub struct ContactSettings {
    pub company_email: String,
    pub from_email: String,
}

impl From<&configs::ContactConfig> for ContactSettings {
    fn from(cfg: &configs::ContactConfig) -> Self {
        Self { company_email: cfg.company_email.clone(), from_email: cfg.from_email.clone() }
    }
}

pub struct ContactService {
    limiter: FixedWindowLimiter,
    mailer: Arc<dyn Mailer>,
    settings: ContactSettings,
}

impl ContactService {
    pub fn new(limiter: FixedWindowLimiter, mailer: Arc<dyn Mailer>, settings: ContactSettings) -> Self {
        Self { limiter, mailer, settings }
    }

    pub fn from_config(cfg: &configs::ContactConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self::new(FixedWindowLimiter::from_config(cfg), mailer, cfg.into())
    }

    pub fn limiter(&self) -> &FixedWindowLimiter { &self.limiter }

    /// Handle one submission from `client` (an IP or `unknown`).
    ///
    /// The rate limit is charged before validation. A failed confirmation
    /// mail to the customer is logged and otherwise ignored.
    pub async fn submit(&self, client: &str, form: ContactForm) -> Result<(), ContactError> {
        let now = Instant::now();
        let decision = self.limiter.check_at(client, now);
        if !decision.allowed {
            metrics::CONTACT_RATE_LIMITED_TOTAL.inc();
            warn!(client, "contact submission rate limited");
            return Err(ContactError::RateLimited { retry_after_secs: decision.retry_after_secs(now) });
        }

        let form = form
            .validate(chrono::Utc::now().timestamp_millis())
            .map_err(ContactError::Invalid)?
            .sanitized();

        let notification = mailer::company_notification(&form, &self.settings);
        self.mailer.send(&notification).await.map_err(|e| {
            warn!(error = %e, "contact notification failed");
            ContactError::Delivery(e.to_string())
        })?;

        let confirmation = mailer::customer_confirmation(&form, &self.settings);
        if let Err(e) = self.mailer.send(&confirmation).await {
            warn!(error = %e, "contact confirmation failed");
        }

        metrics::CONTACT_SUBMISSIONS_TOTAL.inc();
        info!(
            name = %form.name,
            email = %mask_email(&form.email),
            service = form.service.as_deref().unwrap_or("General inquiry"),
            client,
            "contact form submission"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<Email>>,
        fail_to: Option<String>,
    }

    #[async_trait::async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: &Email) -> anyhow::Result<()> {
            if self.fail_to.as_deref() == Some(email.to.as_str()) {
                anyhow::bail!("smtp down");
            }
            self.sent.lock().await.push(email.clone());
            Ok(())
        }
    }

    fn settings() -> ContactSettings {
        ContactSettings { company_email: "office@example.com".into(), from_email: "noreply@example.com".into() }
    }

    fn form() -> ContactForm {
        ContactForm {
            name: "Jane <b>Doe</b>".into(),
            email: "jane@example.com".into(),
            message: "Please call me about a roof.".into(),
            ..ContactForm::default()
        }
    }

    #[tokio::test]
    async fn sends_notification_and_confirmation() -> anyhow::Result<()> {
        let mailer = Arc::new(RecordingMailer::default());
        let svc = ContactService::new(FixedWindowLimiter::new(5, Duration::from_secs(60)), mailer.clone(), settings());
        svc.submit("1.2.3.4", form()).await?;

        let sent = mailer.sent.lock().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "office@example.com");
        assert!(sent[0].subject.contains("Jane bDoe/b"));
        assert_eq!(sent[1].to, "jane@example.com");
        Ok(())
    }

    #[tokio::test]
    async fn confirmation_failure_is_not_fatal() -> anyhow::Result<()> {
        let mailer = Arc::new(RecordingMailer { fail_to: Some("jane@example.com".into()), ..Default::default() });
        let svc = ContactService::new(FixedWindowLimiter::new(5, Duration::from_secs(60)), mailer.clone(), settings());
        svc.submit("1.2.3.4", form()).await?;
        assert_eq!(mailer.sent.lock().await.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn notification_failure_is_reported() {
        let mailer = Arc::new(RecordingMailer { fail_to: Some("office@example.com".into()), ..Default::default() });
        let svc = ContactService::new(FixedWindowLimiter::new(5, Duration::from_secs(60)), mailer, settings());
        assert!(matches!(svc.submit("1.2.3.4", form()).await, Err(ContactError::Delivery(_))));
    }

    #[tokio::test]
    async fn invalid_forms_and_excess_attempts_are_rejected() {
        let mailer = Arc::new(RecordingMailer::default());
        let svc = ContactService::new(FixedWindowLimiter::new(2, Duration::from_secs(60)), mailer, settings());
        let bad = ContactForm { email: "nope".into(), ..form() };
        match svc.submit("5.6.7.8", bad).await {
            Err(ContactError::Invalid(errs)) => assert!(errs.contains("email")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(svc.submit("5.6.7.8", form()).await.is_ok());
        match svc.submit("5.6.7.8", form()).await {
            Err(ContactError::RateLimited { retry_after_secs }) => assert!(retry_after_secs <= 60),
            other => panic!("unexpected {other:?}"),
        }
        assert!(svc.submit("9.9.9.9", form()).await.is_ok());
    }
}
