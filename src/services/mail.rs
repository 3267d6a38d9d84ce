/*
 * Responsibility
 * - Confirmation email delivery through an HTTP mail API (Resend-style)
 * - Callers fire this from a spawned task; a failed send is logged, never
 *   surfaced to the HTTP client
 */
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Config, MailConfig};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("mail api error: http {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Debug, Serialize)]
struct OutboundEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: String,
}

pub struct Mailer {
    mail: Option<MailConfig>,
    public_base_url: String,
    // One client for the lifetime of the mailer so connections are pooled
    // across sends.
    http: reqwest::Client,
}

impl Mailer {
    pub fn from_config(config: &Config) -> Result<Self, MailError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            mail: config.mail.clone(),
            public_base_url: config.public_base_url.clone(),
            http,
        })
    }

    /// A mailer that drops everything; used when `MAIL_API_KEY` is unset
    /// and by tests.
    pub fn disabled() -> Self {
        Self {
            mail: None,
            public_base_url: String::new(),
            http: reqwest::Client::new(),
        }
    }

    pub fn confirmation_link(&self, token: &str) -> String {
        format!(
            "{}/auth/confirmed_email/{}",
            self.public_base_url.trim_end_matches('/'),
            token
        )
    }

    pub async fn send_confirmation(
        &self,
        to: &str,
        username: &str,
        token: &str,
    ) -> Result<(), MailError> {
        let Some(mail) = &self.mail else {
            debug!(to, "mail delivery not configured; skipping confirmation email");
            return Ok(());
        };

        let link = self.confirmation_link(token);
        let email = OutboundEmail {
            from: &mail.from,
            to: [to],
            subject: "Confirm your email",
            html: format!(
                "<p>Hi {username},</p>\
                 <p>Follow <a href=\"{link}\">this link</a> to confirm your email address.</p>"
            ),
        };

        let response = self
            .http
            .post(&mail.api_url)
            .bearer_auth(&mail.api_key)
            .json(&email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Api { status, body });
        }

        info!(to, "confirmation email queued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_link_joins_cleanly() {
        let mailer = Mailer {
            mail: None,
            public_base_url: "http://localhost:8000/".to_string(),
            http: reqwest::Client::new(),
        };
        assert_eq!(
            mailer.confirmation_link("tok"),
            "http://localhost:8000/auth/confirmed_email/tok"
        );
    }

    #[test]
    fn from_config_builds_the_shared_client_up_front() {
        let config = Config {
            addr: "0.0.0.0:8000".parse().unwrap(),
            app_env: crate::config::AppEnv::Development,
            database_url: String::new(),
            redis_url: None,
            jwt_secret: "secret".to_string(),
            access_token_ttl_seconds: 900,
            refresh_token_ttl_seconds: 604_800,
            email_token_ttl_seconds: 604_800,
            rate_limit_times: 3,
            rate_limit_window: Duration::from_secs(60),
            cors_allowed_origins: Vec::new(),
            public_base_url: "http://localhost:8000".to_string(),
            mail: None,
        };
        let mailer = Mailer::from_config(&config).unwrap();
        assert_eq!(
            mailer.confirmation_link("tok"),
            "http://localhost:8000/auth/confirmed_email/tok"
        );
    }

    #[tokio::test]
    async fn disabled_mailer_is_a_no_op() {
        let mailer = Mailer::disabled();
        assert!(mailer.send_confirmation("a@example.com", "a", "tok").await.is_ok());
    }
}
