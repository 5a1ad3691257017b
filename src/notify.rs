//! Digest delivery: SMTP, chat webhooks, or stdout for dry runs.

use std::fmt;

use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::digest::Digest;
use crate::error::{ConfigError, NotificationError};

const SENDER_NAME: &str = "Job Bot";
const DISCORD_LIMIT: usize = 2000;
const TELEGRAM_LIMIT: usize = 4096;

#[async_trait]
pub trait Notifier: Send + Sync {
    fn channel(&self) -> &str;

    async fn send(&self, digest: &Digest) -> Result<(), NotificationError>;
}

#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub recipients: Vec<String>,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("recipients", &self.recipients)
            .finish()
    }
}

/// Which channels are configured
#[derive(Debug, Clone, Default)]
pub struct NotifierSettings {
    pub smtp: Option<SmtpSettings>,
    pub slack_webhook: Option<String>,
    pub discord_webhook: Option<String>,
    pub telegram: Option<(String, String)>,
    pub dry_run: bool,
}

impl NotifierSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read channel settings.
    ///
    /// SMTP needs `EMAIL_HOST`, `EMAIL_HOST_USER` and `EMAIL_TO`;
    /// `EMAIL_PORT` defaults to 587.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let smtp = match (get("EMAIL_HOST"), get("EMAIL_HOST_USER"), get("EMAIL_TO")) {
            (Some(host), Some(username), Some(to)) => {
                let port = match get("EMAIL_PORT") {
                    Some(p) => p.parse().map_err(|_| ConfigError::InvalidValue {
                        key: "EMAIL_PORT",
                        value: p,
                    })?,
                    None => 587,
                };
                Some(SmtpSettings {
                    host,
                    port,
                    username,
                    password: get("EMAIL_HOST_PASSWORD").unwrap_or_default(),
                    recipients: to
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect(),
                })
            }
            _ => None,
        };

        let telegram = match (get("TELEGRAM_BOT_TOKEN"), get("TELEGRAM_CHAT_ID")) {
            (Some(token), Some(chat)) => Some((token, chat)),
            _ => None,
        };

        let dry_run = get("JOB_DIGEST_DRY_RUN")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            smtp,
            slack_webhook: get("SLACK_WEBHOOK_URL"),
            discord_webhook: get("DISCORD_WEBHOOK_URL"),
            telegram,
            dry_run,
        })
    }
}

/// Build the fan-out notifier for every configured channel. A dry run
/// replaces all channels with stdout.
pub fn build_notifier(
    settings: &NotifierSettings,
    client: reqwest::Client,
) -> Result<FanoutNotifier, NotificationError> {
    let mut channels: Vec<Box<dyn Notifier>> = Vec::new();

    if settings.dry_run {
        channels.push(Box::new(StdoutNotifier));
        return Ok(FanoutNotifier::new(channels));
    }

    if let Some(smtp) = &settings.smtp {
        channels.push(Box::new(SmtpNotifier::new(smtp)?));
    }
    if let Some(url) = &settings.slack_webhook {
        let webhook = Webhook::Slack { url: url.clone() };
        channels.push(Box::new(WebhookNotifier::new(webhook, client.clone())));
    }
    if let Some(url) = &settings.discord_webhook {
        let webhook = Webhook::Discord { url: url.clone() };
        channels.push(Box::new(WebhookNotifier::new(webhook, client.clone())));
    }
    if let Some((token, chat_id)) = &settings.telegram {
        channels.push(Box::new(WebhookNotifier::new(
            Webhook::Telegram {
                token: token.clone(),
                chat_id: chat_id.clone(),
            },
            client,
        )));
    }

    Ok(FanoutNotifier::new(channels))
}

/// Sends to every channel; fails if none is configured or any one fails
pub struct FanoutNotifier {
    channels: Vec<Box<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new(channels: Vec<Box<dyn Notifier>>) -> Self {
        Self { channels }
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[async_trait]
impl Notifier for FanoutNotifier {
    fn channel(&self) -> &str {
        "fanout"
    }

    async fn send(&self, digest: &Digest) -> Result<(), NotificationError> {
        if self.channels.is_empty() {
            return Err(NotificationError::NotConfigured);
        }

        let mut first_error = None;
        for channel in &self.channels {
            match channel.send(digest).await {
                Ok(()) => tracing::info!(channel = channel.channel(), "digest sent"),
                Err(e) => {
                    tracing::error!(
                        channel = channel.channel(),
                        error = %e,
                        "failed to send digest"
                    );
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl SmtpNotifier {
    /// Builds a STARTTLS transport; the connection is made on first send
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotificationError> {
        let from: Mailbox = format!("{} <{}>", SENDER_NAME, settings.username)
            .parse()
            .map_err(|e| NotificationError::Address(format!("{}: {}", settings.username, e)))?;

        let to = settings
            .recipients
            .iter()
            .map(|r| {
                r.parse::<Mailbox>()
                    .map_err(|e| NotificationError::Address(format!("{}: {}", r, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if to.is_empty() {
            return Err(NotificationError::Address("no recipients".to_string()));
        }

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| NotificationError::Smtp(e.to_string()))?
            .port(settings.port);
        if !settings.password.is_empty() {
            builder = builder.credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ));
        }

        tracing::debug!(host = %settings.host, port = settings.port, "SMTP notifier initialized");
        Ok(Self {
            transport: builder.build(),
            from,
            to,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    fn channel(&self) -> &str {
        "smtp"
    }

    async fn send(&self, digest: &Digest) -> Result<(), NotificationError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(digest.subject.as_str());
        for to in &self.to {
            builder = builder.to(to.clone());
        }
        let message = builder
            .multipart(MultiPart::alternative_plain_html(digest.text.clone(), digest.html.clone()))
            .map_err(|e| NotificationError::Smtp(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotificationError::Smtp(e.to_string()))?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum Webhook {
    Slack { url: String },
    Discord { url: String },
    Telegram { token: String, chat_id: String },
}

impl Webhook {
    pub fn name(&self) -> &'static str {
        match self {
            Webhook::Slack { .. } => "slack",
            Webhook::Discord { .. } => "discord",
            Webhook::Telegram { .. } => "telegram",
        }
    }
}

pub struct WebhookNotifier {
    webhook: Webhook,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(webhook: Webhook, client: reqwest::Client) -> Self {
        Self { webhook, client }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn channel(&self) -> &str {
        self.webhook.name()
    }

    async fn send(&self, digest: &Digest) -> Result<(), NotificationError> {
        let text = format!("{}\n{}", digest.subject, digest.text);

        let request = match &self.webhook {
            Webhook::Slack { url } => {
                self.client.post(url).json(&serde_json::json!({ "text": text }))
            }
            Webhook::Discord { url } => self
                .client
                .post(url)
                .json(&serde_json::json!({ "content": truncate_chars(&text, DISCORD_LIMIT) })),
            Webhook::Telegram { token, chat_id } => {
                let url = format!("https://api.telegram.org/bot{}/sendMessage", token);
                self.client
                    .post(url)
                    .json(&serde_json::json!({
                        "chat_id": chat_id,
                        "text": truncate_chars(&text, TELEGRAM_LIMIT),
                    }))
            }
        };

        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(NotificationError::Webhook {
                channel: self.webhook.name(),
                code: resp.status().as_u16(),
            });
        }
        Ok(())
    }
}

/// Prints the digest instead of delivering it
pub struct StdoutNotifier;

#[async_trait]
impl Notifier for StdoutNotifier {
    fn channel(&self) -> &str {
        "stdout"
    }

    async fn send(&self, digest: &Digest) -> Result<(), NotificationError> {
        println!("Subject: {}\n\n{}", digest.subject, digest.text);
        Ok(())
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut out: String = text.chars().take(limit.saturating_sub(1)).collect();
    out.push('…');
    out
}
