/*!
 * Discord webhook notifications.
 *
 * Two webhooks are used: one for warnings (restarts, crashes, heat) and one
 * for plan updates. Either may be left unconfigured, in which case the
 * corresponding messages are only logged.
 */

use std::collections::HashSet;
use std::fmt::Debug;

use async_trait::async_trait;
use log::{error, info, warn};
use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::bot::PlanEntry;
use crate::errors::NotifyError;
use crate::system_monitor;

const WARNING_USERNAME: &str = "DSB-Monitor";
const PLANS_USERNAME: &str = "DSB-Bot";
const AVATAR_URL: &str = "https://www.dsbmobile.de/img/logo_dsbmobile.png";
const EMBED_COLOR: u32 = 0x1abc9c;

/// Sink for bot announcements
#[async_trait]
pub trait Notifier: Send + Sync + Debug {
    /// Send a warning; failures are logged, never returned
    async fn send_warning(&self, message: &str);

    /// Announce the current plan list, highlighting new entries
    async fn send_plan_update(&self, plans: &[PlanEntry], new_keys: &HashSet<String>);
}

/// Body of a webhook post
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WebhookPayload {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmbedFooter {
    pub text: String,
}

/// Warning message, prefixed with a role mention when configured
pub fn build_warning_payload(message: &str, ping_role_id: &str) -> WebhookPayload {
    let content = if ping_role_id.is_empty() {
        message.to_string()
    } else {
        format!("<@&{}> {}", ping_role_id, message)
    };

    WebhookPayload {
        username: WARNING_USERNAME.to_string(),
        avatar_url: None,
        content,
        embeds: Vec::new(),
    }
}

/// Embed listing every plan, new ones marked
pub fn build_plan_update_payload(
    plans: &[PlanEntry],
    new_keys: &HashSet<String>,
    temperature: Option<f32>,
) -> WebhookPayload {
    let fields = plans
        .iter()
        .map(|plan| {
            let mut name = plan.title.clone();
            if new_keys.contains(&plan.title) {
                name.push_str(" 🌟 (neu)");
            }
            EmbedField {
                name,
                value: format!("[Vertretungsplan öffnen]({})", plan.url),
                inline: false,
            }
        })
        .collect();

    let temp = temperature.map_or_else(|| "?".to_string(), |t| format!("{:.1}°C", t));

    WebhookPayload {
        username: PLANS_USERNAME.to_string(),
        avatar_url: Some(AVATAR_URL.to_string()),
        content: "Neue Vertretungspläne verfügbar.".to_string(),
        embeds: vec![Embed {
            title: "Aktuelle Vertretungspläne".to_string(),
            color: EMBED_COLOR,
            fields,
            footer: EmbedFooter {
                text: format!("System Temp: {}", temp),
            },
        }],
    }
}

/// Posts to Discord webhooks
#[derive(Debug, Clone)]
pub struct DiscordNotifier {
    warn_url: Option<String>,
    plans_url: Option<String>,
    ping_role_id: String,
    client: Client,
}

impl DiscordNotifier {
    pub fn new(warn_url: Option<String>, plans_url: Option<String>, ping_role_id: &str) -> Self {
        Self {
            warn_url: warn_url.filter(|u| !u.is_empty()),
            plans_url: plans_url.filter(|u| !u.is_empty()),
            ping_role_id: ping_role_id.to_string(),
            client: Client::new(),
        }
    }

    async fn post(&self, url: &str, payload: &WebhookPayload) -> Result<StatusCode, NotifyError> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| NotifyError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::NO_CONTENT {
            return Ok(status);
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::Status {
            status_code: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send_warning(&self, message: &str) {
        warn!("Sending Discord warning: {}", message);

        let Some(url) = &self.warn_url else {
            return;
        };

        let payload = build_warning_payload(message, &self.ping_role_id);
        match self.post(url, &payload).await {
            Ok(_) => info!("Discord warning sent"),
            Err(e) => error!("Discord warning failed: {}", e),
        }
    }

    async fn send_plan_update(&self, plans: &[PlanEntry], new_keys: &HashSet<String>) {
        let Some(url) = &self.plans_url else {
            return;
        };

        let temperature = system_monitor::read_cpu_temperature().await;
        let payload = build_plan_update_payload(plans, new_keys, temperature);

        match self.post(url, &payload).await {
            Ok(StatusCode::NO_CONTENT) => info!("Discord plan update sent"),
            Ok(status) => error!("Discord plan update returned {}", status),
            Err(e) => error!("Discord plan update failed: {}", e),
        }
    }
}
