use std::io::{Read, Write};
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use encoding_rs::WINDOWS_1252;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, error, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::DsbError;

// @module: DSBmobile JSON client

/// Endpoint of the DSBmobile app API
pub const DSB_DATA_URL: &str = "https://app.dsbcontrol.de/JsonHandler.ashx/GetData";

const REQUEST_TIMEOUT_SECS: u64 = 15;
const PAGE_TIMEOUT_SECS: u64 = 10;

/// Link to one published plan page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLink {
    /// URL of the plan page
    pub detail: String,
    /// Publication date as reported by the service
    pub date: Option<String>,
    /// Title of the plan entry
    pub title: Option<String>,
}

/// Parameters sent (compressed) with every request
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestParams {
    pub user_id: String,
    pub user_pw: String,
    pub app_version: String,
    pub language: String,
    pub os_version: String,
    pub app_id: String,
    pub device: String,
    pub bundle_id: String,
    pub date: String,
    pub last_update: String,
}

impl RequestParams {
    pub fn new(username: &str, password: &str) -> Self {
        let now = chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
        Self {
            user_id: username.to_string(),
            user_pw: password.to_string(),
            app_version: "2.5.9".to_string(),
            language: "de".to_string(),
            os_version: "28 8.0".to_string(),
            app_id: uuid::Uuid::new_v4().to_string(),
            device: "SM-G30F".to_string(),
            bundle_id: "de.heinekingmedia.dsbmobile".to_string(),
            date: now.clone(),
            last_update: now,
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestEnvelope {
    req: RequestBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct RequestBody {
    data: String,
    data_type: u8,
}

#[derive(Debug, Deserialize)]
struct ResponseEnvelope {
    d: String,
}

/// Decoded answer of the GetData call
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MenuResponse {
    pub resultcode: Option<i64>,
    pub result_status_info: Option<String>,
    pub result_menu_items: Vec<MenuItem>,
}

impl MenuResponse {
    /// Accept only answers that report `Resultcode` 0
    pub fn into_success(self) -> Result<Self, DsbError> {
        match self.resultcode {
            Some(0) => Ok(self),
            Some(code) => Err(DsbError::Api {
                code,
                message: self.result_status_info.unwrap_or_default(),
            }),
            None => Err(DsbError::MissingResultcode),
        }
    }
}

/// Node of the menu tree
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MenuItem {
    pub title: Option<String>,
    pub date: Option<String>,
    pub detail: Option<String>,
    pub childs: Option<Vec<MenuItem>>,
    pub root: Option<Box<MenuItem>>,
}

impl MenuItem {
    fn children(&self) -> &[MenuItem] {
        self.childs.as_deref().unwrap_or_default()
    }

    fn child_titled(&self, title: &str) -> Option<&MenuItem> {
        self.children().iter().find(|c| c.title.as_deref() == Some(title))
    }
}

/// Gzip then base64-encode a JSON payload
pub fn encode_payload(json: &str) -> Result<String, DsbError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(json.as_bytes())
        .map_err(|e| DsbError::Payload(e.to_string()))?;
    let compressed = encoder.finish().map_err(|e| DsbError::Payload(e.to_string()))?;
    Ok(STANDARD.encode(compressed))
}

/// Base64-decode then gunzip a payload
pub fn decode_payload(data: &str) -> Result<String, DsbError> {
    let compressed = STANDARD
        .decode(data.trim())
        .map_err(|e| DsbError::Payload(e.to_string()))?;
    let mut decoder = GzDecoder::new(compressed.as_slice());
    let mut json = String::new();
    decoder
        .read_to_string(&mut json)
        .map_err(|e| DsbError::Payload(e.to_string()))?;
    Ok(json)
}

/// Collect plan links from "Inhalte" > "Pläne".
///
/// Only entries whose first child links to an `.htm`/`.html` page are kept.
pub fn extract_plan_links(menu: &MenuResponse) -> Vec<PlanLink> {
    let Some(contents) = menu
        .result_menu_items
        .iter()
        .find(|item| item.title.as_deref() == Some("Inhalte"))
    else {
        warn!("DSB menu item 'Inhalte' not found");
        return Vec::new();
    };

    let Some(plans) = contents.child_titled("Pläne") else {
        warn!("DSB child item 'Pläne' not found");
        return Vec::new();
    };

    let entries = plans.root.as_deref().map(MenuItem::children).unwrap_or_default();

    entries
        .iter()
        .filter_map(|entry| {
            let detail = entry.children().first()?.detail.as_deref()?;
            if !(detail.ends_with(".htm") || detail.ends_with(".html")) {
                return None;
            }
            Some(PlanLink {
                detail: detail.to_string(),
                date: entry.date.clone(),
                title: entry.title.clone(),
            })
        })
        .collect()
}

/// Client for one DSBmobile account
#[derive(Debug, Clone)]
pub struct DsbClient {
    username: String,
    password: String,
    data_url: String,
    client: Client,
}

impl DsbClient {
    pub fn new(username: &str, password: &str) -> Self {
        Self::with_url(username, password, DSB_DATA_URL)
    }

    /// Client talking to a different endpoint
    pub fn with_url(username: &str, password: &str, data_url: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            data_url: data_url.to_string(),
            client: Client::new(),
        }
    }

    /// Fetch all plan links; failures are logged and yield an empty list
    pub async fn fetch_menu_links(&self) -> Vec<PlanLink> {
        match self.try_fetch_menu().await {
            Ok(menu) => {
                let links = extract_plan_links(&menu);
                info!("DSB links found: {} substitution plan(s)", links.len());
                debug!("DSB links: {:?}", links);
                links
            }
            Err(e) => {
                error!("DSB fetch failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_fetch_menu(&self) -> Result<MenuResponse, DsbError> {
        let params = RequestParams::new(&self.username, &self.password);
        let params_json = serde_json::to_string(&params).map_err(|e| DsbError::Payload(e.to_string()))?;

        let envelope = RequestEnvelope {
            req: RequestBody {
                data: encode_payload(&params_json)?,
                data_type: 1,
            },
        };

        let response = self
            .client
            .post(&self.data_url)
            .json(&envelope)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| DsbError::RequestFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| DsbError::RequestFailed(e.to_string()))?;

        let envelope: ResponseEnvelope = response
            .json()
            .await
            .map_err(|e| DsbError::Payload(e.to_string()))?;

        let menu: MenuResponse = serde_json::from_str(&decode_payload(&envelope.d)?)
            .map_err(|e| DsbError::Payload(e.to_string()))?;

        menu.into_success()
    }

    /// Download a plan page as text
    pub async fn fetch_page(&self, url: &str) -> Result<String, DsbError> {
        let response = self
            .client
            .get(url)
            .timeout(Duration::from_secs(PAGE_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| DsbError::RequestFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| DsbError::RequestFailed(e.to_string()))?;

        // Untis pages are often Windows-1252 without a charset header
        let bytes = response.bytes().await.map_err(|e| DsbError::RequestFailed(e.to_string()))?;
        Ok(decode_page(&bytes))
    }
}

/// Decode page bytes as UTF-8, falling back to Windows-1252.
///
/// Pages labelled ISO-8859-1 are decoded as Windows-1252, as browsers do.
pub fn decode_page(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            text.into_owned()
        }
    }
}
