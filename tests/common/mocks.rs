/*!
 * Mock collaborators for bot tests
 *
 * These stand in for the DSB service and the Discord webhooks so that no
 * network requests are made. Every call is recorded for later assertions.
 */

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use dsb_bot::bot::{PlanEntry, PlanSource};
use dsb_bot::dsb_client::PlanLink;
use dsb_bot::errors::DsbError;
use dsb_bot::notifier::Notifier;

/// Recorded plan-update announcement
#[derive(Debug, Clone)]
pub struct PlanUpdate {
    pub plans: Vec<PlanEntry>,
    pub new_keys: HashSet<String>,
}

/// Notifier that records what it was asked to send
#[derive(Debug, Default)]
pub struct MockNotifier {
    pub warnings: Mutex<Vec<String>>,
    pub updates: Mutex<Vec<PlanUpdate>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<PlanUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send_warning(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }

    async fn send_plan_update(&self, plans: &[PlanEntry], new_keys: &HashSet<String>) {
        self.updates.lock().unwrap().push(PlanUpdate {
            plans: plans.to_vec(),
            new_keys: new_keys.clone(),
        });
    }
}

/// Plan source serving fixed links and pages
#[derive(Debug, Default)]
pub struct MockPlanSource {
    links: Mutex<Vec<PlanLink>>,
    pages: Mutex<HashMap<String, String>>,
    pub page_requests: Mutex<Vec<String>>,
}

impl MockPlanSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a page under `url`
    pub fn publish(&self, url: &str, html: &str) {
        self.links.lock().unwrap().push(PlanLink {
            detail: url.to_string(),
            date: None,
            title: None,
        });
        self.pages.lock().unwrap().insert(url.to_string(), html.to_string());
    }

    /// Replace the published links, keeping known pages
    pub fn set_links(&self, urls: &[&str]) {
        *self.links.lock().unwrap() = urls
            .iter()
            .map(|url| PlanLink {
                detail: url.to_string(),
                date: None,
                title: None,
            })
            .collect();
    }

    pub fn add_page(&self, url: &str, html: &str) {
        self.pages.lock().unwrap().insert(url.to_string(), html.to_string());
    }

    pub fn page_request_count(&self) -> usize {
        self.page_requests.lock().unwrap().len()
    }
}

#[async_trait]
impl PlanSource for MockPlanSource {
    async fn fetch_menu_links(&self) -> Vec<PlanLink> {
        self.links.lock().unwrap().clone()
    }

    async fn fetch_page(&self, url: &str) -> Result<String, DsbError> {
        self.page_requests.lock().unwrap().push(url.to_string());
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| DsbError::RequestFailed(format!("404 for {}", url)))
    }
}

/// A minimal student plan page with a title
pub fn plan_page(title: &str) -> String {
    format!(
        "<html><body><div class=\"mon_title\">{}</div><p>Vertretungen</p></body></html>",
        title
    )
}
