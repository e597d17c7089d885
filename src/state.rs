//! Shared application state injected into every handler.

use axum::http::HeaderMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

use crate::application::services::UrlService;
use crate::domain::visit_event::VisitEvent;
use crate::utils::request_host::host_from_headers;

/// State cloned into each request.
///
/// All fields are cheap to clone (`Arc` or channel handles).
#[derive(Clone)]
pub struct AppState {
    pub url_service: Arc<UrlService>,
    pub visit_sender: mpsc::Sender<VisitEvent>,
    /// Public prefix for `short_url`, without trailing slash.
    pub base_url: Option<String>,
}

impl AppState {
    pub fn new(
        url_service: Arc<UrlService>,
        visit_sender: mpsc::Sender<VisitEvent>,
        base_url: Option<String>,
    ) -> Self {
        Self {
            url_service,
            visit_sender,
            base_url,
        }
    }

    /// Builds the public short URL for `code`.
    ///
    /// Uses the configured base URL, or `http://<Host>/` from the request.
    pub fn short_url(&self, headers: &HeaderMap, code: &str) -> String {
        match &self.base_url {
            Some(base) => format!("{}/{}", base, code),
            None => {
                let host = host_from_headers(headers).unwrap_or_else(|| "localhost".to_string());
                format!("http://{}/{}", host, code)
            }
        }
    }

    /// Queues a visit without waiting. Dropped with a warning when the queue is full.
    pub fn record_visit(&self, code: &str) {
        match self.visit_sender.try_send(VisitEvent::new(code)) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                metrics::counter!("shortener_visits_dropped_total").increment(1);
                warn!("Visit queue full, dropping visit for {}", event.code);
            }
            Err(TrySendError::Closed(event)) => {
                warn!("Visit queue closed, dropping visit for {}", event.code);
            }
        }
    }
}
