//! Notification hooks
//!
//! Hand-off points for the external messaging collaborator. Nothing here
//! touches the stores.

use serde::{Deserialize, Serialize};
use tracing::info;

const DEFAULT_TITLE: &str = "Notification";
const DEFAULT_URL: &str = "/";

/// Payload delivered with a push message or a notification click.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PushPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    /// Page to open when the notification is clicked
    #[serde(default)]
    pub url: Option<String>,
}

/// Notification the host should display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Carried along so the click hook knows where to go
    pub url: String,
}

/// What the host should do with its client windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ClientAction {
    OpenClient { url: String },
}

/// push-received → show-notification
pub fn push_received(payload: PushPayload) -> Notification {
    let notification = Notification {
        title: payload
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        body: payload.body.unwrap_or_default(),
        icon: payload.icon,
        url: payload.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
    };
    info!(title = %notification.title, "Push received");
    notification
}

/// notification-clicked → open-client(url)
pub fn notification_clicked(payload: PushPayload) -> ClientAction {
    let url = payload
        .url
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_URL.to_string());
    info!(%url, "Notification clicked");
    ClientAction::OpenClient { url }
}
