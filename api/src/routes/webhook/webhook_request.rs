use serde::Deserialize;
use serde_json::Value;

/// Webhook delivery; only `data.report.id` is read.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub data: Option<WebhookData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookData {
    #[serde(default)]
    pub report: Option<WebhookReport>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookReport {
    /// String or number on the wire.
    #[serde(default)]
    pub id: Value,
}

impl WebhookPayload {
    pub fn report_id(&self) -> Option<String> {
        let id = &self.data.as_ref()?.report.as_ref()?.id;
        match id {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// The feed holds one id per line, so an id must not contain whitespace or
/// control characters.
pub fn is_feed_safe(id: &str) -> bool {
    !id.chars().any(|c| c.is_whitespace() || c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_line_breaks_are_not_feed_safe() {
        assert!(is_feed_safe("2571"));
        assert!(!is_feed_safe("1\n2"));
        assert!(!is_feed_safe("1 2"));
        assert!(!is_feed_safe("1\u{7}"));
    }
}
