//! Request and response payloads for the Message Bus v3 API.
//!
//! Field names follow the service's camelCase JSON. Response types tolerate
//! missing fields (they fall back to defaults) and ignore unknown ones, so the
//! values the service returns are passed through without further validation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Merge field the service uses for a mailing list entry's address.
pub const EMAIL_MERGE_FIELD: &str = "%EMAIL%";

/// A single email in a batch send.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    pub to_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_name: Option<String>,
    pub from_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plaintext_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub custom_headers: HashMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Body of `POST emails/send`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchEmailSendRequest {
    pub messages: Vec<EmailMessage>,
}

impl BatchEmailSendRequest {
    pub fn new(messages: Vec<EmailMessage>) -> Self {
        Self { messages }
    }
}

/// A single recipient of a template send.
///
/// Subject and bodies come from the template; `merge_fields` fills its
/// placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMessage {
    pub to_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_name: Option<String>,
    pub from_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub custom_headers: HashMap<String, String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub merge_fields: HashMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Body of `POST templates/send`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTemplateSendRequest {
    pub template_key: String,
    pub messages: Vec<TemplateMessage>,
}

impl BatchTemplateSendRequest {
    pub fn new(template_key: impl Into<String>, messages: Vec<TemplateMessage>) -> Self {
        Self {
            template_key: template_key.into(),
            messages,
        }
    }
}

/// Body of `POST mailing_lists`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailingListCreateRequest {
    pub name: String,
    pub merge_field_keys: Vec<String>,
}

impl MailingListCreateRequest {
    pub fn new(name: impl Into<String>, merge_field_keys: Vec<String>) -> Self {
        Self {
            name: name.into(),
            merge_field_keys,
        }
    }
}

/// Body of `POST mailing_list/{key}/entries`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailingListEntryCreateRequest {
    pub merge_fields: HashMap<String, String>,
}

impl MailingListEntryCreateRequest {
    /// Entry for `email`, stored under [`EMAIL_MERGE_FIELD`].
    pub fn new(email: impl Into<String>) -> Self {
        let mut merge_fields = HashMap::new();
        merge_fields.insert(EMAIL_MERGE_FIELD.to_string(), email.into());
        Self { merge_fields }
    }

    /// Add another merge field value.
    pub fn merge_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.merge_fields.insert(key.into(), value.into());
        self
    }
}

/// Status header carried by every response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiStatus {
    pub status_code: i32,
    pub status_message: String,
    /// Server timestamp, passed through as sent.
    pub status_time: String,
}

/// Error body returned with failure statuses.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorResponse {
    pub status_code: i32,
    pub status_message: String,
}

/// Per-recipient outcome of a batch send.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchEmailResult {
    pub to_email: String,
    pub message_id: String,
    pub message_status: i32,
}

/// Response of `emails/send` and `templates/send`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchEmailResponse {
    #[serde(flatten)]
    pub status: ApiStatus,
    pub success_count: u32,
    pub failure_count: u32,
    pub results: Vec<BatchEmailResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageStats {
    pub msgs_attempted_count: u64,
    pub complaint_count: u64,
    pub unsubscribe_count: u64,
    pub open_count: u64,
    pub unique_open_count: u64,
    pub click_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SmtpStats {
    pub accept_count: u64,
    pub bounce_count: u64,
    pub deferral_count: u64,
    pub reject_count: u64,
    pub sent_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterStats {
    pub rcpt_unsubscribe_count: u64,
    pub rcpt_complaint_count: u64,
    pub rcpt_bad_mailbox_count: u64,
}

/// Response of `GET stats`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub status: ApiStatus,
    pub stats: MessageStats,
    pub smtp: SmtpStats,
    pub filter: FilterStats,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryError {
    pub date: String,
    pub email: String,
    pub message_id: String,
    pub error_code: i32,
}

/// Response of `GET delivery_errors`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryErrorsResponse {
    #[serde(flatten)]
    pub status: ApiStatus,
    pub delivery_errors: Vec<DeliveryError>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Unsubscribe {
    pub date: String,
    pub email: String,
    pub message_id: String,
}

/// Response of `GET unsubscribes`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnsubscribesResponse {
    #[serde(flatten)]
    pub status: ApiStatus,
    pub unsubscribes: Vec<Unsubscribe>,
}

/// Response of `POST mailing_lists`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MailingListCreateResponse {
    #[serde(flatten)]
    pub status: ApiStatus,
    /// Key of the new list, used by the entry endpoints.
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MailingList {
    pub key: String,
    pub name: String,
    pub merge_field_keys: Vec<String>,
}

/// Response of `GET mailing_lists`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MailingListsResponse {
    #[serde(flatten)]
    pub status: ApiStatus,
    pub mailing_lists: Vec<MailingList>,
}

/// Response of `POST mailing_list/{key}/entries`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MailingListEntryCreateResponse {
    #[serde(flatten)]
    pub status: ApiStatus,
}

/// Response of `DELETE mailing_list/{key}/entry/{email}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MailingListEntryDeleteResponse {
    #[serde(flatten)]
    pub status: ApiStatus,
}
