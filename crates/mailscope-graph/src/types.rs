use serde::Deserialize;

/// Response wrapper for Graph API list endpoints
#[derive(Debug, Deserialize)]
pub struct GraphListResponse<T> {
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// A mail folder from Graph API
#[derive(Debug, Clone, Deserialize)]
pub struct MailFolder {
    pub id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "parentFolderId")]
    pub parent_folder_id: Option<String>,
    #[serde(rename = "childFolderCount")]
    pub child_folder_count: Option<i64>,
    #[serde(rename = "totalItemCount")]
    pub total_item_count: Option<i64>,
    #[serde(rename = "unreadItemCount")]
    pub unread_item_count: Option<i64>,
}

/// A message summary from a Graph list call (envelope fields, no full body)
#[derive(Debug, Clone, Deserialize)]
pub struct MessageSummary {
    pub id: String,
    #[serde(rename = "internetMessageId")]
    pub internet_message_id: Option<String>,
    pub subject: Option<String>,
    pub from: Option<Recipient>,
    #[serde(rename = "toRecipients", default)]
    pub to_recipients: Vec<Recipient>,
    #[serde(rename = "ccRecipients", default)]
    pub cc_recipients: Vec<Recipient>,
    #[serde(rename = "receivedDateTime")]
    pub received_date_time: Option<String>,
    #[serde(rename = "sentDateTime")]
    pub sent_date_time: Option<String>,
    #[serde(rename = "isRead")]
    pub is_read: Option<bool>,
    #[serde(rename = "isDraft")]
    pub is_draft: Option<bool>,
    #[serde(rename = "hasAttachments")]
    pub has_attachments: Option<bool>,
    #[serde(rename = "bodyPreview")]
    pub body_preview: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Recipient {
    #[serde(rename = "emailAddress")]
    pub email_address: EmailAddress,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailAddress {
    pub name: Option<String>,
    pub address: Option<String>,
}

/// First page of a message listing
///
/// The server's continuation link is surfaced as-is but never followed;
/// callers that need more than one page narrow the filter instead.
#[derive(Debug)]
pub struct MessageCollection {
    pub messages: Vec<MessageSummary>,
    pub next_link: Option<String>,
}

/// Attachment metadata, fetched separately from content
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentMetadata {
    pub id: String,
    pub name: String,
    #[serde(rename = "contentType")]
    pub content_type: Option<String>,
    pub size: Option<i64>,
    #[serde(rename = "isInline")]
    pub is_inline: Option<bool>,
}

/// A downloaded attachment: metadata plus the raw bytes from the `$value`
/// endpoint, buffered in full
#[derive(Debug, Clone)]
pub struct AttachmentData {
    pub name: String,
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}
