use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{GraphError, GraphResult};
use crate::types::*;

const GRAPH_BASE: &str = "https://graph.microsoft.com/v1.0";

/// Page size sent with every message listing. Always passed as `$top` — the
/// service default is 10, which silently truncates an investigation.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Default `$select` projection for message detail fetches
pub const DEFAULT_MESSAGE_FIELDS: &[&str] = &[
    "id",
    "changeKey",
    "categories",
    "createDateTime",
    "lastModifiedDateTime",
    "subject",
    "body",
    "importance",
    "hasAttachments",
    "attachments",
    "parentFolderId",
    "from",
    "sender",
    "toRecipients",
    "ccRecipients",
    "bccRecipients",
    "replyTo",
    "conversationId",
    "conversationIndex",
    "receivedDateTime",
    "sentDateTime",
    "isDeliveryReceiptRequested",
    "isReadReceiptRequested",
    "isRead",
    "isDraft",
    "webLink",
    "internetMessageId",
    "internetMessageHeaders",
    "flag",
    "inferenceClassification",
    "uniqueBody",
    "singleValueExtendedProperties",
    "multiValueExtendedProperties",
];

/// Client for the Graph mail endpoints of one or more mailboxes
///
/// Holds the HTTP connection pool and the bearer token for its lifetime.
/// Nothing else is cached: every call goes straight to the service, and an
/// expired token surfaces as an API error on the next call. Construct a
/// fresh client with a fresh token per session.
pub struct MailboxClient {
    client: reqwest::Client,
    access_token: String,
}

impl MailboxClient {
    pub fn new(access_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token,
        }
    }

    /// List all top-level folders of a mailbox as display name -> folder ID
    ///
    /// The service returns the same empty list for a nonexistent mailbox and
    /// for one with no folders; both surface as `NotFound`.
    pub async fn list_folders(&self, mailbox: &str) -> GraphResult<HashMap<String, String>> {
        let url = format!("{}/users/{}/mailFolders", GRAPH_BASE, mailbox);
        debug!("Graph: listing folders for {}", mailbox);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::ApiError { status, body });
        }

        let list: GraphListResponse<MailFolder> = response
            .json()
            .await
            .map_err(|e| GraphError::ParseError(e.to_string()))?;

        if list.value.is_empty() {
            return Err(GraphError::NotFound(format!(
                "no folders in mailbox {}",
                mailbox
            )));
        }

        info!("Graph: found {} folders in {}", list.value.len(), mailbox);
        Ok(folder_map(list.value))
    }

    /// Resolve a folder ID by server-side filter
    ///
    /// Returns the first match in server order; no client-side tie-break.
    pub async fn resolve_folder(&self, mailbox: &str, filter: &str) -> GraphResult<String> {
        let url = format!("{}/users/{}/mailFolders", GRAPH_BASE, mailbox);
        debug!("Graph: resolving folder in {} with filter {}", mailbox, filter);

        let response = self
            .client
            .get(&url)
            .query(&[("$filter", filter)])
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::ApiError { status, body });
        }

        let list: GraphListResponse<MailFolder> = response
            .json()
            .await
            .map_err(|e| GraphError::ParseError(e.to_string()))?;

        let folder = first_match(
            list.value,
            format!("no folders matching filter: {}", filter),
        )?;

        info!("Graph: resolved folder filter to {}", folder.id);
        Ok(folder.id)
    }

    /// List the child folders of a folder as display name -> folder ID
    pub async fn list_child_folders(
        &self,
        mailbox: &str,
        parent_folder_id: &str,
    ) -> GraphResult<HashMap<String, String>> {
        let url = format!(
            "{}/users/{}/mailFolders/{}/childFolders",
            GRAPH_BASE, mailbox, parent_folder_id
        );
        debug!("Graph: listing child folders of {}", parent_folder_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::ApiError { status, body });
        }

        let list: GraphListResponse<MailFolder> = response
            .json()
            .await
            .map_err(|e| GraphError::ParseError(e.to_string()))?;

        if list.value.is_empty() {
            return Err(GraphError::NotFound(format!(
                "no child folders under folder {}",
                parent_folder_id
            )));
        }

        info!(
            "Graph: found {} child folders under {}",
            list.value.len(),
            parent_folder_id
        );
        Ok(folder_map(list.value))
    }

    /// List messages in a folder, first page only
    ///
    /// `filter` is passed through to `$filter` verbatim when given and the
    /// parameter is omitted entirely when not. `top` defaults to
    /// [`DEFAULT_PAGE_SIZE`].
    pub async fn list_messages(
        &self,
        mailbox: &str,
        folder_id: &str,
        filter: Option<&str>,
        top: Option<u32>,
    ) -> GraphResult<MessageCollection> {
        let url = format!(
            "{}/users/{}/mailFolders/{}/messages",
            GRAPH_BASE, mailbox, folder_id
        );
        let query = message_query(filter, top);
        debug!(
            "Graph: listing messages in {} folder={} filter={:?}",
            mailbox, folder_id, filter
        );

        let response = self
            .client
            .get(&url)
            .query(&query)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::ApiError { status, body });
        }

        let list: GraphListResponse<MessageSummary> = response
            .json()
            .await
            .map_err(|e| GraphError::ParseError(e.to_string()))?;

        if list.value.is_empty() {
            return Err(GraphError::NotFound(format!(
                "no messages in folder for mailbox {}",
                mailbox
            )));
        }

        info!(
            "Graph: got {} messages, has_more={}",
            list.value.len(),
            list.next_link.is_some()
        );
        Ok(MessageCollection {
            messages: list.value,
            next_link: list.next_link,
        })
    }

    /// Resolve a message ID by server-side filter, first match in server order
    pub async fn resolve_message(
        &self,
        mailbox: &str,
        folder_id: &str,
        filter: &str,
    ) -> GraphResult<String> {
        let url = format!(
            "{}/users/{}/mailFolders/{}/messages",
            GRAPH_BASE, mailbox, folder_id
        );
        debug!("Graph: resolving message in folder {} with filter {}", folder_id, filter);

        let response = self
            .client
            .get(&url)
            .query(&[("$filter", filter)])
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::ApiError { status, body });
        }

        let list: GraphListResponse<MessageSummary> = response
            .json()
            .await
            .map_err(|e| GraphError::ParseError(e.to_string()))?;

        let message = first_match(
            list.value,
            format!("no messages matching filter: {}", filter),
        )?;

        info!("Graph: resolved message filter to {}", message.id);
        Ok(message.id)
    }

    /// Fetch one message restricted to a field projection
    ///
    /// `fields` defaults to [`DEFAULT_MESSAGE_FIELDS`]. The result is the
    /// raw field-name -> value mapping; the shape follows whatever
    /// projection the caller asked for.
    pub async fn get_message_detail(
        &self,
        mailbox: &str,
        folder_id: &str,
        message_id: &str,
        fields: Option<&[&str]>,
    ) -> GraphResult<Map<String, Value>> {
        let url = format!(
            "{}/users/{}/mailFolders/{}/messages/{}",
            GRAPH_BASE, mailbox, folder_id, message_id
        );
        let projection = select_projection(fields);
        debug!("Graph: fetching message {} with {} fields", message_id, projection.split(',').count());

        let response = self
            .client
            .get(&url)
            .query(&[("$select", projection.as_str())])
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::ApiError { status, body });
        }

        let detail: Map<String, Value> = response
            .json()
            .await
            .map_err(|e| GraphError::ParseError(e.to_string()))?;

        if detail.is_empty() {
            return Err(GraphError::NotFound(format!(
                "message {} has no metadata",
                message_id
            )));
        }

        Ok(detail)
    }

    /// List the attachment IDs of a message, in server order
    pub async fn list_attachment_ids(
        &self,
        mailbox: &str,
        folder_id: &str,
        message_id: &str,
    ) -> GraphResult<Vec<String>> {
        let url = format!(
            "{}/users/{}/mailFolders/{}/messages/{}/attachments",
            GRAPH_BASE, mailbox, folder_id, message_id
        );
        debug!("Graph: listing attachments for {}", message_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::ApiError { status, body });
        }

        let list: GraphListResponse<AttachmentMetadata> = response
            .json()
            .await
            .map_err(|e| GraphError::ParseError(e.to_string()))?;

        if list.value.is_empty() {
            return Err(GraphError::NotFound(format!(
                "no attachments in message {}",
                message_id
            )));
        }

        info!(
            "Graph: found {} attachments in {}",
            list.value.len(),
            message_id
        );
        Ok(list.value.into_iter().map(|a| a.id).collect())
    }

    /// ID of the first attachment of a message
    pub async fn first_attachment_id(
        &self,
        mailbox: &str,
        folder_id: &str,
        message_id: &str,
    ) -> GraphResult<String> {
        let ids = self
            .list_attachment_ids(mailbox, folder_id, message_id)
            .await?;
        first_match(ids, format!("no attachments in message {}", message_id))
    }

    /// Download one attachment: metadata, then raw content
    ///
    /// Two requests — the attachment resource for name and content type,
    /// then the `$value` endpoint for the bytes. If either comes back empty
    /// the whole operation fails; no partial result is returned.
    pub async fn get_attachment(
        &self,
        mailbox: &str,
        folder_id: &str,
        message_id: &str,
        attachment_id: &str,
    ) -> GraphResult<AttachmentData> {
        let url = format!(
            "{}/users/{}/mailFolders/{}/messages/{}/attachments/{}",
            GRAPH_BASE, mailbox, folder_id, message_id, attachment_id
        );
        debug!("Graph: fetching attachment metadata for {}", attachment_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::ApiError { status, body });
        }

        let body = response.text().await?;
        if body.is_empty() {
            return Err(GraphError::NotFound(format!(
                "attachment {} has no metadata",
                attachment_id
            )));
        }
        let metadata: AttachmentMetadata =
            serde_json::from_str(&body).map_err(|e| GraphError::ParseError(e.to_string()))?;

        let url = format!("{}/$value", url);
        debug!("Graph: fetching attachment content for {}", attachment_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::ApiError { status, body });
        }

        let content = response.bytes().await?;
        if content.is_empty() {
            return Err(GraphError::NotFound(format!(
                "attachment {} has no content",
                attachment_id
            )));
        }

        info!(
            "Graph: attachment '{}' ({}) {} bytes",
            metadata.name,
            metadata.content_type.as_deref().unwrap_or("unknown"),
            content.len()
        );
        Ok(AttachmentData {
            name: metadata.name,
            content_type: metadata.content_type,
            content: content.to_vec(),
        })
    }
}

/// Collapse a folder listing into display name -> ID
///
/// Display names are not unique; the last folder with a given name wins.
fn folder_map(folders: Vec<MailFolder>) -> HashMap<String, String> {
    folders
        .into_iter()
        .map(|folder| (folder.display_name, folder.id))
        .collect()
}

/// Query parameters for a message listing. `$top` is always sent.
fn message_query(filter: Option<&str>, top: Option<u32>) -> Vec<(&'static str, String)> {
    let mut query = vec![("$top", top.unwrap_or(DEFAULT_PAGE_SIZE).to_string())];
    if let Some(filter) = filter {
        query.push(("$filter", filter.to_string()));
    }
    query
}

/// Comma-joined `$select` projection, defaulting to the full field list
fn select_projection(fields: Option<&[&str]>) -> String {
    fields.unwrap_or(DEFAULT_MESSAGE_FIELDS).join(",")
}

/// First element of a server-ordered listing, or a not-found error naming
/// what was searched for
fn first_match<T>(items: Vec<T>, searched: String) -> GraphResult<T> {
    items
        .into_iter()
        .next()
        .ok_or(GraphError::NotFound(searched))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(id: &str, name: &str) -> MailFolder {
        MailFolder {
            id: id.to_string(),
            display_name: name.to_string(),
            parent_folder_id: None,
            child_folder_count: None,
            total_item_count: None,
            unread_item_count: None,
        }
    }

    #[test]
    fn test_default_projection() {
        let projection = select_projection(None);
        assert_eq!(DEFAULT_MESSAGE_FIELDS.len(), 33);
        assert_eq!(projection.split(',').count(), 33);
        assert!(projection.starts_with("id,changeKey,categories,"));
        assert!(projection.ends_with("singleValueExtendedProperties,multiValueExtendedProperties"));
    }

    #[test]
    fn test_explicit_projection() {
        let projection = select_projection(Some(&["subject", "receivedDateTime"]));
        assert_eq!(projection, "subject,receivedDateTime");
    }

    #[test]
    fn test_message_query_defaults_to_top_100() {
        let query = message_query(None, None);
        assert_eq!(query, vec![("$top", "100".to_string())]);
    }

    #[test]
    fn test_message_query_passes_filter_verbatim() {
        let query = message_query(Some("isRead eq false"), Some(25));
        assert_eq!(
            query,
            vec![
                ("$top", "25".to_string()),
                ("$filter", "isRead eq false".to_string()),
            ]
        );
    }

    #[test]
    fn test_folder_map_keeps_last_duplicate() {
        let folders = vec![
            folder("id-1", "Inbox"),
            folder("id-2", "Projects"),
            folder("id-3", "Projects"),
        ];

        let map = folder_map(folders);
        assert_eq!(map.len(), 2);
        assert_eq!(map["Inbox"], "id-1");
        assert_eq!(map["Projects"], "id-3");
    }

    #[test]
    fn test_first_match_takes_server_order() {
        let folders = vec![folder("id-1", "Inbox"), folder("id-2", "Inbox 2")];
        let first = first_match(folders, "no folders".to_string()).unwrap();
        assert_eq!(first.id, "id-1");
    }

    #[test]
    fn test_first_match_empty_is_not_found() {
        let err = first_match(
            Vec::<MailFolder>::new(),
            "no folders matching filter: displayName eq 'Inbox'".to_string(),
        )
        .unwrap_err();

        match err {
            GraphError::NotFound(searched) => {
                assert!(searched.contains("displayName eq 'Inbox'"))
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }
}
