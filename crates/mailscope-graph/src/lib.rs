//! Microsoft Graph mailbox access for Mailscope
//!
//! A thin client over the Graph mail endpoints for Exchange Online
//! investigations: folder enumeration, message listing with server-side
//! filtering, message detail with field projection, and attachment download.
//! Every operation is a single request/response exchange; failures surface
//! immediately with no retry or caching layer in between.

pub mod client;
pub mod error;
pub mod filters;
pub mod types;

pub use client::{MailboxClient, DEFAULT_MESSAGE_FIELDS, DEFAULT_PAGE_SIZE};
pub use error::{GraphError, GraphResult};
pub use types::*;
