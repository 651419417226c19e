//! Authentication module for Mailscope
//!
//! Acquires app-only access tokens for Microsoft Graph through the OAuth2
//! client credentials grant against the Microsoft identity platform. The
//! token is requested fresh each time; nothing is cached or refreshed here,
//! so an expired token simply surfaces as an authentication failure on the
//! next Graph call.

mod error;

pub use error::{AuthError, AuthResult};

use oauth2::{
    basic::BasicClient, AuthUrl, ClientId, ClientSecret, Scope, TokenResponse, TokenUrl,
};
use tracing::{debug, info};

/// Microsoft identity platform configuration
pub mod microsoft {
    /// Default scope for app-only Microsoft Graph access
    pub const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

    /// Authorization endpoint for a tenant
    pub fn authorize_url(tenant_id: &str) -> String {
        format!(
            "https://login.microsoftonline.com/{}/oauth2/v2.0/authorize",
            tenant_id
        )
    }

    /// Token endpoint for a tenant
    pub fn token_url(tenant_id: &str) -> String {
        format!(
            "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
            tenant_id
        )
    }
}

/// Application credentials for the client credentials grant
///
/// The secret is sourced externally (e.g. a secret store) and only lives for
/// the duration of the exchange.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    /// Entra ID (Azure AD) tenant ID
    pub tenant_id: String,
    /// Application (client) ID
    pub client_id: String,
    /// Client secret issued for the application
    pub client_secret: String,
}

impl ClientCredentials {
    /// Create a new set of application credentials
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

/// Exchange application credentials for a Graph access token
///
/// Performs the client credentials grant against the tenant's token endpoint
/// with the Graph default scope and returns the raw bearer token string,
/// exactly as issued by the provider.
pub async fn acquire_token(credentials: &ClientCredentials) -> AuthResult<String> {
    let client = oauth_client(credentials)?;

    debug!(
        "Requesting app-only token for tenant {}",
        credentials.tenant_id
    );

    let token_response = client
        .exchange_client_credentials()
        .add_scope(Scope::new(microsoft::GRAPH_SCOPE.to_string()))
        .request_async(oauth2::reqwest::async_http_client)
        .await
        .map_err(|e| AuthError::TokenExchangeFailed(e.to_string()))?;

    info!(
        "Acquired Graph access token for tenant {}",
        credentials.tenant_id
    );

    Ok(token_response.access_token().secret().clone())
}

/// Build the OAuth2 client for a tenant's endpoints
fn oauth_client(credentials: &ClientCredentials) -> AuthResult<BasicClient> {
    let client_id = ClientId::new(credentials.client_id.clone());
    let client_secret = ClientSecret::new(credentials.client_secret.clone());
    let auth_url = AuthUrl::new(microsoft::authorize_url(&credentials.tenant_id))
        .map_err(|e| AuthError::InvalidConfig(format!("Invalid auth URL: {}", e)))?;
    let token_url = TokenUrl::new(microsoft::token_url(&credentials.tenant_id))
        .map_err(|e| AuthError::InvalidConfig(format!("Invalid token URL: {}", e)))?;

    Ok(BasicClient::new(
        client_id,
        Some(client_secret),
        auth_url,
        Some(token_url),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_endpoints() {
        let tenant = "11111111-2222-3333-4444-555555555555";
        assert_eq!(
            microsoft::token_url(tenant),
            "https://login.microsoftonline.com/11111111-2222-3333-4444-555555555555/oauth2/v2.0/token"
        );
        assert_eq!(
            microsoft::authorize_url(tenant),
            "https://login.microsoftonline.com/11111111-2222-3333-4444-555555555555/oauth2/v2.0/authorize"
        );
    }

    #[test]
    fn test_graph_scope() {
        assert_eq!(microsoft::GRAPH_SCOPE, "https://graph.microsoft.com/.default");
    }

    #[test]
    fn test_oauth_client_accepts_tenant_id() {
        let credentials =
            ClientCredentials::new("contoso.onmicrosoft.com", "client-id", "client-secret");
        assert!(oauth_client(&credentials).is_ok());
    }
}
