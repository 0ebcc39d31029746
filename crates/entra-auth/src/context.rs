//! Per-request client auth context
//!
//! [`ClientAuthContext`] is what downstream handlers see after the client-auth
//! middleware accepted a request. It is built fresh for every request from the
//! Teams routing headers and the validated token, stored in the request's
//! extensions, and dropped with the request.

use serde::{Deserialize, Serialize};

use crate::jwt::DecodedToken;

/// Teams routing headers read by the middleware
pub mod headers {
    /// App session id (required)
    pub const APP_SESSION_ID: &str = "x-teams-app-session-id";
    /// Page id (required)
    pub const PAGE_ID: &str = "x-teams-page-id";
    /// Channel id
    pub const CHANNEL_ID: &str = "x-teams-channel-id";
    /// Chat id
    pub const CHAT_ID: &str = "x-teams-chat-id";
    /// Meeting id
    pub const MEETING_ID: &str = "x-teams-meeting-id";
    /// Message id
    pub const MESSAGE_ID: &str = "x-teams-message-id";
    /// Sub-page id
    pub const SUB_PAGE_ID: &str = "x-teams-sub-page-id";
    /// Team id
    pub const TEAM_ID: &str = "x-teams-team-id";
}

/// Identity and routing information for an authenticated client request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientAuthContext {
    /// Calling application id (`appId` claim)
    pub app_id: Option<String>,
    /// Teams app session id
    pub app_session_id: String,
    /// The validated bearer token
    pub auth_token: String,
    /// Channel id
    pub channel_id: Option<String>,
    /// Chat id
    pub chat_id: Option<String>,
    /// Meeting id
    pub meeting_id: Option<String>,
    /// Message id
    pub message_id: Option<String>,
    /// Page id
    pub page_id: String,
    /// Sub-page id
    pub sub_page_id: Option<String>,
    /// Team id
    pub team_id: Option<String>,
    /// Tenant of the signed-in user (`tid` claim)
    pub tenant_id: Option<String>,
    /// Object id of the signed-in user (`oid` claim)
    pub user_id: Option<String>,
}

/// Routing headers of one request, before authentication
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientRequestHeaders {
    /// `X-Teams-App-Session-Id`
    pub app_session_id: Option<String>,
    /// `X-Teams-Page-Id`
    pub page_id: Option<String>,
    /// `Authorization`
    pub authorization: Option<String>,
    /// `X-Teams-Channel-Id`
    pub channel_id: Option<String>,
    /// `X-Teams-Chat-Id`
    pub chat_id: Option<String>,
    /// `X-Teams-Meeting-Id`
    pub meeting_id: Option<String>,
    /// `X-Teams-Message-Id`
    pub message_id: Option<String>,
    /// `X-Teams-Sub-Page-Id`
    pub sub_page_id: Option<String>,
    /// `X-Teams-Team-Id`
    pub team_id: Option<String>,
}

impl ClientRequestHeaders {
    /// Read the routing headers from `headers`
    ///
    /// Empty and non-UTF-8 values are treated as absent.
    pub fn from_header_map(map: &http::HeaderMap) -> Self {
        let get = |name: &str| {
            map.get(name)
                .and_then(|value| value.to_str().ok())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        Self {
            app_session_id: get(headers::APP_SESSION_ID),
            page_id: get(headers::PAGE_ID),
            authorization: get(http::header::AUTHORIZATION.as_str()),
            channel_id: get(headers::CHANNEL_ID),
            chat_id: get(headers::CHAT_ID),
            meeting_id: get(headers::MEETING_ID),
            message_id: get(headers::MESSAGE_ID),
            sub_page_id: get(headers::SUB_PAGE_ID),
            team_id: get(headers::TEAM_ID),
        }
    }

    /// Bearer token from the `Authorization` header
    ///
    /// The value is split on single spaces; only exactly two parts whose first
    /// is `bearer` (any case) yield a token. Anything else yields `""`.
    pub fn bearer_token(&self) -> &str {
        self.authorization.as_deref().map_or("", parse_bearer)
    }

    /// Build the context for a request whose token validated
    ///
    /// Returns `None` if the app session id or page id is missing.
    pub fn into_context(
        self,
        auth_token: String,
        token: &DecodedToken,
    ) -> Option<ClientAuthContext> {
        let claims = token.claims();

        Some(ClientAuthContext {
            app_id: claims.and_then(|c| c.app_id.clone()),
            app_session_id: self.app_session_id?,
            auth_token,
            channel_id: self.channel_id,
            chat_id: self.chat_id,
            meeting_id: self.meeting_id,
            message_id: self.message_id,
            page_id: self.page_id?,
            sub_page_id: self.sub_page_id,
            team_id: self.team_id,
            tenant_id: claims.and_then(|c| c.tid.clone()),
            user_id: claims.and_then(|c| c.oid.clone()),
        })
    }
}

fn parse_bearer(value: &str) -> &str {
    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") => *token,
        _ => "",
    }
}
