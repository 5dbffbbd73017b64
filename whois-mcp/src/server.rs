//! MCP tool surface for WHOIS lookups.

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use whois_lib::{parse_record, Query, WhoisClient};

/// Upper bound on the per-round-trip timeout a tool call can ask for.
const MAX_TIMEOUT_SECS: u64 = 3600;

#[derive(Debug, Clone, Default, Deserialize, schemars::JsonSchema)]
pub struct WhoisLookupParams {
    /// Domain name, IPv4/IPv6 address or ASN (e.g. "example.com", "8.8.8.8", "AS15169")
    pub query: String,

    /// WHOIS server to ask instead of the built-in table, e.g. "whois.iana.org"
    #[serde(default)]
    pub server: Option<String>,

    /// Per-round-trip timeout in seconds (default 30, at most 3600)
    #[serde(default)]
    pub timeout: Option<u64>,

    /// Do not follow a referral to a second server
    #[serde(default)]
    pub disable_referral: Option<bool>,

    /// Return the parsed record as JSON instead of raw text
    #[serde(default)]
    pub parse_json: Option<bool>,
}

#[derive(Clone)]
pub struct WhoisServer {
    client: WhoisClient,
    tool_router: ToolRouter<Self>,
}

impl Default for WhoisServer {
    fn default() -> Self {
        Self::new(WhoisClient::new())
    }
}

#[tool_router]
impl WhoisServer {
    pub fn new(client: WhoisClient) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Look up WHOIS registration data for a domain name, IP address or autonomous system number. Follows one referral to the registrar's server automatically."
    )]
    async fn whois_lookup(
        &self,
        Parameters(params): Parameters<WhoisLookupParams>,
    ) -> Result<CallToolResult, McpError> {
        let text = self.lookup(&params).await?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

impl WhoisServer {
    /// Run one lookup and render the tool's text output.
    pub async fn lookup(&self, params: &WhoisLookupParams) -> Result<String, McpError> {
        let subject = params.query.trim();
        if subject.is_empty() {
            return Err(McpError::invalid_params("query must not be empty", None));
        }

        let mut query = Query::new(subject)
            .with_referral_disabled(params.disable_referral.unwrap_or(false));
        if let Some(server) = params.server.as_deref().filter(|s| !s.trim().is_empty()) {
            query = query.with_server(server.trim());
        }
        if let Some(secs) = params.timeout {
            query = query.with_timeout(Duration::from_secs(secs.min(MAX_TIMEOUT_SECS)));
        }

        debug!("whois_lookup {} (server {:?})", subject, params.server);

        let result = self.client.whois(&query).await.map_err(|e| {
            warn!("whois_lookup {} failed: {}", subject, e);
            McpError::internal_error(format!("whois query failed: {}", e), None)
        })?;

        if !params.parse_json.unwrap_or(false) {
            return Ok(result.text);
        }

        let rendered = parse_record(&result.text)
            .and_then(|record| serde_json::to_string_pretty(&record).map_err(Into::into));

        Ok(match rendered {
            Ok(json) => json,
            Err(e) => format!(
                "Failed to parse whois data as JSON: {}\n\nRaw whois data:\n{}",
                e, result.text
            ),
        })
    }
}

#[tool_handler]
impl ServerHandler for WhoisServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "WHOIS lookups for domains, IP addresses and ASNs. Call whois_lookup with a query; set parse_json for a structured record.".to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
