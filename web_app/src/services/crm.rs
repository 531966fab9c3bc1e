//! CRM lead creation through the MCP server.
//!
//! The MCP server exposes a `zoho_create_lead` tool; creating the lead there
//! triggers the automated outbound call. Requests use a JSON-RPC
//! `tools/call` envelope.

use anyhow::{Context, bail};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{consts, metric, models, services::Outcome};

#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<P> {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: P,
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct ToolCall<A> {
    pub name: &'static str,
    pub arguments: A,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadArguments {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub phone: String,
    pub company: &'static str,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

/// Builds the `tools/call` envelope creating a lead for `call_request`
pub fn build_create_lead_request(
    call_request: &models::call_request::CallRequest,
) -> JsonRpcRequest<ToolCall<CreateLeadArguments>> {
    let (first_name, last_name) = call_request.lead_name_parts();

    JsonRpcRequest {
        jsonrpc: "2.0",
        method: "tools/call",
        params: ToolCall {
            name: consts::CRM_LEAD_TOOL_NAME,
            arguments: CreateLeadArguments {
                first_name,
                last_name,
                email: call_request.email.clone(),
                phone: call_request.phone_number.clone(),
                company: consts::CRM_LEAD_COMPANY,
            },
        },
        id: Utc::now().timestamp_millis(),
    }
}

/// Reads the MCP reply, any error member or tool error counts as a failure
pub fn interpret_rpc_response(status: StatusCode, body: &str) -> anyhow::Result<String> {
    let response: JsonRpcResponse = serde_json::from_str(body)
        .with_context(|| format!("crm returned a malformed body with status {status}"))?;

    if let Some(error) = response.error {
        bail!(
            "crm rejected the lead with status {status}, code {:?}: {}",
            error.code,
            error.message
        );
    }

    if !status.is_success() {
        bail!("crm returned error status {status}");
    }

    let result = response.result.unwrap_or_default();
    if result.get("isError").and_then(serde_json::Value::as_bool) == Some(true) {
        bail!("crm tool reported an error: {result}");
    }

    Ok(result.to_string())
}

#[derive(Clone)]
pub struct McpCrmHandler {
    client: reqwest::Client,
    endpoint: String,
}

impl McpCrmHandler {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .context("crm http client couldnt be built")?,
            endpoint: format!("{}/mcp", base_url.trim_end_matches('/')),
        })
    }

    async fn send_create_lead(
        &self,
        call_request: &models::call_request::CallRequest,
    ) -> anyhow::Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&build_create_lead_request(call_request))
            .send()
            .await
            .context("Failed to send request to the MCP server")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read the MCP server response")?;

        interpret_rpc_response(status, &body)
    }
}

#[async_trait]
impl crate::services::CrmService for McpCrmHandler {
    async fn create_lead(
        &self,
        call_request: &models::call_request::CallRequest,
    ) -> Outcome<String> {
        let outcome = Outcome::from_result(self.send_create_lead(call_request).await);
        metric::incr_crm_status_statds(outcome.status());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::CrmService;
    use serde_json::json;

    fn call_request(email: Option<&str>) -> models::call_request::CallRequest {
        models::call_request::CallRequest::from(models::call_request::NewCallRequest {
            name: "Asha Rao".to_string(),
            phone_number: "+919876543210".to_string(),
            email: email.map(str::to_string),
        })
    }

    #[test]
    fn test_build_create_lead_request_envelope() {
        let request = serde_json::to_value(build_create_lead_request(&call_request(Some(
            "asha@x.com",
        ))))
        .unwrap();

        assert_eq!(request["jsonrpc"], "2.0");
        assert_eq!(request["method"], "tools/call");
        assert_eq!(request["params"]["name"], "zoho_create_lead");
        assert_eq!(
            request["params"]["arguments"],
            json!({
                "firstName": "Asha",
                "lastName": "Rao",
                "email": "asha@x.com",
                "phone": "+919876543210",
                "company": "Via Ruka Website"
            })
        );
        assert!(request["id"].is_i64());
    }

    #[test]
    fn test_build_create_lead_request_omits_missing_email() {
        let request = serde_json::to_value(build_create_lead_request(&call_request(None))).unwrap();
        assert!(request["params"]["arguments"].get("email").is_none());
    }

    #[test]
    fn test_interpret_rpc_response_success() {
        let body = r#"{"jsonrpc":"2.0","id":1,"result":{"content":[{"type":"text","text":"lead 42"}]}}"#;
        let result = interpret_rpc_response(StatusCode::OK, body).unwrap();
        assert!(result.contains("lead 42"));
    }

    #[test]
    fn test_interpret_rpc_response_failures() {
        let rpc_error = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"bad phone"}}"#;
        assert!(
            interpret_rpc_response(StatusCode::OK, rpc_error)
                .is_err_and(|e| e.to_string().contains("bad phone"))
        );

        let tool_error = r#"{"jsonrpc":"2.0","id":1,"result":{"isError":true}}"#;
        assert!(interpret_rpc_response(StatusCode::OK, tool_error).is_err());

        assert!(interpret_rpc_response(StatusCode::BAD_GATEWAY, r#"{"result":{}}"#).is_err());
        assert!(interpret_rpc_response(StatusCode::OK, "<html>oops</html>").is_err());
    }

    #[ntex::test]
    async fn test_create_lead_unreachable_server_fails_without_error() {
        let handler = McpCrmHandler::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();

        let outcome = handler.create_lead(&call_request(None)).await;

        assert!(matches!(outcome, Outcome::Failed(_)));
    }
}
