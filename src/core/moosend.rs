use crate::core::mapping::{build_subscriber_payload, EMAIL_HANDLE, NAME_HANDLE};
use crate::core::{
    EmailMarketing, EmailMarketingList, ErrorReport, ErrorReporter, FieldMapping, HttpGateway,
    IntegrationField, PayloadDelivery,
};
use crate::utils::error::{IntegrationError, Result};
use reqwest::Method;
use serde::Deserialize;

pub const MOOSEND_BASE_URL: &str = "http://api.moosend.com/v3/";

const LISTS_PATH: &str = "lists.json";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListsResponse {
    #[serde(default)]
    context: Option<ListsContext>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListsContext {
    #[serde(default)]
    mailing_lists: Option<Vec<MailingList>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MailingList {
    #[serde(rename = "ID")]
    id: String,
    name: String,
    #[serde(default)]
    custom_fields_definition: Option<Vec<CustomFieldDefinition>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CustomFieldDefinition {
    name: String,
    #[serde(default)]
    is_required: Option<bool>,
}

impl MailingList {
    fn into_list(self) -> EmailMarketingList {
        let mut fields = vec![
            IntegrationField::new(EMAIL_HANDLE, "Email", true),
            IntegrationField::new(NAME_HANDLE, "Name", false),
        ];

        fields.extend(
            self.custom_fields_definition
                .unwrap_or_default()
                .into_iter()
                .map(|field| {
                    IntegrationField::new(
                        field.name.clone(),
                        field.name,
                        field.is_required.unwrap_or(false),
                    )
                }),
        );

        EmailMarketingList {
            id: self.id,
            name: self.name,
            fields,
        }
    }
}

/// 回應中的聯絡人 id；空字串或 0 視為沒有建立訂閱者
fn contact_id(response: &serde_json::Value) -> Option<String> {
    match response.pointer("/Context/ID")? {
        serde_json::Value::String(id) if !id.is_empty() => Some(id.clone()),
        serde_json::Value::Number(n) if n.as_f64().is_some_and(|v| v != 0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// Moosend 訂閱者 API 的郵件行銷整合
pub struct MoosendConnector<G: HttpGateway, R: ErrorReporter> {
    handle: String,
    gateway: G,
    reporter: R,
}

impl<G: HttpGateway, R: ErrorReporter> MoosendConnector<G, R> {
    pub fn new(gateway: G, reporter: R) -> Self {
        Self {
            handle: "moosend".to_string(),
            gateway,
            reporter,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    #[track_caller]
    fn report_failure(&self, error: &IntegrationError) {
        let message = match error {
            IntegrationError::MissingResponseFieldError { .. }
            | IntegrationError::RejectedError { .. } => error.to_string(),
            _ => format!("API error: “{}”", error),
        };
        self.reporter
            .report(ErrorReport::new(self.handle.as_str(), message, true));
    }

    async fn fetch_lists(&self) -> Result<Vec<EmailMarketingList>> {
        let response = self.gateway.request(Method::GET, LISTS_PATH).await?;
        // 空的回應內容視為沒有清單
        let parsed: Option<ListsResponse> = serde_json::from_value(response)?;

        let lists = parsed
            .and_then(|parsed| parsed.context)
            .and_then(|context| context.mailing_lists)
            .unwrap_or_default();

        Ok(lists.into_iter().map(MailingList::into_list).collect())
    }

    async fn check_connection(&self) -> Result<String> {
        let response = self.gateway.request(Method::GET, LISTS_PATH).await?;

        response
            .pointer("/Context/MailingLists")
            .and_then(serde_json::Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|list| list.get("ID").and_then(serde_json::Value::as_str))
            .find(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| IntegrationError::MissingResponseFieldError {
                field: "{instance_id}".to_string(),
            })
    }

    async fn attempt_delivery(&self, mapped_fields: FieldMapping, list_id: &str) -> Result<String> {
        if list_id.trim().is_empty() {
            return Err(IntegrationError::MissingConfigError {
                field: "list_id".to_string(),
            });
        }

        let payload = build_subscriber_payload(mapped_fields);
        tracing::debug!(
            "Prepared subscriber payload with {} custom fields",
            payload.custom_fields.len()
        );

        let path = format!("subscribers/{}/subscribe.json", list_id);
        let body = serde_json::to_value(&payload)?;

        let response = match self.gateway.deliver_payload(&path, body).await? {
            PayloadDelivery::Sent(response) => response,
            PayloadDelivery::Cancelled => return Err(IntegrationError::PayloadCancelled),
        };

        contact_id(&response).ok_or_else(|| IntegrationError::RejectedError {
            response: response.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl<G: HttpGateway, R: ErrorReporter> EmailMarketing for MoosendConnector<G, R> {
    fn handle(&self) -> &str {
        &self.handle
    }

    fn display_name(&self) -> &str {
        "Moosend"
    }

    fn description(&self) -> &str {
        "Sign up users to your Moosend lists to grow your audience for campaigns."
    }

    async fn discover_schema(&self) -> Vec<EmailMarketingList> {
        match self.fetch_lists().await {
            Ok(lists) => {
                tracing::info!("Discovered {} Moosend lists", lists.len());
                lists
            }
            Err(e) => {
                tracing::warn!("List discovery failed: {}", e);
                self.report_failure(&e);
                Vec::new()
            }
        }
    }

    async fn verify_connection(&self) -> bool {
        match self.check_connection().await {
            Ok(list_id) => {
                tracing::info!("Connected to Moosend (first list {})", list_id);
                true
            }
            Err(e) => {
                tracing::warn!("Connection check failed: {}", e);
                self.report_failure(&e);
                false
            }
        }
    }

    async fn deliver(&self, mapped_fields: FieldMapping, list_id: &str) -> bool {
        match self.attempt_delivery(mapped_fields, list_id).await {
            Ok(contact_id) => {
                tracing::info!("Subscriber {} added to list {}", contact_id, list_id);
                true
            }
            Err(IntegrationError::PayloadCancelled) => {
                tracing::info!("Delivery to list {} cancelled before sending", list_id);
                false
            }
            Err(e) => {
                tracing::warn!("Delivery to list {} failed: {}", list_id, e);
                self.report_failure(&e);
                false
            }
        }
    }
}
