use crate::domain::model::{EmailMarketingList, ErrorReport, FieldMapping, IntegrationFormSettings};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Method;
use std::time::Duration;

/// `deliver_payload` 的結果：已送出並取得回應，或在送出前被攔截
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadDelivery {
    Sent(serde_json::Value),
    Cancelled,
}

/// 對供應商 API 的 HTTP 存取
///
/// 回傳 `Err` 且 `is_transport()` 為 true 時表示沒有取得回應；
/// 回應內容是否符合預期由呼叫端判斷。
#[async_trait]
pub trait HttpGateway: Send + Sync {
    async fn request(&self, method: Method, path: &str) -> Result<serde_json::Value>;

    async fn deliver_payload(
        &self,
        path: &str,
        payload: serde_json::Value,
    ) -> Result<PayloadDelivery>;
}

pub trait ErrorReporter: Send + Sync {
    fn report(&self, report: ErrorReport);
}

pub trait ConfigProvider: Send + Sync {
    fn api_key(&self) -> &str;
    fn list_id(&self) -> Option<&str>;
    fn base_url(&self) -> &str;
    fn timeout(&self) -> Option<Duration>;
    fn field_mapping(&self) -> &[(String, String)];
}

/// 郵件行銷整合的三個操作，由各供應商實作
#[async_trait]
pub trait EmailMarketing: Send + Sync {
    fn handle(&self) -> &str;

    fn display_name(&self) -> &str;

    fn description(&self) -> &str;

    /// 取得遠端清單與欄位；失敗時回傳空集合
    async fn discover_schema(&self) -> Vec<EmailMarketingList>;

    /// 驗證憑證與連線，不會回傳錯誤
    async fn verify_connection(&self) -> bool;

    /// 送出一筆訂閱，成功代表供應商回傳了聯絡人 id
    async fn deliver(&self, mapped_fields: FieldMapping, list_id: &str) -> bool;

    async fn fetch_form_settings(&self) -> IntegrationFormSettings {
        IntegrationFormSettings {
            lists: self.discover_schema().await,
        }
    }
}
