use crate::utils::error::Result;
use crate::utils::validation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::panic::Location;

/// 清單上的一個可對應欄位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationField {
    pub handle: String,
    pub name: String,
    pub required: bool,
}

impl IntegrationField {
    pub fn new(handle: impl Into<String>, name: impl Into<String>, required: bool) -> Self {
        Self {
            handle: handle.into(),
            name: name.into(),
            required,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMarketingList {
    pub id: String,
    pub name: String,
    pub fields: Vec<IntegrationField>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationFormSettings {
    pub lists: Vec<EmailMarketingList>,
}

/// 欄位 handle 對應到提交值，保留解析時的插入順序
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    entries: Vec<(String, serde_json::Value)>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// 相同 handle 會覆蓋舊值並保留原位置
    pub fn insert(&mut self, handle: impl Into<String>, value: impl Into<serde_json::Value>) {
        let handle = handle.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == handle) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((handle, value)),
        }
    }

    pub fn remove(&mut self, handle: &str) -> Option<serde_json::Value> {
        let index = self.entries.iter().position(|(key, _)| key == handle)?;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, handle: &str) -> Option<&serde_json::Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == handle)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<serde_json::Value>> FromIterator<(K, V)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = FieldMapping::new();
        for (handle, value) in iter {
            mapping.insert(handle, value);
        }
        mapping
    }
}

impl IntoIterator for FieldMapping {
    type Item = (String, serde_json::Value);
    type IntoIter = std::vec::IntoIter<(String, serde_json::Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub list_id: Option<String>,
}

impl Credentials {
    /// 送出訂閱時必須有 list_id
    pub fn require_list_id(&self) -> Result<&str> {
        let list_id = validation::validate_required_field("integration.list_id", &self.list_id)?;
        validation::validate_non_empty_string("integration.list_id", list_id)?;
        Ok(list_id.as_str())
    }
}

/// Moosend `subscribe.json` 的請求內容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubscriberPayload {
    pub email: String,
    pub name: String,
    pub custom_fields: Vec<String>,
}

/// 表單提交，欄位值以 handle 索引
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub form: Option<String>,
    #[serde(default)]
    pub fields: HashMap<String, serde_json::Value>,
}

impl Submission {
    pub fn field_value(&self, handle: &str) -> Option<&serde_json::Value> {
        self.fields.get(handle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub integration: String,
    pub message: String,
    pub file: &'static str,
    pub line: u32,
    pub reported_at: DateTime<Utc>,
    pub notify: bool,
}

impl ErrorReport {
    /// 位置取自呼叫端
    #[track_caller]
    pub fn new(integration: impl Into<String>, message: impl Into<String>, notify: bool) -> Self {
        let location = Location::caller();
        Self {
            integration: integration.into(),
            message: message.into(),
            file: location.file(),
            line: location.line(),
            reported_at: Utc::now(),
            notify,
        }
    }

    pub fn location(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }
}
