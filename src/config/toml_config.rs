use crate::core::moosend::MOOSEND_BASE_URL;
use crate::core::{ConfigProvider, Credentials};
use crate::utils::error::{IntegrationError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub integration: IntegrationConfig,
    #[serde(default)]
    pub field_mapping: Option<toml::Table>,
    #[serde(skip)]
    mapping: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrationConfig {
    #[serde(default)]
    pub api_key: String,
    pub list_id: Option<String>,
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub enabled: Option<bool>,
}

impl TomlConfig {
    /// 只有 API key 的最小配置
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            integration: IntegrationConfig {
                api_key: api_key.into(),
                ..Default::default()
            },
            field_mapping: None,
            mapping: Vec::new(),
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(IntegrationError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        let mut config: TomlConfig =
            toml::from_str(&processed_content).map_err(|e| IntegrationError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;
        config.mapping = Self::collect_mapping(config.field_mapping.as_ref())?;

        Ok(config)
    }

    /// 替換環境變數 (例如 ${MOOSEND_API_KEY})，未設定的保留原文
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env pattern is valid"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    /// 欄位對應依檔案中的順序保存，值必須是字串
    fn collect_mapping(table: Option<&toml::Table>) -> Result<Vec<(String, String)>> {
        let Some(table) = table else {
            return Ok(Vec::new());
        };

        table
            .iter()
            .map(|(handle, value)| match value {
                toml::Value::String(template) => Ok((handle.clone(), template.clone())),
                other => Err(IntegrationError::InvalidConfigValueError {
                    field: format!("field_mapping.{}", handle),
                    value: other.to_string(),
                    reason: "Field mapping values must be strings".to_string(),
                }),
            })
            .collect()
    }

    /// 以命令列參數覆蓋檔案中的值
    pub fn with_overrides(mut self, api_key: Option<String>, list_id: Option<String>) -> Self {
        if let Some(api_key) = api_key {
            self.integration.api_key = api_key;
        }
        if let Some(list_id) = list_id {
            self.integration.list_id = Some(list_id);
        }
        self
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            api_key: self.integration.api_key.clone(),
            list_id: self.integration.list_id.clone(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.integration.enabled.unwrap_or(true)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("integration.api_key", &self.integration.api_key)?;
        validation::validate_no_placeholder("integration.api_key", &self.integration.api_key)?;

        validation::validate_url("integration.base_url", self.base_url())?;

        if let Some(list_id) = &self.integration.list_id {
            validation::validate_non_empty_string("integration.list_id", list_id)?;
            validation::validate_no_placeholder("integration.list_id", list_id)?;
        }

        if let Some(timeout) = self.integration.timeout_seconds {
            validation::validate_range("integration.timeout_seconds", timeout, 1, 300)?;
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn api_key(&self) -> &str {
        &self.integration.api_key
    }

    fn list_id(&self) -> Option<&str> {
        self.integration.list_id.as_deref()
    }

    fn base_url(&self) -> &str {
        self.integration
            .base_url
            .as_deref()
            .unwrap_or(MOOSEND_BASE_URL)
    }

    fn timeout(&self) -> Option<Duration> {
        self.integration.timeout_seconds.map(Duration::from_secs)
    }

    fn field_mapping(&self) -> &[(String, String)] {
        &self.mapping
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
