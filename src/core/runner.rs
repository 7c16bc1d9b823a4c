use crate::core::mapping::resolve_field_mapping;
use crate::core::{EmailMarketing, IntegrationFormSettings, Submission};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsRun {
    pub connected: bool,
    pub settings: IntegrationFormSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRun {
    pub integration: String,
    pub mapped_fields: usize,
    pub delivered: bool,
}

/// 驅動單一整合：設定頁的連線與清單刷新，以及提交的送出
pub struct IntegrationRunner<I: EmailMarketing> {
    integration: I,
}

impl<I: EmailMarketing> IntegrationRunner<I> {
    pub fn new(integration: I) -> Self {
        Self { integration }
    }

    pub fn integration(&self) -> &I {
        &self.integration
    }

    /// 先驗證連線，成功才取得清單
    pub async fn refresh_settings(&self) -> SettingsRun {
        tracing::info!("Refreshing settings for {}", self.integration.display_name());

        if !self.integration.verify_connection().await {
            return SettingsRun::default();
        }

        let settings = self.integration.fetch_form_settings().await;
        tracing::info!("Fetched {} lists", settings.lists.len());

        SettingsRun {
            connected: true,
            settings,
        }
    }

    /// 送出失敗不會中斷提交本身，只反映在回傳結果
    pub async fn send_submission(
        &self,
        submission: &Submission,
        field_mapping: &[(String, String)],
        list_id: &str,
    ) -> SubmissionRun {
        let mapped = resolve_field_mapping(submission, field_mapping);
        let mapped_fields = mapped.len();

        tracing::info!(
            "Sending submission {} to {} list {} ({} mapped fields)",
            submission.id.as_deref().unwrap_or("-"),
            self.integration.display_name(),
            list_id,
            mapped_fields
        );

        let delivered = self.integration.deliver(mapped, list_id).await;

        SubmissionRun {
            integration: self.integration.handle().to_string(),
            mapped_fields,
            delivered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EmailMarketingList, FieldMapping};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct FakeIntegration {
        connected: bool,
        delivered: Mutex<Vec<(FieldMapping, String)>>,
    }

    impl FakeIntegration {
        fn new(connected: bool) -> Self {
            Self {
                connected,
                delivered: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl EmailMarketing for FakeIntegration {
        fn handle(&self) -> &str {
            "fake"
        }

        fn display_name(&self) -> &str {
            "Fake"
        }

        fn description(&self) -> &str {
            "Test integration"
        }

        async fn discover_schema(&self) -> Vec<EmailMarketingList> {
            vec![EmailMarketingList {
                id: "L1".to_string(),
                name: "News".to_string(),
                fields: vec![],
            }]
        }

        async fn verify_connection(&self) -> bool {
            self.connected
        }

        async fn deliver(&self, mapped_fields: FieldMapping, list_id: &str) -> bool {
            self.delivered
                .lock()
                .unwrap()
                .push((mapped_fields, list_id.to_string()));
            true
        }
    }

    #[tokio::test]
    async fn test_refresh_settings_when_connected() {
        let runner = IntegrationRunner::new(FakeIntegration::new(true));

        let run = runner.refresh_settings().await;

        assert!(run.connected);
        assert_eq!(run.settings.lists.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_settings_skips_discovery_when_disconnected() {
        let runner = IntegrationRunner::new(FakeIntegration::new(false));

        let run = runner.refresh_settings().await;

        assert!(!run.connected);
        assert!(run.settings.lists.is_empty());
    }

    #[tokio::test]
    async fn test_send_submission_resolves_mapping() {
        let runner = IntegrationRunner::new(FakeIntegration::new(true));
        let mut submission = Submission::default();
        submission
            .fields
            .insert("email".to_string(), json!("a@b.com"));
        let mapping = vec![
            ("Email".to_string(), "{email}".to_string()),
            ("Name".to_string(), "".to_string()),
        ];

        let run = runner.send_submission(&submission, &mapping, "L1").await;

        assert_eq!(
            run,
            SubmissionRun {
                integration: "fake".to_string(),
                mapped_fields: 1,
                delivered: true,
            }
        );
        let delivered = runner.integration().delivered.lock().unwrap();
        assert_eq!(delivered[0].1, "L1");
        assert_eq!(delivered[0].0.get("Email"), Some(&json!("a@b.com")));
    }
}
