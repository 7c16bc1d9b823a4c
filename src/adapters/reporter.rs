use crate::domain::model::ErrorReport;
use crate::domain::ports::ErrorReporter;
use std::sync::{Arc, Mutex, MutexGuard};

/// 記錄本次執行中的整合錯誤，同時寫入 tracing
///
/// Clone 後共用同一份紀錄，可交給連接器後再由呼叫端讀取。
#[derive(Debug, Clone, Default)]
pub struct RecordingErrorReporter {
    reports: Arc<Mutex<Vec<ErrorReport>>>,
}

impl RecordingErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ErrorReport>> {
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn reports(&self) -> Vec<ErrorReport> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// 該整合在本次執行中是否已被標記為失敗
    pub fn has_failed(&self, integration: &str) -> bool {
        self.lock().iter().any(|r| r.integration == integration)
    }

    /// 需要通知使用者的訊息
    pub fn notifications(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|r| r.notify)
            .map(|r| r.message.clone())
            .collect()
    }

    pub fn take(&self) -> Vec<ErrorReport> {
        std::mem::take(&mut *self.lock())
    }
}

impl ErrorReporter for RecordingErrorReporter {
    fn report(&self, report: ErrorReport) {
        tracing::error!(
            integration = %report.integration,
            location = %report.location(),
            "{}",
            report.message
        );
        self.lock().push(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_reports_across_clones() {
        let reporter = RecordingErrorReporter::new();
        let shared = reporter.clone();

        shared.report(ErrorReport::new("moosend", "API error: “timeout”", true));
        shared.report(ErrorReport::new("moosend", "diagnostic only", false));

        assert_eq!(reporter.len(), 2);
        assert!(reporter.has_failed("moosend"));
        assert!(!reporter.has_failed("mailchimp"));
        assert_eq!(reporter.notifications(), vec!["API error: “timeout”"]);
    }

    #[test]
    fn test_take_clears_reports() {
        let reporter = RecordingErrorReporter::new();
        reporter.report(ErrorReport::new("moosend", "API error", true));

        let taken = reporter.take();

        assert_eq!(taken.len(), 1);
        assert!(reporter.is_empty());
        assert!(taken[0].file.ends_with("reporter.rs"));
    }
}
