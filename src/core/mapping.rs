use crate::domain::model::{FieldMapping, Submission, SubscriberPayload};
use regex::Regex;
use std::sync::OnceLock;

pub const EMAIL_HANDLE: &str = "Email";
pub const NAME_HANDLE: &str = "Name";

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("placeholder pattern is valid"))
}

fn single_placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\{([^{}]+)\}$").expect("placeholder pattern is valid"))
}

/// 將提交值轉成純文字
pub fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(render_value)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        serde_json::Value::Object(_) => value.to_string(),
    }
}

/// 取出 Email 與 Name，其餘欄位轉為 `key=value`
///
/// Email 與 Name 一定先從對應中移除，不會重複出現在 CustomFields。
pub fn build_subscriber_payload(mut mapped_fields: FieldMapping) -> SubscriberPayload {
    let email = mapped_fields
        .remove(EMAIL_HANDLE)
        .map(|v| render_value(&v))
        .unwrap_or_default();
    let name = mapped_fields
        .remove(NAME_HANDLE)
        .map(|v| render_value(&v))
        .unwrap_or_default();

    let custom_fields = mapped_fields
        .iter()
        .map(|(key, value)| format!("{}={}", key, render_value(value)))
        .collect();

    SubscriberPayload {
        email,
        name,
        custom_fields,
    }
}

/// 依設定的欄位對應，從提交內容取值
///
/// 設定值為 `{fieldHandle}` 時保留原始型別；含其他文字時以字串替換，
/// 找不到的欄位以空字串取代。空設定與 null 值會被略過。
pub fn resolve_field_mapping(
    submission: &Submission,
    configured: &[(String, String)],
) -> FieldMapping {
    let mut mapping = FieldMapping::new();

    for (handle, template) in configured {
        let template = template.trim();
        if template.is_empty() {
            continue;
        }

        let value = if let Some(caps) = single_placeholder_regex().captures(template) {
            submission
                .field_value(caps[1].trim())
                .cloned()
                .unwrap_or(serde_json::Value::Null)
        } else {
            let rendered = placeholder_regex().replace_all(template, |caps: &regex::Captures| {
                submission
                    .field_value(caps[1].trim())
                    .map(render_value)
                    .unwrap_or_default()
            });
            serde_json::Value::String(rendered.trim().to_string())
        };

        if value.is_null() {
            tracing::debug!("Skipping field mapping for {}: no submission value", handle);
            continue;
        }

        mapping.insert(handle.clone(), value);
    }

    mapping
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submission() -> Submission {
        let mut submission = Submission::default();
        submission
            .fields
            .insert("emailAddress".to_string(), json!("a@b.com"));
        submission.fields.insert("firstName".to_string(), json!("Ada"));
        submission
            .fields
            .insert("lastName".to_string(), json!("Lovelace"));
        submission.fields.insert("age".to_string(), json!(30));
        submission
            .fields
            .insert("topics".to_string(), json!(["News", "Events"]));
        submission
    }

    fn configured(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_build_payload_scenario() {
        let mapping: FieldMapping = vec![("Email", "a@b.com"), ("Name", "A"), ("Age", "30")]
            .into_iter()
            .collect();

        let payload = build_subscriber_payload(mapping);

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"Email": "a@b.com", "Name": "A", "CustomFields": ["Age=30"]})
        );
    }

    #[test]
    fn test_build_payload_never_repeats_email_or_name() {
        let mapping: FieldMapping = vec![
            ("Age", "30"),
            ("Email", "a@b.com"),
            ("City", "Oslo"),
            ("Name", "A"),
        ]
        .into_iter()
        .collect();

        let payload = build_subscriber_payload(mapping);

        assert_eq!(payload.custom_fields, vec!["Age=30", "City=Oslo"]);
        assert!(payload
            .custom_fields
            .iter()
            .all(|f| !f.starts_with("Email=") && !f.starts_with("Name=")));
    }

    #[test]
    fn test_build_payload_missing_email_and_name() {
        let mapping: FieldMapping = vec![("Age", json!(30))].into_iter().collect();

        let payload = build_subscriber_payload(mapping);

        assert_eq!(payload.email, "");
        assert_eq!(payload.name, "");
        assert_eq!(payload.custom_fields, vec!["Age=30"]);
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&json!(null)), "");
        assert_eq!(render_value(&json!("x")), "x");
        assert_eq!(render_value(&json!(4.5)), "4.5");
        assert_eq!(render_value(&json!(true)), "true");
        assert_eq!(render_value(&json!(["a", "", "b"])), "a, b");
    }

    #[test]
    fn test_resolve_field_mapping() {
        let configured = configured(&[
            ("Email", "{emailAddress}"),
            ("Name", "{firstName} {lastName}"),
            ("Age", "{age}"),
            ("Topics", "{topics}"),
            ("Source", "website"),
        ]);

        let mapping = resolve_field_mapping(&submission(), &configured);

        assert_eq!(mapping.get("Email"), Some(&json!("a@b.com")));
        assert_eq!(mapping.get("Name"), Some(&json!("Ada Lovelace")));
        assert_eq!(mapping.get("Age"), Some(&json!(30)));
        assert_eq!(mapping.get("Topics"), Some(&json!(["News", "Events"])));
        assert_eq!(mapping.get("Source"), Some(&json!("website")));

        let keys: Vec<&str> = mapping.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Email", "Name", "Age", "Topics", "Source"]);
    }

    #[test]
    fn test_resolve_skips_empty_and_missing() {
        let configured = configured(&[
            ("Email", "{emailAddress}"),
            ("Phone", ""),
            ("Company", "{company}"),
            ("Greeting", "Hi {company}"),
        ]);

        let mapping = resolve_field_mapping(&submission(), &configured);

        assert_eq!(mapping.len(), 2);
        assert!(mapping.get("Phone").is_none());
        assert!(mapping.get("Company").is_none());
        assert_eq!(mapping.get("Greeting"), Some(&json!("Hi")));
    }

    #[test]
    fn test_resolved_mapping_to_payload() {
        let configured = configured(&[
            ("Email", "{emailAddress}"),
            ("Name", "{firstName}"),
            ("Topics", "{topics}"),
        ]);

        let payload = build_subscriber_payload(resolve_field_mapping(&submission(), &configured));

        assert_eq!(payload.email, "a@b.com");
        assert_eq!(payload.name, "Ada");
        assert_eq!(payload.custom_fields, vec!["Topics=News, Events"]);
    }
}
