use serde_json::{json, Value};

use crate::config::DeploymentSettings;
use crate::stack::template::Template;

/// Resource types accepting a `Tags` list of `{Key, Value}` entries.
pub const TAGGABLE_TYPES: [&str; 12] = [
    "AWS::Lambda::Function",
    "AWS::Logs::LogGroup",
    "AWS::IAM::Role",
    "AWS::ApiGateway::RestApi",
    "AWS::ApiGateway::Stage",
    "AWS::ApiGateway::ApiKey",
    "AWS::ApiGateway::UsagePlan",
    "AWS::CloudFront::Distribution",
    "AWS::S3::Bucket",
    "AWS::WAFv2::WebACL",
    "AWS::SNS::Topic",
    "AWS::CloudWatch::Alarm",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tags {
    tags: Vec<(String, String)>,
}

impl Tags {
    pub fn new(tags: Vec<(String, String)>) -> Self {
        Tags { tags }
    }

    pub fn from_settings(settings: &DeploymentSettings) -> Self {
        Tags::new(vec![
            (String::from("Environment"), settings.environment.clone()),
            (String::from("Project"), settings.project_tag.clone()),
            (String::from("ManagedBy"), settings.managed_by_tag.clone()),
        ])
    }

    /// Tags every taggable resource of `template`, returning how many were tagged.
    pub fn apply(&self, template: &mut Template) -> usize {
        let mut tagged = 0;
        for (logical_id, resource) in template.resources.iter_mut() {
            if !TAGGABLE_TYPES.contains(&resource.resource_type.as_str()) {
                continue;
            }
            // distributions keep their tags next to DistributionConfig, not inside it
            let existing = resource
                .properties
                .entry(String::from("Tags"))
                .or_insert_with(|| Value::Array(vec![]));
            match existing {
                Value::Array(entries) => {
                    self.merge(entries);
                    tagged += 1;
                }
                _ => log::warn!("{} has malformed tags, leaving them untouched", logical_id),
            }
        }
        log::debug!("tagged {} resources", tagged);
        tagged
    }

    fn merge(&self, entries: &mut Vec<Value>) {
        for (key, value) in &self.tags {
            entries.retain(|entry| entry.get("Key").and_then(Value::as_str) != Some(key.as_str()));
            entries.push(json!({ "Key": key, "Value": value }));
        }
        entries.sort_by(|left, right| {
            let key = |entry: &Value| entry.get("Key").and_then(Value::as_str).unwrap_or("").to_string();
            key(left).cmp(&key(right))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::template::Resource;
    use pretty_assertions::assert_eq;

    fn tags() -> Tags {
        Tags::new(vec![
            (String::from("Environment"), String::from("stg")),
            (String::from("Project"), String::from("BacklogMCP")),
            (String::from("ManagedBy"), String::from("backlog-mcp-infra")),
        ])
    }

    #[test]
    fn test_only_taggable_types_are_tagged() {
        let mut template = Template::new(String::new());
        template.add_resource("Role", Resource::new("AWS::IAM::Role", json!({})));
        template.add_resource("Policy", Resource::new("AWS::IAM::Policy", json!({})));

        assert_eq!(1, tags().apply(&mut template));
        assert_eq!(
            Some(&json!([
                { "Key": "Environment", "Value": "stg" },
                { "Key": "ManagedBy", "Value": "backlog-mcp-infra" },
                { "Key": "Project", "Value": "BacklogMCP" }
            ])),
            template.resource("Role").unwrap().property("Tags")
        );
        assert_eq!(None, template.resource("Policy").unwrap().property("Tags"));
    }

    #[test]
    fn test_existing_tags_are_replaced_by_key() {
        let mut template = Template::new(String::new());
        template.add_resource(
            "Bucket",
            Resource::new(
                "AWS::S3::Bucket",
                json!({ "Tags": [
                    { "Key": "Project", "Value": "Other" },
                    { "Key": "Owner", "Value": "ops" }
                ]}),
            ),
        );

        tags().apply(&mut template);
        assert_eq!(
            Some(&json!([
                { "Key": "Environment", "Value": "stg" },
                { "Key": "ManagedBy", "Value": "backlog-mcp-infra" },
                { "Key": "Owner", "Value": "ops" },
                { "Key": "Project", "Value": "BacklogMCP" }
            ])),
            template.resource("Bucket").unwrap().property("Tags")
        );
    }

    #[test]
    fn test_applying_twice_changes_nothing() {
        let mut template = Template::new(String::new());
        template.add_resource("Topic", Resource::new("AWS::SNS::Topic", json!({})));
        tags().apply(&mut template);
        let once = template.clone();
        tags().apply(&mut template);
        assert_eq!(once, template);
    }
}
