use heck::CamelCase;

use crate::config::EnvironmentTag;

/// Physical and logical names of everything in the stack.
///
/// Physical names follow `<service>-<environment>-<resource>`, logical ids are
/// prefixed with the service name in PascalCase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
    service: String,
    environment: EnvironmentTag,
    prefix: String,
}

impl Naming {
    pub fn new(service: &str, environment: EnvironmentTag) -> Self {
        Naming {
            service: service.to_string(),
            environment,
            prefix: service.to_camel_case(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn environment(&self) -> EnvironmentTag {
        self.environment
    }

    pub fn physical(&self, resource: &str) -> String {
        format!("{}-{}-{}", self.service, self.environment, resource)
    }

    pub fn logical(&self, suffix: &str) -> String {
        format!("{}{}", self.prefix, suffix)
    }

    pub fn function_name(&self) -> String {
        self.physical("function")
    }

    pub fn key_management_function_name(&self) -> String {
        format!("manage-api-keys-{}-function", self.environment)
    }

    pub fn usage_plan_name(&self) -> String {
        format!("{}-standard", self.environment)
    }

    pub fn log_group_name(function_name: &str) -> String {
        format!("/aws/lambda/{}", function_name)
    }

    /// Logical id of the REST API resource at `path`, e.g. `api/v1/issues/{issueId}`
    /// becomes `<Prefix>ApiApiV1IssuesIssueId`.
    pub fn api_resource(&self, path: &str) -> String {
        let segments: String = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| segment.trim_matches(|c: char| c == '{' || c == '}').to_camel_case())
            .collect();
        self.logical(&format!("Api{}", segments))
    }

    /// Readable tag used in descriptions, e.g. `Backlog MCP`.
    pub fn display_name(&self) -> String {
        self.service
            .split('-')
            .map(|word| match word {
                "mcp" | "api" | "aws" => word.to_uppercase(),
                _ => word.to_camel_case(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        let naming = Naming::new("backlog-mcp", EnvironmentTag::Stg);
        assert_eq!("backlog-mcp-stg-function", naming.function_name());
        assert_eq!("backlog-mcp-stg-web-acl", naming.physical("web-acl"));
        assert_eq!("manage-api-keys-stg-function", naming.key_management_function_name());
        assert_eq!("stg-standard", naming.usage_plan_name());
        assert_eq!("BacklogMcpFunction", naming.logical("Function"));
        assert_eq!("Backlog MCP", naming.display_name());
        assert_eq!(
            "/aws/lambda/backlog-mcp-stg-function",
            Naming::log_group_name(&naming.function_name())
        );
    }

    #[test]
    fn test_api_resource_ids() {
        let naming = Naming::new("backlog-mcp", EnvironmentTag::Dev);
        assert_eq!("BacklogMcpApiApi", naming.api_resource("api"));
        assert_eq!(
            "BacklogMcpApiApiV1IssuesIssueId",
            naming.api_resource("api/v1/issues/{issueId}")
        );
    }
}
