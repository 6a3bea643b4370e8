use heck::CamelCase;
use indexmap::IndexMap;
use serde_json::{json, Value};

use crate::stack::template::{get_att, reference, sub, Resource, Template};
use crate::stack::StackContext;

const API_DESCRIPTION: &str = "API for Backlog Model Context Protocol";

const CORS_ALLOW_HEADERS: [&str; 5] = [
    "Content-Type",
    "X-Amz-Date",
    "Authorization",
    "X-Api-Key",
    "X-Amz-Security-Token",
];
const CORS_ALLOW_METHODS: &str = "OPTIONS,GET,PUT,POST,DELETE,PATCH,HEAD";

/// Every route of the service and the methods it accepts. All of them are
/// proxied to the service function.
pub(crate) const ROUTES: [(&str, &[&str]); 5] = [
    ("api/v1/issues", &["GET", "POST"]),
    ("api/v1/issues/{issueId}", &["GET", "PUT", "DELETE"]),
    ("api/v1/projects", &["GET"]),
    ("api/v1/projects/{projectId}", &["GET"]),
    ("api/v1/bulk", &["POST"]),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ApiIds {
    pub(crate) api: String,
    pub(crate) api_key: String,
}

fn lambda_proxy_integration(function_id: &str) -> Value {
    json!({
        "Type": "AWS_PROXY",
        "IntegrationHttpMethod": "POST",
        "Uri": sub(format!(
            "arn:${{AWS::Partition}}:apigateway:${{AWS::Region}}:lambda:path/2015-03-31/functions/${{{}.Arn}}/invocations",
            function_id
        )),
    })
}

fn cors_preflight_method(api_id: &str, resource: Value) -> Resource {
    let allow_headers = format!("'{}'", CORS_ALLOW_HEADERS.join(","));
    Resource::new(
        "AWS::ApiGateway::Method",
        json!({
            "HttpMethod": "OPTIONS",
            "ResourceId": resource,
            "RestApiId": reference(api_id),
            "AuthorizationType": "NONE",
            "Integration": {
                "Type": "MOCK",
                "RequestTemplates": { "application/json": "{ statusCode: 200 }" },
                "IntegrationResponses": [{
                    "StatusCode": "204",
                    "ResponseParameters": {
                        "method.response.header.Access-Control-Allow-Headers": allow_headers,
                        "method.response.header.Access-Control-Allow-Origin": "'*'",
                        "method.response.header.Access-Control-Allow-Methods": format!("'{}'", CORS_ALLOW_METHODS),
                    }
                }]
            },
            "MethodResponses": [{
                "StatusCode": "204",
                "ResponseParameters": {
                    "method.response.header.Access-Control-Allow-Headers": true,
                    "method.response.header.Access-Control-Allow-Origin": true,
                    "method.response.header.Access-Control-Allow-Methods": true,
                }
            }]
        }),
    )
}

/// Creates the resource for `path` and any missing parent, returning its logical id.
fn ensure_resource(
    template: &mut Template,
    ctx: &StackContext<'_>,
    api_id: &str,
    created: &mut IndexMap<String, String>,
    path: &str,
) -> String {
    if let Some(logical_id) = created.get(path) {
        return logical_id.clone();
    }

    let (parent, path_part) = match path.rfind('/') {
        Some(index) => {
            let parent_id = ensure_resource(template, ctx, api_id, created, &path[..index]);
            (reference(&parent_id), &path[index + 1..])
        }
        None => (get_att(api_id, "RootResourceId"), path),
    };

    let logical_id = ctx.naming.api_resource(path);
    template.add_resource(
        &logical_id,
        Resource::new(
            "AWS::ApiGateway::Resource",
            json!({
                "ParentId": parent,
                "PathPart": path_part,
                "RestApiId": reference(api_id),
            }),
        ),
    );
    created.insert(path.to_string(), logical_id.clone());
    logical_id
}

/// Adds the REST API with its routes, stage, invoke permission, API key and
/// usage plan.
pub(crate) fn add_rest_api(template: &mut Template, ctx: &StackContext<'_>, function_id: &str) -> ApiIds {
    let naming = &ctx.naming;
    let config = ctx.config;
    let environment = naming.environment();
    let api_key_required = ctx.profile.api_key_required();

    let api_id = naming.logical("Api");
    template.add_resource(
        &api_id,
        Resource::new(
            "AWS::ApiGateway::RestApi",
            json!({
                "Name": naming.physical("api"),
                "Description": format!("{} ({})", API_DESCRIPTION, environment),
            }),
        ),
    );

    let mut methods = vec![];
    let root_options = format!("{}OptionsRoot", api_id);
    template.add_resource(
        &root_options,
        cors_preflight_method(&api_id, get_att(&api_id, "RootResourceId")),
    );
    methods.push(root_options);

    let mut created = IndexMap::new();
    for (path, verbs) in ROUTES.iter() {
        let resource_id = ensure_resource(template, ctx, &api_id, &mut created, path);
        for verb in verbs.iter() {
            let method_id = format!("{}{}", resource_id, verb.to_camel_case());
            template.add_resource(
                &method_id,
                Resource::new(
                    "AWS::ApiGateway::Method",
                    json!({
                        "HttpMethod": verb,
                        "ResourceId": reference(&resource_id),
                        "RestApiId": reference(&api_id),
                        "AuthorizationType": "NONE",
                        "ApiKeyRequired": api_key_required,
                        "Integration": lambda_proxy_integration(function_id),
                    }),
                ),
            );
            methods.push(method_id);
        }
    }

    for resource_id in created.values() {
        let method_id = format!("{}Options", resource_id);
        template.add_resource(&method_id, cors_preflight_method(&api_id, reference(resource_id)));
        methods.push(method_id);
    }

    let deployment_id = naming.logical("ApiDeployment");
    template.add_resource(
        &deployment_id,
        Resource::new(
            "AWS::ApiGateway::Deployment",
            json!({
                "RestApiId": reference(&api_id),
                "Description": format!("{} ({})", API_DESCRIPTION, environment),
            }),
        )
        .depends_on(methods),
    );

    let stage_id = naming.logical("ApiStage");
    template.add_resource(
        &stage_id,
        Resource::new(
            "AWS::ApiGateway::Stage",
            json!({
                "RestApiId": reference(&api_id),
                "DeploymentId": reference(&deployment_id),
                "StageName": environment.as_str(),
                "TracingEnabled": true,
                "MethodSettings": [{
                    "ResourcePath": "/*",
                    "HttpMethod": "*",
                    "LoggingLevel": "INFO",
                    "MetricsEnabled": true,
                    "DataTraceEnabled": environment.data_trace_enabled(),
                }],
            }),
        ),
    );

    template.add_resource(
        &naming.logical("ApiInvokePermission"),
        Resource::new(
            "AWS::Lambda::Permission",
            json!({
                "Action": "lambda:InvokeFunction",
                "FunctionName": get_att(function_id, "Arn"),
                "Principal": "apigateway.amazonaws.com",
                "SourceArn": sub(format!(
                    "arn:${{AWS::Partition}}:execute-api:${{AWS::Region}}:${{AWS::AccountId}}:${{{}}}/*/*/*",
                    api_id
                )),
            }),
        ),
    );

    let api_key_id = naming.logical("ApiKey");
    template.add_resource(
        &api_key_id,
        Resource::new(
            "AWS::ApiGateway::ApiKey",
            json!({
                "Name": naming.physical("key"),
                "Description": format!("API Key for {} ({})", naming.display_name(), environment),
                "Enabled": true,
            }),
        ),
    );

    let usage_plan_id = naming.logical("UsagePlan");
    template.add_resource(
        &usage_plan_id,
        Resource::new(
            "AWS::ApiGateway::UsagePlan",
            json!({
                "UsagePlanName": naming.usage_plan_name(),
                "Description": format!("Standard usage plan for {} API ({})", naming.display_name(), environment),
                "ApiStages": [{ "ApiId": reference(&api_id), "Stage": reference(&stage_id) }],
                "Throttle": {
                    "RateLimit": config.rate_limit,
                    "BurstLimit": config.burst_limit,
                },
                "Quota": {
                    "Limit": config.quota_limit,
                    "Period": "MONTH",
                },
            }),
        ),
    );

    template.add_resource(
        &naming.logical("UsagePlanKey"),
        Resource::new(
            "AWS::ApiGateway::UsagePlanKey",
            json!({
                "KeyId": reference(&api_key_id),
                "KeyType": "API_KEY",
                "UsagePlanId": reference(&usage_plan_id),
            }),
        ),
    );

    ApiIds {
        api: api_id,
        api_key: api_key_id,
    }
}
