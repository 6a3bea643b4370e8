use serde_json::{json, Map, Value};

use crate::config::DeploymentProfile;
use crate::stack::naming::Naming;
use crate::stack::template::{get_att, reference, sub, Resource, Template};
use crate::stack::StackContext;

pub(crate) const PYTHON_RUNTIME: &str = "python3.10";
const TIME_ZONE: &str = "Asia/Tokyo";
const KEY_MANAGEMENT_TIMEOUT_SECONDS: u32 = 60;
const KEY_MANAGEMENT_LOG_RETENTION_DAYS: u32 = 7;

pub(crate) const LOG_GROUP: &str = "LambdaLogGroup";
pub(crate) const EXECUTION_ROLE: &str = "LambdaExecutionRole";
pub(crate) const EXECUTION_POLICY: &str = "LambdaExecutionPolicy";
pub(crate) const VERSION: &str = "LambdaVersion";
pub(crate) const PYPI_LAYER: &str = "PypiLayer";
pub(crate) const WHL_LAYER: &str = "WhlLayer";
pub(crate) const KEY_MANAGEMENT_FUNCTION: &str = "ManageApiKeysFunction";
const KEY_MANAGEMENT_ROLE: &str = "ManageApiKeysLambdaExecutionRole";
const KEY_MANAGEMENT_POLICY: &str = "ManageApiKeysLambdaExecutionPolicy";
const KEY_MANAGEMENT_LOG_GROUP: &str = "ManageApiKeysLogGroup";

fn lambda_assume_role_policy() -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": { "Service": "lambda.amazonaws.com" },
            "Action": "sts:AssumeRole"
        }]
    })
}

/// Code bundle uploaded by the deployment tooling into the service asset bucket.
fn asset(naming: &Naming, key: &str) -> Value {
    json!({
        "S3Bucket": sub(format!("{}-assets-${{AWS::AccountId}}-${{AWS::Region}}", naming.service())),
        "S3Key": key,
    })
}

fn log_group(name: &str, retention_days: u32) -> Resource {
    Resource::new(
        "AWS::Logs::LogGroup",
        json!({
            "LogGroupName": Naming::log_group_name(name),
            "RetentionInDays": retention_days,
        }),
    )
    .destroy_on_removal()
}

fn environment_variables(ctx: &StackContext<'_>) -> Map<String, Value> {
    let environment = ctx.naming.environment();
    let mut variables = Map::new();
    variables.insert(String::from("TZ"), json!(TIME_ZONE));

    match ctx.profile {
        DeploymentProfile::Container => {
            variables.insert(String::from("NODE_ENV"), json!(environment.as_str()));
            variables.insert(String::from("LOG_LEVEL"), json!(environment.log_level()));
            variables.insert(String::from("PYTHONPATH"), json!("/app"));
        }
        DeploymentProfile::Layered => {
            let backlog = &ctx.settings.backlog;
            variables.insert(
                String::from("PYTHONPATH"),
                json!(["/var/runtime", "/opt/python", "/opt"].join(":")),
            );
            variables.insert(String::from("LOG_LEVEL"), json!(environment.log_level()));
            variables.insert(String::from("READ_ONLY_MODE"), json!(backlog.read_only_mode));
            variables.insert(String::from("BACKLOG_API_KEY"), json!(backlog.api_key));
            variables.insert(String::from("BACKLOG_SPACE"), json!(backlog.space));
            variables.insert(String::from("BACKLOG_PROJECT"), json!(backlog.project));
            variables.insert(
                String::from("BACKLOG_DISABLE_SSL_VERIFY"),
                json!(backlog.disable_ssl_verify),
            );
        }
    }
    variables
}

fn add_layers(template: &mut Template, ctx: &StackContext<'_>) -> Vec<Value> {
    let display_name = ctx.naming.display_name();
    let layers = [
        (PYPI_LAYER, "lambda_layer.zip", format!("{} PyPI Packages Layer", display_name)),
        (WHL_LAYER, "dependencies.zip", format!("{} local WHL packages layer", display_name)),
    ];

    layers
        .iter()
        .map(|(logical_id, key, description)| {
            template.add_resource(
                logical_id,
                Resource::new(
                    "AWS::Lambda::LayerVersion",
                    json!({
                        "CompatibleRuntimes": [PYTHON_RUNTIME],
                        "Content": asset(&ctx.naming, key),
                        "Description": description,
                    }),
                ),
            );
            reference(logical_id)
        })
        .collect()
}

/// Adds the service function with its log group, execution role and policy,
/// and the provisioned-concurrency version when the environment asks for one.
/// Returns the logical id of the function.
pub(crate) fn add_service_function(template: &mut Template, ctx: &StackContext<'_>) -> String {
    let naming = &ctx.naming;
    let config = ctx.config;
    let environment = naming.environment();
    let function_name = naming.function_name();
    let function_id = naming.logical("Function");

    template.add_resource(LOG_GROUP, log_group(&function_name, config.log_retention_days));

    template.add_resource(
        EXECUTION_ROLE,
        Resource::new(
            "AWS::IAM::Role",
            json!({
                "AssumeRolePolicyDocument": lambda_assume_role_policy(),
                "Description": format!("Execution role for {} Lambda ({})", naming.display_name(), environment),
            }),
        ),
    );

    template.add_resource(
        EXECUTION_POLICY,
        Resource::new(
            "AWS::IAM::Policy",
            json!({
                "PolicyName": naming.physical("execution-policy"),
                "PolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [
                        {
                            "Effect": "Allow",
                            "Action": ["logs:CreateLogGroup", "logs:CreateLogStream", "logs:PutLogEvents"],
                            "Resource": format!("arn:aws:logs:*:*:log-group:{}:*", Naming::log_group_name(&function_name)),
                        },
                        {
                            "Effect": "Allow",
                            "Action": ["xray:PutTraceSegments", "xray:PutTelemetryRecords"],
                            "Resource": ["*"],
                        }
                    ]
                },
                "Roles": [reference(EXECUTION_ROLE)],
            }),
        ),
    );

    let mut properties = json!({
        "FunctionName": function_name,
        "MemorySize": config.memory_size_mb,
        "Timeout": config.timeout_seconds,
        "Role": get_att(EXECUTION_ROLE, "Arn"),
        "TracingConfig": { "Mode": "Active" },
        "LoggingConfig": { "LogGroup": reference(LOG_GROUP) },
        "Environment": { "Variables": environment_variables(ctx) },
    });

    match ctx.profile {
        DeploymentProfile::Container => {
            properties["PackageType"] = json!("Image");
            properties["Code"] = json!({
                "ImageUri": sub(format!(
                    "${{AWS::AccountId}}.dkr.ecr.${{AWS::Region}}.${{AWS::URLSuffix}}/{}:{}",
                    naming.service(),
                    environment
                )),
            });
        }
        DeploymentProfile::Layered => {
            let layers = add_layers(template, ctx);
            properties["Runtime"] = json!(PYTHON_RUNTIME);
            properties["Handler"] = json!("main.handler");
            properties["Code"] = asset(naming, "app.zip");
            properties["Layers"] = Value::Array(layers);
        }
    }

    template.add_resource(
        &function_id,
        Resource::new("AWS::Lambda::Function", properties).depends_on(vec![EXECUTION_POLICY, EXECUTION_ROLE]),
    );

    match config.provisioned_concurrency {
        Some(executions) => {
            log::debug!("{} function keeps {} provisioned executions", environment, executions);
            template.add_resource(
                VERSION,
                Resource::new(
                    "AWS::Lambda::Version",
                    json!({
                        "FunctionName": reference(&function_id),
                        "Description": format!("Version with provisioned concurrency for {}", environment),
                        "ProvisionedConcurrencyConfig": { "ProvisionedConcurrentExecutions": executions },
                    }),
                ),
            );
        }
        None => log::debug!("no provisioned concurrency for {}", environment),
    }

    function_id
}

/// Adds the function that issues API keys and attaches them to usage plans of
/// the stage `stage_name` of `api_id`.
pub(crate) fn add_key_management_function(
    template: &mut Template,
    ctx: &StackContext<'_>,
    api_id: &str,
    stage_name: &str,
) {
    let naming = &ctx.naming;
    let environment = naming.environment();
    let function_name = naming.key_management_function_name();
    let stage_arn = format!(
        "arn:aws:apigateway:${{AWS::Region}}::/restapis/${{{}}}/stages/{}",
        api_id, stage_name
    );

    template.add_resource(
        KEY_MANAGEMENT_LOG_GROUP,
        log_group(&function_name, KEY_MANAGEMENT_LOG_RETENTION_DAYS),
    );

    template.add_resource(
        KEY_MANAGEMENT_ROLE,
        Resource::new(
            "AWS::IAM::Role",
            json!({
                "AssumeRolePolicyDocument": lambda_assume_role_policy(),
                "Description": format!("Execution role for Manage API Keys Lambda ({})", environment),
            }),
        ),
    );

    let api_gateway_paths: Vec<Value> = [
        "/apikeys",
        "/apikeys/*",
        "/usageplans",
        "/usageplans/*",
        "/usageplans/*/keys",
    ]
    .iter()
    .map(|path| sub(format!("arn:aws:apigateway:${{AWS::Region}}::{}", path)))
    .chain(std::iter::once(sub(stage_arn.clone())))
    .collect();

    template.add_resource(
        KEY_MANAGEMENT_POLICY,
        Resource::new(
            "AWS::IAM::Policy",
            json!({
                "PolicyName": format!("manage-api-keys-{}-execution-policy", environment),
                "PolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [
                        {
                            "Effect": "Allow",
                            "Action": ["logs:CreateLogGroup", "logs:CreateLogStream", "logs:PutLogEvents"],
                            "Resource": sub(format!(
                                "arn:aws:logs:${{AWS::Region}}:${{AWS::AccountId}}:log-group:{}:*",
                                Naming::log_group_name(&function_name)
                            )),
                        },
                        {
                            "Effect": "Allow",
                            "Action": ["apigateway:POST", "apigateway:PUT", "apigateway:GET"],
                            "Resource": api_gateway_paths,
                        }
                    ]
                },
                "Roles": [reference(KEY_MANAGEMENT_ROLE)],
            }),
        ),
    );

    template.add_resource(
        KEY_MANAGEMENT_FUNCTION,
        Resource::new(
            "AWS::Lambda::Function",
            json!({
                "FunctionName": function_name,
                "Runtime": PYTHON_RUNTIME,
                "Handler": "manage_api_keys_function.lambda_handler",
                "Code": asset(naming, "manage_api_keys.zip"),
                "Role": get_att(KEY_MANAGEMENT_ROLE, "Arn"),
                "Timeout": KEY_MANAGEMENT_TIMEOUT_SECONDS,
                "LoggingConfig": { "LogGroup": reference(KEY_MANAGEMENT_LOG_GROUP) },
                "Environment": { "Variables": { "API_GATEWAY_STAGE_ARN": sub(stage_arn) } },
            }),
        )
        .depends_on(vec![KEY_MANAGEMENT_POLICY, KEY_MANAGEMENT_ROLE]),
    );
}
