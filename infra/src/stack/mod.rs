mod alarms;
mod api;
mod compute;
mod edge;
pub mod naming;
pub mod tags;
pub mod template;

use crate::config::{DeploymentProfile, DeploymentSettings, ResolvedConfig};
use crate::errors::Result;
use crate::stack::naming::Naming;
use crate::stack::tags::Tags;
use crate::stack::template::{get_att, reference, sub, Output, Template};

pub(crate) struct StackContext<'a> {
    pub(crate) naming: Naming,
    pub(crate) config: &'a ResolvedConfig,
    pub(crate) profile: DeploymentProfile,
    pub(crate) settings: &'a DeploymentSettings,
}

/// A synthesized, tagged stack ready to be handed to the provisioning tooling.
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    pub name: String,
    /// Target account, left to the deploying credentials when absent.
    pub account: Option<String>,
    pub region: String,
    pub config: ResolvedConfig,
    pub profile: DeploymentProfile,
    pub template: Template,
}

fn add_outputs(template: &mut Template, ctx: &StackContext<'_>, api: &api::ApiIds) {
    let naming = &ctx.naming;
    let environment = naming.environment();

    template.add_output(
        "Environment",
        Output::new(serde_json::Value::from(environment.as_str())).description("Deployment environment"),
    );
    template.add_output(
        "ApiGatewayUrl",
        Output::new(sub(format!(
            "https://${{{}}}.execute-api.${{AWS::Region}}.${{AWS::URLSuffix}}/{}/",
            api.api, environment
        )))
        .description(&format!("API Gateway endpoint URL for {} environment", environment))
        .export(naming.physical("api-url")),
    );
    template.add_output(
        "CloudFrontDomain",
        Output::new(get_att(edge::DISTRIBUTION, "DomainName"))
            .description(&format!("CloudFront distribution domain for {} environment", environment))
            .export(naming.physical("cloudfront-domain")),
    );
    template.add_output(
        "ApiKeyId",
        Output::new(reference(&api.api_key))
            .description(&format!("API Key ID for {} environment", environment))
            .export(naming.physical("api-key-id")),
    );
    if ctx.profile.includes_key_management() {
        template.add_output(
            "ManageApiKeysFunctionName",
            Output::new(reference(compute::KEY_MANAGEMENT_FUNCTION))
                .description(&format!("Name of the API key management function for {} environment", environment))
                .export(naming.physical("manage-api-keys-function-name")),
        );
    }
}

/// Builds the untagged template for an already resolved configuration.
pub fn build(settings: &DeploymentSettings, config: &ResolvedConfig, profile: DeploymentProfile) -> Template {
    let ctx = StackContext {
        naming: Naming::new(&settings.service, config.environment),
        config,
        profile,
        settings,
    };
    let mut template = Template::new(format!(
        "{} infrastructure ({}, {} profile)",
        ctx.naming.display_name(),
        config.environment,
        profile
    ));

    let function_id = compute::add_service_function(&mut template, &ctx);
    let api = api::add_rest_api(&mut template, &ctx, &function_id);
    if profile.includes_key_management() {
        compute::add_key_management_function(&mut template, &ctx, &api.api, config.environment.as_str());
    }
    edge::add_distribution(&mut template, &ctx, &api.api);
    alarms::add_alarms(&mut template, &ctx, &function_id);
    add_outputs(&mut template, &ctx, &api);

    template
}

/// Validates `settings`, resolves the environment configuration and builds
/// the tagged template.
pub fn synthesize(settings: &DeploymentSettings) -> Result<Stack> {
    settings.validate()?;
    let config = settings.resolve()?;
    let profile = settings.deployment_profile()?;
    log::info!(
        "synthesizing {} for {} with the {} profile in {}",
        settings.stack_name(),
        config.environment,
        profile,
        settings.region()
    );

    let mut template = build(settings, &config, profile);
    Tags::from_settings(settings).apply(&mut template);

    Ok(Stack {
        name: settings.stack_name(),
        account: settings.account().map(String::from),
        region: settings.region().to_string(),
        config,
        profile,
        template,
    })
}
