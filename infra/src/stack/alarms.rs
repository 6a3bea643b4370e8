use serde_json::{json, Value};

use crate::stack::template::{reference, Resource, Template};
use crate::stack::StackContext;

pub(crate) const TOPIC: &str = "AlarmTopic";
pub(crate) const SUBSCRIPTION: &str = "AlarmEmailSubscription";
pub(crate) const LAMBDA_ERROR_ALARM: &str = "LambdaErrorAlarm";
pub(crate) const API_5XX_ALARM: &str = "Api5xxErrorAlarm";

const PERIOD_SECONDS: u32 = 60;
const EVALUATION_PERIODS: u32 = 3;
const THRESHOLD: u32 = 1;

fn alarm(name: String, description: String, namespace: &str, metric: &str, dimension: Value) -> Resource {
    Resource::new(
        "AWS::CloudWatch::Alarm",
        json!({
            "AlarmName": name,
            "AlarmDescription": description,
            "Namespace": namespace,
            "MetricName": metric,
            "Dimensions": [dimension],
            "Statistic": "Sum",
            "Period": PERIOD_SECONDS,
            "EvaluationPeriods": EVALUATION_PERIODS,
            "Threshold": THRESHOLD,
            "ComparisonOperator": "GreaterThanThreshold",
            "TreatMissingData": "notBreaching",
            "AlarmActions": [reference(TOPIC)],
        }),
    )
}

/// Adds the alarm topic, its email subscription and the error alarms of the
/// function and the REST API. Nothing is added unless alarms are enabled and
/// an address is configured.
pub(crate) fn add_alarms(template: &mut Template, ctx: &StackContext<'_>, function_id: &str) {
    let naming = &ctx.naming;
    let environment = naming.environment();

    let email = match ctx.settings.alert_email() {
        Some(email) if ctx.config.alarms_enabled => email,
        Some(_) => {
            log::debug!("alarms are disabled for {}", environment);
            return;
        }
        None => {
            if ctx.config.alarms_enabled {
                log::warn!("alarms enabled for {} but no alert email configured, skipping", environment);
            }
            return;
        }
    };

    template.add_resource(
        TOPIC,
        Resource::new(
            "AWS::SNS::Topic",
            json!({
                "TopicName": naming.physical("alarms"),
                "DisplayName": format!("{} Alarms ({})", naming.display_name(), environment),
            }),
        ),
    );

    template.add_resource(
        SUBSCRIPTION,
        Resource::new(
            "AWS::SNS::Subscription",
            json!({
                "Protocol": "email",
                "Endpoint": email,
                "TopicArn": reference(TOPIC),
            }),
        ),
    );

    template.add_resource(
        LAMBDA_ERROR_ALARM,
        alarm(
            naming.physical("lambda-errors"),
            format!("Errors raised by the {} function ({})", naming.display_name(), environment),
            "AWS/Lambda",
            "Errors",
            json!({ "Name": "FunctionName", "Value": reference(function_id) }),
        ),
    );

    template.add_resource(
        API_5XX_ALARM,
        alarm(
            naming.physical("api-5xx-errors"),
            format!("5XX responses of the {} API ({})", naming.display_name(), environment),
            "AWS/ApiGateway",
            "5XXError",
            json!({ "Name": "ApiName", "Value": naming.physical("api") }),
        ),
    );
}
