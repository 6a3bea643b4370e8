use super::*;
use indoc::indoc;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_defaults_only() -> crate::errors::Result<()> {
    let settings =
        DeploymentSettings::load(SettingsSource::Defaults, &HashMap::new(), &Overrides::default())?;
    assert_eq!("dev", settings.environment);
    assert_eq!("backlog-mcp", settings.service);
    assert_eq!("container", settings.profile);
    assert_eq!(None, settings.alert_email());
    assert_eq!("ap-northeast-1", settings.region());
    assert_eq!(None, settings.account());
    assert_eq!(BacklogSettings::default(), settings.backlog);
    assert_eq!("BacklogMcpStack-dev", settings.stack_name());
    Ok(())
}

#[test]
fn test_payload_then_environment_then_overrides() -> crate::errors::Result<()> {
    let payload = indoc! {r#"
        environment = "stg"
        service = "issue-tracker"
        region = "ap-northeast-1"

        [backlog]
        space = "example-space"
    "#};
    let environment = vars(&[("ENVIRONMENT", "prod"), ("BACKLOG_PROJECT", "PRJ")]);

    let settings = DeploymentSettings::load(
        SettingsSource::Toml(payload.to_string()),
        &environment,
        &Overrides::default(),
    )?;
    assert_eq!("prod", settings.environment);
    assert_eq!("issue-tracker", settings.service);
    assert_eq!("ap-northeast-1", settings.region());
    assert_eq!("example-space", settings.backlog.space);
    assert_eq!("PRJ", settings.backlog.project);
    assert_eq!("YOUR_BACKLOG_API_KEY_PLACEHOLDER", settings.backlog.api_key);

    let overrides = Overrides {
        environment: Some(String::from("dev")),
        profile: Some(String::from("layered")),
        ..Overrides::default()
    };
    let settings = DeploymentSettings::load(
        SettingsSource::Toml(payload.to_string()),
        &environment,
        &overrides,
    )?;
    assert_eq!("dev", settings.environment);
    assert_eq!(DeploymentProfile::Layered, settings.deployment_profile()?);
    Ok(())
}

#[test]
fn test_alert_email_from_environment_enables_alarms() -> crate::errors::Result<()> {
    let environment = vars(&[("ENVIRONMENT", "prod"), ("ALERT_EMAIL", "ops@example.com")]);
    let settings =
        DeploymentSettings::load(SettingsSource::Defaults, &environment, &Overrides::default())?;
    assert_eq!(Some("ops@example.com"), settings.alert_email());
    assert!(settings.resolve()?.alarms_enabled);
    Ok(())
}

#[test]
fn test_blank_alert_email_is_absent() -> crate::errors::Result<()> {
    let environment = vars(&[("ENVIRONMENT", "prod"), ("ALERT_EMAIL", "")]);
    let settings =
        DeploymentSettings::load(SettingsSource::Defaults, &environment, &Overrides::default())?;
    assert_eq!(None, settings.alert_email());
    assert!(!settings.resolve()?.alarms_enabled);
    Ok(())
}

#[rstest]
#[case("not-an-email")]
#[case("ops@")]
#[case("@example.com")]
#[case("ops@example")]
fn test_invalid_alert_email(#[case] email: &str) {
    let overrides = Overrides {
        alert_email: Some(email.to_string()),
        ..Overrides::default()
    };
    let result = DeploymentSettings::load(SettingsSource::Defaults, &HashMap::new(), &overrides);
    assert!(matches!(result, Err(Error::InvalidAlertEmail(_))));
}

#[test]
fn test_unknown_environment_fails_loading() {
    let result = DeploymentSettings::load(
        SettingsSource::Defaults,
        &vars(&[("ENVIRONMENT", "qa")]),
        &Overrides::default(),
    );
    match result {
        Err(Error::UnknownEnvironment(name)) => assert_eq!("qa", name),
        other => panic!("expected UnknownEnvironment, got {:?}", other),
    }
}

#[test]
fn test_unknown_profile_fails_loading() {
    let overrides = Overrides {
        profile: Some(String::from("serverless")),
        ..Overrides::default()
    };
    let result = DeploymentSettings::load(SettingsSource::Defaults, &HashMap::new(), &overrides);
    assert!(matches!(result, Err(Error::UnknownProfile(_))));
}

#[rstest]
#[case("Backlog")]
#[case("backlog_mcp")]
#[case("-backlog")]
#[case("backlog--mcp")]
fn test_invalid_service_name(#[case] service: &str) {
    let overrides = Overrides {
        service: Some(service.to_string()),
        ..Overrides::default()
    };
    let result = DeploymentSettings::load(SettingsSource::Defaults, &HashMap::new(), &overrides);
    assert!(matches!(result, Err(Error::IllegalArguments(_))));
}

#[test]
fn test_missing_settings_file() {
    let result = DeploymentSettings::load(
        SettingsSource::File(Path::new("does/not/exist.toml")),
        &HashMap::new(),
        &Overrides::default(),
    );
    assert!(matches!(result, Err(Error::FileNotFoundError(_))));
}

#[test]
fn test_deploy_target_from_environment() -> crate::errors::Result<()> {
    let environment = vars(&[
        ("CDK_DEFAULT_ACCOUNT", "123456789012"),
        ("CDK_DEFAULT_REGION", "us-east-1"),
    ]);
    let settings =
        DeploymentSettings::load(SettingsSource::Defaults, &environment, &Overrides::default())?;
    assert_eq!(Some("123456789012"), settings.account());
    assert_eq!("us-east-1", settings.region());

    let environment = vars(&[("CDK_DEFAULT_ACCOUNT", " "), ("CDK_DEFAULT_REGION", "")]);
    let settings =
        DeploymentSettings::load(SettingsSource::Defaults, &environment, &Overrides::default())?;
    assert_eq!(None, settings.account());
    assert_eq!("ap-northeast-1", settings.region());
    Ok(())
}

#[test]
fn test_settings_variables_keeps_known_names() {
    let picked = settings_variables(vec![
        (OsString::from("ENVIRONMENT"), OsString::from("stg")),
        (OsString::from("CDK_DEFAULT_REGION"), OsString::from("eu-west-1")),
        (OsString::from("HOME"), OsString::from("/root")),
    ]);
    assert_eq!(
        vars(&[("ENVIRONMENT", "stg"), ("CDK_DEFAULT_REGION", "eu-west-1")]),
        picked
    );
}

#[cfg(unix)]
#[test]
fn test_settings_variables_skips_non_utf8_values() -> crate::errors::Result<()> {
    use std::os::unix::ffi::OsStringExt;

    let picked = settings_variables(vec![
        (OsString::from("JUNK"), OsString::from_vec(vec![0xff, 0xfe])),
        (OsString::from_vec(vec![0xff, 0xfe]), OsString::from("value")),
        (OsString::from("ALERT_EMAIL"), OsString::from_vec(vec![0xff, 0xfe])),
        (OsString::from("ENVIRONMENT"), OsString::from("prod")),
    ]);
    assert_eq!(vars(&[("ENVIRONMENT", "prod")]), picked);

    let settings = DeploymentSettings::load(SettingsSource::Defaults, &picked, &Overrides::default())?;
    assert_eq!("prod", settings.environment);
    assert_eq!(None, settings.alert_email());
    Ok(())
}
