use super::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn expected(
    environment: EnvironmentTag,
    memory_size_mb: u32,
    log_retention_days: u32,
    limits: (u32, u32, u64),
    cache_ttl_seconds: u32,
    price_class_all: bool,
    waf_enabled: bool,
) -> ResolvedConfig {
    ResolvedConfig {
        environment,
        memory_size_mb,
        timeout_seconds: 30,
        provisioned_concurrency: None,
        log_retention_days,
        rate_limit: limits.0,
        burst_limit: limits.1,
        quota_limit: limits.2,
        cache_ttl_seconds,
        price_class_all,
        waf_enabled,
        alarms_enabled: false,
    }
}

#[test]
fn test_resolve_dev_without_email() -> crate::errors::Result<()> {
    let resolved = resolve("dev", None)?;
    assert_eq!(
        expected(EnvironmentTag::Dev, 512, 14, (50, 25, 5000), 5, false, false),
        resolved
    );
    Ok(())
}

#[test]
fn test_resolve_stg_without_email() -> crate::errors::Result<()> {
    let resolved = resolve("stg", None)?;
    assert_eq!(
        expected(EnvironmentTag::Stg, 1024, 14, (100, 50, 10000), 10, false, true),
        resolved
    );
    assert!(resolved.waf_enabled);
    assert!(!resolved.alarms_enabled);
    Ok(())
}

#[test]
fn test_resolve_prod_with_email() -> crate::errors::Result<()> {
    let resolved = resolve("prod", Some("a@b.com"))?;
    let mut prod = expected(EnvironmentTag::Prod, 2048, 30, (500, 100, 1_000_000), 30, true, true);
    prod.provisioned_concurrency = Some(10);
    prod.alarms_enabled = true;
    assert_eq!(prod, resolved);
    Ok(())
}

#[test]
fn test_resolve_prod_without_email_has_no_alarms() -> crate::errors::Result<()> {
    let resolved = resolve("prod", None)?;
    assert!(!resolved.alarms_enabled);
    assert_eq!(Some(10), resolved.provisioned_concurrency);
    assert!(resolved.waf_enabled);
    Ok(())
}

#[rstest]
#[case(Some(""))]
#[case(Some("   "))]
#[case(None)]
fn test_blank_email_counts_as_absent(#[case] email: Option<&str>) {
    let resolved = resolve("prod", email).unwrap();
    assert!(!resolved.alarms_enabled);
}

#[rstest]
#[case("qa")]
#[case("")]
#[case("Prod")]
#[case("production")]
#[case(" dev")]
fn test_unknown_environment_is_rejected(#[case] tag: &str) {
    match resolve(tag, Some("a@b.com")) {
        Err(Error::UnknownEnvironment(name)) => assert_eq!(tag, name),
        other => panic!("expected UnknownEnvironment, got {:?}", other),
    }
}

#[rstest]
#[case("dev", None)]
#[case("stg", Some("ops@example.com"))]
#[case("prod", Some("ops@example.com"))]
#[case("prod", None)]
fn test_resolve_is_idempotent(#[case] tag: &str, #[case] email: Option<&str>) {
    let first = resolve(tag, email).unwrap();
    let second = resolve(tag, email).unwrap();
    assert_eq!(first, second);
}

#[rstest]
#[case(EnvironmentTag::Dev, false, BitFlags::empty())]
#[case(EnvironmentTag::Dev, true, BitFlags::empty())]
#[case(EnvironmentTag::Stg, true, BitFlags::from(Feature::Waf))]
#[case(EnvironmentTag::Prod, false, Feature::Waf | Feature::ProvisionedConcurrency)]
#[case(EnvironmentTag::Prod, true, Feature::Waf | Feature::ProvisionedConcurrency | Feature::Alarms)]
fn test_feature_flags(
    #[case] tag: EnvironmentTag,
    #[case] alert_email_present: bool,
    #[case] features: BitFlags<Feature>,
) {
    assert_eq!(features, tag.resolve(alert_email_present).features());
}

#[test]
fn test_tag_round_trips_through_display() {
    for tag in EnvironmentTag::ALL {
        assert_eq!(tag, tag.to_string().parse::<EnvironmentTag>().unwrap());
    }
}

#[test]
fn test_per_tag_derived_values() {
    assert_eq!("debug", EnvironmentTag::Dev.log_level());
    assert_eq!("debug", EnvironmentTag::Stg.log_level());
    assert_eq!("info", EnvironmentTag::Prod.log_level());
    assert!(EnvironmentTag::Stg.data_trace_enabled());
    assert!(!EnvironmentTag::Prod.data_trace_enabled());
    assert_eq!(500, EnvironmentTag::Stg.waf_rate_limit());
    assert_eq!(1000, EnvironmentTag::Prod.waf_rate_limit());
    assert_eq!("PriceClass_100", EnvironmentTag::Stg.resolve(false).price_class());
    assert_eq!("PriceClass_All", EnvironmentTag::Prod.resolve(false).price_class());
}

#[test]
fn test_resolved_config_serializes_camel_case() {
    let value = serde_json::to_value(EnvironmentTag::Dev.resolve(false)).unwrap();
    assert_eq!(value["memorySizeMb"], 512);
    assert_eq!(value["environment"], "dev");
    assert!(value.get("provisionedConcurrency").is_none());
}
