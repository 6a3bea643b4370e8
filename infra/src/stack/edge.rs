use serde_json::{json, Value};

use crate::stack::template::{get_att, reference, sub, Resource, Template};
use crate::stack::StackContext;

pub(crate) const RESPONSE_HEADERS_POLICY: &str = "SecurityHeaders";
pub(crate) const CACHE_POLICY: &str = "ApiCachePolicy";
pub(crate) const LOGGING_BUCKET: &str = "ApiDistributionLoggingBucket";
pub(crate) const DISTRIBUTION: &str = "ApiDistribution";
pub(crate) const WEB_ACL: &str = "WebAcl";

const HSTS_MAX_AGE_SECONDS: u64 = 63_072_000;
const ORIGIN_ID: &str = "RestApiOrigin";

fn visibility(metric_name: String) -> Value {
    json!({
        "CloudWatchMetricsEnabled": true,
        "MetricName": metric_name,
        "SampledRequestsEnabled": true,
    })
}

fn add_web_acl(template: &mut Template, ctx: &StackContext<'_>) {
    let naming = &ctx.naming;
    template.add_resource(
        WEB_ACL,
        Resource::new(
            "AWS::WAFv2::WebACL",
            json!({
                "Name": naming.physical("web-acl"),
                "Scope": "CLOUDFRONT",
                "DefaultAction": { "Allow": {} },
                "VisibilityConfig": visibility(naming.physical("web-acl-metric")),
                "Rules": [
                    {
                        "Name": "SQLInjectionRule",
                        "Priority": 10,
                        "Statement": {
                            "ManagedRuleGroupStatement": {
                                "Name": "AWSManagedRulesSQLiRuleSet",
                                "VendorName": "AWS",
                            }
                        },
                        "OverrideAction": { "None": {} },
                        "VisibilityConfig": visibility(naming.physical("sql-injection-metric")),
                    },
                    {
                        "Name": "RateLimitRule",
                        "Priority": 20,
                        "Action": { "Block": {} },
                        "Statement": {
                            "RateBasedStatement": {
                                "Limit": naming.environment().waf_rate_limit(),
                                "AggregateKeyType": "IP",
                            }
                        },
                        "VisibilityConfig": visibility(naming.physical("rate-limit-metric")),
                    }
                ],
            }),
        ),
    );
}

/// Adds the CloudFront distribution in front of the REST API stage, its cache
/// and response header policies, the access log bucket and, when enabled, the
/// WAF web ACL guarding it.
pub(crate) fn add_distribution(template: &mut Template, ctx: &StackContext<'_>, api_id: &str) {
    let naming = &ctx.naming;
    let config = ctx.config;
    let environment = naming.environment();
    let ttl = ctx.profile.effective_cache_ttl(config);
    // CloudFront only accepts compression settings on policies that cache.
    let compress = ttl > 0;

    template.add_resource(
        RESPONSE_HEADERS_POLICY,
        Resource::new(
            "AWS::CloudFront::ResponseHeadersPolicy",
            json!({
                "ResponseHeadersPolicyConfig": {
                    "Name": naming.physical("security-headers"),
                    "SecurityHeadersConfig": {
                        "ContentTypeOptions": { "Override": true },
                        "FrameOptions": { "FrameOption": "DENY", "Override": true },
                        "ReferrerPolicy": { "ReferrerPolicy": "same-origin", "Override": true },
                        "StrictTransportSecurity": {
                            "AccessControlMaxAgeSec": HSTS_MAX_AGE_SECONDS,
                            "IncludeSubdomains": true,
                            "Override": true,
                            "Preload": true,
                        },
                        "XSSProtection": { "Protection": true, "ModeBlock": true, "Override": true },
                    }
                }
            }),
        ),
    );

    template.add_resource(
        CACHE_POLICY,
        Resource::new(
            "AWS::CloudFront::CachePolicy",
            json!({
                "CachePolicyConfig": {
                    "Name": naming.physical("cache-policy"),
                    "DefaultTTL": ttl,
                    "MaxTTL": ttl * 3,
                    "MinTTL": 0,
                    "ParametersInCacheKeyAndForwardedToOrigin": {
                        "EnableAcceptEncodingBrotli": compress,
                        "EnableAcceptEncodingGzip": compress,
                        "CookiesConfig": { "CookieBehavior": "none" },
                        "HeadersConfig": { "HeaderBehavior": "none" },
                        "QueryStringsConfig": { "QueryStringBehavior": "none" },
                    }
                }
            }),
        ),
    );

    // CloudFront standard logging writes with ACLs, so the bucket keeps object writer ownership.
    template.add_resource(
        LOGGING_BUCKET,
        Resource::new(
            "AWS::S3::Bucket",
            json!({
                "BucketEncryption": {
                    "ServerSideEncryptionConfiguration": [{
                        "ServerSideEncryptionByDefault": { "SSEAlgorithm": "AES256" }
                    }]
                },
                "OwnershipControls": { "Rules": [{ "ObjectOwnership": "ObjectWriter" }] },
                "PublicAccessBlockConfiguration": {
                    "BlockPublicAcls": true,
                    "BlockPublicPolicy": true,
                    "IgnorePublicAcls": true,
                    "RestrictPublicBuckets": true,
                },
            }),
        ),
    );

    let mut distribution = json!({
        "DistributionConfig": {
            "Comment": format!("{} API Distribution ({})", naming.display_name(), environment),
            "Enabled": true,
            "HttpVersion": "http2",
            "IPV6Enabled": true,
            "PriceClass": config.price_class(),
            "Origins": [{
                "Id": ORIGIN_ID,
                "DomainName": sub(format!("${{{}}}.execute-api.${{AWS::Region}}.${{AWS::URLSuffix}}", api_id)),
                "OriginPath": format!("/{}", environment),
                "CustomOriginConfig": {
                    "OriginProtocolPolicy": "https-only",
                    "OriginSSLProtocols": ["TLSv1.2"],
                }
            }],
            "DefaultCacheBehavior": {
                "TargetOriginId": ORIGIN_ID,
                "ViewerProtocolPolicy": "https-only",
                "AllowedMethods": ["GET", "HEAD", "OPTIONS", "PUT", "PATCH", "POST", "DELETE"],
                "CachedMethods": ["GET", "HEAD", "OPTIONS"],
                "CachePolicyId": reference(CACHE_POLICY),
                "ResponseHeadersPolicyId": reference(RESPONSE_HEADERS_POLICY),
                "Compress": true,
            },
            "Logging": {
                "Bucket": get_att(LOGGING_BUCKET, "RegionalDomainName"),
                "IncludeCookies": false,
            },
        }
    });

    if config.waf_enabled {
        log::debug!("guarding the {} distribution with a web ACL", environment);
        add_web_acl(template, ctx);
        distribution["DistributionConfig"]["WebACLId"] = get_att(WEB_ACL, "Arn");
    } else {
        log::debug!("no web ACL for {}", environment);
    }

    template.add_resource(
        DISTRIBUTION,
        Resource::new("AWS::CloudFront::Distribution", distribution),
    );
}
