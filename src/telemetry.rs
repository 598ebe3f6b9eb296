use std::{collections::HashMap, io};

use anyhow::{anyhow, Context, Result};
use opentelemetry::{
    sdk::{trace as sdktrace, Resource},
    KeyValue,
};
use opentelemetry_otlp::WithExportConfig;
use tracing_subscriber::{
    fmt::time::UtcTime, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt, EnvFilter, Layer,
};
use url::Url;

const ENDPOINT: &str = "OTLP_ENDPOINT";
const HEADER_PREFIX: &str = "OTLP_";

/// Install the stderr log layer, plus OTLP trace export when `OTLP_ENDPOINT`
/// is set.
pub fn init() -> Result<()> {
    let fmt_env_filter = env_filter_merge_from_environment("info", "ELYSIA_LOG_LEVEL")?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_timer(UtcTime::rfc_3339())
        .with_filter(fmt_env_filter);

    let otel_layer = match new_tracer().context("Failed to create tracer")? {
        Some(tracer) => {
            let otel_env_filter =
                env_filter_merge_from_environment("trace,polling=off", "ELYSIA_TRACE_LEVEL")?;
            Some(
                tracing_opentelemetry::layer()
                    .with_tracer(tracer)
                    .with_filter(otel_env_filter),
            )
        },
        None => None,
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()
        .context("Failed to set global default tracing subscriber")?;

    Ok(())
}

/// Flush spans still waiting in the batch exporter.
pub fn shutdown() {
    opentelemetry::global::shutdown_tracer_provider();
}

fn env_filter_merge_from_environment(
    default_directives: &'static str,
    env_var: &'static str,
) -> Result<EnvFilter> {
    let mut filter = EnvFilter::builder()
        .parse(default_directives)
        .with_context(|| anyhow!("Default directives were invalid: {default_directives}"))?;

    if let Ok(env_value) = std::env::var(env_var) {
        for env_directive in env_value.split(',') {
            match env_directive.parse() {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(err) => eprintln!("WARN ignoring log directive: {env_directive:?}: {err}"),
            }
        }
    }

    Ok(filter)
}

fn otlp_headers(vars: impl Iterator<Item = (String, String)>) -> HashMap<String, String> {
    vars.filter(|(name, _)| name != ENDPOINT)
        .filter_map(|(name, value)| {
            let header_name = name
                .strip_prefix(HEADER_PREFIX)?
                .replace('_', "-")
                .to_ascii_lowercase();
            Some((header_name, value))
        })
        .collect()
}

fn new_tracer() -> Result<Option<sdktrace::Tracer>> {
    let endpoint = match std::env::var(ENDPOINT) {
        Ok(endpoint) => endpoint,
        Err(_) => return Ok(None),
    };
    let endpoint =
        Url::parse(&endpoint).with_context(|| anyhow!("Invalid {ENDPOINT}: {endpoint}"))?;

    let exporter = opentelemetry_otlp::new_exporter()
        .http()
        .with_endpoint(endpoint.as_str())
        .with_headers(otlp_headers(std::env::vars()));

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(
            sdktrace::config().with_resource(Resource::new(vec![KeyValue::new(
                opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                "elysia-admin",
            )])),
        )
        .install_batch(opentelemetry::runtime::AsyncStd)?;

    Ok(Some(tracer))
}
