use opentelemetry::{global, trace::TracerProvider, KeyValue};
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    logs::SdkLoggerProvider, trace::SdkTracerProvider, Resource,
};
use std::env;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

fn env_filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy()
}

/// sets up logging. traces and logs are also exported over OTLP when
/// `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
pub fn init_telemetry() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let Some(otlp_endpoint) = env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .ok()
        .filter(|endpoint| !endpoint.is_empty())
    else {
        Registry::default()
            .with(env_filter())
            .with(tracing_subscriber::fmt::layer())
            .try_init()?;

        tracing::info!("no OTLP endpoint configured, logging to stdout only");
        return Ok(());
    };

    let service_name = env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "moodquote".to_string());

    let service_version =
        env::var("OTEL_SERVICE_VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

    let resource = Resource::builder()
        .with_service_name(service_name)
        .with_attribute(KeyValue::new("service.version", service_version))
        .build();

    let span_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&otlp_endpoint)
        .build()?;

    let log_exporter = opentelemetry_otlp::LogExporter::builder()
        .with_tonic()
        .with_endpoint(&otlp_endpoint)
        .build()?;

    let tracer_provider = SdkTracerProvider::builder()
        .with_resource(resource.clone())
        .with_batch_exporter(span_exporter)
        .build();

    let log_provider = SdkLoggerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(log_exporter)
        .build();

    global::set_tracer_provider(tracer_provider.clone());

    let tracer = tracer_provider.tracer("moodquote");
    let tracer_layer = tracing_opentelemetry::layer().with_tracer(tracer);
    let logger_layer = OpenTelemetryTracingBridge::new(&log_provider);

    Registry::default()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer())
        .with(tracer_layer)
        .with(logger_layer)
        .try_init()?;

    tracing::info!(endpoint = %otlp_endpoint, "OpenTelemetry initialized successfully");
    Ok(())
}
