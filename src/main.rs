//! SkillNexus Admin - administrative back-office service
//!
//! Serves the admin REST API: admin account management, the audit ledger,
//! scoped bulk user activation and the admin dashboard.

use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{extract::Request, Router, ServiceExt};
use tower::Layer;
use tower_http::{
    cors::{Any, CorsLayer},
    normalize_path::{NormalizePath, NormalizePathLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use config::LogFormat;
use skillnexus_admin::{
    api_router, config, db, middleware::auth::create_access_token, services::AdminService,
    AppConfig, AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(());
    }

    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        println!("SkillNexus Admin {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Load configuration first (before logging, so we know log format)
    let config = AppConfig::load().context("Failed to load configuration")?;

    // The guard must outlive the program so file logs are flushed
    let _log_guard = init_logging(&config).context("Failed to initialize logging")?;

    info!("SkillNexus Admin starting up");

    ensure_data_directory(&config)?;

    info!("Initializing database connection");
    let db = db::init_pool(&config.database)
        .await
        .context("Failed to initialize database")?;

    if let Some(user_id) = flag_value(&args, "--provision-system-admin")? {
        return provision_system_admin(db, user_id).await;
    }

    if let Some(user_id) = flag_value(&args, "--issue-token")? {
        return issue_token(&config, db, user_id).await;
    }

    let state = AppState {
        config: config.clone(),
        db,
    };

    let app = create_app(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address configuration")?;

    info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .await
    .context("HTTP server error")?;

    Ok(())
}

/// Parse the numeric user id following `flag`, if the flag is present
fn flag_value(args: &[String], flag: &str) -> Result<Option<i64>> {
    let Some(pos) = args.iter().position(|arg| arg == flag) else {
        return Ok(None);
    };
    let raw = args
        .get(pos + 1)
        .with_context(|| format!("{} requires a user id", flag))?;
    let user_id = raw
        .parse::<i64>()
        .with_context(|| format!("Invalid user id for {}: {}", flag, raw))?;
    Ok(Some(user_id))
}

/// Bootstrap a system admin without an existing one
async fn provision_system_admin(db: db::DbPool, user_id: i64) -> Result<()> {
    let admin = AdminService::new(db)
        .provision_system_admin(user_id)
        .await
        .context("Failed to provision system admin")?;

    info!(
        system_admin_id = admin.id,
        user_id = admin.user_id,
        "System admin provisioned"
    );
    println!(
        "Provisioned system admin {} for {} <{}>",
        admin.id, admin.user_name, admin.user_email
    );
    Ok(())
}

/// Print a signed access token for an existing user
async fn issue_token(config: &AppConfig, db: db::DbPool, user_id: i64) -> Result<()> {
    let mut conn = db.acquire().await.context("Failed to acquire connection")?;
    let user = db::UserRepository::new(&mut conn)
        .get_by_id(user_id)
        .await?
        .with_context(|| format!("User {} does not exist", user_id))?;

    let token = create_access_token(
        user.id,
        &user.email,
        &config.auth.jwt_secret,
        config.auth.token_expiry_hours,
    )
    .context("Failed to sign access token")?;

    println!("{}", token);
    Ok(())
}

/// Initialize logging based on configuration
///
/// Returns a guard that must be kept alive for file logging to work.
fn init_logging(config: &AppConfig) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    use config::LogTarget;
    use tracing_subscriber::{prelude::*, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let log_config = &config.logging;

    match &log_config.target {
        LogTarget::Console => {
            let subscriber = tracing_subscriber::registry().with(env_filter);
            init_console_logging(subscriber, &log_config.format);
            Ok(None)
        }
        LogTarget::File => {
            let (writer, guard) = create_file_writer(log_config)?;
            let subscriber = tracing_subscriber::registry().with(env_filter);
            init_file_logging(subscriber, &log_config.format, writer);
            Ok(Some(guard))
        }
        LogTarget::Both => {
            let (writer, guard) = create_file_writer(log_config)?;
            let subscriber = tracing_subscriber::registry().with(env_filter);
            init_both_logging(subscriber, &log_config.format, writer);
            Ok(Some(guard))
        }
    }
}

fn create_file_writer(
    log_config: &config::LoggingConfig,
) -> Result<(
    tracing_appender::non_blocking::NonBlocking,
    tracing_appender::non_blocking::WorkerGuard,
)> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};

    if let Err(e) = std::fs::create_dir_all(&log_config.log_dir) {
        eprintln!(
            "Warning: Failed to create log directory {:?}: {}",
            log_config.log_dir, e
        );
    }

    let rotation = if log_config.daily_rotation {
        Rotation::DAILY
    } else {
        Rotation::NEVER
    };

    let mut builder = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(&log_config.log_prefix);
    // 0 keeps every file
    if log_config.max_log_files > 0 {
        builder = builder.max_log_files(log_config.max_log_files);
    }

    let file_appender = builder
        .build(&log_config.log_dir)
        .with_context(|| format!("Failed to open log directory {:?}", log_config.log_dir))?;

    Ok(tracing_appender::non_blocking(file_appender))
}

fn init_console_logging<S>(subscriber: S, format: &LogFormat)
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + Send + Sync,
{
    use tracing_subscriber::{fmt, prelude::*};

    match format {
        LogFormat::Json => {
            subscriber
                .with(fmt::layer().json().with_target(true))
                .init();
        }
        LogFormat::Compact => {
            subscriber
                .with(fmt::layer().compact().with_target(false))
                .init();
        }
        LogFormat::Pretty => {
            subscriber
                .with(fmt::layer().with_target(true).with_line_number(false))
                .init();
        }
    }
}

fn init_file_logging<S>(
    subscriber: S,
    format: &LogFormat,
    writer: tracing_appender::non_blocking::NonBlocking,
) where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + Send + Sync,
{
    use tracing_subscriber::{fmt, prelude::*};

    match format {
        LogFormat::Json => {
            subscriber
                .with(fmt::layer().json().with_target(true).with_writer(writer))
                .init();
        }
        LogFormat::Compact => {
            subscriber
                .with(fmt::layer().compact().with_target(false).with_writer(writer))
                .init();
        }
        LogFormat::Pretty => {
            subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
        }
    }
}

fn init_both_logging<S>(
    subscriber: S,
    format: &LogFormat,
    writer: tracing_appender::non_blocking::NonBlocking,
) where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + Send + Sync,
{
    use tracing_subscriber::{fmt, prelude::*};

    match format {
        LogFormat::Json => {
            subscriber
                .with(fmt::layer().json().with_target(true))
                .with(fmt::layer().json().with_target(true).with_writer(writer))
                .init();
        }
        LogFormat::Compact => {
            subscriber
                .with(fmt::layer().compact().with_target(false))
                .with(fmt::layer().compact().with_target(false).with_writer(writer))
                .init();
        }
        LogFormat::Pretty => {
            subscriber
                .with(fmt::layer().with_target(true))
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
        }
    }
}

/// Ensure the directory holding the SQLite file exists
fn ensure_data_directory(config: &AppConfig) -> Result<()> {
    if let Some(path) = config.database.url.strip_prefix("sqlite://") {
        let path = path.split('?').next().unwrap_or(path);
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).context("Failed to create data directory")?;
                info!("Created data directory: {:?}", parent);
            }
        }
    }
    Ok(())
}

/// Wrap the API router with the global layers.
///
/// Trailing slashes are trimmed before routing, so the normalizing layer wraps
/// the router instead of being added with `Router::layer`.
fn create_app(state: AppState, config: &AppConfig) -> NormalizePath<Router> {
    let cors = if config.server.cors_allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins = config
            .server
            .cors_allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect::<Vec<axum::http::HeaderValue>>();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let router = api_router(state).layer(trace_layer).layer(cors);

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

fn print_help() {
    println!(
        r#"SkillNexus Admin {}

USAGE:
    skillnexus-admin [OPTIONS]

OPTIONS:
    -h, --help                          Print this help message
    -V, --version                       Print version information
    --provision-system-admin <USER_ID>  Make an existing user a system admin
                                        and exit. Use this to bootstrap the
                                        first system admin.
    --issue-token <USER_ID>             Print a signed access token for an
                                        existing user and exit.

ENVIRONMENT:
    SKILLNEXUS_CONFIG       Path to configuration file (default: config.yaml)
    SKILLNEXUS_HOST         Listen address
    SKILLNEXUS_PORT         Listen port
    DATABASE_URL            SQLite database URL
    JWT_SECRET              Token signing secret (at least 32 characters)
    RUST_LOG                Log filter

CONFIGURATION:
    The application looks for configuration files in the following order:
    1. Path specified by SKILLNEXUS_CONFIG environment variable
    2. ./config.yaml
    3. ./config/config.yaml
    4. /etc/skillnexus-admin/config.yaml"#,
        env!("CARGO_PKG_VERSION")
    );
}
