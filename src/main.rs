use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use shelfgate::config::{
    AppConfig, ConfigError, DEFAULT_IMAGEKIT_UPLOAD_URL, DEFAULT_SESSION_MAX_AGE_SECS, ImageKitConfig,
};
use shelfgate::routes;
use shelfgate::services::token::{SessionToken, TokenError, TokenKeys, unix_now};
use shelfgate::state::AppState;
use shelfgate::upload::{
    HttpAuthenticator, ImageKitCdn, MediaKind, SelectedFile, TracingNotifier, UploadError, UploadWidget, Variant,
    WidgetProps,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("session token error: {0}")]
    Token(#[from] TokenError),
    #[error("upload failed: {0}")]
    Upload(#[from] UploadError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "shelfgate", about = "Route gate, session endpoints, and media uploads")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server.
    Serve,
    /// Upload one file through the widget flow.
    Upload(UploadArgs),
    /// Mint a signed session token.
    Token(TokenArgs),
}

#[derive(Args, Debug)]
struct UploadArgs {
    #[arg(long, default_value = "image")]
    kind: MediaKind,

    #[arg(long, default_value = "/")]
    folder: String,

    #[arg(long)]
    accept: Option<String>,

    #[arg(long, default_value = "dark")]
    variant: Variant,

    #[arg(long, env = "API_ENDPOINT", default_value = "http://127.0.0.1:3000")]
    api_endpoint: String,

    #[arg(long, env = "IMAGEKIT_PUBLIC_KEY")]
    public_key: String,

    #[arg(long, env = "IMAGEKIT_URL_ENDPOINT")]
    url_endpoint: String,

    #[arg(long, env = "IMAGEKIT_UPLOAD_URL", default_value = DEFAULT_IMAGEKIT_UPLOAD_URL)]
    upload_url: String,

    path: PathBuf,
}

#[derive(Args, Debug)]
struct TokenArgs {
    #[arg(long, env = "AUTH_SECRET")]
    secret: String,

    #[arg(long)]
    sub: String,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    email: Option<String>,

    #[arg(long, default_value_t = DEFAULT_SESSION_MAX_AGE_SECS)]
    max_age_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve => run_serve().await,
        Command::Upload(args) => run_upload(args).await,
        Command::Token(args) => run_token(&args),
    }
}

async fn run_serve() -> Result<(), CliError> {
    let config = Arc::new(AppConfig::from_env()?);
    let port = config.port;
    if config.imagekit.private_key.is_none() {
        tracing::warn!("IMAGEKIT_PRIVATE_KEY not set; upload credentials are disabled");
    }

    let state = AppState::new(config)?;
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!(%port, "shelfgate listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_upload(args: UploadArgs) -> Result<(), CliError> {
    let imagekit = ImageKitConfig {
        public_key: args.public_key,
        private_key: None,
        url_endpoint: args.url_endpoint.trim_end_matches('/').to_owned(),
        upload_url: args.upload_url,
    };
    let credential_url = format!("{}/api/auth/imagekit", args.api_endpoint.trim_end_matches('/'));

    let props = WidgetProps {
        kind: args.kind,
        accept: args.accept.unwrap_or_else(|| format!("{}/*", args.kind)),
        placeholder: format!("Upload a {}", args.kind),
        folder: args.folder,
        variant: args.variant,
    };
    let mut widget = UploadWidget::new(
        props,
        imagekit.url_endpoint.clone(),
        Arc::new(HttpAuthenticator::new(credential_url)?),
        Arc::new(ImageKitCdn::new(&imagekit)?),
        Arc::new(TracingNotifier),
        |path: &str| tracing::info!(%path, "file changed"),
    );

    let mut progress = widget.subscribe_progress();
    let printer = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let pct = *progress.borrow_and_update();
            eprint!("\r{pct:>3}%");
        }
        eprintln!();
    });

    let file = SelectedFile::open(&args.path).await?;
    let result = widget.select(file).await;
    let preview = widget.preview();
    drop(widget);
    if let Err(e) = printer.await {
        tracing::debug!(error = %e, "progress printer task ended abnormally");
    }

    let uploaded = result?;
    println!("{}", uploaded.file_path);
    if let Some(preview) = preview {
        tracing::debug!(?preview, "preview");
    }
    Ok(())
}

fn run_token(args: &TokenArgs) -> Result<(), CliError> {
    let keys = TokenKeys::new(&args.secret)?;
    let mut token = SessionToken::new().with_claim("sub", args.sub.clone());
    if let Some(name) = &args.name {
        token = token.with_claim("name", name.clone());
    }
    if let Some(email) = &args.email {
        token = token.with_claim("email", email.clone());
    }

    let raw = keys.issue(token.refreshed(unix_now(), args.max_age_secs))?;
    println!("{raw}");
    Ok(())
}
