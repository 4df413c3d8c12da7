use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use exam_core::Clock;
use exam_core::model::{SessionStyle, Topic};
use services::billing::ENTITLEMENT_COOKIE;
use services::{
    AccessDecision, BillingConfig, EntitlementService, QuizSession, StripeCheckout, StudyGuard,
    SubscriptionGate, WebhookService,
};
use storage::repository::Storage;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod quiz;

const DEFAULT_DB_URL: &str = "sqlite://mastery.sqlite3";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { name: &'static str },
    UnknownArg(String),
    InvalidTopic { raw: String },
    InvalidStyle { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { name } => write!(f, "missing <{name}>"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidTopic { raw } => write!(f, "invalid --topic value: {raw}"),
            ArgsError::InvalidStyle { raw } => write!(f, "invalid --style value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- practice [--topic <id>] [--style training|strict]");
    eprintln!("  cargo run -p app -- exam     [--style training|strict]");
    eprintln!("  cargo run -p app -- checkout [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- verify <session_id> [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- webhook --payload <file> --signature <header> [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- access <path> [--cookie <token>] [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Topics:");
    let ids: Vec<&str> = Topic::ALL.iter().map(|t| t.as_str()).collect();
    eprintln!("  {}", ids.join(", "));
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --topic mixed  --style training  --db {DEFAULT_DB_URL}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  MASTERY_DB_URL, STRIPE_SECRET_KEY, STRIPE_PRICE_ID, APP_URL,");
    eprintln!("  STRIPE_WEBHOOK_SECRET, STRIPE_API_BASE, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Practice,
    Exam,
    Checkout,
    Verify,
    Webhook,
    Access,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "practice" => Some(Self::Practice),
            "exam" => Some(Self::Exam),
            "checkout" => Some(Self::Checkout),
            "verify" => Some(Self::Verify),
            "webhook" => Some(Self::Webhook),
            "access" => Some(Self::Access),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    topic: Topic,
    style: SessionStyle,
    positional: Option<String>,
    payload: Option<PathBuf>,
    signature: Option<String>,
    cookie: Option<String>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            db_url: std::env::var("MASTERY_DB_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url),
            topic: Topic::Mixed,
            style: SessionStyle::default(),
            positional: None,
            payload: None,
            signature: None,
            cookie: None,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = normalize_sqlite_url(value);
                }
                "--topic" => {
                    let value = require_value(args, "--topic")?;
                    parsed.topic = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidTopic { raw: value.clone() })?;
                }
                "--style" => {
                    let value = require_value(args, "--style")?;
                    parsed.style = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidStyle { raw: value.clone() })?;
                }
                "--payload" => {
                    parsed.payload = Some(PathBuf::from(require_value(args, "--payload")?));
                }
                "--signature" => parsed.signature = Some(require_value(args, "--signature")?),
                "--cookie" => parsed.cookie = Some(require_value(args, "--cookie")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ if !arg.starts_with("--") && parsed.positional.is_none() => {
                    parsed.positional = Some(arg);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }

    fn require_positional(&self, name: &'static str) -> Result<&str, ArgsError> {
        self.positional
            .as_deref()
            .ok_or(ArgsError::MissingArgument { name })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim();
    let path = std::path::Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

// Open + migrate SQLite in the binary glue so core/services stay storage-agnostic.
async fn open_storage(db_url: &str) -> Result<Storage, Box<dyn std::error::Error>> {
    prepare_sqlite_file(db_url)?;
    Ok(Storage::sqlite(db_url).await?)
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "app=info,services=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let mut argv = std::env::args().skip(1);
    let cmd = match argv.next() {
        None => Command::Practice,
        Some(first) if first == "--help" || first == "-h" => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(&first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let clock = Clock::default();

    match cmd {
        Command::Practice => {
            info!(topic = %parsed.topic, style = %parsed.style, "practice session");
            quiz::run(QuizSession::new(parsed.style), quiz::Start::Practice(parsed.topic)).await?;
        }
        Command::Exam => {
            quiz::run(QuizSession::new(parsed.style), quiz::Start::Exam).await?;
        }
        Command::Checkout => {
            let storage = open_storage(&parsed.db_url).await?;
            let service = EntitlementService::new(
                clock,
                Arc::new(StripeCheckout::from_env()),
                storage.subscriptions,
            );
            let redirect = service.begin_checkout().await?;
            println!("{}", redirect.url);
        }
        Command::Verify => {
            let storage = open_storage(&parsed.db_url).await?;
            let session_id = parsed.require_positional("session_id")?;
            let service = EntitlementService::new(
                clock,
                Arc::new(StripeCheckout::from_env()),
                storage.subscriptions,
            );
            let record = service.verify_checkout(session_id).await?;
            println!("{ENTITLEMENT_COOKIE}={}", record.token());
        }
        Command::Webhook => {
            let storage = open_storage(&parsed.db_url).await?;
            let path = parsed
                .payload
                .as_ref()
                .ok_or(ArgsError::MissingValue { flag: "--payload" })?;
            let payload = std::fs::read(path)?;
            let secret = BillingConfig::from_env().and_then(|c| c.webhook_secret);
            let service = WebhookService::new(clock, secret, storage.subscriptions);
            let outcome = service
                .handle(&payload, parsed.signature.as_deref())
                .await?;
            println!("{outcome:?}");
        }
        Command::Access => {
            let storage = open_storage(&parsed.db_url).await?;
            let path = parsed.require_positional("path")?;
            let guard = StudyGuard::new(Arc::new(SubscriptionGate::new(storage.subscriptions)));
            match guard.check(path, parsed.cookie.as_deref()).await {
                AccessDecision::Allow => println!("allow"),
                AccessDecision::Redirect(to) => println!("redirect {to}"),
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
