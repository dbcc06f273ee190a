use anyhow::{Context, Result, bail};
use chrono::{Duration, Utc};
use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;

use kubevents_k8s::{EventFeed, KubeClient};
use kubevents_stream::{CollectorConfig, MatchPredicate, run};
use kubevents_types::{CollectorSpec, EventSource, Format, Mode};

/// Kubevents - tail and filter Kubernetes cluster events
#[derive(Parser, Debug)]
#[command(name = "kubevents")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Event kinds to request from the source (empty = all kinds)
    #[arg(value_name = "KIND")]
    allowlist: Vec<String>,

    /// Kubeconfig context (defaults to the current context)
    #[arg(long)]
    context: Option<String>,

    /// Namespace to read events from (defaults to the whole cluster)
    #[arg(short = 'n', long)]
    namespace: Option<String>,

    /// Lookback window start quantity
    #[arg(short = 'b', long = "begin", default_value_t = 10)]
    begin: i64,

    /// Lookback window start unit
    #[arg(short = 'U', long = "unit", value_enum, default_value_t = BeginUnit::Minutes)]
    unit: BeginUnit,

    /// Optional window end as a lookback duration, e.g. 90m, 2h, 1d
    #[arg(short = 'e', long = "end", value_name = "DUR")]
    end: Option<String>,

    /// Limit events to this kind ("all" disables the filter)
    #[arg(short = 'k', long = "kind", default_value = "all")]
    kind: String,

    /// Message match: "all", a glob (*vmnic*), or a regex (^ERROR.*)
    #[arg(short = 'M', long = "match", default_value = "all", value_name = "PATTERN")]
    message_match: String,

    /// Event display mode
    #[arg(short = 'm', long = "mode", value_enum, default_value_t = ModeArg::List)]
    mode: ModeArg,

    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t = FormatArg::Text)]
    output: FormatArg,

    /// Follow the event stream after it drains
    #[arg(short = 'f', long)]
    follow: bool,

    /// Number of events to fetch per page
    #[arg(short = 'c', long = "count", default_value_t = 100)]
    count: usize,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BeginUnit {
    #[value(name = "m")]
    Minutes,
    #[value(name = "h")]
    Hours,
    #[value(name = "d")]
    Days,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    List,
    Kinds,
    Summary,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::List => Self::List,
            ModeArg::Kinds => Self::Kinds,
            ModeArg::Summary => Self::Summary,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for Format {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Diagnostics go to stderr so they never mix with rendered events
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run_app(args).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_app(args: Args) -> Result<()> {
    // Configuration errors are fatal before any fetching begins
    if args.count == 0 {
        bail!("Page size must be greater than 0");
    }
    let predicate = MatchPredicate::new(&args.kind, &args.message_match)?;
    let end = args.end.as_deref().map(parse_lookback).transpose()?;

    let config = CollectorConfig {
        mode: args.mode.into(),
        format: args.output.into(),
        page_size: args.count,
        follow: args.follow,
    };

    let kube_client = KubeClient::new()?;
    let client = kube_client.connect(args.context.as_deref()).await?;

    let now = Utc::now();
    let mut spec = CollectorSpec::new(now - lookback(args.begin, args.unit));
    spec.kind_allowlist = args.allowlist;
    spec.namespace = args.namespace;
    spec.end = end.map(|d| now - d);

    let feed = EventFeed::new(client);
    let cursor = feed.create_collector(spec).await?;

    // Ctrl-C cancels cooperatively; the loop unwinds and releases the cursor
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_token.cancel();
        }
    });

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let report = run(cursor, &config, &predicate, &cancel, &mut out).await?;

    tracing::debug!(
        total = report.total,
        kinds = report.kinds.len(),
        "kubevents run complete"
    );
    Ok(())
}

fn lookback(quantity: i64, unit: BeginUnit) -> Duration {
    match unit {
        BeginUnit::Minutes => Duration::minutes(quantity),
        BeginUnit::Hours => Duration::hours(quantity),
        BeginUnit::Days => Duration::days(quantity),
    }
}

/// Parse a suffixed lookback duration like `90m`, `2h`, or `1d`
fn parse_lookback(raw: &str) -> Result<Duration> {
    let Some(unit) = raw.chars().last() else {
        bail!("Invalid duration: empty string");
    };
    let quantity: i64 = raw[..raw.len() - unit.len_utf8()]
        .parse()
        .with_context(|| format!("Invalid duration: {}", raw))?;
    match unit {
        'm' => Ok(Duration::minutes(quantity)),
        'h' => Ok(Duration::hours(quantity)),
        'd' => Ok(Duration::days(quantity)),
        _ => bail!("Invalid duration unit in {:?}; expected m, h, or d", raw),
    }
}
