use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use project_graph::client::ApiClient;
use project_graph::fetcher::{FetcherConfig, ProjectsFetcher, ResourceKind, Scope};
use project_graph::models::Language;

#[derive(Parser)]
#[command(name = "pgraph")]
#[command(about = "Fetch and inspect per-user project graphs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Core,
    Favorite,
    All,
}

impl From<KindArg> for ResourceKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Core => ResourceKind::Core,
            KindArg::Favorite => ResourceKind::Favorite,
            KindArg::All => ResourceKind::All,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LanguageArg {
    En,
    Es,
}

impl From<LanguageArg> for Language {
    fn from(language: LanguageArg) -> Self {
        match language {
            LanguageArg::En => Language::English,
            LanguageArg::Es => Language::Spanish,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a user's projects and print them as JSON
    Fetch {
        /// User key (e-mail)
        #[arg(short, long)]
        email: String,

        /// Which project subset to fetch
        #[arg(short, long, value_enum, default_value = "all")]
        kind: KindArg,

        /// Skip loading the priority catalog first
        #[arg(long)]
        no_catalog: bool,
    },
    /// Print a user's personal info and priorities as JSON
    Profile {
        /// User key (e-mail)
        #[arg(short, long)]
        email: String,
    },
    /// List a user's priorities, one `id<TAB>description` per line
    Priorities {
        /// User key (e-mail)
        #[arg(short, long)]
        email: String,

        /// Description language
        #[arg(short, long, value_enum, default_value = "en")]
        language: LanguageArg,
    },
}

/// Initialize tracing on stderr so stdout stays clean JSON.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "project_graph=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_fetcher(email: &str, language: Language) -> anyhow::Result<ProjectsFetcher> {
    let fetcher = ProjectsFetcher::builder()
        .configure(FetcherConfig::new(email).with_language(language))
        .client(ApiClient::from_env()?)
        .build()?;
    Ok(fetcher)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Fetch {
            email,
            kind,
            no_catalog,
        } => {
            let fetcher = build_fetcher(&email, Language::default())?;
            if !no_catalog {
                let profile = fetcher.load_catalog().await?;
                tracing::info!(
                    "Loaded {} priorities for {}",
                    profile.priorities.len(),
                    profile.preferred_name
                );
            }

            let kind = ResourceKind::from(kind);
            fetcher.fetch(&[kind], &[Scope::MainUser])?;
            let output = match kind {
                ResourceKind::Core => serde_json::to_string_pretty(&fetcher.get_cores().await?)?,
                ResourceKind::Favorite => {
                    serde_json::to_string_pretty(&fetcher.get_favorites().await?)?
                }
                ResourceKind::All => serde_json::to_string_pretty(&fetcher.get_all().await?)?,
            };
            println!("{}", output);
        }
        Commands::Profile { email } => {
            let fetcher = build_fetcher(&email, Language::default())?;
            let profile = fetcher.load_catalog().await?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Commands::Priorities { email, language } => {
            let fetcher = build_fetcher(&email, language.into())?;
            fetcher.load_catalog().await?;
            for (id, description) in fetcher.priority_descriptions() {
                println!("{}\t{}", id, description);
            }
        }
    }

    Ok(())
}
