use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hinru::{
    api::{self, AppState},
    article::Article,
    auth::{
        CachedIdentityProvider, ChainedIdentityProvider, FirebaseIdentityProvider,
        IdentityProvider, StaticTokenProvider,
    },
    client::{DictionaryClient, HttpArticlesApi, Session},
    config::{ConfigError, ServerConfig},
    store::{MemoryStore, Seed},
};

#[derive(Parser)]
#[command(name = "hinru")]
#[command(about = "Hindi-Russian dictionary service")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        #[arg(short, long, default_value = "3005")]
        port: u16,

        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Built client application to serve next to the API
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Prefix search against a running server, grouped by headword
    Lookup {
        term: String,

        #[arg(long, default_value = "http://127.0.0.1:3005")]
        server: String,

        #[arg(long, env = "HINRU_TOKEN")]
        token: Option<String>,
    },

    /// Print every article under one headword
    Show {
        word: String,

        /// Print the raw JSON instead of a readable summary
        #[arg(long)]
        json: bool,

        #[arg(long, default_value = "http://127.0.0.1:3005")]
        server: String,

        #[arg(long, env = "HINRU_TOKEN")]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let filter_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("hinru={filter_level},tower_http=info").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match args.command {
        Command::Serve {
            port,
            host,
            static_dir,
        } => serve(&host, port, static_dir).await,
        Command::Lookup {
            term,
            server,
            token,
        } => {
            let client = client(&server, token)?;
            for group in client.lookup(&term).await? {
                println!("{}", summarize(&group));
            }
            Ok(())
        }
        Command::Show {
            word,
            json,
            server,
            token,
        } => {
            let client = client(&server, token)?;
            let articles = client.article_group(&word).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&articles)?);
            } else {
                for article in &articles {
                    println!("{}", describe(article));
                }
            }
            Ok(())
        }
    }
}

/// One line per headword: the word and the parts of speech filed under it.
fn summarize(group: &[Article]) -> String {
    let Some(first) = group.first() else {
        return String::new();
    };
    let labels: Vec<&str> = group
        .iter()
        .map(|article| article.entry.part_of_speech.label())
        .collect();
    format!("{} ({})", first.word(), labels.join(", "))
}

fn describe(article: &Article) -> String {
    let entry = &article.entry;
    let mut lines = vec![format!(
        "{} [{}] {}",
        entry.word,
        entry.transliteration,
        entry.part_of_speech.label()
    )];

    for (key, values) in &entry.properties {
        let Some(property) = entry.part_of_speech.property(key) else {
            continue;
        };
        let names: Vec<&str> = values
            .iter()
            .filter(|(_, set)| **set)
            .filter_map(|(value, _)| property.value(value).map(|value| value.name))
            .collect();
        if !names.is_empty() {
            lines.push(format!("  {}: {}", property.name, names.join(", ")));
        }
    }

    for (index, meaning) in entry.meanings.iter().enumerate() {
        lines.push(format!("  {}. {}", index + 1, meaning.meaning));
    }
    lines.join("\n")
}

fn client(server: &str, token: Option<String>) -> anyhow::Result<DictionaryClient> {
    let api = HttpArticlesApi::new(server)?;
    let session = token.map(Session::token).unwrap_or_default();
    Ok(DictionaryClient::new(Arc::new(api)).with_session(session))
}

fn identity_provider(config: &ServerConfig) -> anyhow::Result<Arc<dyn IdentityProvider>> {
    if !config.has_identity_provider() {
        bail!(ConfigError::NoIdentityProvider);
    }

    let mut providers: Vec<Arc<dyn IdentityProvider>> = Vec::new();

    if let Some(tokens) = &config.static_tokens {
        let tokens = StaticTokenProvider::parse(tokens).context("HINRU_STATIC_TOKENS")?;
        info!("Accepting {} static tokens", tokens.len());
        providers.push(Arc::new(tokens));
    }

    if let Some(api_key) = &config.firebase_api_key {
        let firebase = FirebaseIdentityProvider::with_base_url(
            config.firebase_base_url.clone(),
            api_key.clone(),
        );
        providers.push(Arc::new(CachedIdentityProvider::new(
            Arc::new(firebase),
            Duration::from_secs(config.token_ttl_secs),
            config.token_cache_capacity,
        )));
    }

    if providers.len() == 1 {
        return Ok(providers.remove(0));
    }
    Ok(Arc::new(ChainedIdentityProvider::new(providers)))
}

async fn serve(host: &str, port: u16, static_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;
    let identity = identity_provider(&config)?;

    let store = MemoryStore::new();
    if let Some(seed) = &config.seed {
        Seed::from_file(seed)
            .await
            .with_context(|| format!("failed to load seed {}", seed.display()))?
            .load_into(&store)
            .await?;
    }

    let state = AppState::new(Arc::new(store), identity)
        .with_anonymous_submissions(config.anonymous_submissions);
    let app = match &static_dir {
        Some(dir) => api::router_with_static(state, dir),
        None => api::router(state),
    };

    let bind_addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {bind_addr}"))?;

    info!("Dictionary server started on {}", bind_addr);
    if let Some(dir) = &static_dir {
        info!("Serving client application from {}", dir.display());
    }
    if config.anonymous_submissions {
        info!("Anonymous submissions are enabled");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hinru::article::{ArticleId, Meaning, NewArticle, PartOfSpeech};

    #[test]
    fn test_args_parsing() {
        let args = Args::try_parse_from(["hinru", "--debug", "serve", "--port", "9000"]).unwrap();

        assert!(args.debug);
        match args.command {
            Command::Serve {
                port, static_dir, ..
            } => {
                assert_eq!(port, 9000);
                assert!(static_dir.is_none());
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_lookup_args() {
        let args = Args::try_parse_from(["hinru", "lookup", "पा", "--token", "t"]).unwrap();
        match args.command {
            Command::Lookup { term, token, .. } => {
                assert_eq!(term, "पा");
                assert_eq!(token.as_deref(), Some("t"));
            }
            _ => panic!("expected lookup"),
        }
    }

    #[test]
    fn test_describe_uses_russian_names() {
        let mut entry = NewArticle::new("घर", PartOfSpeech::Noun);
        entry.transliteration = "ghar".into();
        entry
            .properties
            .entry("gender".into())
            .or_default()
            .insert("m".into(), true);
        entry.meanings.push(Meaning {
            meaning: "дом".into(),
            examples: String::new(),
        });
        let article = entry.with_id(ArticleId::new("a1"));

        assert_eq!(
            describe(&article),
            "घर [ghar] существительное\n  Род: мужской\n  1. дом"
        );
    }

    #[test]
    fn test_summarize_lists_parts_of_speech() {
        let group = vec![
            NewArticle::new("पानी", PartOfSpeech::Noun).with_id(ArticleId::new("a1")),
            NewArticle::new("पानी", PartOfSpeech::Adjective).with_id(ArticleId::new("a2")),
        ];
        assert_eq!(summarize(&group), "पानी (существительное, прилагательное)");
        assert_eq!(summarize(&[]), "");
    }

    #[test]
    fn test_no_identity_provider_is_an_error() {
        assert!(identity_provider(&ServerConfig::default()).is_err());
    }

    #[test]
    fn test_single_provider_is_used_directly() {
        let config = ServerConfig {
            static_tokens: Some("t=a@example.com".into()),
            ..ServerConfig::default()
        };
        assert!(identity_provider(&config).is_ok());
    }
}
