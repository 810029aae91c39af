//! quiz: command-line front end for the product quiz service.
//! Lists the quiz questions, searches the catalog for a step, and asks
//! follow-up questions with the accumulated quiz context.

use clap::{Parser, Subcommand};
use quiz_client::config;
use quiz_client::{ApiClient, Config, Product, QuizContext, SearchFilters};
use serde::Deserialize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "quiz", version, about = "Product quiz recommendations and follow-up chat")]
struct Cli {
    /// Config file (default: ~/.quiz/config.yaml).
    #[arg(long, env = "QUIZ_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the quiz questions in order.
    Questions,
    /// Search the catalog and print `id<TAB>title` per product.
    Search {
        /// Product category, e.g. `jackets`.
        #[arg(long)]
        category: Option<String>,
        /// Extra filter as `key=value`; repeatable.
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, serde_json::Value)>,
        /// Maximum products to print (default from config, else 10).
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Ask a follow-up question; reads the first stdin line if MESSAGE is omitted.
    Ask {
        message: Option<String>,
        /// JSON file with `{products, answers, summary, chatMessages}`.
        #[arg(long)]
        context: Option<PathBuf>,
    },
}

/// Contents of the `ask --context` file.
#[derive(Debug, Default, Deserialize)]
struct AskContext {
    #[serde(default)]
    products: Vec<Product>,
    #[serde(flatten)]
    quiz: QuizContext,
}

/// `key=value`; the value is JSON when it parses as JSON, a string otherwise.
fn parse_filter(raw: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{}`", raw))?;
    if key.is_empty() {
        return Err(format!("empty filter key in `{}`", raw));
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Explicit path must load; the default path is optional.
fn load_config(path: Option<&Path>) -> Config {
    if let Some(path) = path {
        return config::load(path).unwrap_or_else(|e| {
            fail(format!("failed to load config from {}: {}", path.display(), e))
        });
    }
    match config::default_config_path() {
        Some(path) if path.exists() => config::load(&path).unwrap_or_else(|e| {
            fail(format!("failed to load config from {}: {}", path.display(), e))
        }),
        _ => Config::default(),
    }
}

fn read_message(message: Option<String>) -> String {
    let message = match message {
        Some(m) => m,
        None => {
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line).unwrap_or(0);
            line
        }
    };
    let message = message.trim().to_string();
    if message.is_empty() {
        fail("no question provided");
    }
    message
}

fn read_context(path: Option<&Path>) -> AskContext {
    let Some(path) = path else {
        return AskContext::default();
    };
    let contents = std::fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("failed to read {}: {}", path.display(), e)));
    serde_json::from_str(&contents)
        .unwrap_or_else(|e| fail(format!("invalid context file {}: {}", path.display(), e)))
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    if let Command::Questions = cli.command {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for (i, question) in quiz_client::fetch_questions().iter().enumerate() {
            let _ = writeln!(out, "{}. [{}] {}", i + 1, question.category, question.text);
        }
        return;
    }

    let cfg = load_config(cli.config.as_deref());
    let client = ApiClient::from_config(&cfg).unwrap_or_else(|e| fail(e));

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| fail(format!("failed to create runtime: {}", e)));

    rt.block_on(async {
        let stdout = io::stdout();
        match cli.command {
            Command::Questions => {}
            Command::Search {
                category,
                filters: extra,
                limit,
            } => {
                let mut filters = SearchFilters::new();
                if let Some(category) = category {
                    filters.insert("category", category);
                }
                for (key, value) in extra {
                    filters.insert(key, value);
                }
                let limit = limit.unwrap_or_else(|| cfg.quiz.search_limit());

                let products = client
                    .fetch_products(&filters, limit)
                    .await
                    .unwrap_or_else(|e| fail(format!("search failed: {}", e)));
                let mut out = stdout.lock();
                if products.is_empty() {
                    eprintln!("No recommendations available.");
                }
                for product in &products {
                    let _ = writeln!(out, "{}\t{}", product.id, product.title);
                }
            }
            Command::Ask { message, context } => {
                let message = read_message(message);
                let context = read_context(context.as_deref());
                let reply = client
                    .ask(&message, &context.products, &context.quiz)
                    .await
                    .unwrap_or_else(|e| fail(format!("chat failed: {}", e)));
                let mut out = stdout.lock();
                let _ = writeln!(out, "{}", reply);
            }
        }
    });
}
