//! wanderlore - content cache CLI
//!
//! Fetch cultural insights and quizzes through the tiered cache, inspect
//! the daily budget, and try out key normalization.

use std::path::Path;

use clap::{Parser, Subcommand};

use wanderlore::{
    Config, ContentCache, ContentItem, ContentPayload, ContentType, Secrets, WanderloreBuilder,
    normalize,
};

/// Wanderlore content cache CLI
#[derive(Parser)]
#[command(name = "wanderlore")]
#[command(version)]
#[command(about = "Tiered cache for AI-generated travel content")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "WANDERLORE_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Override the configured user id.
    #[arg(short, long)]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch content for one location
    Get {
        /// Raw location label, e.g. "Trastevere, Rome, Italy"
        key: String,
        /// Content type: cultural_insight or quiz
        #[arg(short = 't', long = "type", default_value = "cultural_insight")]
        content_type: ContentType,
        /// Print the item as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch content for several locations, skipping failures
    Batch {
        /// Raw location labels
        #[arg(required = true)]
        keys: Vec<String>,
        #[arg(short = 't', long = "type", default_value = "cultural_insight")]
        content_type: ContentType,
    },

    /// Show the daily generation budget
    Budget {
        /// Zero today's counter
        #[arg(long)]
        reset: bool,
    },

    /// Show how labels normalize (no network)
    Normalize {
        #[arg(required = true)]
        inputs: Vec<String>,
    },

    /// Empty the memory and local tiers
    Clear {
        /// Also delete the user's remote items
        #[arg(long)]
        remote: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Args {
        config,
        user,
        command,
    } = Args::parse();
    let config = config.as_deref();
    let user = user.as_deref();

    match command {
        Command::Normalize { inputs } => {
            for input in &inputs {
                let key = normalize(input);
                println!("{input:?} -> {} ({})", key.display(), key.as_str());
            }
        }

        Command::Get {
            key,
            content_type,
            json,
        } => {
            let cache = build_cache(config, user)?;
            let item = cache.get_content(&key, content_type).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(item.as_ref())?);
            } else {
                print_item(&item);
            }
        }

        Command::Batch { keys, content_type } => {
            let cache = build_cache(config, user)?;
            let items = cache.get_content_for_many(&keys, content_type).await;
            for item in &items {
                print_item(item);
                println!();
            }
            println!("{} of {} fetched", items.len(), keys.len());
        }

        Command::Budget { reset } => {
            let cache = build_cache(config, user)?;
            if reset {
                cache.reset_budget().await?;
                println!("budget reset");
            }
            let status = cache.budget_status().await;
            println!("can request: {}", status.can_request);
            println!("remaining: {}", status.requests_remaining);
            if let Some(next) = status.next_available_time {
                println!("next available: {}", next.to_rfc3339());
            }
        }

        Command::Clear { remote } => {
            let cache = build_cache(config, user)?;
            cache.clear_all().await?;
            if remote {
                for content_type in ContentType::ALL {
                    cache.clear_remote(content_type).await?;
                }
            }
            println!("cache cleared");
        }
    }

    Ok(())
}

fn build_cache(
    config_path: Option<&Path>,
    user: Option<&str>,
) -> Result<ContentCache, wanderlore::WanderloreError> {
    let config = Config::load_or_default(config_path)?;
    let secrets = Secrets::load()?;
    let mut builder = WanderloreBuilder::from_config(&config, &secrets)?;
    if let Some(user) = user {
        builder = builder.user_id(user);
    }
    builder.build()
}

fn print_item(item: &ContentItem) {
    match &item.payload {
        ContentPayload::CulturalInsight(insight) => {
            println!("{} ({})", item.display_name, insight.region);
            println!("customs:");
            for custom in &insight.customs {
                println!("  - {custom}");
            }
            println!("etiquette: {}", insight.etiquette);
            println!("dining: {}", insight.dining_tips);
            for (label, list) in [("restaurants", &insight.restaurants), ("bars", &insight.bars)] {
                println!("{label}:");
                for r in list {
                    println!("  - {}: {}", r.name, r.description);
                }
            }
            println!("local tips:");
            for tip in &insight.local_tips {
                println!("  - {tip}");
            }
        }
        ContentPayload::Quiz(quiz) => {
            println!("{}", quiz.title);
            println!("{}", quiz.description);
            for (i, q) in quiz.questions.iter().enumerate() {
                println!("{}. {}", i + 1, q.question);
                for (j, option) in q.options.iter().enumerate() {
                    let marker = if j == usize::from(q.correct_answer_index) { "*" } else { " " };
                    println!("   {marker} {option}");
                }
            }
        }
    }
}
