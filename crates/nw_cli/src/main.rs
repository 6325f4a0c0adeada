use anyhow::{bail, Context};
use clap::Parser;
use nw_core::logging::init_logging;
use nw_core::{format_article, Config};
use nw_web::AppState;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Search news and publish it to a Telegram channel", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: String,
    },
    /// Search a topic and print the results
    Search {
        topic: String,
        /// Maximum number of articles (default 8, at most 50)
        #[arg(long)]
        limit: Option<usize>,
        /// Publish the result at this position (1-based) to the channel
        #[arg(long)]
        publish: Option<usize>,
    },
    /// Post a pre-rendered HTML message to the channel
    Post { message: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = Config::from_env().context("Invalid configuration")?;
    let state = AppState::from_config(&config)?;

    match cli.command {
        Commands::Serve { addr } => {
            info!("🚀 Starting newswire API on {}", addr);
            nw_web::serve(&addr, state).await?;
        }
        Commands::Search {
            topic,
            limit,
            publish,
        } => {
            let articles = state.pipeline.search(&topic, limit).await?;
            if articles.is_empty() {
                println!("No articles found for '{}'", topic.trim());
            }
            for (i, article) in articles.iter().enumerate() {
                println!("{:>2}. {}", i + 1, article.title);
                println!("    {}", article.link);
            }

            if let Some(position) = publish {
                let Some(article) = position.checked_sub(1).and_then(|i| articles.get(i)) else {
                    bail!("No article at position {}", position);
                };
                state.pipeline.publish(article).await?;
                println!("Published:\n{}", format_article(article));
            }
        }
        Commands::Post { message } => {
            state.pipeline.publish_message(&message).await?;
            println!("Published");
        }
    }

    Ok(())
}
