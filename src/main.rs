//! retail-assistant - chat with the back-office command interpreter.
//!
//! Wires the PostgreSQL repositories and the Gemini provider, then either
//! applies migrations or runs an interactive chat on stdin for one topic.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use secrecy::ExposeSecret;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use retail_assistant::adapters::ai::{GeminiConfig, GeminiProvider};
use retail_assistant::adapters::postgres::{
    self, PostgresConversationRepository, PostgresProductRepository,
};
use retail_assistant::application::{
    FallbackSettings, ProcessMessageCommand, ProcessMessageHandler,
};
use retail_assistant::config::AppConfig;
use retail_assistant::domain::conversation::ChatTopic;
use retail_assistant::domain::foundation::{TopicId, UserId};
use retail_assistant::ports::ConversationRepository;
use retail_assistant::telemetry;

/// Conversational command interpreter for the retail back office.
#[derive(Parser, Debug)]
#[command(name = "retail-assistant", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply database migrations and exit.
    Migrate,
    /// Chat on stdin; one line per message, an empty line or EOF ends it.
    Chat {
        /// User the messages are sent as.
        #[arg(long)]
        user: String,
        /// Continue an existing topic instead of starting a new one.
        #[arg(long)]
        topic: Option<TopicId>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("retail-assistant: {err}");
            std::process::exit(1);
        }
    };

    telemetry::init(&config.logging);

    if let Err(err) = run(cli, config).await {
        tracing::error!(error = %err, "retail-assistant failed");
        eprintln!("retail-assistant: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.database.validate()?;
    let pool = postgres::connect(&config.database).await?;

    match cli.command {
        Commands::Migrate => {
            postgres::run_migrations(&pool).await?;
            tracing::info!("Migrations applied");
            Ok(())
        }
        Commands::Chat { user, topic } => {
            config.validate()?;
            if config.database.run_migrations {
                postgres::run_migrations(&pool).await?;
            }

            let api_key = config
                .ai
                .gemini_api_key
                .as_ref()
                .map(|k| k.expose_secret().clone())
                .unwrap_or_default();
            let provider = GeminiProvider::new(
                GeminiConfig::new(api_key)
                    .with_model(&config.ai.model)
                    .with_base_url(&config.ai.base_url)
                    .with_timeout(config.ai.timeout()),
            )?;

            let conversations = Arc::new(PostgresConversationRepository::new(pool.clone()));
            let products = Arc::new(PostgresProductRepository::new(pool));
            let handler = ProcessMessageHandler::new(
                conversations.clone(),
                products,
                Arc::new(provider),
            )
            .with_assistant_config(config.assistant.clone())
            .with_fallback_settings(FallbackSettings::from_config(&config.ai));

            let user_id = UserId::new(user)?;
            let topic_id = match topic {
                Some(id) => id,
                None => {
                    let topic = ChatTopic::new(user_id.clone());
                    conversations.create_topic(&topic).await?;
                    *topic.id()
                }
            };

            chat_loop(&handler, user_id, topic_id).await
        }
    }
}

async fn chat_loop(
    handler: &ProcessMessageHandler,
    user_id: UserId,
    topic_id: TopicId,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(format!("topic {topic_id}\n").as_bytes())
        .await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            break;
        }

        let cmd = ProcessMessageCommand::new(user_id.clone(), topic_id, line);
        match handler.handle(cmd).await {
            Ok(result) => {
                stdout
                    .write_all(format!("{}\n\n", result.reply).as_bytes())
                    .await?;
            }
            Err(err) => {
                stdout.write_all(format!("! {err}\n\n").as_bytes()).await?;
            }
        }
    }

    Ok(())
}
