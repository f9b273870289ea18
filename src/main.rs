use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use rag_chat::app::App;
use rag_chat::config::{Config, ENDPOINT_ENV};
use rag_chat::logging::{self, LogTarget};
use rag_chat::{handler, tui, ui};
use rag_chat::{ChatClient, Conversation, Role, SubmitOutcome};

#[derive(Parser)]
#[command(name = "rag-chat")]
#[command(about = "Chat with a retrieval-augmented backend from the terminal")]
struct Cli {
    /// Chat endpoint URL (overrides config file)
    #[arg(short, long, env = ENDPOINT_ENV)]
    endpoint: Option<String>,

    /// Request timeout in seconds (overrides config file)
    #[arg(short, long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message and print the answer
    Ask {
        /// Your message
        message: String,
    },
    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?.with_env_overrides();
    if let Some(endpoint) = cli.endpoint {
        config.endpoint_url = endpoint;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }

    match cli.command {
        None => {
            logging::init_tracing(LogTarget::File)?;
            run_tui(&config).await
        }
        Some(Commands::Ask { message }) => {
            logging::init_tracing(LogTarget::Stderr)?;
            ask(&config, message).await
        }
        Some(Commands::Config { save }) => show_config(&config, save),
    }
}

async fn run_tui(config: &Config) -> Result<()> {
    let client = ChatClient::from_config(config)?;
    info!(endpoint = %client.endpoint(), "starting chat session");
    let mut app = App::new(Conversation::new(Arc::new(client)), &config.endpoint_url);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new(Duration::from_millis(150));

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event).await,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}

async fn ask(config: &Config, message: String) -> Result<()> {
    let client = ChatClient::from_config(config)?;
    let mut conversation = Conversation::new(Arc::new(client));
    conversation.set_draft(message);

    if conversation.submit() == SubmitOutcome::Empty {
        anyhow::bail!("Message is empty");
    }
    conversation.wait_for_response().await;

    match conversation.transcript().last() {
        Some(reply) if reply.role() == Role::Error => anyhow::bail!("{}", reply.text()),
        Some(reply) => println!("{}", reply.text()),
        None => {}
    }
    Ok(())
}

fn show_config(config: &Config, save: bool) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    if save {
        let path = config.save()?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}
