//! Command-line interface parsing and startup wiring.

use std::error::Error;
use std::sync::Arc;

use clap::Parser;

use crate::api::{HttpReplyProvider, ReplyProvider, StaticReplyProvider};
use crate::core::config::Config;
use crate::core::constants::DEFAULT_REPLY_FILE;
use crate::ui::chat_loop::run_chat;
use crate::utils::logging;

#[derive(Parser)]
#[command(name = "causerie")]
#[command(about = "A terminal chat interface with a stubbed reply backend")]
#[command(
    long_about = "Causerie is a full-screen terminal chat interface whose backend is a stub: \
sending a message fetches a fixed markdown payload (a local file or an HTTP resource) \
and renders it as the assistant's reply, with markdown formatting and syntax-highlighted \
code blocks.\n\n\
Controls:\n\
  Type              Enter your message in the input field\n\
  Enter             Send the message\n\
  Shift+Enter       Insert a newline in the draft (Alt+Enter also works)\n\
  Up/Down/Mouse     Scroll through the transcript\n\
  Ctrl+C            Quit"
)]
pub struct Args {
    /// Local markdown file to serve as the canned reply
    #[arg(short = 'f', long, value_name = "PATH")]
    pub reply_file: Option<String>,

    /// HTTP resource to serve as the canned reply (takes precedence)
    #[arg(short = 'u', long, value_name = "URL")]
    pub reply_url: Option<String>,

    /// UI theme ("dark" or "light")
    #[arg(short = 't', long, value_name = "NAME")]
    pub theme: Option<String>,

    /// Append a plain-text transcript of the conversation to this file
    #[arg(short = 'l', long, value_name = "PATH")]
    pub log: Option<String>,

    /// Write tracing diagnostics to this file
    #[arg(long, value_name = "PATH")]
    pub debug_log: Option<String>,
}

pub async fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let mut config = Config::load()?;
    apply_overrides(&mut config, &args);

    logging::init_tracing(config.debug_log_file.as_deref())?;

    let provider = build_provider(&config);
    tracing::info!(provider = %provider.describe(), "starting chat session");
    run_chat(config, provider).await
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if args.reply_file.is_some() {
        config.reply_file = args.reply_file.clone();
        // A file given on the command line beats a configured URL.
        config.reply_url = None;
    }
    if args.reply_url.is_some() {
        config.reply_url = args.reply_url.clone();
    }
    if args.theme.is_some() {
        config.theme = args.theme.clone();
    }
    if args.log.is_some() {
        config.transcript_file = args.log.clone();
    }
    if args.debug_log.is_some() {
        config.debug_log_file = args.debug_log.clone();
    }
}

fn build_provider(config: &Config) -> Arc<dyn ReplyProvider> {
    if let Some(url) = &config.reply_url {
        Arc::new(HttpReplyProvider::new(url.clone()))
    } else {
        let path = config
            .reply_file
            .clone()
            .unwrap_or_else(|| DEFAULT_REPLY_FILE.to_string());
        Arc::new(StaticReplyProvider::new(path))
    }
}
