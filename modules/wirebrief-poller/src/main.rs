use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mailbox_client::MailboxClient;
use wirebrief_archive::ArticleFetcher;
use wirebrief_common::Config;
use wirebrief_poller::ledger::ProcessedLedger;
use wirebrief_poller::poller::Poller;
use wirebrief_poller::report::MarkdownWriter;
use wirebrief_poller::summarize::NewsSummarizer;
use wirebrief_poller::traits::ARTICLE_TIMEOUT;

#[derive(Parser)]
#[command(
    name = "wirebrief-poller",
    about = "Watches a mailbox for stock alerts and writes markdown briefs"
)]
struct Args {
    /// Run one bounded cycle and exit instead of polling continuously.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("wirebrief_poller=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env();
    config.log_redacted();

    let mailbox = MailboxClient::new(
        &config.mailbox_base_url,
        &config.mailbox_token,
        Duration::from_secs(config.network_timeout_secs),
    );
    let articles = ArticleFetcher::new(ARTICLE_TIMEOUT);
    let summarizer = NewsSummarizer::new(
        &config.openai_api_key,
        &config.openai_model,
        config.openai_base_url.as_deref(),
    );
    let reports = MarkdownWriter::new(config.output_dir.clone());

    let ledger = ProcessedLedger::load(config.state_file.clone());
    info!(processed = ledger.len(), "Ledger loaded");

    let mut poller = Poller::new(
        Arc::new(mailbox),
        Arc::new(articles),
        Arc::new(summarizer),
        Arc::new(reports),
        ledger,
        config,
    );

    if args.once {
        let stats = poller.run_once().await?;
        info!("{stats}");
    } else {
        poller.run().await?;
    }

    Ok(())
}
