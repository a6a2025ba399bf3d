//! The poll loop: search the mailbox, process new alerts, sleep, repeat.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use wirebrief_common::{resolve_best_date, Config};

use crate::budget::TimeBudget;
use crate::compose::{compose, with_date_marker};
use crate::ledger::{unit_key, ProcessedLedger};
use crate::report::report_filename;
use crate::scheduler::PollSchedule;
use crate::stats::CycleStats;
use crate::tickers::extract_tickers;
use crate::traits::{ArticleReader, Mailbox, ReportSink, Summarizer};

/// Budgets applied to single-shot runs when none are configured.
const DEFAULT_ONCE_OVERALL_SECS: u64 = 180;
const DEFAULT_ONCE_PER_MESSAGE_SECS: u64 = 60;

/// Drives the mail-to-brief pipeline against the collaborator traits.
///
/// Processing is unit-at-a-time: a unit is one (message, ticker) pair, and
/// the ledger is persisted after every finished unit, so a crash at any
/// point repeats at most the unit in flight.
pub struct Poller {
    mailbox: Arc<dyn Mailbox>,
    articles: Arc<dyn ArticleReader>,
    summarizer: Arc<dyn Summarizer>,
    reports: Arc<dyn ReportSink>,
    ledger: ProcessedLedger,
    schedule: PollSchedule,
    config: Config,
}

impl Poller {
    pub fn new(
        mailbox: Arc<dyn Mailbox>,
        articles: Arc<dyn ArticleReader>,
        summarizer: Arc<dyn Summarizer>,
        reports: Arc<dyn ReportSink>,
        ledger: ProcessedLedger,
        config: Config,
    ) -> Self {
        let schedule = PollSchedule::new(config.poll_interval_secs, config.idle_backoff_max_secs);
        Self {
            mailbox,
            articles,
            summarizer,
            reports,
            ledger,
            schedule,
            config,
        }
    }

    /// Poll until interrupted. Ctrl-C is honored at the sleep between
    /// cycles; the ledger is persisted once more on the way out.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            query = %self.config.search_query,
            batch = self.config.poll_batch,
            "Starting poll loop"
        );

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            let stats = self.run_cycle().await;
            info!("{stats}");

            let delay = if stats.ids_found == 0 {
                self.schedule.idle_sleep()
            } else {
                self.schedule.active_sleep()
            };

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Interrupt received; shutting down");
                    break;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.ledger.persist()?;
        info!(processed = self.ledger.len(), "Shutdown complete");
        Ok(())
    }

    /// Run one poll cycle with the configured budgets. Budgets left unset
    /// mean an unbounded cycle.
    pub async fn run_cycle(&mut self) -> CycleStats {
        let overall = TimeBudget::from_secs(self.config.overall_budget_secs);
        self.cycle(&overall, self.config.per_message_budget_secs)
            .await
    }

    /// Run a single bounded cycle and persist the ledger. Unset budgets
    /// default to 180s overall and 60s per message.
    pub async fn run_once(&mut self) -> Result<CycleStats> {
        let overall = TimeBudget::from_secs(Some(
            self.config
                .overall_budget_secs
                .unwrap_or(DEFAULT_ONCE_OVERALL_SECS),
        ));
        let per_message = Some(
            self.config
                .per_message_budget_secs
                .unwrap_or(DEFAULT_ONCE_PER_MESSAGE_SECS),
        );
        let stats = self.cycle(&overall, per_message).await;
        self.ledger.persist()?;
        Ok(stats)
    }

    pub fn ledger(&self) -> &ProcessedLedger {
        &self.ledger
    }

    async fn cycle(&mut self, overall: &TimeBudget, per_message_secs: Option<u64>) -> CycleStats {
        let mut stats = CycleStats::default();

        let ids = match self
            .mailbox
            .search(&self.config.search_query, self.config.poll_batch)
            .await
        {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, "Mailbox search failed; idling this cycle");
                return stats;
            }
        };
        stats.ids_found = ids.len();
        if ids.is_empty() {
            return stats;
        }

        // Mail showed up, so idle backoff starts over even if every unit
        // below fails.
        self.schedule.reset();

        for id in &ids {
            if overall.check("overall") {
                break;
            }
            self.process_message(id, per_message_secs, &mut stats).await;
        }

        stats
    }

    async fn process_message(
        &mut self,
        id: &str,
        per_message_secs: Option<u64>,
        stats: &mut CycleStats,
    ) {
        let budget = TimeBudget::from_secs(per_message_secs);

        let mail = match self.mailbox.fetch(id).await {
            Ok(mail) => mail,
            Err(e) => {
                warn!(message = %id, error = %e, "Failed to fetch message");
                stats.messages_failed += 1;
                return;
            }
        };

        // A subject with no recognizable ticker stays unmarked and will be
        // seen again next cycle.
        let tickers = extract_tickers(&mail.subject, &self.config.allowed_tickers);
        if tickers.is_empty() {
            info!(message = %id, subject = %mail.subject, "No tickers in subject; skipping");
            stats.messages_skipped_no_ticker += 1;
            return;
        }

        let total = tickers.len();
        let pending: Vec<String> = tickers
            .into_iter()
            .filter(|t| !self.ledger.is_processed(&unit_key(id, t)))
            .collect();
        stats.units_skipped_processed += total - pending.len();
        if pending.is_empty() {
            return;
        }

        // One composition and one date resolution per message; every pending
        // ticker summarizes the same input.
        let composed = compose(
            &mail,
            self.articles.as_ref(),
            self.config.min_body_len,
            &budget,
        )
        .await;
        let (display, source) = resolve_best_date(
            composed.article_display.as_deref(),
            mail.header_date,
            mail.internal_ms,
        );
        let summary_input = with_date_marker(&composed.text, &display, source);

        let mut any_done = false;
        for ticker in &pending {
            if budget.check("per-message") {
                break;
            }
            let key = unit_key(id, ticker);
            match self.process_unit(&key, &summary_input).await {
                Ok(path) => {
                    info!(unit = %key, path = %path.display(), "Brief written");
                    stats.units_written += 1;
                    any_done = true;
                }
                Err(e) => {
                    warn!(unit = %key, error = %e, "Unit failed; will retry next cycle");
                    stats.units_failed += 1;
                }
            }
        }
        stats.messages_processed += 1;

        if any_done {
            if let Some(label) = &self.config.processed_label {
                if let Err(e) = self.mailbox.label(id, label).await {
                    warn!(message = %id, label = %label, error = %e, "Failed to label message");
                }
            }
        }
    }

    /// Summarize, write, and record one unit. The ledger entry is only
    /// made after the brief is on disk, and persisted before returning.
    async fn process_unit(&mut self, key: &str, summary_input: &str) -> Result<PathBuf> {
        let summary = self.summarizer.summarize(summary_input).await?;
        let filename = report_filename(key);
        let path = self.reports.write(&filename, &summary).await?;
        self.ledger.mark_processed(key);
        self.ledger.persist()?;
        Ok(path)
    }
}
