//! End-to-end poller scenarios over mock collaborators.
//!
//! Every scenario runs fully offline: no mailbox account, no API keys,
//! no network. State files live in a tempdir per test.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use wirebrief_archive::FetchedArticle;
use wirebrief_common::Config;
use wirebrief_poller::ledger::ProcessedLedger;
use wirebrief_poller::poller::Poller;
use wirebrief_poller::testing::{
    make_mail, test_config, MemoryReportSink, MockArticleReader, MockMailbox, MockSummarizer,
};

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    mailbox: Arc<MockMailbox>,
    articles: Arc<MockArticleReader>,
    summarizer: Arc<MockSummarizer>,
    reports: Arc<MemoryReportSink>,
    poller: Poller,
    dir: TempDir,
}

fn harness(
    mailbox: MockMailbox,
    articles: MockArticleReader,
    summarizer: MockSummarizer,
) -> Harness {
    harness_with(mailbox, articles, summarizer, MemoryReportSink::new(), |c| c)
}

/// Build a poller over the given mocks. `tweak` may adjust the config and
/// may seed the state file before the ledger loads it.
fn harness_with(
    mailbox: MockMailbox,
    articles: MockArticleReader,
    summarizer: MockSummarizer,
    reports: MemoryReportSink,
    tweak: impl FnOnce(Config) -> Config,
) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let config = tweak(test_config(
        &dir.path().join("state.json"),
        &dir.path().join("out"),
    ));
    let ledger = ProcessedLedger::load(config.state_file.clone());

    let mailbox = Arc::new(mailbox);
    let articles = Arc::new(articles);
    let summarizer = Arc::new(summarizer);
    let reports = Arc::new(reports);

    let poller = Poller::new(
        mailbox.clone(),
        articles.clone(),
        summarizer.clone(),
        reports.clone(),
        ledger,
        config,
    );

    Harness {
        mailbox,
        articles,
        summarizer,
        reports,
        poller,
        dir,
    }
}

fn article(url: &str, published_display: &str) -> FetchedArticle {
    FetchedArticle {
        url: url.to_string(),
        title: "Tesla Q3 deliveries miss estimates".to_string(),
        markdown: "Tesla delivered 435,000 vehicles in Q3, missing the 455,000 consensus."
            .to_string(),
        published_display: Some(published_display.to_string()),
    }
}

fn long_body() -> String {
    "Nvidia and Palantir both moved sharply after the joint contract announcement. ".repeat(3)
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_tsla_alert_end_to_end() {
    let mut mail = make_mail(
        "m1",
        "TSLA — Q3 delivery miss",
        "Tesla reported Q3 deliveries below consensus today.",
    );
    mail.urls = vec!["https://seekingalpha.com/news/tsla-q3".to_string()];

    let mut h = harness(
        MockMailbox::new()
            .on_search("label:breaking", &["m1"])
            .on_message(mail),
        MockArticleReader::new().on_article(article(
            "https://seekingalpha.com/news/tsla-q3",
            "2025.11.04. 05:22",
        )),
        MockSummarizer::new().with_output("# TSLA — Q3 delivery miss\n\nBrief body."),
    );

    let stats = h.poller.run_cycle().await;

    assert_eq!(stats.ids_found, 1);
    assert_eq!(stats.units_written, 1, "one brief for the one ticker");
    assert_eq!(h.reports.write_count(), 1);
    assert!(
        h.reports.has_report_containing("m1#TSLA"),
        "brief filename should embed the unit key"
    );
    assert!(h.poller.ledger().is_processed("m1#TSLA"));

    // The thin body forced article enrichment, and the article's own
    // publication date won the marker.
    let inputs = h.summarizer.inputs();
    assert_eq!(inputs.len(), 1);
    assert!(
        inputs[0].starts_with("[DETECTED_DATE_KST:2025.11.04. 05:22|SOURCE:article]\n"),
        "summary input should lead with the detected-date marker, got: {}",
        inputs[0].lines().next().unwrap_or("")
    );
    assert!(inputs[0].contains("[linked article] https://seekingalpha.com/news/tsla-q3"));
    assert!(inputs[0].contains("435,000 vehicles"));
    assert_eq!(
        h.articles.fetched_urls(),
        vec!["https://seekingalpha.com/news/tsla-q3".to_string()]
    );
}

#[tokio::test]
async fn test_multi_ticker_mail_yields_one_brief_per_ticker() {
    let mail = make_mail("m1", "NVDA, PLTR: Both move on AI deal", &long_body());

    let mut h = harness(
        MockMailbox::new()
            .on_search("label:breaking", &["m1"])
            .on_message(mail),
        MockArticleReader::new(),
        MockSummarizer::new(),
    );

    let stats = h.poller.run_cycle().await;

    assert_eq!(stats.units_written, 2);
    let written = h.reports.written();
    assert!(written[0].0.contains("m1#NVDA"));
    assert!(written[1].0.contains("m1#PLTR"));
    assert!(h.poller.ledger().is_processed("m1#NVDA"));
    assert!(h.poller.ledger().is_processed("m1#PLTR"));

    // One composition per message: both tickers summarize identical input.
    let inputs = h.summarizer.inputs();
    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs[0], inputs[1]);
    assert!(
        h.articles.fetched_urls().is_empty(),
        "long body should not trigger article fetches"
    );
}

// ---------------------------------------------------------------------------
// Idempotency and retries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_second_identical_cycle_writes_nothing() {
    let mail = make_mail("m1", "TSLA: Deliveries update", &long_body());

    let mut h = harness(
        MockMailbox::new()
            .on_search("label:breaking", &["m1"])
            .on_message(mail),
        MockArticleReader::new(),
        MockSummarizer::new(),
    );

    let first = h.poller.run_cycle().await;
    assert_eq!(first.units_written, 1);

    let second = h.poller.run_cycle().await;
    assert_eq!(second.units_written, 0, "already-processed unit must not rerun");
    assert_eq!(second.units_skipped_processed, 1);
    assert_eq!(h.reports.write_count(), 1);
    assert_eq!(h.summarizer.call_count(), 1);
}

#[tokio::test]
async fn test_failed_units_stay_unmarked_and_retry() {
    let mail = make_mail("m1", "NVDA, PLTR: Both move", &long_body());

    let mut h = harness(
        MockMailbox::new()
            .on_search("label:breaking", &["m1"])
            .on_message(mail),
        MockArticleReader::new(),
        MockSummarizer::new().failing(),
    );

    let first = h.poller.run_cycle().await;
    assert_eq!(first.units_failed, 2);
    assert_eq!(first.units_written, 0);
    assert!(!h.poller.ledger().is_processed("m1#NVDA"));
    assert!(!h.poller.ledger().is_processed("m1#PLTR"));

    let second = h.poller.run_cycle().await;
    assert_eq!(second.units_failed, 2);
    assert_eq!(
        h.summarizer.call_count(),
        4,
        "failed units should be attempted again on the next cycle"
    );
}

#[tokio::test]
async fn test_failed_write_leaves_unit_unmarked() {
    let mail = make_mail("m1", "TSLA: Deliveries update", &long_body());

    let mut h = harness_with(
        MockMailbox::new()
            .on_search("label:breaking", &["m1"])
            .on_message(mail),
        MockArticleReader::new(),
        MockSummarizer::new(),
        MemoryReportSink::new().failing(),
        |c| c,
    );

    let stats = h.poller.run_cycle().await;

    assert_eq!(stats.units_failed, 1);
    assert_eq!(h.summarizer.call_count(), 1, "summarization ran before the write failed");
    assert!(
        !h.poller.ledger().is_processed("m1#TSLA"),
        "a unit whose brief never landed must not be marked done"
    );
}

#[tokio::test]
async fn test_no_ticker_subject_skipped_and_seen_again() {
    let mail = make_mail("m1", "Market wrap for today", &long_body());

    let mut h = harness(
        MockMailbox::new()
            .on_search("label:breaking", &["m1"])
            .on_message(mail),
        MockArticleReader::new(),
        MockSummarizer::new(),
    );

    let first = h.poller.run_cycle().await;
    assert_eq!(first.messages_skipped_no_ticker, 1);
    assert_eq!(first.messages_processed, 0);

    let second = h.poller.run_cycle().await;
    assert_eq!(
        second.messages_skipped_no_ticker, 1,
        "a tickerless message is never marked and shows up every cycle"
    );
    assert_eq!(h.summarizer.call_count(), 0);
}

// ---------------------------------------------------------------------------
// Filtering and state migration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_allow_list_restricts_tickers() {
    let mail = make_mail("m1", "NVDA, PLTR: Both move", &long_body());

    let mut h = harness_with(
        MockMailbox::new()
            .on_search("label:breaking", &["m1"])
            .on_message(mail),
        MockArticleReader::new(),
        MockSummarizer::new(),
        MemoryReportSink::new(),
        |mut c| {
            c.allowed_tickers = ["NVDA".to_string()].into_iter().collect();
            c
        },
    );

    let stats = h.poller.run_cycle().await;

    assert_eq!(stats.units_written, 1);
    assert!(h.poller.ledger().is_processed("m1#NVDA"));
    assert!(!h.poller.ledger().is_processed("m1#PLTR"));
}

#[tokio::test]
async fn test_legacy_state_covers_every_ticker_of_a_message() {
    let mail = make_mail("m1", "TSLA — Q3 delivery miss", &long_body());

    let mut h = harness_with(
        MockMailbox::new()
            .on_search("label:breaking", &["m1"])
            .on_message(mail),
        MockArticleReader::new(),
        MockSummarizer::new(),
        MemoryReportSink::new(),
        |config| {
            std::fs::write(&config.state_file, r#"{"processed_ids": ["m1"]}"#).unwrap();
            config
        },
    );

    let stats = h.poller.run_cycle().await;

    assert_eq!(stats.units_written, 0, "migrated message must not be reprocessed");
    assert_eq!(stats.units_skipped_processed, 1);
    assert_eq!(h.summarizer.call_count(), 0);
}

#[tokio::test]
async fn test_run_once_persists_ledger_to_disk() {
    let mail = make_mail("m1", "TSLA: Deliveries update", &long_body());

    let mut h = harness(
        MockMailbox::new()
            .on_search("label:breaking", &["m1"])
            .on_message(mail),
        MockArticleReader::new(),
        MockSummarizer::new(),
    );

    let stats = h.poller.run_once().await.unwrap();
    assert_eq!(stats.units_written, 1);

    let state_path = h.dir.path().join("state.json");
    let raw = std::fs::read_to_string(&state_path).unwrap();
    assert!(raw.contains("m1#TSLA"), "state file should record the unit: {raw}");
}

// ---------------------------------------------------------------------------
// Date resolution fallbacks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_header_date_wins_when_no_article_date() {
    let mut mail = make_mail("m1", "TSLA: Deliveries update", &long_body());
    mail.header_date = Some(Utc.with_ymd_and_hms(2025, 11, 3, 20, 22, 0).unwrap());

    let mut h = harness(
        MockMailbox::new()
            .on_search("label:breaking", &["m1"])
            .on_message(mail),
        MockArticleReader::new(),
        MockSummarizer::new(),
    );

    h.poller.run_cycle().await;

    let inputs = h.summarizer.inputs();
    assert!(
        inputs[0].starts_with("[DETECTED_DATE_KST:2025.11.04. 05:22|SOURCE:email]\n"),
        "header date should render in KST, got: {}",
        inputs[0].lines().next().unwrap_or("")
    );
}

#[tokio::test]
async fn test_dateless_mail_gets_undetermined_marker() {
    let mail = make_mail("m1", "TSLA: Deliveries update", &long_body());

    let mut h = harness(
        MockMailbox::new()
            .on_search("label:breaking", &["m1"])
            .on_message(mail),
        MockArticleReader::new(),
        MockSummarizer::new(),
    );

    h.poller.run_cycle().await;

    let inputs = h.summarizer.inputs();
    assert!(inputs[0].starts_with("[DETECTED_DATE_KST:undetermined|SOURCE:unknown]\n"));
}

// ---------------------------------------------------------------------------
// Failure modes, budgets, labels
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_search_failure_idles_the_cycle() {
    let mut h = harness(
        MockMailbox::new().failing_search(),
        MockArticleReader::new(),
        MockSummarizer::new(),
    );

    let stats = h.poller.run_cycle().await;

    assert_eq!(stats.ids_found, 0);
    assert_eq!(stats.messages_processed, 0);
    assert_eq!(h.reports.write_count(), 0);
}

#[tokio::test]
async fn test_exhausted_overall_budget_stops_before_messages() {
    let mail = make_mail("m1", "TSLA: Deliveries update", &long_body());

    let mut h = harness_with(
        MockMailbox::new()
            .on_search("label:breaking", &["m1"])
            .on_message(mail),
        MockArticleReader::new(),
        MockSummarizer::new(),
        MemoryReportSink::new(),
        |mut c| {
            c.overall_budget_secs = Some(0);
            c
        },
    );

    let stats = h.poller.run_cycle().await;

    assert_eq!(stats.ids_found, 1, "search itself still runs");
    assert_eq!(stats.messages_processed, 0);
    assert_eq!(h.reports.write_count(), 0);
}

#[tokio::test]
async fn test_processed_label_applied_after_success() {
    let mail = make_mail("m1", "TSLA: Deliveries update", &long_body());

    let mut h = harness_with(
        MockMailbox::new()
            .on_search("label:breaking", &["m1"])
            .on_message(mail),
        MockArticleReader::new(),
        MockSummarizer::new(),
        MemoryReportSink::new(),
        |mut c| {
            c.processed_label = Some("brief-done".to_string());
            c
        },
    );

    h.poller.run_cycle().await;

    assert_eq!(
        h.mailbox.labels_added(),
        vec![("m1".to_string(), "brief-done".to_string())]
    );
}

#[tokio::test]
async fn test_label_failure_does_not_unmark_units() {
    let mail = make_mail("m1", "TSLA: Deliveries update", &long_body());

    let mut h = harness_with(
        MockMailbox::new()
            .on_search("label:breaking", &["m1"])
            .on_message(mail)
            .failing_labels(),
        MockArticleReader::new(),
        MockSummarizer::new(),
        MemoryReportSink::new(),
        |mut c| {
            c.processed_label = Some("brief-done".to_string());
            c
        },
    );

    let stats = h.poller.run_cycle().await;

    assert_eq!(stats.units_written, 1);
    assert!(
        h.poller.ledger().is_processed("m1#TSLA"),
        "labeling is best-effort and must not undo the unit"
    );
}

#[tokio::test]
async fn test_failed_fetch_counts_and_spares_other_messages() {
    let good = make_mail("m2", "NVDA: Chip news", &long_body());

    let mut h = harness(
        MockMailbox::new()
            .on_search("label:breaking", &["m1", "m2"])
            .on_message(good),
        MockArticleReader::new(),
        MockSummarizer::new(),
    );

    let stats = h.poller.run_cycle().await;

    assert_eq!(stats.messages_failed, 1, "m1 has no registered message and fails to fetch");
    assert_eq!(stats.units_written, 1, "m2 still processes");
    assert!(h.poller.ledger().is_processed("m2#NVDA"));
}
