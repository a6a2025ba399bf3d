pub mod budget;
pub mod compose;
pub mod ledger;
pub mod poller;
pub mod report;
pub mod scheduler;
pub mod sources;
pub mod stats;
pub mod summarize;
pub mod tickers;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;
