pub mod error;
pub mod fetcher;

mod dates;
mod readability;

pub use error::{ArchiveError, Result};
pub use fetcher::{ArticleFetcher, FetchedArticle};
