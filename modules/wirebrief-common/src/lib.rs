pub mod config;
pub mod datetime;
pub mod error;
pub mod text;

pub use config::Config;
pub use datetime::{kst_display, parse_flexible, resolve_best_date, scan_datetime, DateSource};
pub use error::WirebriefError;
pub use text::strip_invisibles;
