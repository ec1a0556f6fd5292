pub mod stats;

pub use stats::{flatten_groups, GroupStat, NewsItem, ProcessedGroups, TitleEntry, UNCATEGORIZED};
