pub mod backend;
pub mod feed_rss;
