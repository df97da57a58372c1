pub mod crawl_logs;
