pub mod crawl;
pub mod data;
pub mod error;
pub mod model;
pub mod paths;
pub mod rank;
pub mod report;
pub mod service;
pub mod store;

pub use crawl::{CrawlPolicy, CrawlProgressCallback, CrawlScheduler, TitleFilter, Worklist, is_year_title};
pub use data::Database;
pub use error::{GraphError, Result};
pub use model::{Link, Page, PageId, PageRef};
pub use paths::{LinkGraph, PathFinder, PathOutcome, PathReport, PathStep};
pub use rank::{PageRankConfig, PageRankRun, pagerank, pagerank_run};
pub use service::{GraphService, GraphView, PageRankSummary, RankedPage, TitleEdge, summarize_pagerank};
pub use store::GraphStore;
