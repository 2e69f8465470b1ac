pub mod client;
pub mod error;
pub mod links;
pub mod resolver;
pub mod result;
pub mod source;

pub use client::{ClientConfig, MediaWikiClient};
pub use error::ScanError;
pub use resolver::TitleResolver;
pub use result::{FetchedPage, PageId, PageRef, PageStub, RawLink, ResolvedTitle, TitleMapping, TitleQuery};
pub use source::WikiSource;
