//! Client code for docshelf.
//!
//! This crate provides the resilient HTTP fetch pipeline, record extraction
//! from documentation pages, and the [`DocsService`] composition root shared
//! by the MCP server.

pub mod extract;
pub mod fetch;
pub mod service;

pub use extract::{ExtractedPage, SectionLink, build_record, extract_section_links, record_id_for};
pub use fetch::{
    CachePolicy, FetchConfig, FetchOutcome, FetchResponse, FetchSource, HttpTransport, RateLimiter, ResilientFetcher,
    Transport,
};
pub use service::{ContentDocument, ContentSource, DocsService};
pub use tokio_util::sync::CancellationToken;

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted [`Transport`] for exercising retries and degradation offline.

    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;
    use reqwest::Url;
    use tokio::time::Instant;

    use crate::fetch::{FetchResponse, Transport};
    use docshelf_core::Error;

    #[derive(Debug, Clone)]
    pub enum Step {
        Html(String),
        Status(u16),
        Refused,
        /// Never answers; the fetcher's timeout has to fire.
        Hang,
    }

    #[derive(Default)]
    pub struct ScriptedTransport {
        routes: Mutex<HashMap<String, VecDeque<Step>>>,
        fallback: Option<Step>,
        calls: Mutex<Vec<(String, Instant)>>,
    }

    impl ScriptedTransport {
        /// Every unrouted call yields `step`.
        pub fn always(step: Step) -> Self {
            Self { fallback: Some(step), ..Self::default() }
        }

        /// Queue `steps` for `url`; once drained, the fallback step applies.
        pub fn route(self, url: &str, steps: impl IntoIterator<Item = Step>) -> Self {
            self.routes.lock().unwrap().entry(url.to_string()).or_default().extend(steps);
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn call_times(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().iter().map(|(_, at)| *at).collect()
        }

        fn next_step(&self, url: &str) -> Option<Step> {
            let mut routes = self.routes.lock().unwrap();
            routes
                .get_mut(url)
                .and_then(VecDeque::pop_front)
                .or_else(|| self.fallback.clone())
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get(&self, url: &Url) -> Result<FetchResponse, Error> {
            self.calls.lock().unwrap().push((url.to_string(), Instant::now()));
            match self.next_step(url.as_str()) {
                Some(Step::Html(body)) => Ok(FetchResponse {
                    url: url.clone(),
                    final_url: url.clone(),
                    bytes: Bytes::from(body),
                }),
                Some(Step::Status(code)) => Err(Error::HttpError(format!("status {code} for {url}"))),
                Some(Step::Hang) => std::future::pending().await,
                Some(Step::Refused) | None => Err(Error::Network(format!("connection refused: {url}"))),
            }
        }
    }
}
