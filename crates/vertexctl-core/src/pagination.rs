//! Lazy page iteration for list and search calls
//!
//! A [`Pager`] holds the continuation token between pages. Nothing is fetched
//! until the caller asks for the next page or item, each page costs exactly
//! one request, and enumeration ends once the server stops returning a token.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut pager = IndexHandler::new(client).list_indexes(&ListIndexesParams::new(parent))?;
//! while let Some(index) = pager.next().await? {
//!     println!("{}", index.name);
//! }
//! ```

use crate::client::{AiPlatformClient, ApiVersion};
use crate::error::Result;
use futures::future::BoxFuture;
use futures::{FutureExt, Stream, stream};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use tracing::debug;

/// A list/search response that carries one page of items
pub trait PagedResponse: DeserializeOwned {
    type Item;

    /// Split the page into its items and the continuation token
    fn into_page(self) -> (Vec<Self::Item>, Option<String>);
}

type PageFetch<T> = Box<
    dyn Fn(Option<String>) -> BoxFuture<'static, Result<(Vec<T>, Option<String>)>> + Send + Sync,
>;

/// Lazily fetched sequence of items spread across pages
pub struct Pager<T> {
    fetch: PageFetch<T>,
    token: Option<String>,
    finished: bool,
    pages_fetched: usize,
    buffer: VecDeque<T>,
}

impl<T> fmt::Debug for Pager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pager")
            .field("token", &self.token)
            .field("finished", &self.finished)
            .field("pages_fetched", &self.pages_fetched)
            .field("buffered", &self.buffer.len())
            .finish()
    }
}

impl<T: Send + 'static> Pager<T> {
    /// Build a pager from a page-fetching function
    ///
    /// The function receives the continuation token (`None` for the first
    /// page) and returns that page's items plus the next token.
    pub fn from_fn<F, Fut>(fetch: F) -> Self
    where
        F: Fn(Option<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(Vec<T>, Option<String>)>> + Send + 'static,
    {
        Self {
            fetch: Box::new(move |token| fetch(token).boxed()),
            token: None,
            finished: false,
            pages_fetched: 0,
            buffer: VecDeque::new(),
        }
    }

    /// Pages served by `GET` with `pageSize`/`pageToken` query parameters
    pub(crate) fn get<R>(
        client: AiPlatformClient,
        version: ApiVersion,
        path: String,
        query: Vec<(&'static str, String)>,
    ) -> Self
    where
        R: PagedResponse<Item = T> + Send + 'static,
    {
        Self::from_fn(move |token| {
            let client = client.clone();
            let path = path.clone();
            let mut query = query.clone();
            async move {
                if let Some(token) = token {
                    query.push(("pageToken", token));
                }
                let page: R = client.get(version, &path, &query).await?;
                Ok(page.into_page())
            }
        })
    }

    /// Pages served by `POST` with the token carried in the request body
    pub(crate) fn post<R>(
        client: AiPlatformClient,
        version: ApiVersion,
        path: String,
        body: Value,
    ) -> Self
    where
        R: PagedResponse<Item = T> + Send + 'static,
    {
        Self::from_fn(move |token| {
            let client = client.clone();
            let path = path.clone();
            let mut body = body.clone();
            async move {
                if let (Some(token), Some(map)) = (token, body.as_object_mut()) {
                    map.insert("pageToken".to_string(), Value::String(token));
                }
                let page: R = client.post(version, &path, &[], &body).await?;
                Ok(page.into_page())
            }
        })
    }

    /// Start from a token obtained earlier instead of the first page
    #[must_use]
    pub fn with_page_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Token the next page fetch will send
    pub fn page_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// True once the last page has been fetched
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Fetch the next whole page
    ///
    /// Returns `Ok(None)` after the last page. A failed fetch leaves the
    /// pager where it was, so calling this again retries the same token.
    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>> {
        if self.finished {
            return Ok(None);
        }

        let (items, next) = (self.fetch)(self.token.clone()).await?;
        self.pages_fetched += 1;
        self.token = next.filter(|t| !t.is_empty());
        self.finished = self.token.is_none();
        debug!(
            "Fetched page {} with {} items (more: {})",
            self.pages_fetched,
            items.len(),
            !self.finished
        );
        Ok(Some(items))
    }

    /// Next item, fetching a page when the buffer runs dry
    pub async fn next(&mut self) -> Result<Option<T>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }
            match self.next_page().await? {
                Some(items) => self.buffer.extend(items),
                None => return Ok(None),
            }
        }
    }

    /// Drain every remaining page into a vector
    pub async fn collect(mut self) -> Result<Vec<T>> {
        let mut all: Vec<T> = self.buffer.drain(..).collect();
        while let Some(items) = self.next_page().await? {
            all.extend(items);
        }
        Ok(all)
    }

    /// Item stream; ends after the first error
    pub fn into_stream(self) -> impl Stream<Item = Result<T>> + Send {
        stream::unfold(Some(self), |state| async move {
            let mut pager = state?;
            match pager.next().await {
                Ok(Some(item)) => Some((Ok(item), Some(pager))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }
}
