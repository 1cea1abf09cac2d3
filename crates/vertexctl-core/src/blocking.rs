//! Blocking facade for synchronous callers
//!
//! [`BlockingClient`] owns a current-thread tokio runtime and drives the async
//! API to completion on the calling thread. Do not use it from inside another
//! async runtime.
//!
//! ```rust,ignore
//! let blocking = BlockingClient::new()?;
//! let handler = ExtensionRegistryHandler::new(context.client()?);
//! let handle = blocking.block_on(handler.import_extension(&parent, &extension))?;
//! let extension = blocking.wait(handle)?;
//! ```

use crate::error::{CoreError, Result};
use crate::lro::{OperationHandle, PollConfig, ProgressCallback};
use crate::pagination::Pager;
use serde::de::DeserializeOwned;
use std::future::Future;
use tokio::runtime::{Builder, Runtime};

/// Runs async calls to completion on the current thread
#[derive(Debug)]
pub struct BlockingClient {
    runtime: Runtime,
}

impl BlockingClient {
    pub fn new() -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| CoreError::Config(format!("Failed to start runtime: {e}")))?;
        Ok(Self { runtime })
    }

    /// Block until `future` resolves
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Block until the operation finishes, using the default poll schedule
    pub fn wait<T: DeserializeOwned>(&self, handle: OperationHandle<T>) -> Result<T> {
        self.runtime.block_on(handle.wait())
    }

    pub fn wait_with<T: DeserializeOwned>(
        &self,
        handle: OperationHandle<T>,
        config: &PollConfig,
        on_progress: Option<ProgressCallback>,
    ) -> Result<T> {
        self.runtime.block_on(handle.wait_with(config, on_progress))
    }

    /// Iterate a pager's items, fetching pages as the iterator advances
    pub fn iter<T: Send + 'static>(&self, pager: Pager<T>) -> PagerIter<'_, T> {
        PagerIter {
            runtime: &self.runtime,
            pager,
        }
    }
}

/// Blocking iterator over a [`Pager`]
///
/// A failed page fetch yields one `Err`; advancing again retries that page.
#[derive(Debug)]
pub struct PagerIter<'a, T> {
    runtime: &'a Runtime,
    pager: Pager<T>,
}

impl<T: Send + 'static> PagerIter<'_, T> {
    pub fn pager(&self) -> &Pager<T> {
        &self.pager
    }
}

impl<T: Send + 'static> Iterator for PagerIter<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.runtime.block_on(self.pager.next()).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_iterates_all_pages_on_current_thread() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let pager = Pager::from_fn(move |token: Option<String>| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move {
                Ok(match token.as_deref() {
                    None => (vec!["a", "b"], Some("next".to_string())),
                    _ => (vec!["c"], None),
                })
            }
        });

        let blocking = BlockingClient::new().unwrap();
        let items: Result<Vec<_>> = blocking.iter(pager).collect();
        assert_eq!(items.unwrap(), vec!["a", "b", "c"]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_block_on_returns_output() {
        let blocking = BlockingClient::new().unwrap();
        assert_eq!(blocking.block_on(async { 40 + 2 }), 42);
    }
}
