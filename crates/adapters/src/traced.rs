// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::driver::{AutomationDriver, DriverError, ElementInfo, KeyChord, Page, PageProbe};
use crate::notify::{NotifyAdapter, NotifyError};
use async_trait::async_trait;
use av_core::{Cookie, Locator};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Wrapper that adds tracing to any AutomationDriver and the pages it opens
#[derive(Clone)]
pub struct TracedDriver<D> {
    inner: D,
    next_page: Arc<AtomicU64>,
}

impl<D> TracedDriver<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            next_page: Arc::new(AtomicU64::new(1)),
        }
    }
}

#[async_trait]
impl<D: AutomationDriver> AutomationDriver for TracedDriver<D> {
    async fn open(&self) -> Result<Box<dyn Page>, DriverError> {
        let page_id = self.next_page.fetch_add(1, Ordering::Relaxed);
        let span = tracing::info_span!("driver.open", page_id);
        async {
            let start = Instant::now();
            let result = self.inner.open().await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match result {
                Ok(page) => {
                    tracing::info!(elapsed_ms, "browser session started");
                    Ok(Box::new(TracedPage {
                        inner: page,
                        page_id,
                    }) as Box<dyn Page>)
                }
                Err(e) => {
                    tracing::error!(elapsed_ms, error = %e, "open failed");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// Page wrapper produced by `TracedDriver`
pub struct TracedPage {
    inner: Box<dyn Page>,
    page_id: u64,
}

impl TracedPage {
    pub fn new(inner: Box<dyn Page>, page_id: u64) -> Self {
        Self { inner, page_id }
    }
}

fn log_outcome<T>(result: &Result<T, DriverError>, start: Instant, what: &str) {
    let elapsed_ms = start.elapsed().as_millis() as u64;
    match result {
        Ok(_) => tracing::debug!(elapsed_ms, "{what} ok"),
        Err(e) => tracing::warn!(elapsed_ms, error = %e, "{what} failed"),
    }
}

#[async_trait]
impl PageProbe for TracedPage {
    async fn is_responsive(&self) -> bool {
        let alive = self.inner.is_responsive().await;
        tracing::trace!(page_id = self.page_id, alive, "probed");
        alive
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        self.inner.current_url().await
    }

    async fn visible_text(&self) -> Result<String, DriverError> {
        let result = self.inner.visible_text().await;
        tracing::trace!(
            page_id = self.page_id,
            text_len = result.as_ref().map(|t| t.len()).ok(),
            "read visible text"
        );
        result
    }

    async fn find(&self, locator: &Locator) -> Result<Vec<ElementInfo>, DriverError> {
        let result = self.inner.find(locator).await;
        tracing::trace!(
            page_id = self.page_id,
            %locator,
            found = result.as_ref().map(|v| v.len()).ok(),
            "find"
        );
        result
    }
}

#[async_trait]
impl Page for TracedPage {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        let span = tracing::info_span!("page.navigate", page_id = self.page_id, url);
        async {
            // Precondition: absolute URL
            if !(url.starts_with("https://") || url.starts_with("http://") || url == "about:blank")
            {
                tracing::error!("refusing to navigate to a non-http url");
                return Err(DriverError::Protocol(format!("not an absolute url: {url}")));
            }

            tracing::info!("navigating");
            let start = Instant::now();
            let result = self.inner.navigate(url).await;
            log_outcome(&result, start, "navigate");
            result
        }
        .instrument(span)
        .await
    }

    async fn reload(&mut self) -> Result<(), DriverError> {
        let span = tracing::info_span!("page.reload", page_id = self.page_id);
        async {
            let start = Instant::now();
            let result = self.inner.reload().await;
            log_outcome(&result, start, "reload");
            result
        }
        .instrument(span)
        .await
    }

    async fn click(&mut self, locator: &Locator) -> Result<(), DriverError> {
        let span = tracing::info_span!("page.click", page_id = self.page_id, %locator);
        async {
            let start = Instant::now();
            let result = self.inner.click(locator).await;
            log_outcome(&result, start, "click");
            result
        }
        .instrument(span)
        .await
    }

    async fn type_text(&mut self, locator: &Locator, text: &str) -> Result<(), DriverError> {
        // Typed text may be a password; only its length is logged
        let span = tracing::info_span!(
            "page.type_text",
            page_id = self.page_id,
            %locator,
            text_len = text.len()
        );
        async {
            let start = Instant::now();
            let result = self.inner.type_text(locator, text).await;
            log_outcome(&result, start, "type_text");
            result
        }
        .instrument(span)
        .await
    }

    async fn press_keys(&mut self, chord: &KeyChord) -> Result<(), DriverError> {
        let span = tracing::info_span!("page.press_keys", page_id = self.page_id, %chord);
        async {
            let start = Instant::now();
            let result = self.inner.press_keys(chord).await;
            log_outcome(&result, start, "press_keys");
            result
        }
        .instrument(span)
        .await
    }

    async fn execute_script(
        &mut self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, DriverError> {
        let span = tracing::debug_span!(
            "page.execute_script",
            page_id = self.page_id,
            script_len = script.len()
        );
        async {
            let start = Instant::now();
            let result = self.inner.execute_script(script, args).await;
            log_outcome(&result, start, "execute_script");
            result
        }
        .instrument(span)
        .await
    }

    async fn snapshot(&mut self) -> Result<Vec<u8>, DriverError> {
        let span = tracing::info_span!("page.snapshot", page_id = self.page_id);
        async {
            let start = Instant::now();
            let result = self.inner.snapshot().await;
            tracing::info!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                bytes = result.as_ref().map(|b| b.len()).ok(),
                "snapshot"
            );
            result
        }
        .instrument(span)
        .await
    }

    async fn cookies(&mut self) -> Result<Vec<Cookie>, DriverError> {
        let result = self.inner.cookies().await;
        tracing::debug!(
            page_id = self.page_id,
            count = result.as_ref().map(|c| c.len()).ok(),
            "read cookies"
        );
        result
    }

    async fn set_cookies(&mut self, cookies: &[Cookie]) -> Result<(), DriverError> {
        let result = self.inner.set_cookies(cookies).await;
        match &result {
            Ok(()) => tracing::info!(page_id = self.page_id, count = cookies.len(), "cookies installed"),
            Err(e) => tracing::warn!(page_id = self.page_id, error = %e, "cookie install failed"),
        }
        result
    }

    fn probe(&self) -> Arc<dyn PageProbe> {
        self.inner.probe()
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        let span = tracing::info_span!("page.close", page_id = self.page_id);
        async {
            let result = self.inner.close().await;
            // close() failing is often acceptable (browser already gone)
            match &result {
                Ok(()) => tracing::info!("browser session closed"),
                Err(e) => tracing::warn!(error = %e, "close failed (may be expected)"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any NotifyAdapter
#[derive(Clone)]
pub struct TracedNotifyAdapter<N> {
    inner: N,
}

impl<N> TracedNotifyAdapter<N> {
    pub fn new(inner: N) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<N: NotifyAdapter> NotifyAdapter for TracedNotifyAdapter<N> {
    async fn send(&self, channel: &str, message: &str) -> Result<(), NotifyError> {
        let span = tracing::info_span!("notify.send", channel);
        async {
            let result = self.inner.send(channel, message).await;
            match &result {
                Ok(()) => tracing::info!(message_len = message.len(), "sent"),
                Err(e) => tracing::error!(error = %e, "send failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
