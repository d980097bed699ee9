//! Drives the council's "find your next collection day" form and returns the
//! inner HTML of the results panel.
//!
//! The form is a fixed six-step sequence: load the page, fill and submit the
//! postcode, wait for the address dropdown to populate, pick the address,
//! wait for the collection blocks to render, read the panel. The three waits
//! each carry their own timeout and are the only points that report
//! `Browser`; everything else that goes wrong is `Unknown`.

use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use log::{error, info, warn};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

use crate::extractor::COLLECTION_BLOCK_SELECTOR;
use crate::records::ErrorCode;

const POSTCODE_INPUT_SELECTOR: &str = "#FINDYOURBINDAYS3WEEKLY_ADDRESSLOOKUPPOSTCODE";
const SEARCH_BUTTON_SELECTOR: &str = "#FINDYOURBINDAYS3WEEKLY_ADDRESSLOOKUPSEARCH";
const ADDRESS_SELECT_SELECTOR: &str = "#FINDYOURBINDAYS3WEEKLY_ADDRESSLOOKUPADDRESS";
const RESULTS_SELECTOR: &str = "#FINDYOURBINDAYS3WEEKLY_RUBBISHRECYCLEFOODDATE";

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// One budget per suspension point. The council site is slow to hand the
/// address list back, hence the generous defaults.
#[derive(Debug, Clone, Copy)]
pub struct StepTimeouts {
    pub navigate: Duration,
    pub addresses: Duration,
    pub results: Duration,
}

impl Default for StepTimeouts {
    fn default() -> Self {
        Self {
            navigate: Duration::from_secs(60),
            addresses: Duration::from_secs(20),
            results: Duration::from_secs(20),
        }
    }
}

/// Why the step sequence stopped early.
#[derive(Debug)]
pub enum StepFailure {
    TimedOut {
        step: &'static str,
    },
    Failed {
        step: &'static str,
        source: anyhow::Error,
    },
}

impl StepFailure {
    fn timed_out(step: &'static str) -> Self {
        StepFailure::TimedOut { step }
    }

    fn failed(step: &'static str, source: anyhow::Error) -> Self {
        StepFailure::Failed { step, source }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            StepFailure::TimedOut { .. } => ErrorCode::Browser,
            StepFailure::Failed { .. } => ErrorCode::Unknown,
        }
    }
}

impl std::fmt::Display for StepFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepFailure::TimedOut { step } => write!(f, "timed out waiting for {step}"),
            StepFailure::Failed { step, source } => write!(f, "{step} failed: {source:#}"),
        }
    }
}

impl std::error::Error for StepFailure {}

/// The page interactions the lookup needs, kept narrow so the step sequence
/// and its timeout policy can be exercised against a scripted page in tests.
#[async_trait]
pub trait CollectionPage {
    async fn navigate(&self, url: &str) -> anyhow::Result<()>;
    async fn fill_postcode(&self, postcode: &str) -> anyhow::Result<()>;
    async fn submit_postcode(&self) -> anyhow::Result<()>;
    async fn address_option_count(&self) -> anyhow::Result<u32>;
    async fn select_address(&self, value: &str) -> anyhow::Result<()>;
    async fn collection_block_count(&self) -> anyhow::Result<u32>;
    async fn results_html(&self) -> anyhow::Result<String>;
}

/// Runs the six lookup steps against an already-open page.
pub async fn run_lookup_steps<P: CollectionPage + Sync>(
    page: &P,
    url: &str,
    postcode: &str,
    address_value: &str,
    timeouts: StepTimeouts,
) -> Result<String, StepFailure> {
    match timeout(timeouts.navigate, page.navigate(url)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(StepFailure::failed("navigation", e)),
        Err(_) => return Err(StepFailure::timed_out("navigation")),
    }

    page.fill_postcode(postcode)
        .await
        .map_err(|e| StepFailure::failed("postcode entry", e))?;
    page.submit_postcode()
        .await
        .map_err(|e| StepFailure::failed("postcode search", e))?;

    // A single option is the placeholder; real addresses push it past one.
    wait_until("address dropdown", timeouts.addresses, || async {
        Ok(page.address_option_count().await? > 1)
    })
    .await?;

    page.select_address(address_value)
        .await
        .map_err(|e| StepFailure::failed("address selection", e))?;

    wait_until("collection results", timeouts.results, || async {
        Ok(page.collection_block_count().await? > 0)
    })
    .await?;

    page.results_html()
        .await
        .map_err(|e| StepFailure::failed("results readout", e))
}

async fn wait_until<F, Fut>(
    step: &'static str,
    budget: Duration,
    mut probe: F,
) -> Result<(), StepFailure>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<bool>>,
{
    let waited = timeout(budget, async {
        loop {
            if probe().await? {
                return Ok::<_, anyhow::Error>(());
            }
            sleep(POLL_INTERVAL).await;
        }
    })
    .await;

    match waited {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(StepFailure::failed(step, e)),
        Err(_) => Err(StepFailure::timed_out(step)),
    }
}

/// Scrapes the collection-day lookup for one postcode and address.
///
/// Stateless per call: a fresh browser is launched, driven through the form,
/// and torn down again. Retry policy, if any, belongs to the caller.
#[derive(Debug)]
pub struct BinDayScraper {
    pub url: String,
    pub postcode: String,
    pub address_value: String,
    pub timeouts: StepTimeouts,
}

impl BinDayScraper {
    pub fn new(url: String, postcode: String, address_value: String) -> Self {
        Self {
            url,
            postcode,
            address_value,
            timeouts: StepTimeouts::default(),
        }
    }

    pub async fn scrape(&self) -> Result<String, ErrorCode> {
        let session = match BrowserSession::launch().await {
            Ok(session) => session,
            Err(e) => {
                error!("browser launch failed: {e:#}");
                return Err(ErrorCode::Unknown);
            }
        };

        let page = ChromiumPage {
            page: session.page.clone(),
        };
        let outcome = run_lookup_steps(
            &page,
            &self.url,
            &self.postcode,
            &self.address_value,
            self.timeouts,
        )
        .await;

        // The session comes down on every exit path once it is up.
        session.close().await;

        match outcome {
            Ok(html) => {
                info!("retrieved {} bytes of results markup", html.len());
                Ok(html)
            }
            Err(failure) => {
                match &failure {
                    StepFailure::TimedOut { .. } => warn!("{failure}"),
                    StepFailure::Failed { .. } => error!("{failure}"),
                }
                Err(failure.code())
            }
        }
    }
}

struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    async fn launch() -> anyhow::Result<Self> {
        let config = BrowserConfig::builder()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-sandbox")
            .arg("--disable-software-rasterizer")
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                let _ = browser.wait().await;
                handler_task.abort();
                return Err(anyhow::Error::from(e).context("failed to open page"));
            }
        };

        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    async fn close(mut self) {
        let _ = self.page.close().await;
        let _ = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.handler_task.abort();
    }
}

/// Production driver backed by a chromiumoxide page.
struct ChromiumPage {
    page: Page,
}

impl ChromiumPage {
    async fn evaluate_value<T: serde::de::DeserializeOwned>(
        &self,
        script: &str,
    ) -> anyhow::Result<T> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("script evaluation failed")?;
        result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert script result: {e:?}"))
    }
}

#[async_trait]
impl CollectionPage for ChromiumPage {
    async fn navigate(&self, url: &str) -> anyhow::Result<()> {
        self.page.goto(url).await.context("navigation failed")?;
        let _ = self.page.wait_for_navigation().await;
        Ok(())
    }

    async fn fill_postcode(&self, postcode: &str) -> anyhow::Result<()> {
        let input = self
            .page
            .find_element(POSTCODE_INPUT_SELECTOR)
            .await
            .context("postcode input not found")?;
        input.click().await.context("failed to focus postcode input")?;
        input
            .type_str(postcode)
            .await
            .context("failed to type postcode")?;
        Ok(())
    }

    async fn submit_postcode(&self) -> anyhow::Result<()> {
        let button = self
            .page
            .find_element(SEARCH_BUTTON_SELECTOR)
            .await
            .context("search button not found")?;
        button.click().await.context("failed to click search")?;
        Ok(())
    }

    async fn address_option_count(&self) -> anyhow::Result<u32> {
        let script = format!(
            "(() => {{ const el = document.querySelector('{ADDRESS_SELECT_SELECTOR}'); \
             return el ? el.options.length : 0; }})()"
        );
        self.evaluate_value(&script).await
    }

    async fn select_address(&self, value: &str) -> anyhow::Result<()> {
        // Set the <select> value directly and fire a change event, which is
        // what the council's own script listens for.
        let script = format!(
            "(() => {{ const el = document.querySelector('{ADDRESS_SELECT_SELECTOR}'); \
             el.value = {value}; \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return true; }})()",
            value = serde_json::Value::String(value.to_string())
        );
        let _: bool = self.evaluate_value(&script).await?;
        Ok(())
    }

    async fn collection_block_count(&self) -> anyhow::Result<u32> {
        let script = format!(
            "document.querySelectorAll('{RESULTS_SELECTOR} {COLLECTION_BLOCK_SELECTOR}').length"
        );
        self.evaluate_value(&script).await
    }

    async fn results_html(&self) -> anyhow::Result<String> {
        let script = format!("document.querySelector('{RESULTS_SELECTOR}').innerHTML");
        self.evaluate_value(&script).await
    }
}
