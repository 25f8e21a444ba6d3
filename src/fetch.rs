use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use tokio::sync::{mpsc, Semaphore};
use tracing::warn;

use crate::parser::{self, Selectors};
use crate::sink::ProductOutcome;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a single fetch failed: connection-level trouble vs. a non-2xx
/// response. Callers treat listing failures as fatal and product failures
/// as skippable, so the distinction matters.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
}

pub fn client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

/// GET `url` and return the response body, requiring a 2xx status.
pub async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let response = client.get(url).send().await.map_err(|e| FetchError::Transport {
        url: url.to_string(),
        source: e,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    response.text().await.map_err(|e| FetchError::Transport {
        url: url.to_string(),
        source: e,
    })
}

/// Fetch stats returned after completion.
pub struct FetchStats {
    pub total: usize,
    pub ok: usize,
    pub errors: usize,
}

/// Fetch and extract all product pages concurrently. Results come back in
/// the original discovery order regardless of completion order; a failed
/// fetch becomes a `Failed` outcome and never aborts the run.
pub async fn fetch_products(
    client: &reqwest::Client,
    selectors: &Arc<Selectors>,
    urls: Vec<String>,
    concurrency: usize,
) -> Result<(Vec<ProductOutcome>, FetchStats)> {
    let total = urls.len();
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    // Channel: workers send indexed outcomes, main loop slots them in order
    let (tx, mut rx) = mpsc::channel::<(usize, ProductOutcome)>(concurrency.max(1) * 2);

    for (index, url) in urls.into_iter().enumerate() {
        let client = client.clone();
        let selectors = Arc::clone(selectors);
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();

        tokio::spawn(async move {
            let _permit = sem.acquire().await.unwrap();
            let outcome = match fetch_html(&client, &url).await {
                Ok(body) => {
                    ProductOutcome::Extracted(parser::extract_product(&url, &body, &selectors))
                }
                Err(e) => {
                    warn!("Skipping product page {}: {}", url, e);
                    ProductOutcome::Failed {
                        url,
                        error: e.to_string(),
                    }
                }
            };
            let _ = tx.send((index, outcome)).await;
        });
    }

    // Drop our copy of tx so rx closes when all spawned tasks finish
    drop(tx);

    let mut slots: Vec<Option<ProductOutcome>> = (0..total).map(|_| None).collect();
    let mut ok = 0usize;
    let mut errors = 0usize;

    while let Some((index, outcome)) = rx.recv().await {
        match &outcome {
            ProductOutcome::Extracted(_) => ok += 1,
            ProductOutcome::Failed { .. } => errors += 1,
        }
        slots[index] = Some(outcome);
        pb.inc(1);
    }

    pb.finish_and_clear();

    let outcomes: Vec<ProductOutcome> = slots.into_iter().flatten().collect();
    Ok((outcomes, FetchStats { total, ok, errors }))
}

// ── Tests ──
