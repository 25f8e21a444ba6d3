use scraper::Html;
use tracing::{info, warn};
use url::Url;

use crate::fetch::{self, FetchError};
use crate::parser::Selectors;

/// Walk the paginated listing from `start_url`, following the "load more"
/// link until it disappears. Returns product URLs in discovery order, with
/// no deduplication. Any listing fetch failure is fatal to the walk.
pub async fn walk(
    client: &reqwest::Client,
    start_url: &str,
    base: &Url,
    selectors: &Selectors,
) -> Result<Vec<String>, FetchError> {
    let mut products = Vec::new();
    let mut cursor = start_url.to_string();
    let mut page = 1usize;

    loop {
        let body = fetch::fetch_html(client, &cursor).await?;
        let (links, next) = parse_listing(&body, base, selectors);
        info!("Listing page {}: {} product links", page, links.len());
        products.extend(links);

        match next {
            Some(url) => {
                cursor = url;
                page += 1;
            }
            None => break,
        }
    }

    info!(
        "Discovered {} product URLs across {} listing pages",
        products.len(),
        page
    );
    Ok(products)
}

/// Pull product links and the next-page target out of one listing page.
/// A missing "load more" container or an empty href means the catalog is
/// exhausted, not an error.
pub fn parse_listing(html: &str, base: &Url, selectors: &Selectors) -> (Vec<String>, Option<String>) {
    let doc = Html::parse_document(html);

    let mut links = Vec::new();
    for element in doc.select(&selectors.product_link) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        match base.join(href) {
            Ok(resolved) => links.push(resolved.to_string()),
            Err(e) => warn!("Ignoring malformed product link {:?}: {}", href, e),
        }
    }

    let next = doc
        .select(&selectors.next_page)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .and_then(|href| match base.join(href) {
            Ok(resolved) => Some(resolved.to_string()),
            Err(e) => {
                warn!("Ignoring malformed next-page link {:?}: {}", href, e);
                None
            }
        });

    (links, next)
}

// ── Tests ──
