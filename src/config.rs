use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Site configuration: start/base URLs plus every site-specific markup
/// constant, so a layout change means editing a config file, not code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// First listing page of the catalog.
    pub start_url: String,

    /// Base URL that relative product/next-page hrefs are resolved against.
    pub base_url: String,

    /// Output CSV path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Concurrent product-page fetches.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// CSS selectors and marker words for the observed site layout. Every field
/// has a default, so a config file only needs to name what differs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Product link on a listing page.
    #[serde(default = "default_product_link")]
    pub product_link: String,

    /// "Load more" link on a listing page.
    #[serde(default = "default_next_page")]
    pub next_page: String,

    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_product_type")]
    pub product_type: String,

    #[serde(default = "default_reference")]
    pub reference: String,

    #[serde(default = "default_price")]
    pub price: String,

    /// Size element when the product has a single variant.
    #[serde(default = "default_size_single")]
    pub size_single: String,

    /// Size elements when the product has multiple variants.
    #[serde(default = "default_size_multi")]
    pub size_multi: String,

    /// Headings scanned for the marker words below.
    #[serde(default = "default_marker_headings")]
    pub marker_headings: String,

    /// Heading text introducing the description paragraph.
    #[serde(default = "default_description_marker")]
    pub description_marker: String,

    /// Heading text introducing the composition paragraph.
    #[serde(default = "default_composition_marker")]
    pub composition_marker: String,
}

impl SiteConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            start_url: "https://www.chanel.com/in/fragrance/bath-and-body/c/7x1x7x92/women/"
                .to_string(),
            base_url: "https://www.chanel.com".to_string(),
            output: default_output(),
            max_concurrency: default_max_concurrency(),
            selectors: SelectorConfig::default(),
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            product_link: default_product_link(),
            next_page: default_next_page(),
            title: default_title(),
            product_type: default_product_type(),
            reference: default_reference(),
            price: default_price(),
            size_single: default_size_single(),
            size_multi: default_size_multi(),
            marker_headings: default_marker_headings(),
            description_marker: default_description_marker(),
            composition_marker: default_composition_marker(),
        }
    }
}

fn default_output() -> String {
    "products.csv".to_string()
}

fn default_max_concurrency() -> usize {
    4
}

fn default_product_link() -> String {
    "div.txt-product a".to_string()
}

fn default_next_page() -> String {
    "div.loadmore-container a".to_string()
}

fn default_title() -> String {
    "span.product-details__title".to_string()
}

fn default_product_type() -> String {
    "span.product-details__description".to_string()
}

fn default_reference() -> String {
    "div.product-details-block".to_string()
}

fn default_price() -> String {
    "p.product-details__price".to_string()
}

fn default_size_single() -> String {
    "div.product-details__option".to_string()
}

fn default_size_multi() -> String {
    "div.product-details__variant".to_string()
}

fn default_marker_headings() -> String {
    "h2, h3".to_string()
}

fn default_description_marker() -> String {
    "Description".to_string()
}

fn default_composition_marker() -> String {
    "Composition".to_string()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_selector_defaults() {
        let cfg: SiteConfig = serde_json::from_str(
            r#"{
                "start_url": "https://example.com/catalog",
                "base_url": "https://example.com",
                "selectors": { "title": "h1.name" }
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.selectors.title, "h1.name");
        assert_eq!(cfg.selectors.price, "p.product-details__price");
        assert_eq!(cfg.output, "products.csv");
        assert_eq!(cfg.max_concurrency, 4);
    }

    #[test]
    fn default_config_round_trips() {
        let cfg = SiteConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SiteConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.start_url, cfg.start_url);
        assert_eq!(back.selectors.next_page, cfg.selectors.next_page);
    }
}
