pub mod clean;

use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};

use crate::config::SelectorConfig;
use crate::sink::{ProductRecord, NOT_AVAILABLE};

/// Selectors compiled once at startup and shared across all pages.
pub struct Selectors {
    pub product_link: Selector,
    pub next_page: Selector,
    title: Selector,
    product_type: Selector,
    reference: Selector,
    price: Selector,
    size_single: Selector,
    size_multi: Selector,
    marker_headings: Selector,
    description_marker: String,
    composition_marker: String,
}

impl Selectors {
    pub fn compile(cfg: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            product_link: compile_one(&cfg.product_link)?,
            next_page: compile_one(&cfg.next_page)?,
            title: compile_one(&cfg.title)?,
            product_type: compile_one(&cfg.product_type)?,
            reference: compile_one(&cfg.reference)?,
            price: compile_one(&cfg.price)?,
            size_single: compile_one(&cfg.size_single)?,
            size_multi: compile_one(&cfg.size_multi)?,
            marker_headings: compile_one(&cfg.marker_headings)?,
            description_marker: cfg.description_marker.clone(),
            composition_marker: cfg.composition_marker.clone(),
        })
    }
}

fn compile_one(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow!("Invalid selector {:?}: {}", selector, e))
}

/// Extract one product record from a detail page. Each field rule is
/// independent; a missing element degrades to the sentinel instead of
/// failing the record.
pub fn extract_product(url: &str, html: &str, sel: &Selectors) -> ProductRecord {
    let doc = Html::parse_document(html);

    ProductRecord {
        url: url.to_string(),
        title: first_text(&doc, &sel.title).unwrap_or_else(not_available),
        product_type: first_text(&doc, &sel.product_type).unwrap_or_else(not_available),
        reference: digit_field(&doc, &sel.reference).unwrap_or_else(not_available),
        price: digit_field(&doc, &sel.price).unwrap_or_else(not_available),
        size: extract_size(&doc, sel).unwrap_or_else(not_available),
        description: marker_paragraph(&doc, sel, &sel.description_marker)
            .unwrap_or_else(not_available),
        composition: marker_paragraph(&doc, sel, &sel.composition_marker)
            .unwrap_or_else(not_available),
    }
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

/// Trimmed text of the first match, or None if absent or empty.
fn first_text(doc: &Html, sel: &Selector) -> Option<String> {
    doc.select(sel).next().and_then(element_text)
}

fn element_text(el: ElementRef) -> Option<String> {
    let text = el.text().collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn digit_field(doc: &Html, sel: &Selector) -> Option<String> {
    first_text(doc, sel)
        .map(|t| clean::digits_only(&t))
        .filter(|t| !t.is_empty())
}

/// Single-variant size element if present, otherwise every multi-variant
/// element, each cleaned and joined with ", ".
fn extract_size(doc: &Html, sel: &Selectors) -> Option<String> {
    if let Some(raw) = first_text(doc, &sel.size_single) {
        let size = clean::clean_size(&raw);
        return (!size.is_empty()).then_some(size);
    }

    let sizes: Vec<String> = doc
        .select(&sel.size_multi)
        .filter_map(element_text)
        .map(|raw| clean::clean_size(&raw))
        .filter(|s| !s.is_empty())
        .collect();
    (!sizes.is_empty()).then(|| sizes.join(", "))
}

/// Text of the first <p> following a heading whose text equals `marker`.
fn marker_paragraph(doc: &Html, sel: &Selectors, marker: &str) -> Option<String> {
    let heading = doc
        .select(&sel.marker_headings)
        .find(|el| el.text().collect::<String>().trim() == marker)?;
    heading
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "p")
        .and_then(element_text)
}

// ── Tests ──
