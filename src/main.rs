mod config;
mod fetch;
mod parser;
mod sink;
mod walker;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use url::Url;

use crate::config::SiteConfig;
use crate::parser::Selectors;

#[derive(Parser)]
#[command(name = "catalog_scraper", about = "Paginated product catalog scraper")]
struct Cli {
    /// Site config file (JSON); defaults to the built-in site layout
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk the listing pages and print discovered product URLs
    Walk {
        /// Max URLs to print (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Fetch one product page and print its extracted fields
    Extract { url: String },
    /// Walk + extract + write CSV in one pipeline
    Run {
        /// Max products to fetch (default: all discovered)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Output CSV path (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Concurrent product-page fetches (overrides config)
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Walk { limit } => {
            let site = Site::prepare(&cfg)?;
            let mut urls = walker::walk(&site.client, &cfg.start_url, &site.base, &site.selectors)
                .await
                .context("Listing crawl failed")?;
            if let Some(n) = limit {
                urls.truncate(n);
            }
            for url in &urls {
                println!("{}", url);
            }
            println!("\n{} product URLs", urls.len());
            Ok(())
        }
        Commands::Extract { url } => {
            let site = Site::prepare(&cfg)?;
            let body = fetch::fetch_html(&site.client, &url)
                .await
                .context("Product fetch failed")?;
            let record = parser::extract_product(&url, &body, &site.selectors);
            println!("URL:         {}", record.url);
            println!("Title:       {}", record.title);
            println!("Type:        {}", record.product_type);
            println!("Reference:   {}", record.reference);
            println!("Price:       {}", record.price);
            println!("Size:        {}", record.size);
            println!("Description: {}", record.description);
            println!("Composition: {}", record.composition);
            Ok(())
        }
        Commands::Run {
            limit,
            output,
            concurrency,
        } => {
            let out_path = output.unwrap_or_else(|| PathBuf::from(&cfg.output));
            let jobs = concurrency.unwrap_or(cfg.max_concurrency);
            run_pipeline(&cfg, &out_path, limit, jobs).await
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Shared per-run state: HTTP client, resolved base URL, compiled selectors.
struct Site {
    client: reqwest::Client,
    base: Url,
    selectors: Arc<Selectors>,
}

impl Site {
    fn prepare(cfg: &SiteConfig) -> Result<Self> {
        Ok(Self {
            client: fetch::client()?,
            base: Url::parse(&cfg.base_url)
                .with_context(|| format!("Invalid base URL {:?}", cfg.base_url))?,
            selectors: Arc::new(Selectors::compile(&cfg.selectors)?),
        })
    }
}

fn load_config(path: Option<&Path>) -> Result<SiteConfig> {
    match path {
        Some(p) => SiteConfig::from_file(p),
        None => Ok(SiteConfig::default()),
    }
}

/// Full pipeline: walk the listing, fetch every product page, write the CSV.
/// The output file exists by the time this returns, even when the walk
/// itself fails (header-only in that case).
async fn run_pipeline(
    cfg: &SiteConfig,
    out_path: &Path,
    limit: Option<usize>,
    concurrency: usize,
) -> Result<()> {
    let site = Site::prepare(cfg)?;

    let mut urls = match walker::walk(&site.client, &cfg.start_url, &site.base, &site.selectors)
        .await
    {
        Ok(urls) => urls,
        Err(e) => {
            sink::write_csv(out_path, &[])?;
            return Err(anyhow::Error::new(e).context("Listing crawl failed"));
        }
    };
    if let Some(n) = limit {
        urls.truncate(n);
    }

    if urls.is_empty() {
        sink::write_csv(out_path, &[])?;
        println!("No products discovered; wrote {}", out_path.display());
        return Ok(());
    }

    println!("Fetching {} product pages...", urls.len());
    let (outcomes, stats) =
        fetch::fetch_products(&site.client, &site.selectors, urls, concurrency).await?;

    let rows = sink::write_csv(out_path, &outcomes)?;
    println!(
        "Wrote {} rows to {} ({} ok, {} failed).",
        rows,
        out_path.display(),
        stats.ok,
        stats.errors
    );
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn product_page(title: &str, price: &str) -> String {
        format!(
            r#"<html><body>
            <span class="heading product-details__title">{}</span>
            <span class="product-details__description">Shower Gel</span>
            <div class="product-details-block">Ref. 116930</div>
            <p class="product-details__price">{}</p>
            <div class="product-details__option">6.8 FL. OZ.</div>
            <h2>Description</h2>
            <p>A silky shower gel.</p>
            </body></html>"#,
            title, price
        )
    }

    fn test_config(server: &Server) -> SiteConfig {
        SiteConfig {
            start_url: format!("{}/catalog", server.url()),
            base_url: server.url(),
            ..SiteConfig::default()
        }
    }

    fn read_rows(path: &Path) -> Vec<csv::StringRecord> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.records().map(|r| r.unwrap()).collect()
    }

    #[tokio::test]
    async fn two_page_catalog_end_to_end() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/catalog")
            .with_body(
                r#"<html><body>
                <div class="txt-product"><a href="/p/one">One</a></div>
                <div class="txt-product"><a href="/p/two">Two</a></div>
                <div class="loadmore-container"><a href="/catalog/2">Load more</a></div>
                </body></html>"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/catalog/2")
            .with_body(
                r#"<html><body>
                <div class="txt-product"><a href="/p/three">Three</a></div>
                </body></html>"#,
            )
            .create_async()
            .await;
        for (path, title) in [("/p/one", "ONE"), ("/p/two", "TWO"), ("/p/three", "THREE")] {
            server
                .mock("GET", path)
                .with_body(product_page(title, "₹4,700"))
                .create_async()
                .await;
        }

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("products.csv");
        run_pipeline(&test_config(&server), &out, None, 3).await.unwrap();

        let rows = read_rows(&out);
        assert_eq!(rows.len(), 3);
        let titles: Vec<&str> = rows.iter().map(|r| &r[1]).collect();
        assert_eq!(titles, vec!["ONE", "TWO", "THREE"]);
        assert_eq!(&rows[0][4], "4700");
        assert_eq!(&rows[0][5], "6.8");
    }

    #[tokio::test]
    async fn failed_product_page_keeps_its_row() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/catalog")
            .with_body(
                r#"<html><body>
                <div class="txt-product"><a href="/p/one">One</a></div>
                <div class="txt-product"><a href="/p/two">Two</a></div>
                <div class="txt-product"><a href="/p/three">Three</a></div>
                </body></html>"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/p/one")
            .with_body(product_page("ONE", "$128.00"))
            .create_async()
            .await;
        server.mock("GET", "/p/two").with_status(500).create_async().await;
        server
            .mock("GET", "/p/three")
            .with_body(product_page("THREE", "$98.00"))
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("products.csv");
        run_pipeline(&test_config(&server), &out, None, 2).await.unwrap();

        let rows = read_rows(&out);
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][1], "ONE");
        // Failed fetch: URL survives, every other column is the sentinel.
        assert_eq!(&rows[1][0], format!("{}/p/two", server.url()));
        assert_eq!(&rows[1][1], sink::NOT_AVAILABLE);
        assert_eq!(&rows[1][4], sink::NOT_AVAILABLE);
        assert_eq!(&rows[2][1], "THREE");
    }

    #[tokio::test]
    async fn listing_failure_leaves_header_only_file() {
        let mut server = Server::new_async().await;
        server.mock("GET", "/catalog").with_status(503).create_async().await;

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("products.csv");
        let err = run_pipeline(&test_config(&server), &out, None, 2)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Listing crawl failed"));

        let rows = read_rows(&out);
        assert!(rows.is_empty());
        let mut rdr = csv::Reader::from_path(&out).unwrap();
        assert_eq!(rdr.headers().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn limit_caps_product_count() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/catalog")
            .with_body(
                r#"<html><body>
                <div class="txt-product"><a href="/p/one">One</a></div>
                <div class="txt-product"><a href="/p/two">Two</a></div>
                </body></html>"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/p/one")
            .with_body(product_page("ONE", "$10"))
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("products.csv");
        run_pipeline(&test_config(&server), &out, Some(1), 1).await.unwrap();

        let rows = read_rows(&out);
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][1], "ONE");
    }
}
