//! Seller inventory scraping for the record marketplace
//!
//! Implements the catalog source seam: a verification probe that decides
//! whether a submission is worth a task at all, and the paged inventory
//! fetch that feeds dataset production. Extraction is CSS-selector driven
//! so marketplace markup changes stay confined to the selector config.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};
use url::Url;

use crate::domain::dataset::Row;
use crate::domain::services::{CatalogRequest, CatalogSource, InventorySnapshot};
use crate::infrastructure::http_client::{HttpClient, HttpClientConfig};

/// Where and how hard to fetch seller inventories.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CatalogSourceConfig {
    /// Marketplace origin, e.g. "https://www.discogs.com".
    pub base_url: String,
    /// Listings requested per inventory page.
    pub page_size: u32,
    /// Hard cap on pages fetched for one seller.
    pub max_pages: u32,
}

impl Default for CatalogSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.discogs.com".to_string(),
            page_size: 250,
            max_pages: 40,
        }
    }
}

/// CSS selectors for the seller inventory listing table.
#[derive(Debug, Clone)]
pub struct InventorySelectors {
    /// One listing per row.
    pub listing_row: String,
    pub artist: String,
    pub title: String,
    pub label: String,
    pub year: String,
    pub price: String,
    pub media_condition: String,
    /// Link to the listing; only its href path is kept.
    pub item_link: String,
}

impl Default for InventorySelectors {
    fn default() -> Self {
        Self {
            listing_row: "table.inventory tbody tr, tr.shortcut_navigable".to_string(),
            artist: "td.item_description .artist, td.artist".to_string(),
            title: "td.item_description a.item_title, td.title a, td.title".to_string(),
            label: "td.item_description .label, td.label".to_string(),
            year: "td.item_description .year, td.year".to_string(),
            price: "td.item_price .price, td.price".to_string(),
            media_condition: "td.item_condition .media, td.condition".to_string(),
            item_link: "td.item_description a.item_title, td.title a".to_string(),
        }
    }
}

/// Extracts listing rows from an inventory page.
pub struct InventoryPageParser {
    selectors: InventorySelectors,
}

impl InventoryPageParser {
    pub fn new() -> Self {
        Self::with_selectors(InventorySelectors::default())
    }

    pub fn with_selectors(selectors: InventorySelectors) -> Self {
        Self { selectors }
    }

    /// Column names in cell order, the header row of every produced dataset.
    pub fn column_names(&self) -> Vec<String> {
        ["artist", "title", "label", "year", "price", "media_condition", "item"]
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Extract all listing rows from one inventory page.
    pub fn parse_rows(&self, html: &Html) -> Result<Vec<Row>> {
        let row_selector = Selector::parse(&self.selectors.listing_row)
            .map_err(|e| anyhow!("Invalid listing row selector: {e}"))?;

        let mut rows = Vec::new();
        for listing in html.select(&row_selector) {
            rows.push(self.extract_listing(&listing));
        }

        debug!("Extracted {} listings from inventory page", rows.len());
        Ok(rows)
    }

    /// Whether the page shows any listings at all.
    pub fn has_listings(&self, html: &Html) -> bool {
        Selector::parse(&self.selectors.listing_row)
            .map(|selector| html.select(&selector).next().is_some())
            .unwrap_or(false)
    }

    fn extract_listing(&self, listing: &ElementRef) -> Row {
        let text = |selector: &str| self.extract_text(listing, selector).unwrap_or_default();

        vec![
            text(&self.selectors.artist),
            text(&self.selectors.title),
            text(&self.selectors.label),
            text(&self.selectors.year),
            text(&self.selectors.price),
            text(&self.selectors.media_condition),
            self.extract_href(listing, &self.selectors.item_link)
                .unwrap_or_default(),
        ]
    }

    /// Extract trimmed text content from the first match of a CSS selector.
    fn extract_text(&self, element: &ElementRef, selector: &str) -> Option<String> {
        let parsed = Selector::parse(selector).ok()?;
        element
            .select(&parsed)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty())
    }

    fn extract_href(&self, element: &ElementRef, selector: &str) -> Option<String> {
        let parsed = Selector::parse(selector).ok()?;
        element
            .select(&parsed)
            .next()
            .and_then(|el| el.value().attr("href"))
            .map(|href| href.to_string())
    }
}

impl Default for InventoryPageParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Marketplace-backed catalog source: verification probe plus paged fetch.
pub struct SellerCatalogClient {
    http: HttpClient,
    parser: InventoryPageParser,
    config: CatalogSourceConfig,
}

impl SellerCatalogClient {
    pub fn new(config: CatalogSourceConfig, http_config: HttpClientConfig) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(http_config)?,
            parser: InventoryPageParser::new(),
            config,
        })
    }

    /// Inventory page URL for one seller, with the submission filters as
    /// query parameters.
    fn inventory_url(&self, request: &CatalogRequest, page: u32) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .context("Invalid marketplace base URL")?
            .join(&format!("seller/{}/profile", request.seller))
            .context("Failed to build seller inventory URL")?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("page", &page.to_string());
            pairs.append_pair("limit", &self.config.page_size.to_string());
            if request.filters.vinyl_only {
                pairs.append_pair("format", "Vinyl");
            }
            if let Some(genre) = &request.filters.genre {
                pairs.append_pair("genre", genre);
            }
            if let Some(style) = &request.filters.style {
                pairs.append_pair("style", style);
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl CatalogSource for SellerCatalogClient {
    async fn verify_seller(&self, seller: &str) -> Result<bool> {
        let request = CatalogRequest {
            seller: seller.to_string(),
            filters: Default::default(),
        };
        let url = self.inventory_url(&request, 1)?;

        let response = self.http.try_get(url.as_str()).await?;
        if !response.status().is_success() {
            debug!("Seller probe for '{}' answered {}", seller, response.status());
            return Ok(false);
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read seller page for '{seller}'"))?;
        let html = Html::parse_document(&body);

        // An existing seller with nothing for sale is rejected too.
        Ok(self.parser.has_listings(&html))
    }

    async fn fetch_inventory(&self, request: &CatalogRequest) -> Result<InventorySnapshot> {
        let mut rows: Vec<Row> = Vec::new();

        for page in 1..=self.config.max_pages {
            let url = self.inventory_url(request, page)?;
            let body = self
                .http
                .get_text(url.as_str())
                .await
                .with_context(|| format!("Failed to fetch inventory page {page}"))?;

            let html = Html::parse_document(&body);
            let page_rows = self.parser.parse_rows(&html)?;
            if page_rows.is_empty() {
                break;
            }

            info!(
                "Fetched inventory page {} for '{}': {} listings",
                page,
                request.seller,
                page_rows.len()
            );

            let last_page = page_rows.len() < self.config.page_size as usize;
            rows.extend(page_rows);
            if last_page {
                break;
            }
        }

        info!(
            "Collected {} listings for seller '{}'",
            rows.len(),
            request.seller
        );

        Ok(InventorySnapshot {
            column_names: self.parser.column_names(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <table class="inventory">
            <tbody>
                <tr>
                    <td class="artist">Miles Davis</td>
                    <td class="title"><a href="/sell/item/101">Kind of Blue</a></td>
                    <td class="label">Columbia</td>
                    <td class="year">1959</td>
                    <td class="price">$34.99</td>
                    <td class="condition">Very Good Plus (VG+)</td>
                </tr>
                <tr>
                    <td class="artist">Art Blakey</td>
                    <td class="title"><a href="/sell/item/102">Moanin'</a></td>
                    <td class="label">Blue Note</td>
                    <td class="year">1958</td>
                    <td class="price">CA$31.25</td>
                    <td class="condition">Near Mint (NM)</td>
                </tr>
            </tbody>
        </table>
    "#;

    #[test]
    fn parses_listing_rows_in_page_order() {
        let parser = InventoryPageParser::new();
        let html = Html::parse_document(PAGE);

        let rows = parser.parse_rows(&html).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], "Miles Davis");
        assert_eq!(rows[0][4], "$34.99");
        assert_eq!(rows[0][6], "/sell/item/101");
        assert_eq!(rows[1][1], "Moanin'");
    }

    #[test]
    fn missing_cells_become_empty_strings() {
        let parser = InventoryPageParser::new();
        let html = Html::parse_document(
            r#"<table class="inventory"><tbody>
                <tr><td class="artist">Unknown Artist</td></tr>
            </tbody></table>"#,
        );

        let rows = parser.parse_rows(&html).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "Unknown Artist");
        assert!(rows[0][1..].iter().all(|cell| cell.is_empty()));
    }

    #[test]
    fn empty_page_has_no_listings() {
        let parser = InventoryPageParser::new();
        let html = Html::parse_document("<html><body><p>Nothing for sale.</p></body></html>");
        assert!(!parser.has_listings(&html));
        assert!(parser.parse_rows(&html).unwrap().is_empty());
    }

    #[test]
    fn inventory_url_carries_submission_filters() {
        let client = SellerCatalogClient::new(
            CatalogSourceConfig::default(),
            HttpClientConfig::default(),
        )
        .unwrap();

        let request = CatalogRequest {
            seller: "example_seller".into(),
            filters: crate::domain::services::CatalogFilters {
                vinyl_only: true,
                genre: Some("Jazz".into()),
                style: None,
            },
        };

        let url = client.inventory_url(&request, 3).unwrap();
        assert_eq!(url.path(), "/seller/example_seller/profile");
        let query = url.query().unwrap();
        assert!(query.contains("page=3"));
        assert!(query.contains("format=Vinyl"));
        assert!(query.contains("genre=Jazz"));
        assert!(!query.contains("style="));
    }
}
