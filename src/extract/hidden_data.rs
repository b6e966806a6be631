use crate::error::{Result, ScrapeError};
use ::scraper::{Html, Selector};
use serde_json::Value;

/// Where the hidden JSON lives and which tokens a block must mention to be worth parsing
#[derive(Debug, Clone, PartialEq)]
pub struct HiddenDataMarkers {
    /// CSS selector for the carrier script tags
    pub selector: String,

    /// Top-level scheduler token every hydration payload carries
    pub scheduler_marker: String,

    /// Key under which thread items are nested
    pub items_key: String,
}

impl Default for HiddenDataMarkers {
    fn default() -> Self {
        Self {
            selector: r#"script[type="application/json"][data-sjs]"#.to_string(),
            scheduler_marker: "ScheduledServerJS".to_string(),
            items_key: "thread_items".to_string(),
        }
    }
}

/// Pulls parsed JSON out of the page's hidden hydration blocks
pub struct HiddenDataExtractor {
    selector: Selector,
    scheduler_marker: String,
    items_key: String,
}

impl HiddenDataExtractor {
    pub fn new(markers: &HiddenDataMarkers) -> Result<Self> {
        let selector = Selector::parse(&markers.selector).map_err(|e| {
            ScrapeError::internal(format!("Invalid hidden data selector '{}': {:?}", markers.selector, e), None)
        })?;

        Ok(Self {
            selector,
            scheduler_marker: markers.scheduler_marker.clone(),
            items_key: markers.items_key.clone(),
        })
    }

    /// Parsed payloads of every qualifying block, in document order.
    ///
    /// Blocks missing either marker are not parsed at all; blocks that fail to
    /// parse are skipped.
    pub fn extract(&self, html: &str) -> Vec<Value> {
        let document = Html::parse_document(html);
        let mut datasets = Vec::new();

        for script in document.select(&self.selector) {
            let content: String = script.text().collect();

            if !content.contains(&self.scheduler_marker) || !content.contains(&self.items_key) {
                continue;
            }

            match serde_json::from_str::<Value>(&content) {
                Ok(parsed) => datasets.push(parsed),
                Err(e) => log::debug!("Skipping malformed hidden data block: {}", e),
            }
        }

        datasets
    }
}

/// Extract hidden datasets using the default markers
pub fn extract_hidden_data(html: &str) -> Vec<Value> {
    match HiddenDataExtractor::new(&HiddenDataMarkers::default()) {
        Ok(extractor) => extractor.extract(html),
        Err(e) => {
            log::error!("{}", e);
            Vec::new()
        }
    }
}
