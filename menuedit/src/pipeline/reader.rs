//! Item reader
//!
//! Reads every item node of a section with the slot rules of the inferencer,
//! normalizing price values to the section's frozen labels.

use super::inference::locate_fields;
use crate::locator::trimmed_text;
use crate::page_model::{ItemRecord, PricePair};
use crate::site_config::PageProfile;
use scraper::ElementRef;

/// Raw field text of one item node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFields {
    pub name: String,
    /// `None` when the item has no description node
    pub description: Option<String>,
    /// One entry per located price slot, unnormalized
    pub prices: Vec<String>,
}

/// Read the trimmed text of an item's fields
pub fn read_fields(item: ElementRef<'_>, profile: &PageProfile) -> ItemFields {
    let slots = locate_fields(item, profile);
    ItemFields {
        name: trimmed_text(slots.name),
        description: slots.description.map(trimmed_text),
        prices: slots.prices.into_iter().map(trimmed_text).collect(),
    }
}

/// Read all item nodes of a section into records
///
/// # Parameters
/// * `items` - Matched item nodes in document order
/// * `section_id` - Owning section identifier, used to derive item ids
/// * `price_labels` - The section's frozen labels
/// * `uses_description` - Whether records carry a description
/// * `profile` - Compiled locator cascades for the page
///
/// # Returns
/// * `Vec<ItemRecord>` - One record per node, each with exactly `price_labels.len()` prices
pub fn read_items(
    items: &[ElementRef<'_>],
    section_id: &str,
    price_labels: &[String],
    uses_description: bool,
    profile: &PageProfile,
) -> Vec<ItemRecord> {
    items
        .iter()
        .enumerate()
        .map(|(idx, node)| {
            let fields = read_fields(*node, profile);
            if fields.prices.len() > price_labels.len() {
                log::debug!(
                    "{}-item-{}: ignoring {} extra price slot(s)",
                    section_id,
                    idx,
                    fields.prices.len() - price_labels.len()
                );
            }
            ItemRecord {
                id: format!("{}-item-{}", section_id, idx),
                name: fields.name,
                description: uses_description.then(|| fields.description.unwrap_or_default()),
                prices: normalize_prices(price_labels, fields.prices),
                removed: false,
                is_new: false,
            }
        })
        .collect()
}

/// Align raw values with labels: missing values become empty, extras are dropped
pub fn normalize_prices(price_labels: &[String], values: Vec<String>) -> Vec<PricePair> {
    let mut values = values.into_iter();
    price_labels
        .iter()
        .map(|label| PricePair {
            label: label.clone(),
            value: values.next().unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::inference::infer_section;
    use crate::site_config::SiteConfig;
    use scraper::{Html, Selector};

    const TWO_PRICE_SECTION: &str = r#"
        <div class="misc-table">
          <div class="misc-item">
            <span class="misc-name"> Hibiki Harmony </span>
            <span class="misc-price">70</span><span class="misc-price">1200</span>
          </div>
          <div class="misc-item">
            <span class="misc-name">Yamazaki 12</span>
            <span class="misc-price">80</span>
          </div>
          <div class="misc-item">
            <span class="misc-name">Hakushu</span>
            <span class="misc-price">75</span><span class="misc-price">1300</span><span class="misc-price">99</span>
          </div>
        </div>"#;

    fn read(html: &str) -> (Vec<String>, Vec<ItemRecord>) {
        let profile = SiteConfig::embedded().unwrap().profile("whisky").unwrap();
        let doc = Html::parse_document(html);
        let sel = Selector::parse(".misc-table").unwrap();
        let container = doc.select(&sel).next().unwrap();
        let schema = infer_section(container, &[], &profile).unwrap();
        let records = read_items(
            &schema.items,
            "whisky-section-0",
            &schema.price_labels,
            schema.uses_description,
            &profile,
        );
        (schema.price_labels, records)
    }

    #[test]
    fn test_labels_frozen_from_first_item() {
        let (labels, records) = read(TWO_PRICE_SECTION);

        assert_eq!(labels, vec!["Price 1", "Price 2"]);
        for record in &records {
            let item_labels: Vec<&str> = record.prices.iter().map(|p| p.label.as_str()).collect();
            assert_eq!(item_labels, vec!["Price 1", "Price 2"]);
        }
    }

    #[test]
    fn test_short_items_padded_and_long_items_truncated() {
        let (_, records) = read(TWO_PRICE_SECTION);

        assert_eq!(records[0].name, "Hibiki Harmony");
        assert_eq!(records[1].prices[0].value, "80");
        assert_eq!(records[1].prices[1].value, "");
        assert_eq!(records[2].prices.len(), 2);
        assert_eq!(records[2].prices[1].value, "1300");
    }

    #[test]
    fn test_item_ids_and_flags() {
        let (_, records) = read(TWO_PRICE_SECTION);

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["whisky-section-0-item-0", "whisky-section-0-item-1", "whisky-section-0-item-2"]
        );
        assert!(records.iter().all(|r| !r.removed && !r.is_new));
        assert!(records.iter().all(|r| r.description.is_none()));
    }

    #[test]
    fn test_missing_description_defaults_to_empty() {
        let (_, records) = read(
            r#"<div class="misc-table">
                 <div class="misc-item">
                   <span class="misc-name">Gyoza</span>
                   <p class="misc-description">  Pan-fried, six pieces </p>
                   <span class="misc-price">38</span>
                 </div>
                 <div class="misc-item">
                   <span class="misc-name">Miso Soup</span>
                   <span class="misc-price">18</span>
                 </div>
               </div>"#,
        );

        assert_eq!(records[0].description.as_deref(), Some("Pan-fried, six pieces"));
        assert_eq!(records[1].description.as_deref(), Some(""));
    }

    #[test]
    fn test_normalize_prices() {
        let labels = vec!["Glass".to_string(), "Bottle".to_string()];

        let padded = normalize_prices(&labels, vec!["45".to_string()]);
        assert_eq!(
            padded,
            vec![PricePair::new("Glass", "45"), PricePair::new("Bottle", "")]
        );

        let truncated = normalize_prices(&[], vec!["45".to_string()]);
        assert!(truncated.is_empty());
    }
}
