//! Section scanner
//!
//! Finds section blocks with the page's anchor locator and turns each one
//! that holds items into a `SectionModel`. Sections without items are
//! dropped; pages mix item sections with notes, images and the like.

use super::{inference, reader};
use crate::locator::trimmed_text;
use crate::page_model::SectionModel;
use crate::site_config::PageProfile;
use scraper::{ElementRef, Html};

/// Scan a parsed document for editable sections
///
/// # Parameters
/// * `document` - Parsed page
/// * `profile` - Compiled locator cascades for the page
///
/// # Returns
/// * `Vec<SectionModel>` - Sections with at least one item, in document order
pub fn scan_sections(document: &Html, profile: &PageProfile) -> Vec<SectionModel> {
    let anchors = profile.anchor.find_all(document.root_element());
    if anchors.is_empty() {
        log::debug!("{}: no section matches the anchor locator", profile.id);
    }

    anchors
        .into_iter()
        .enumerate()
        .filter_map(|(index, section)| scan_section(section, index, profile))
        .collect()
}

fn scan_section(section: ElementRef<'_>, index: usize, profile: &PageProfile) -> Option<SectionModel> {
    let id = format!("{}-section-{}", profile.id, index);
    let title = profile
        .titles
        .first_match(section)
        .map(trimmed_text)
        .unwrap_or_else(|| format!("Section {}", index + 1));
    let container = profile.containers.first_match(section).unwrap_or(section);
    let header_labels = header_labels(section, profile);

    let Some(schema) = inference::infer_section(container, &header_labels, profile) else {
        log::debug!("{}: '{}' has no items, skipping", id, title);
        return None;
    };

    let items = reader::read_items(
        &schema.items,
        &id,
        &schema.price_labels,
        schema.uses_description,
        profile,
    );
    log::debug!(
        "{}: '{}' with {} item(s), labels [{}]",
        id,
        title,
        items.len(),
        schema.price_labels.join(", ")
    );

    Some(SectionModel {
        id,
        title,
        container: container.id(),
        item_locator: schema.item_locator,
        template: schema.template,
        header_labels,
        price_labels: schema.price_labels,
        uses_description: schema.uses_description,
        items,
        next_new: 0,
    })
}

/// Non-empty text of the section's column label nodes
fn header_labels(section: ElementRef<'_>, profile: &PageProfile) -> Vec<String> {
    profile
        .header_labels
        .collect_unique(section)
        .into_iter()
        .map(trimmed_text)
        .filter(|label| !label.is_empty())
        .collect()
}
