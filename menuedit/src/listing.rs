//! Text and CSV listings of loaded pages and offers

use crate::offers::{day_name, OffersDocument};
use crate::page_model::{ItemRecord, PageModel};
use itertools::Itertools;
use serde::Serialize;
use std::fmt::Write as _;
use std::io;

/// One CSV row per item
#[derive(Debug, Serialize)]
struct ItemRow<'a> {
    page: &'a str,
    section: usize,
    section_title: &'a str,
    item: usize,
    id: &'a str,
    name: &'a str,
    description: &'a str,
    prices: String,
    removed: bool,
    new: bool,
}

/// Human-readable listing of a page's sections and items
///
/// Indices shown are the ones edit commands address.
pub fn render_table(page: &PageModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", page.profile.label, page.profile.file);

    if page.sections.is_empty() {
        let _ = writeln!(out, "  no editable sections");
        return out;
    }

    for (s, section) in page.sections.iter().enumerate() {
        let labels = if section.price_labels.is_empty() {
            "no prices".to_string()
        } else {
            section.price_labels.iter().join(" | ")
        };
        let _ = writeln!(out, "\n[{}] {} ({}) - {}", s, section.title, section.id, labels);

        for (i, item) in section.items.iter().enumerate() {
            let marker = match (item.removed, item.is_new) {
                (true, _) => " (removed)",
                (false, true) => " (new)",
                _ => "",
            };
            let _ = writeln!(out, "  {:>3}  {}{}", i, display_name(item), marker);
            if let Some(description) = item.description.as_deref().filter(|d| !d.is_empty()) {
                let _ = writeln!(out, "       {}", description);
            }
            if !item.prices.is_empty() {
                let _ = writeln!(out, "       {}", price_summary(item));
            }
        }
    }

    out
}

/// Write every item of a page as CSV
///
/// # Parameters
/// * `page` - Loaded page
/// * `writer` - CSV destination
pub fn write_csv<W: io::Write>(page: &PageModel, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for (s, section) in page.sections.iter().enumerate() {
        for (i, item) in section.items.iter().enumerate() {
            csv_writer.serialize(ItemRow {
                page: page.id(),
                section: s,
                section_title: &section.title,
                item: i,
                id: &item.id,
                name: &item.name,
                description: item.description.as_deref().unwrap_or(""),
                prices: price_summary(item),
                removed: item.removed,
                new: item.is_new,
            })?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}

/// Listing of the offers document in day order
pub fn render_offers(offers: &OffersDocument) -> String {
    let mut out = String::new();
    for (key, day) in offers.ordered() {
        let name = day_name(key).unwrap_or("Unknown day");
        let _ = writeln!(out, "{} (#{}): {}", name, key, day.title);
        for (i, line) in day.lines.iter().enumerate() {
            let _ = writeln!(out, "  {:>2}  {}", i, line);
        }
    }
    out
}

fn display_name(item: &ItemRecord) -> &str {
    if item.name.is_empty() {
        "(unnamed)"
    } else {
        &item.name
    }
}

fn price_summary(item: &ItemRecord) -> String {
    item.prices
        .iter()
        .map(|p| format!("{}: {}", p.label, p.value))
        .join("; ")
}
