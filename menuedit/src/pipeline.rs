//! Page processing pipeline
//!
//! This module orchestrates the stages of page processing:
//! 1. **Load**: Fetch the raw page text from a `PageSource`
//! 2. **Scan**: Find sections, infer each section's item schema and read its items
//! 3. **Write**: Rebuild item nodes from edited records and serialize the page

pub mod inference;
pub mod reader;
pub mod scanner;
pub mod writer;

use crate::loader::{LoadError, PageSource};
use crate::page_model::PageModel;
use crate::site_config::PageProfile;
use itertools::Itertools;
use scraper::Html;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Build a page model from raw document text
///
/// # Parameters
/// * `profile` - Compiled page definition
/// * `raw` - Document text as loaded
///
/// # Returns
/// * `PageModel` - Parsed document with every section that holds items
pub fn build_page(profile: &PageProfile, raw: String) -> PageModel {
    let document = Html::parse_document(&raw);
    let sections = scanner::scan_sections(&document, profile);
    log::info!(
        "Loaded {} ({}): {} section(s), {} item(s)",
        profile.id,
        profile.file,
        sections.len(),
        sections.iter().map(|s| s.items.len()).sum::<usize>()
    );

    PageModel {
        profile: profile.clone(),
        document,
        original_html: raw,
        sections,
    }
}

/// Fetch and build a page
///
/// # Returns
/// * `Ok(PageModel)` - Page loaded and scanned
/// * `Err(LoadError)` - The source could not supply the page text
pub fn load_page(source: &dyn PageSource, profile: &PageProfile) -> Result<PageModel, LoadError> {
    let raw = source.fetch(&profile.file)?;
    Ok(build_page(profile, raw))
}

/// Result of regenerating a page without edits and reading it back
#[derive(Debug, Clone, Default)]
pub struct RoundTripReport {
    pub page_id: String,
    pub sections: usize,
    pub items: usize,
    /// Human-readable description of every field that changed
    pub mismatches: Vec<String>,
}

impl RoundTripReport {
    pub fn is_ok(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Check that regenerating an unedited page preserves every item field
///
/// # Parameters
/// * `profile` - Compiled page definition
/// * `raw` - Document text as loaded
///
/// # Returns
/// * `RoundTripReport` - Counts of checked sections and items, plus any differences
pub fn verify_round_trip(profile: &PageProfile, raw: String) -> RoundTripReport {
    let mut original = build_page(profile, raw);
    let regenerated_html = writer::regenerate(&mut original);
    let reread = build_page(profile, regenerated_html);

    let mut report = RoundTripReport {
        page_id: profile.id.clone(),
        sections: original.sections.len(),
        items: original.item_count(),
        mismatches: Vec::new(),
    };

    if original.sections.len() != reread.sections.len() {
        report.mismatches.push(format!(
            "section count {} became {}",
            original.sections.len(),
            reread.sections.len()
        ));
    }

    for (before, after) in original.sections.iter().zip(&reread.sections) {
        if before.title != after.title {
            report
                .mismatches
                .push(format!("{}: title '{}' became '{}'", before.id, before.title, after.title));
        }
        if before.items.len() != after.items.len() {
            report.mismatches.push(format!(
                "{}: {} item(s) became {}",
                before.id,
                before.items.len(),
                after.items.len()
            ));
        }
        for (a, b) in before.items.iter().zip(&after.items) {
            if a.name != b.name || a.description != b.description || a.prices != b.prices {
                report.mismatches.push(format!(
                    "{}: [{}] became [{}]",
                    a.id,
                    describe(a),
                    describe(b)
                ));
            }
        }
    }

    report
}

/// Round-trip check of every page
///
/// Each page is fetched, parsed and regenerated independently, in parallel
/// when the `parallel` feature is enabled.
///
/// # Parameters
/// * `source` - Supplier of page text
/// * `profiles` - Pages to check
///
/// # Returns
/// * `Vec<Result<RoundTripReport, LoadError>>` - One result per profile, in input order
pub fn check_pages<S: PageSource + Sync>(
    source: &S,
    profiles: &[PageProfile],
) -> Vec<Result<RoundTripReport, LoadError>> {
    let check = |profile: &PageProfile| -> Result<RoundTripReport, LoadError> {
        let raw = source.fetch(&profile.file)?;
        Ok(verify_round_trip(profile, raw))
    };

    #[cfg(feature = "parallel")]
    let reports: Vec<_> = profiles.par_iter().map(check).collect();

    #[cfg(not(feature = "parallel"))]
    let reports: Vec<_> = profiles.iter().map(check).collect();

    reports
}

fn describe(item: &crate::page_model::ItemRecord) -> String {
    let prices = item
        .prices
        .iter()
        .map(|p| format!("{}={}", p.label, p.value))
        .join(", ");
    match &item.description {
        Some(description) => format!("{} | {} | {}", item.name, description, prices),
        None => format!("{} | {}", item.name, prices),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site_config::SiteConfig;

    const CLASSIC_PAGE: &str = r#"<!DOCTYPE html>
<html><body>
<main>
  <section class="misc-section">
    <h2>Classics</h2>
    <ul class="classic-list">
      <li><span class="classic-name">Negroni</span> <span class="classic-price">55</span></li>
      <li><span class="classic-name">Old Fashioned</span> <span class="classic-price">60</span></li>
    </ul>
  </section>
  <section class="misc-section">
    <h2>Shots</h2>
    <ul class="classic-list">
      <li><span class="classic-name">Kamikaze</span> <span class="classic-price">30</span></li>
    </ul>
  </section>
</main>
</body></html>"#;

    fn classic() -> PageProfile {
        SiteConfig::embedded().unwrap().profile("classic").unwrap()
    }

    #[test]
    fn test_build_page_reads_all_sections() {
        let page = build_page(&classic(), CLASSIC_PAGE.to_string());

        assert_eq!(page.id(), "classic");
        assert_eq!(page.sections.len(), 2);
        assert_eq!(page.item_count(), 3);
        assert_eq!(page.sections[0].items[1].name, "Old Fashioned");
        assert_eq!(page.sections[0].items[1].prices[0].value, "60");
        assert_eq!(page.original_html, CLASSIC_PAGE);
    }

    #[test]
    fn test_round_trip_identity() {
        let report = verify_round_trip(&classic(), CLASSIC_PAGE.to_string());

        assert!(report.is_ok(), "{:?}", report.mismatches);
        assert_eq!(report.sections, 2);
        assert_eq!(report.items, 3);
    }

    #[test]
    fn test_check_pages_reports_missing_files() {
        // Arrange
        let config = SiteConfig::embedded().unwrap();
        let profiles = vec![classic(), config.profile("wine").unwrap()];
        let source = crate::loader::MemorySource::default().with("classic.html", CLASSIC_PAGE);

        // Act
        let results = check_pages(&source, &profiles);

        // Assert
        assert_eq!(results.len(), 2);
        assert!(results[0].as_ref().unwrap().is_ok());
        assert!(matches!(results[1], Err(LoadError::NotFound(_))));
    }

    #[test]
    fn test_describe_item() {
        let page = build_page(&classic(), CLASSIC_PAGE.to_string());
        assert_eq!(describe(&page.sections[1].items[0]), "Kamikaze | Price=30");
    }
}
