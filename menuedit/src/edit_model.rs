//! Editable page model and command API
//!
//! `PageEditModel` wraps a loaded `PageModel` and the page's dirty flag.
//! Every change goes through an `EditCommand`; applying one marks the page
//! dirty. Records are never removed from a section: deleting only toggles
//! the soft-delete flag, so it can be undone until the page is saved or reset.

use crate::page_model::{PageModel, PricePair};
use crate::pipeline::writer;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Field of an item addressed by an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRef {
    Name,
    Description,
    /// Zero-based price slot
    Price(usize),
}

impl FromStr for FieldRef {
    type Err = EditError;

    /// Parse `name`, `description`, `price` or `price:N`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(FieldRef::Name),
            "description" | "desc" => Ok(FieldRef::Description),
            "price" => Ok(FieldRef::Price(0)),
            other => other
                .strip_prefix("price:")
                .and_then(|n| n.parse().ok())
                .map(FieldRef::Price)
                .ok_or_else(|| EditError::InvalidField(s.to_string())),
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRef::Name => write!(f, "name"),
            FieldRef::Description => write!(f, "description"),
            FieldRef::Price(idx) => write!(f, "price:{}", idx),
        }
    }
}

/// A single change to a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    /// Overwrite one field of an item
    SetField {
        section: usize,
        item: usize,
        field: FieldRef,
        value: String,
    },
    /// Append a blank item to a section
    AddItem { section: usize },
    /// Flip an item's soft-delete flag
    ToggleRemoved { section: usize, item: usize },
}

/// Errors raised by edit commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Section {0} does not exist")]
    UnknownSection(usize),

    #[error("Section {section} has no item {item}")]
    UnknownItem { section: usize, item: usize },

    #[error("Section {0} has no description field")]
    NoDescription(usize),

    #[error("Section {section} has no price slot {slot}")]
    UnknownPriceSlot { section: usize, slot: usize },

    #[error("Unknown field '{0}' (expected name, description, price or price:N)")]
    InvalidField(String),
}

/// A loaded page plus its dirty flag
#[derive(Debug)]
pub struct PageEditModel {
    page: PageModel,
    dirty: bool,
}

impl PageEditModel {
    /// Wrap a freshly loaded page; it starts clean
    pub fn new(page: PageModel) -> Self {
        Self { page, dirty: false }
    }

    pub fn page(&self) -> &PageModel {
        &self.page
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Apply one command
    ///
    /// # Returns
    /// * `Ok(bool)` - The new dirty state (always `true`)
    /// * `Err(EditError)` - The command addressed something that does not exist; nothing changed
    pub fn apply_edit(&mut self, command: EditCommand) -> Result<bool, EditError> {
        match command {
            EditCommand::SetField {
                section,
                item,
                field,
                value,
            } => self.set_field(section, item, field, value)?,
            EditCommand::AddItem { section } => {
                self.add_item(section)?;
            }
            EditCommand::ToggleRemoved { section, item } => {
                self.toggle_removed(section, item)?;
            }
        }
        Ok(self.dirty)
    }

    /// Overwrite a field of an item
    ///
    /// A missing price record for a labeled slot is created on demand.
    pub fn set_field(
        &mut self,
        section: usize,
        item: usize,
        field: FieldRef,
        value: String,
    ) -> Result<(), EditError> {
        let section_model = self
            .page
            .sections
            .get_mut(section)
            .ok_or(EditError::UnknownSection(section))?;
        let uses_description = section_model.uses_description;
        let labels = &section_model.price_labels;
        let record = section_model
            .items
            .get_mut(item)
            .ok_or(EditError::UnknownItem { section, item })?;

        match field {
            FieldRef::Name => record.name = value,
            FieldRef::Description => {
                if !uses_description {
                    return Err(EditError::NoDescription(section));
                }
                record.description = Some(value);
            }
            FieldRef::Price(slot) => {
                if slot >= labels.len() {
                    return Err(EditError::UnknownPriceSlot { section, slot });
                }
                while record.prices.len() <= slot {
                    let label = &labels[record.prices.len()];
                    record.prices.push(PricePair::new(label, ""));
                }
                record.prices[slot].value = value;
            }
        }

        self.dirty = true;
        Ok(())
    }

    /// Append a blank item shaped by the section's labels
    ///
    /// # Returns
    /// * `Ok(usize)` - Index of the new item
    /// * `Err(EditError)` - Unknown section
    pub fn add_item(&mut self, section: usize) -> Result<usize, EditError> {
        let section_model = self
            .page
            .sections
            .get_mut(section)
            .ok_or(EditError::UnknownSection(section))?;
        let blank = section_model.blank_item();
        section_model.items.push(blank);
        self.dirty = true;
        Ok(section_model.items.len() - 1)
    }

    /// Flip the soft-delete flag of an item
    ///
    /// # Returns
    /// * `Ok(bool)` - The item's new `removed` value
    /// * `Err(EditError)` - Unknown section or item
    pub fn toggle_removed(&mut self, section: usize, item: usize) -> Result<bool, EditError> {
        let record = self
            .page
            .sections
            .get_mut(section)
            .ok_or(EditError::UnknownSection(section))?
            .items
            .get_mut(item)
            .ok_or(EditError::UnknownItem { section, item })?;
        record.removed = !record.removed;
        let removed = record.removed;
        self.dirty = true;
        Ok(removed)
    }

    /// Rebuild the page document from the current records
    ///
    /// Does not change the dirty flag; only a delivered save or copy does.
    pub fn regenerate(&mut self) -> String {
        writer::regenerate(&mut self.page)
    }

    /// Record that the current state was delivered
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::build_page;
    use crate::site_config::SiteConfig;

    const MISC_PAGE: &str = r#"<!DOCTYPE html>
<html><body><main>
  <section class="misc-section">
    <h2>Bites</h2>
    <div class="misc-table">
      <div class="misc-item">
        <span class="misc-name">Edamame</span>
        <p class="misc-description">Sea salt</p>
        <span class="misc-price">20</span>
      </div>
      <div class="misc-item">
        <span class="misc-name">Karaage</span>
        <p class="misc-description">Fried chicken</p>
        <span class="misc-price">42</span>
      </div>
    </div>
  </section>
  <section class="misc-section">
    <h2>Soft Drinks</h2>
    <div class="beer-table">
      <div class="beer-item"><span class="beer-name">Ramune</span><span class="beer-price">18</span></div>
    </div>
  </section>
</main></body></html>"#;

    fn model() -> PageEditModel {
        let profile = SiteConfig::embedded().unwrap().profile("misc").unwrap();
        PageEditModel::new(build_page(&profile, MISC_PAGE.to_string()))
    }

    fn set(section: usize, item: usize, field: FieldRef, value: &str) -> EditCommand {
        EditCommand::SetField {
            section,
            item,
            field,
            value: value.to_string(),
        }
    }

    #[test]
    fn test_each_mutation_sets_dirty() {
        let commands = vec![
            set(0, 0, FieldRef::Name, "Spicy Edamame"),
            EditCommand::AddItem { section: 1 },
            EditCommand::ToggleRemoved { section: 0, item: 1 },
        ];

        for command in commands {
            let mut model = model();
            assert!(!model.is_dirty());
            assert!(model.apply_edit(command).unwrap());
            assert!(model.is_dirty());
        }
    }

    #[test]
    fn test_set_field_updates_record() {
        let mut model = model();

        model.apply_edit(set(0, 1, FieldRef::Price(0), "45")).unwrap();
        model.apply_edit(set(0, 1, FieldRef::Description, "Crispy")).unwrap();

        let record = &model.page().sections[0].items[1];
        assert_eq!(record.prices[0], PricePair::new("Price", "45"));
        assert_eq!(record.description.as_deref(), Some("Crispy"));
    }

    #[test]
    fn test_invalid_edits_leave_model_clean() {
        let mut model = model();

        assert_eq!(
            model.apply_edit(set(5, 0, FieldRef::Name, "x")),
            Err(EditError::UnknownSection(5))
        );
        assert_eq!(
            model.apply_edit(set(0, 9, FieldRef::Name, "x")),
            Err(EditError::UnknownItem { section: 0, item: 9 })
        );
        assert_eq!(
            model.apply_edit(set(1, 0, FieldRef::Description, "x")),
            Err(EditError::NoDescription(1))
        );
        assert_eq!(
            model.apply_edit(set(1, 0, FieldRef::Price(1), "x")),
            Err(EditError::UnknownPriceSlot { section: 1, slot: 1 })
        );
        assert!(!model.is_dirty());
    }

    #[test]
    fn test_missing_price_record_created_on_demand() {
        let mut model = model();
        model.page.sections[0].items[0].prices.clear();

        model.set_field(0, 0, FieldRef::Price(0), "22".to_string()).unwrap();

        assert_eq!(
            model.page().sections[0].items[0].prices,
            vec![PricePair::new("Price", "22")]
        );
    }

    #[test]
    fn test_add_item_is_blank_and_new() {
        let mut model = model();

        let idx = model.add_item(0).unwrap();
        let second = model.add_item(0).unwrap();

        let section = &model.page().sections[0];
        let record = &section.items[idx];
        assert_eq!(idx, 2);
        assert_eq!(record.id, "misc-section-0-new-0");
        assert_eq!(section.items[second].id, "misc-section-0-new-1");
        assert_eq!(record.name, "");
        assert_eq!(record.description.as_deref(), Some(""));
        assert_eq!(record.prices, vec![PricePair::new("Price", "")]);
        assert!(record.is_new && !record.removed);
    }

    #[test]
    fn test_toggle_removed_keeps_sequence() {
        let mut model = model();

        assert!(model.toggle_removed(0, 0).unwrap());
        assert_eq!(model.page().sections[0].items.len(), 2);
        assert_eq!(model.page().sections[0].visible_count(), 1);
        assert!(!model.toggle_removed(0, 0).unwrap());
        assert_eq!(model.page().sections[0].visible_count(), 2);
    }

    #[test]
    fn test_soft_delete_reversibility() {
        let mut untouched = model();
        let mut toggled = model();

        toggled.toggle_removed(0, 1).unwrap();
        toggled.toggle_removed(0, 1).unwrap();

        assert_eq!(toggled.regenerate(), untouched.regenerate());
    }

    #[test]
    fn test_add_then_save_appends_one_item() {
        let mut model = model();

        let idx = model.add_item(1).unwrap();
        model.apply_edit(set(1, idx, FieldRef::Name, "Test Item")).unwrap();
        model.apply_edit(set(1, idx, FieldRef::Price(0), "10")).unwrap();
        let html = model.regenerate();

        let reread = build_page(&model.page().profile, html);
        let items = &reread.sections[1].items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Ramune");
        assert_eq!(items[1].name, "Test Item");
        assert_eq!(items[1].prices[0].value, "10");
    }

    #[test]
    fn test_regenerate_does_not_clear_dirty() {
        let mut model = model();
        model.toggle_removed(0, 0).unwrap();

        let _ = model.regenerate();
        assert!(model.is_dirty());

        model.mark_clean();
        assert!(!model.is_dirty());
    }

    #[test]
    fn test_field_ref_parsing() {
        assert_eq!("name".parse::<FieldRef>().unwrap(), FieldRef::Name);
        assert_eq!("Description".parse::<FieldRef>().unwrap(), FieldRef::Description);
        assert_eq!("price".parse::<FieldRef>().unwrap(), FieldRef::Price(0));
        assert_eq!("price:2".parse::<FieldRef>().unwrap(), FieldRef::Price(2));
        assert!("colour".parse::<FieldRef>().is_err());
        assert_eq!(FieldRef::Price(1).to_string(), "price:1");
    }
}
