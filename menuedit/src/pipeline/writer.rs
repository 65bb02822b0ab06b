//! Document writer
//!
//! Rebuilds every section's item nodes from its template and current records,
//! then serializes the whole document. Markup outside item containers is
//! never touched.

use super::inference::{locate_fields, SlotIds};
use crate::dom;
use crate::page_model::{ItemRecord, ItemTemplate, PageModel, SectionModel};
use crate::site_config::PageProfile;
use ego_tree::{NodeId, Tree};
use scraper::{ElementRef, Html, Node};

/// Preamble prepended to every serialized document
pub const DOCTYPE: &str = "<!DOCTYPE html>\n";

/// Build a new item node tree from the template and a record
///
/// # Parameters
/// * `template` - The section's captured first item
/// * `record` - Values to write
/// * `uses_description` - Whether the section has a description field
/// * `profile` - Compiled locator cascades, used to find the template's slots
///
/// # Returns
/// * `Tree<Node>` - A standalone copy of the template holding the record's values
pub fn render_item(
    template: &ItemTemplate,
    record: &ItemRecord,
    uses_description: bool,
    profile: &PageProfile,
) -> Tree<Node> {
    let mut tree = template.instantiate();
    // Slots are located once, before any text changes, so written values
    // cannot shift the numeric fallback.
    let slots: SlotIds = match ElementRef::wrap(tree.root()) {
        Some(root) => locate_fields(root, profile).ids(),
        None => return tree,
    };

    dom::set_text(&mut tree, slots.name, record.name.trim());

    if uses_description {
        if let Some(description) = slots.description {
            let value = record.description.as_deref().unwrap_or_default().trim();
            dom::set_text(&mut tree, description, value);
        }
    }

    for (idx, slot) in slots.prices.iter().enumerate() {
        let value = record
            .prices
            .get(idx)
            .map(|price| price.value.trim())
            .unwrap_or_default();
        dom::set_text(&mut tree, *slot, value);
    }

    tree
}

/// Replace a section's item nodes with rendered records
pub fn rebuild_section(tree: &mut Tree<Node>, section: &SectionModel, profile: &PageProfile) {
    let stale: Vec<NodeId> = match tree.get(section.container).and_then(ElementRef::wrap) {
        Some(container) => section
            .item_locator
            .find_all(container)
            .iter()
            .map(|el| el.id())
            .collect(),
        None => {
            log::warn!("{}: item container is no longer in the document", section.id);
            return;
        }
    };
    for id in stale {
        dom::detach(tree, id);
    }

    for record in section.items.iter().filter(|item| !item.removed) {
        let fragment = render_item(&section.template, record, section.uses_description, profile);
        dom::graft(tree, section.container, fragment.root());
    }
}

/// Regenerate the page document from its current records
///
/// # Returns
/// * `String` - The full document with a doctype preamble
pub fn regenerate(page: &mut PageModel) -> String {
    let PageModel {
        profile,
        document,
        sections,
        ..
    } = page;
    for section in sections.iter() {
        rebuild_section(&mut document.tree, section, profile);
    }
    serialize(document)
}

/// Serialize a document after the doctype preamble
///
/// Top-level elements and comments are kept; the original doctype node is
/// replaced by the preamble.
pub fn serialize(document: &Html) -> String {
    let mut out = String::from(DOCTYPE);
    for child in document.tree.root().children() {
        match child.value() {
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    out.push_str(&el.html());
                }
            }
            Node::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(&comment.comment);
                out.push_str("-->\n");
            }
            _ => {}
        }
    }
    out
}
