//! Schema inference for a section's items
//!
//! The first item node of a container decides the section's layout: where
//! the name lives, whether there is a description, how many price slots
//! exist and what they are called. The same slot-location rules are reused by
//! the reader and the writer so all three agree on every item.

use crate::locator::{child_elements, Locator};
use crate::page_model::ItemTemplate;
use crate::site_config::PageProfile;
use ego_tree::NodeId;
use scraper::ElementRef;

/// Field nodes of one item
#[derive(Debug, Clone)]
pub struct FieldSlots<'a> {
    pub name: ElementRef<'a>,
    pub description: Option<ElementRef<'a>>,
    pub price_group: Option<ElementRef<'a>>,
    pub prices: Vec<ElementRef<'a>>,
}

/// Node ids of an item's field slots, detached from any borrow of the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotIds {
    pub name: NodeId,
    pub description: Option<NodeId>,
    pub prices: Vec<NodeId>,
}

impl<'a> FieldSlots<'a> {
    pub fn ids(&self) -> SlotIds {
        SlotIds {
            name: self.name.id(),
            description: self.description.map(|el| el.id()),
            prices: self.prices.iter().map(|el| el.id()).collect(),
        }
    }
}

/// Layout inferred from a container's first item
#[derive(Debug)]
pub struct SectionSchema<'a> {
    /// Locator that matched the item nodes
    pub item_locator: Locator,
    /// Every matched item node, in document order
    pub items: Vec<ElementRef<'a>>,
    /// Snapshot of the first item
    pub template: ItemTemplate,
    /// Frozen labels, one per price slot of the first item
    pub price_labels: Vec<String>,
    pub uses_description: bool,
}

/// Infer the item layout of a container
///
/// # Parameters
/// * `container` - Node holding the section's items
/// * `header_labels` - Column labels declared by the section, possibly empty
/// * `profile` - Compiled locator cascades for the page
///
/// # Returns
/// * `Some(SectionSchema)` - Items found; schema derived from the first one
/// * `None` - No item locator matched anything in the container
pub fn infer_section<'a>(
    container: ElementRef<'a>,
    header_labels: &[String],
    profile: &PageProfile,
) -> Option<SectionSchema<'a>> {
    let (locator, items) = profile.items.first_non_empty(container)?;
    let first = *items.first()?;

    let slots = locate_fields(first, profile);
    let price_labels = compute_price_labels(header_labels, slots.prices.len());

    Some(SectionSchema {
        item_locator: locator.clone(),
        template: ItemTemplate::capture(first),
        uses_description: slots.description.is_some(),
        price_labels,
        items,
    })
}

/// Locate the name, description and price slots of an item
pub fn locate_fields<'a>(item: ElementRef<'a>, profile: &PageProfile) -> FieldSlots<'a> {
    let name = locate_name(item, profile);
    let description = profile.descriptions.first_match(item);
    let price_group = profile.price_groups.first_match(item);
    let prices = match price_group {
        Some(group) => profile.price_group_slots.collect_unique(group),
        None => locate_standalone_prices(item, name, profile),
    };

    FieldSlots {
        name,
        description,
        price_group,
        prices,
    }
}

fn locate_name<'a>(item: ElementRef<'a>, profile: &PageProfile) -> ElementRef<'a> {
    if let Some(el) = profile.names.first_match(item) {
        return el;
    }
    match child_elements(item).find(|child| !is_price_like(child, profile)) {
        Some(child) => {
            log::debug!("{}: name falls back to first non-price child <{}>", profile.id, child.value().name());
            child
        }
        None => item,
    }
}

fn locate_standalone_prices<'a>(
    item: ElementRef<'a>,
    name: ElementRef<'a>,
    profile: &PageProfile,
) -> Vec<ElementRef<'a>> {
    let found: Vec<ElementRef<'a>> = profile
        .prices
        .collect_unique(item)
        .into_iter()
        .filter(|el| !inside_price_group(*el, item, profile))
        .collect();
    if !found.is_empty() {
        return found;
    }

    let numeric: Vec<ElementRef<'a>> = child_elements(item)
        .filter(|child| child.id() != name.id())
        .filter(|child| has_digit(*child))
        .collect();
    if !numeric.is_empty() {
        log::debug!("{}: prices fall back to {} numeric children", profile.id, numeric.len());
    }
    numeric
}

/// Whether `el`, or an ancestor up to and including `item`, is a price group
fn inside_price_group(el: ElementRef<'_>, item: ElementRef<'_>, profile: &PageProfile) -> bool {
    let mut current = Some(el);
    while let Some(node) = current {
        if profile.price_groups.matches(&node) {
            return true;
        }
        if node.id() == item.id() {
            break;
        }
        current = node.parent().and_then(ElementRef::wrap);
    }
    false
}

/// Shallow lexical check of the class attribute
pub fn is_price_like(el: &ElementRef<'_>, profile: &PageProfile) -> bool {
    el.value()
        .attr("class")
        .is_some_and(|class| profile.price_like.is_match(class))
}

fn has_digit(el: ElementRef<'_>) -> bool {
    el.text().any(|t| t.chars().any(|c| c.is_ascii_digit()))
}

/// Label price slots
///
/// Header labels win when there are at least as many as slots; otherwise a
/// single slot is "Price" and several are "Price 1", "Price 2", ...
pub fn compute_price_labels(header_labels: &[String], slot_count: usize) -> Vec<String> {
    if header_labels.len() >= slot_count {
        header_labels[..slot_count].to_vec()
    } else if slot_count == 1 {
        vec!["Price".to_string()]
    } else {
        (1..=slot_count).map(|i| format!("Price {}", i)).collect()
    }
}
