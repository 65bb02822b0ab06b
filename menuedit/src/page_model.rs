//! In-memory model of one loaded menu page
//!
//! A `PageModel` owns the parsed document, the raw source text it came from
//! and the sections found in it. Each `SectionModel` points at its item
//! container inside the document and keeps an immutable snapshot of its first
//! item, used as the template for every regenerated item node.

use crate::dom;
use crate::locator::Locator;
use crate::site_config::PageProfile;
use ego_tree::{NodeId, Tree};
use scraper::{ElementRef, Html, Node};

/// One loaded page
#[derive(Debug)]
pub struct PageModel {
    /// Compiled page definition the model was built with
    pub profile: PageProfile,
    /// Parsed document tree
    pub document: Html,
    /// Source text as loaded, used to rebuild the model on reset
    pub original_html: String,
    /// Sections that contain items, in document order
    pub sections: Vec<SectionModel>,
}

impl PageModel {
    /// Page identifier
    pub fn id(&self) -> &str {
        &self.profile.id
    }

    /// Total number of items across all sections, removed ones included
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }
}

/// One section of a page
#[derive(Debug)]
pub struct SectionModel {
    /// Identifier of the form `{page}-section-{index}`
    pub id: String,
    /// Heading text, or `Section N` when the section has no heading
    pub title: String,
    /// Item container inside the page document
    pub container: NodeId,
    /// Locator that matched this section's item nodes
    pub item_locator: Locator,
    /// Snapshot of the first item node
    pub template: ItemTemplate,
    /// Column labels declared in the section header
    pub header_labels: Vec<String>,
    /// Frozen price labels, one per price slot
    pub price_labels: Vec<String>,
    /// Whether items carry a description field
    pub uses_description: bool,
    /// Item records in display order
    pub items: Vec<ItemRecord>,
    /// Counter for identifiers of items added in this session
    pub(crate) next_new: usize,
}

impl SectionModel {
    /// Number of items not marked removed
    pub fn visible_count(&self) -> usize {
        self.items.iter().filter(|item| !item.removed).count()
    }

    /// A blank record shaped by the section's frozen labels
    pub(crate) fn blank_item(&mut self) -> ItemRecord {
        let id = format!("{}-new-{}", self.id, self.next_new);
        self.next_new += 1;
        ItemRecord {
            id,
            name: String::new(),
            description: self.uses_description.then(String::new),
            prices: self
                .price_labels
                .iter()
                .map(|label| PricePair::new(label, ""))
                .collect(),
            removed: false,
            is_new: true,
        }
    }
}

/// One menu item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    /// Identifier of the form `{section}-item-{n}` or `{section}-new-{n}`
    pub id: String,
    pub name: String,
    /// Present only when the section uses descriptions
    pub description: Option<String>,
    /// Price values aligned with the section's price labels
    pub prices: Vec<PricePair>,
    /// Soft-delete flag
    pub removed: bool,
    /// Created in this session rather than read from the document
    pub is_new: bool,
}

/// A labeled price value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricePair {
    pub label: String,
    pub value: String,
}

impl PricePair {
    pub fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

/// Immutable structural copy of a section's first item
#[derive(Debug, Clone)]
pub struct ItemTemplate {
    tree: Tree<Node>,
}

impl ItemTemplate {
    /// Capture a deep copy of `item`
    pub fn capture(item: ElementRef<'_>) -> Self {
        Self {
            tree: dom::snapshot(*item),
        }
    }

    /// The template's item element
    pub fn root(&self) -> Option<ElementRef<'_>> {
        ElementRef::wrap(self.tree.root())
    }

    /// A fresh copy of the template tree, free to mutate
    pub fn instantiate(&self) -> Tree<Node> {
        self.tree.clone()
    }

    /// Serialized template markup
    pub fn html(&self) -> String {
        self.root().map(|el| el.html()).unwrap_or_default()
    }
}
