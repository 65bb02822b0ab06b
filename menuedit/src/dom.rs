//! Low-level document tree surgery
//!
//! The parsed document is an arena tree (`ego_tree::Tree<scraper::Node>`);
//! nodes are addressed by `NodeId`. These helpers copy subtrees between
//! trees, replace text content and detach nodes.

use ego_tree::{NodeId, NodeRef, Tree};
use scraper::node::Text;
use scraper::Node;
use tendril::StrTendril;

/// Copy the subtree rooted at `node` into a new standalone tree
pub fn snapshot(node: NodeRef<'_, Node>) -> Tree<Node> {
    let mut tree = Tree::new(node.value().clone());
    let root = tree.root().id();
    copy_children(&mut tree, root, node);
    tree
}

/// Append a deep copy of `fragment` as the last child of `parent`
///
/// # Returns
/// * `Some(NodeId)` - Id of the copied fragment root inside `tree`
/// * `None` - `parent` does not exist in `tree`
pub fn graft(tree: &mut Tree<Node>, parent: NodeId, fragment: NodeRef<'_, Node>) -> Option<NodeId> {
    let id = tree.get_mut(parent)?.append(fragment.value().clone()).id();
    copy_children(tree, id, fragment);
    Some(id)
}

fn copy_children(tree: &mut Tree<Node>, parent: NodeId, source: NodeRef<'_, Node>) {
    for child in source.children() {
        let id = match tree.get_mut(parent) {
            Some(mut node) => node.append(child.value().clone()).id(),
            None => return,
        };
        copy_children(tree, id, child);
    }
}

/// Replace all children of `id` with a single text node
///
/// An empty `value` leaves the node without children.
pub fn set_text(tree: &mut Tree<Node>, id: NodeId, value: &str) {
    let children: Vec<NodeId> = match tree.get(id) {
        Some(node) => node.children().map(|c| c.id()).collect(),
        None => return,
    };
    for child in children {
        detach(tree, child);
    }
    if value.is_empty() {
        return;
    }
    if let Some(mut node) = tree.get_mut(id) {
        node.append(Node::Text(Text {
            text: StrTendril::from_slice(value),
        }));
    }
}

/// Unlink a node (and its subtree) from its parent
pub fn detach(tree: &mut Tree<Node>, id: NodeId) {
    if let Some(mut node) = tree.get_mut(id) {
        node.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{ElementRef, Html, Selector};

    fn first(doc: &Html, css: &str) -> NodeId {
        let sel = Selector::parse(css).unwrap();
        doc.select(&sel).next().unwrap().id()
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let mut doc = Html::parse_document(r#"<div class="item"><b>Gin</b> <i>12</i></div>"#);
        let item = first(&doc, ".item");

        let copy = snapshot(doc.tree.get(item).unwrap());
        let bold = first(&doc, "b");
        set_text(&mut doc.tree, bold, "Rum");

        let copied = ElementRef::wrap(copy.root()).unwrap();
        assert_eq!(copied.html(), r#"<div class="item"><b>Gin</b> <i>12</i></div>"#);
    }

    #[test]
    fn test_graft_appends_last() {
        let mut doc = Html::parse_document(r#"<ul><li>a</li></ul>"#);
        let list = first(&doc, "ul");
        let fragment = Html::parse_fragment("<li>b</li>");
        let li = fragment
            .tree
            .root()
            .descendants()
            .find(|n| n.value().as_element().is_some_and(|e| e.name() == "li"))
            .unwrap();

        graft(&mut doc.tree, list, li).unwrap();

        let ul = ElementRef::wrap(doc.tree.get(list).unwrap()).unwrap();
        assert_eq!(ul.inner_html(), "<li>a</li><li>b</li>");
    }

    #[test]
    fn test_set_text_replaces_markup() {
        let mut doc = Html::parse_document(r#"<p class="d">old <em>text</em></p>"#);
        let p = first(&doc, ".d");

        set_text(&mut doc.tree, p, "new");
        let el = ElementRef::wrap(doc.tree.get(p).unwrap()).unwrap();
        assert_eq!(el.inner_html(), "new");

        set_text(&mut doc.tree, p, "");
        let el = ElementRef::wrap(doc.tree.get(p).unwrap()).unwrap();
        assert_eq!(el.inner_html(), "");
    }
}
