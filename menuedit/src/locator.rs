//! Structural locators and ordered locator cascades
//!
//! A locator finds the nodes that play one role (section, container, item,
//! name, description, price slot) inside a scope node. A cascade is an
//! ordered list of locators tried in sequence; the first one that matches
//! wins. Cascades are plain data so new page layouts only need new lists.

use scraper::{ElementRef, Selector};
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised while compiling locator patterns
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// The pattern is not a valid CSS selector
    #[error("Invalid locator '{pattern}': {reason}")]
    InvalidSelector {
        /// The offending pattern as written in the configuration
        pattern: String,
        /// Parser diagnostic
        reason: String,
    },

    /// The pattern is empty (or only a child marker)
    #[error("Empty locator pattern")]
    Empty,
}

/// A single structural matcher
#[derive(Debug, Clone)]
pub enum Locator {
    /// Any descendant of the scope matching the selector
    Descendant(Selector),
    /// Only direct children of the scope matching the selector
    Child(Selector),
}

impl Locator {
    /// Compile a locator pattern
    ///
    /// # Parameters
    /// * `pattern` - CSS selector, optionally prefixed with `>` for direct children
    ///
    /// # Returns
    /// * `Ok(Locator)` - Compiled locator
    /// * `Err(LocatorError)` - Empty or unparsable pattern
    pub fn parse(pattern: &str) -> Result<Self, LocatorError> {
        let trimmed = pattern.trim();
        let (child_only, body) = match trimmed.strip_prefix('>') {
            Some(rest) => (true, rest.trim()),
            None => (false, trimmed),
        };
        if body.is_empty() {
            return Err(LocatorError::Empty);
        }

        let selector = Selector::parse(body).map_err(|e| LocatorError::InvalidSelector {
            pattern: pattern.to_string(),
            reason: format!("{:?}", e),
        })?;

        Ok(if child_only {
            Locator::Child(selector)
        } else {
            Locator::Descendant(selector)
        })
    }

    fn selector(&self) -> &Selector {
        match self {
            Locator::Descendant(selector) | Locator::Child(selector) => selector,
        }
    }

    /// All matches inside `scope`, in document order. The scope itself never matches.
    pub fn find_all<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        match self {
            Locator::Descendant(selector) => descendant_elements(scope)
                .filter(|el| selector.matches(el))
                .collect(),
            Locator::Child(selector) => child_elements(scope)
                .filter(|el| selector.matches(el))
                .collect(),
        }
    }

    /// First match inside `scope`, in document order
    pub fn find_first<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        match self {
            Locator::Descendant(selector) => {
                descendant_elements(scope).find(|el| selector.matches(el))
            }
            Locator::Child(selector) => child_elements(scope).find(|el| selector.matches(el)),
        }
    }

    /// Whether `element` itself satisfies the locator's selector
    pub fn matches(&self, element: &ElementRef<'_>) -> bool {
        self.selector().matches(element)
    }
}

/// Ordered fallback list of locators
#[derive(Debug, Clone, Default)]
pub struct Cascade {
    locators: Vec<Locator>,
}

impl Cascade {
    /// Compile every pattern of a configured list, keeping its order
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, LocatorError> {
        let locators = patterns
            .iter()
            .map(|p| Locator::parse(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { locators })
    }

    pub fn len(&self) -> usize {
        self.locators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }

    /// First match of the first locator that matches anything
    pub fn first_match<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.locators.iter().find_map(|l| l.find_first(scope))
    }

    /// All matches of the first locator with at least one match
    ///
    /// # Returns
    /// * `Some((locator, nodes))` - The winning locator and its matches in document order
    /// * `None` - No locator in the cascade matched anything
    pub fn first_non_empty<'a>(
        &self,
        scope: ElementRef<'a>,
    ) -> Option<(&Locator, Vec<ElementRef<'a>>)> {
        self.locators.iter().find_map(|locator| {
            let found = locator.find_all(scope);
            (!found.is_empty()).then_some((locator, found))
        })
    }

    /// Union of every locator's matches, in cascade order, each node once
    pub fn collect_unique<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for locator in &self.locators {
            for el in locator.find_all(scope) {
                if seen.insert(el.id()) {
                    out.push(el);
                }
            }
        }
        out
    }

    /// Whether any locator's selector matches `element` itself
    pub fn matches(&self, element: &ElementRef<'_>) -> bool {
        self.locators.iter().any(|l| l.matches(element))
    }
}

/// Descendant elements of `scope` in document order, excluding `scope`
pub fn descendant_elements<'a>(scope: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    scope.descendants().skip(1).filter_map(ElementRef::wrap)
}

/// Direct child elements of `scope`
pub fn child_elements<'a>(scope: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    scope.children().filter_map(ElementRef::wrap)
}

/// Text content of an element with surrounding whitespace removed
pub fn trimmed_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    const FRAGMENT: &str = r#"
        <div class="table">
          <div class="item"><span class="name">A</span></div>
          <div class="row"><div class="item"><span class="name">B</span></div></div>
          <div class="item"><span class="name">C</span></div>
        </div>"#;

    fn table(doc: &Html) -> ElementRef<'_> {
        let sel = Selector::parse(".table").unwrap();
        doc.select(&sel).next().unwrap()
    }

    #[test]
    fn test_descendant_locator_finds_nested_items() {
        let doc = Html::parse_document(FRAGMENT);
        let locator = Locator::parse(".item").unwrap();

        let names: Vec<String> = locator
            .find_all(table(&doc))
            .into_iter()
            .map(trimmed_text)
            .collect();

        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_child_locator_skips_nested_items() {
        let doc = Html::parse_document(FRAGMENT);
        let locator = Locator::parse("> .item").unwrap();

        let names: Vec<String> = locator
            .find_all(table(&doc))
            .into_iter()
            .map(trimmed_text)
            .collect();

        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_scope_never_matches_itself() {
        let doc = Html::parse_document(FRAGMENT);
        let locator = Locator::parse(".table").unwrap();
        assert!(locator.find_first(table(&doc)).is_none());
    }

    #[test]
    fn test_cascade_first_non_empty_wins() {
        let doc = Html::parse_document(FRAGMENT);
        let cascade = Cascade::compile(&[".missing", "> .item", ".item"]).unwrap();

        let (locator, found) = cascade.first_non_empty(table(&doc)).unwrap();

        assert!(matches!(locator, Locator::Child(_)));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_cascade_collect_unique_deduplicates() {
        let doc = Html::parse_document(FRAGMENT);
        let cascade = Cascade::compile(&[".row .name", ".name"]).unwrap();

        let texts: Vec<String> = cascade
            .collect_unique(table(&doc))
            .into_iter()
            .map(trimmed_text)
            .collect();

        assert_eq!(texts, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_invalid_patterns_are_rejected() {
        assert_eq!(Locator::parse(" > ").unwrap_err(), LocatorError::Empty);
        assert!(matches!(
            Locator::parse("div[").unwrap_err(),
            LocatorError::InvalidSelector { .. }
        ));
    }
}
