//! Editing session
//!
//! A `Session` caches one edit model per opened page plus the offers editor.
//! Pages are loaded on first open and kept until reset; a failed load leaves
//! the cache as it was. Save and copy go through a `Sink`, and only a
//! delivered result clears the dirty flag.

use crate::edit_model::{EditCommand, EditError, PageEditModel};
use crate::loader::{LoadError, PageSource};
use crate::offers::{OffersDocument, OffersEditModel, OffersError};
use crate::pipeline::{build_page, load_page};
use crate::sink::{Sink, SinkError, HTML_MEDIA_TYPE, JSON_MEDIA_TYPE};
use crate::site_config::{ConfigError, SiteConfig};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use thiserror::Error;

/// Errors surfaced by session operations
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Offers(#[from] OffersError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    /// Save, copy or edit was requested for a page that is not open
    #[error("Page '{0}' is not open")]
    NotOpen(String),
}

/// Open pages and the offers editor for one site
pub struct Session<S: PageSource> {
    config: SiteConfig,
    source: S,
    pages: HashMap<String, PageEditModel>,
    offers: Option<OffersEditModel>,
}

impl<S: PageSource> Session<S> {
    pub fn new(config: SiteConfig, source: S) -> Self {
        Self {
            config,
            source,
            pages: HashMap::new(),
            offers: None,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Open a page, loading it on first use
    ///
    /// # Parameters
    /// * `id` - Page identifier from the configuration
    ///
    /// # Returns
    /// * `Ok(&mut PageEditModel)` - Cached or freshly loaded page
    /// * `Err(SessionError)` - Unknown page id or load failure; nothing is cached
    pub fn open(&mut self, id: &str) -> Result<&mut PageEditModel, SessionError> {
        match self.pages.entry(id.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let profile = self.config.profile(id)?;
                let page = load_page(&self.source, &profile)?;
                Ok(entry.insert(PageEditModel::new(page)))
            }
        }
    }

    /// A page that is already open
    pub fn page(&self, id: &str) -> Option<&PageEditModel> {
        self.pages.get(id)
    }

    /// Apply a command to a page, opening it first if needed
    ///
    /// # Returns
    /// * `Ok(bool)` - The page's new dirty state
    pub fn apply_edit(&mut self, id: &str, command: EditCommand) -> Result<bool, SessionError> {
        Ok(self.open(id)?.apply_edit(command)?)
    }

    /// Discard a page's edits and rebuild it from the text it was loaded from
    ///
    /// A page that was never opened is loaded from the source instead.
    pub fn reset(&mut self, id: &str) -> Result<&mut PageEditModel, SessionError> {
        match self.pages.remove(id) {
            Some(model) => {
                let page = model.page();
                let rebuilt = build_page(&page.profile, page.original_html.clone());
                log::info!("Reset {}", id);
                Ok(self
                    .pages
                    .entry(id.to_string())
                    .or_insert(PageEditModel::new(rebuilt)))
            }
            None => self.open(id),
        }
    }

    /// Regenerate a page and deliver it as a named file
    pub fn save(&mut self, id: &str, sink: &mut dyn Sink) -> Result<(), SessionError> {
        let model = self.open_page_mut(id)?;
        let html = model.regenerate();
        let file = model.page().profile.file.clone();
        deliver(sink.download(&file, &html, HTML_MEDIA_TYPE), &file)?;
        model.mark_clean();
        Ok(())
    }

    /// Regenerate a page and deliver the bare markup
    pub fn copy(&mut self, id: &str, sink: &mut dyn Sink) -> Result<(), SessionError> {
        let model = self.open_page_mut(id)?;
        let html = model.regenerate();
        deliver(sink.copy(&html), id)?;
        model.mark_clean();
        Ok(())
    }

    /// Open the offers editor, loading the document on first use
    pub fn open_offers(&mut self) -> Result<&mut OffersEditModel, SessionError> {
        if self.offers.is_none() {
            let file = self.config.offers_file.clone();
            let text = self.source.fetch(&file)?;
            let data = OffersDocument::parse(&file, &text)?;
            log::info!("Loaded {}: {} day(s)", file, data.days.len());
            self.offers = Some(OffersEditModel::new(&file, data));
        }
        self.offers
            .as_mut()
            .ok_or_else(|| SessionError::NotOpen("offers".to_string()))
    }

    /// Restore the offers editor to its last clean state
    pub fn reset_offers(&mut self) -> Result<(), SessionError> {
        self.offers_mut()?.reset();
        Ok(())
    }

    /// Deliver the offers document as a named file
    pub fn save_offers(&mut self, sink: &mut dyn Sink) -> Result<(), SessionError> {
        let offers = self.offers_mut()?;
        let json = offers.data().to_json()?;
        let file = offers.file().to_string();
        deliver(sink.download(&file, &json, JSON_MEDIA_TYPE), &file)?;
        offers.mark_clean();
        Ok(())
    }

    /// Deliver the bare offers JSON
    pub fn copy_offers(&mut self, sink: &mut dyn Sink) -> Result<(), SessionError> {
        let offers = self.offers_mut()?;
        let json = offers.data().to_json()?;
        let file = offers.file().to_string();
        deliver(sink.copy(&json), &file)?;
        offers.mark_clean();
        Ok(())
    }

    /// Open pages with undelivered edits, sorted, then `offers` if its editor is dirty
    pub fn unsaved(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .pages
            .iter()
            .filter(|(_, model)| model.is_dirty())
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        if self.offers.as_ref().is_some_and(|o| o.is_dirty()) {
            ids.push("offers");
        }
        ids
    }

    /// Whether any open page or the offers editor holds undelivered edits
    pub fn has_unsaved_changes(&self) -> bool {
        !self.unsaved().is_empty()
    }

    fn open_page_mut(&mut self, id: &str) -> Result<&mut PageEditModel, SessionError> {
        self.pages
            .get_mut(id)
            .ok_or_else(|| SessionError::NotOpen(id.to_string()))
    }

    fn offers_mut(&mut self) -> Result<&mut OffersEditModel, SessionError> {
        self.offers
            .as_mut()
            .ok_or_else(|| SessionError::NotOpen("offers".to_string()))
    }
}

fn deliver(result: Result<(), SinkError>, what: &str) -> Result<(), SinkError> {
    match &result {
        Ok(()) => log::info!("Delivered {}", what),
        Err(e) => log::warn!("Could not deliver {}: {}", what, e),
    }
    result
}
