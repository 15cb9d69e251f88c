//! Directory-listing extraction
//!
//! Turns the HTML index pages served for day folders and for the per-game
//! `pitchers/` and `batters/` folders into typed children. A malformed anchor is
//! skipped on its own; it never aborts the rest of the listing.

use crate::config::LayoutConfig;
use crate::error::{ParseError, Result};
use crate::types::{ChildRef, EntityId, EntityLink, GameId};
use scraper::{ElementRef, Html, Selector};

/// Which parse rule to apply to a listing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListingKind {
    /// Day folder: anchors naming game folders
    DayChildren,
    /// Pitchers/batters folder: anchors linking entity files
    EntityChildren,
}

/// Listing parser configured with the game prefix and header marker
#[derive(Clone, Debug)]
pub struct ListingExtractor {
    game_prefix: String,
    header_marker: char,
}

impl ListingExtractor {
    /// Create an extractor from the remote layout
    pub fn new(layout: &LayoutConfig) -> Self {
        Self {
            game_prefix: layout.game_prefix.clone(),
            header_marker: layout.header_marker,
        }
    }

    /// Parse `document` with the rule selected by `kind`
    ///
    /// The whole document is parsed before this returns; the iterator is consumed once.
    pub fn extract_children(
        &self,
        document: &str,
        kind: ListingKind,
    ) -> Result<impl Iterator<Item = ChildRef> + use<>> {
        let children: Vec<ChildRef> = match kind {
            ListingKind::DayChildren => self
                .game_ids(document)?
                .into_iter()
                .map(ChildRef::Game)
                .collect(),
            ListingKind::EntityChildren => self
                .entity_links(document)?
                .into_iter()
                .map(ChildRef::Entity)
                .collect(),
        };
        Ok(children.into_iter())
    }

    /// Game identifiers of a day listing, in document order
    pub fn game_ids(&self, document: &str) -> Result<Vec<GameId>> {
        let html = Html::parse_document(document);
        let anchors = anchor_selector()?;

        let games = html
            .select(&anchors)
            .filter_map(|anchor| {
                let text = link_text(&anchor);
                let id = text.trim_end_matches('/');
                if id.starts_with(self.game_prefix.as_str()) {
                    Some(GameId(id.to_string()))
                } else {
                    None
                }
            })
            .collect();
        Ok(games)
    }

    /// Entity rows of a pitchers/batters listing, in document order
    pub fn entity_links(&self, document: &str) -> Result<Vec<EntityLink>> {
        let html = Html::parse_document(document);
        let anchors = anchor_selector()?;

        let mut links = Vec::new();
        for anchor in html.select(&anchors) {
            let text = link_text(&anchor);
            if text.starts_with(self.header_marker) {
                continue;
            }
            match parse_entity_anchor(&anchor, &text) {
                Ok(link) => links.push(link),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping malformed listing anchor");
                }
            }
        }
        Ok(links)
    }
}

fn anchor_selector() -> Result<Selector> {
    Selector::parse("a").map_err(|e| {
        ParseError::InvalidSelector {
            selector: "a".to_string(),
            reason: format!("{e:?}"),
        }
        .into()
    })
}

fn link_text(anchor: &ElementRef<'_>) -> String {
    anchor.text().collect::<String>().trim().to_string()
}

fn parse_entity_anchor(anchor: &ElementRef<'_>, text: &str) -> Result<EntityLink> {
    let href = anchor
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ParseError::MissingHref {
            text: text.to_string(),
        })?;
    let id = parse_entity_id(href)?;
    Ok(EntityLink {
        id,
        href: href.to_string(),
    })
}

/// Parse the trailing numeric component of the href's file name, ignoring every extension
///
/// The stem ends at the first dot. `111.xml`, `/pitchers/111.xml`, `p111.xml` and
/// `111.xml.gz` all yield `111`.
pub fn parse_entity_id(href: &str) -> Result<EntityId> {
    let invalid = || ParseError::InvalidEntityId {
        href: href.to_string(),
    };

    let file_name = href.rsplit('/').find(|s| !s.is_empty()).ok_or_else(invalid)?;
    let stem = match file_name.split_once('.') {
        Some((stem, _ext)) => stem,
        None => file_name,
    };
    let digits_start = stem
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)
        .ok_or_else(invalid)?;

    stem[digits_start..]
        .parse::<EntityId>()
        .map_err(|_| invalid().into())
}
