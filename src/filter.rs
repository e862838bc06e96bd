//! Filter pipeline: picks the source list for the current view mode,
//! applies the category/favorites filter, then sorts.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::state::EnrichedEntry;

/// Which list feeds the grid. Searching and paging are mutually
/// exclusive views: an active search always replaces the current page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ViewMode {
    Paginated,
    Searching(String),
}

impl ViewMode {
    pub fn is_searching(&self) -> bool {
        matches!(self, ViewMode::Searching(_))
    }

    pub fn query(&self) -> Option<&str> {
        match self {
            ViewMode::Paginated => None,
            ViewMode::Searching(query) => Some(query),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CategoryFilter {
    All,
    Favorites,
    Generation(u8),
    Category(String),
}

impl CategoryFilter {
    pub fn label(&self) -> String {
        match self {
            CategoryFilter::All => "all".to_string(),
            CategoryFilter::Favorites => "favorites".to_string(),
            CategoryFilter::Generation(gen) => format!("gen {gen}"),
            CategoryFilter::Category(name) => name.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Source order: dex/index order for pages, match order for searches.
    Index,
    NameAsc,
    NameDesc,
}

impl SortOrder {
    pub fn next(self) -> Self {
        match self {
            SortOrder::Index => SortOrder::NameAsc,
            SortOrder::NameAsc => SortOrder::NameDesc,
            SortOrder::NameDesc => SortOrder::Index,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Index => "index",
            SortOrder::NameAsc => "name a-z",
            SortOrder::NameDesc => "name z-a",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub mode: ViewMode,
    pub category: CategoryFilter,
    pub sort: SortOrder,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            mode: ViewMode::Paginated,
            category: CategoryFilter::All,
            sort: SortOrder::Index,
        }
    }
}

/// Produce the displayed list. In `Paginated` mode only `page_entries`
/// is consulted; in `Searching` mode only `universal_matches`. Inputs
/// are never mutated; zero survivors is a valid (empty) result.
pub fn apply(
    page_entries: &[EnrichedEntry],
    universal_matches: &[EnrichedEntry],
    criteria: &FilterCriteria,
    favorites: &BTreeSet<String>,
) -> Vec<EnrichedEntry> {
    let source = match &criteria.mode {
        ViewMode::Paginated => page_entries,
        ViewMode::Searching(_) => universal_matches,
    };

    let mut out: Vec<EnrichedEntry> = source
        .iter()
        .filter(|entry| matches_category(entry, &criteria.category, favorites))
        .cloned()
        .collect();

    match criteria.sort {
        SortOrder::Index => {}
        SortOrder::NameAsc => out.sort_by(|a, b| a.name.cmp(&b.name)),
        SortOrder::NameDesc => out.sort_by(|a, b| b.name.cmp(&a.name)),
    }
    out
}

fn matches_category(
    entry: &EnrichedEntry,
    category: &CategoryFilter,
    favorites: &BTreeSet<String>,
) -> bool {
    match category {
        CategoryFilter::All => true,
        CategoryFilter::Favorites => favorites.contains(&entry.name),
        CategoryFilter::Generation(gen) => entry.generation == Some(*gen),
        CategoryFilter::Category(name) => entry.category.as_deref() == Some(name.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> EnrichedEntry {
        EnrichedEntry {
            name: name.to_string(),
            url: format!("https://pokeapi.co/api/v2/pokemon/{name}"),
            numeric_id: None,
            sprite_url: String::new(),
            generation: None,
            cost: None,
            category: None,
            effect_text: None,
            market_price: None,
            rarity: None,
        }
    }

    fn criteria(mode: ViewMode) -> FilterCriteria {
        FilterCriteria {
            mode,
            category: CategoryFilter::All,
            sort: SortOrder::Index,
        }
    }

    #[test]
    fn test_paginated_mode_ignores_universal_matches() {
        let page = vec![entry("bulbasaur"), entry("ivysaur")];
        let universal = vec![entry("charmander")];
        let out = apply(
            &page,
            &universal,
            &criteria(ViewMode::Paginated),
            &BTreeSet::new(),
        );
        let names: Vec<_> = out.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["bulbasaur", "ivysaur"]);
    }

    #[test]
    fn test_searching_mode_ignores_page_entries() {
        let page = vec![entry("bulbasaur")];
        let universal = vec![entry("charmander"), entry("charmeleon")];
        let out = apply(
            &page,
            &universal,
            &criteria(ViewMode::Searching("char".into())),
            &BTreeSet::new(),
        );
        let names: Vec<_> = out.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["charmander", "charmeleon"]);
    }

    #[test]
    fn test_favorites_filter() {
        let page = vec![entry("pikachu"), entry("eevee"), entry("ditto")];
        let favorites: BTreeSet<String> = ["eevee".to_string()].into_iter().collect();
        let mut crit = criteria(ViewMode::Paginated);
        crit.category = CategoryFilter::Favorites;
        let out = apply(&page, &[], &crit, &favorites);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "eevee");
    }

    #[test]
    fn test_generation_filter() {
        let mut mew = entry("mew");
        mew.generation = Some(1);
        let mut chikorita = entry("chikorita");
        chikorita.generation = Some(2);
        let unknown = entry("missingno");

        let page = vec![mew, chikorita, unknown];
        let mut crit = criteria(ViewMode::Paginated);
        crit.category = CategoryFilter::Generation(2);
        let out = apply(&page, &[], &crit, &BTreeSet::new());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "chikorita");
    }

    #[test]
    fn test_category_filter_on_items() {
        let mut ball = entry("poke-ball");
        ball.category = Some("standard-balls".into());
        let mut potion = entry("potion");
        potion.category = Some("healing".into());

        let page = vec![ball, potion];
        let mut crit = criteria(ViewMode::Paginated);
        crit.category = CategoryFilter::Category("healing".into());
        let out = apply(&page, &[], &crit, &BTreeSet::new());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "potion");
    }

    #[test]
    fn test_sort_orders() {
        let page = vec![entry("squirtle"), entry("bulbasaur"), entry("charmander")];
        let mut crit = criteria(ViewMode::Paginated);

        crit.sort = SortOrder::NameAsc;
        let out = apply(&page, &[], &crit, &BTreeSet::new());
        let names: Vec<_> = out.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["bulbasaur", "charmander", "squirtle"]);

        crit.sort = SortOrder::NameDesc;
        let out = apply(&page, &[], &crit, &BTreeSet::new());
        let names: Vec<_> = out.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["squirtle", "charmander", "bulbasaur"]);

        crit.sort = SortOrder::Index;
        let out = apply(&page, &[], &crit, &BTreeSet::new());
        let names: Vec<_> = out.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["squirtle", "bulbasaur", "charmander"]);
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let out = apply(
            &[],
            &[],
            &criteria(ViewMode::Searching("zzz".into())),
            &BTreeSet::new(),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_inputs_are_untouched() {
        let page = vec![entry("b"), entry("a")];
        let mut crit = criteria(ViewMode::Paginated);
        crit.sort = SortOrder::NameAsc;
        let _ = apply(&page, &[], &crit, &BTreeSet::new());
        assert_eq!(page[0].name, "b");
        assert_eq!(page[1].name, "a");
    }
}
