use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::collection::{self, CollectionKind, ALL_KINDS};
use crate::favorites::FavoritesStore;
use crate::filter::{self, FilterCriteria};
use crate::index::UniversalIndex;
use crate::pager::Pager;

pub const DEFAULT_AUTH_URL: &str = "http://localhost:5000";

/// Shown when an entry's real sprite could not be resolved.
pub const SPRITE_PLACEHOLDER: &str =
    "https://upload.wikimedia.org/wikipedia/commons/b/b1/Loading_icon.gif";

/// Ticks a transient status notice stays on screen.
pub const NOTICE_TICKS: u16 = 12;

/// Minimal listing record: every collection endpoint is normalized to
/// named, URL-referenced entries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub name: String,
    pub url: String,
}

/// A listing entry plus the derived display fields its detail record
/// provides. Which fields are populated depends on the collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnrichedEntry {
    pub name: String,
    pub url: String,
    pub numeric_id: Option<u32>,
    pub sprite_url: String,
    pub generation: Option<u8>,
    pub cost: Option<u32>,
    pub category: Option<String>,
    pub effect_text: Option<String>,
    pub market_price: Option<f64>,
    pub rarity: Option<String>,
}

impl EnrichedEntry {
    /// Lightweight enrichment straight from a listing entry: whatever
    /// can be derived without a detail fetch (id from the URL, sprite
    /// from the CDN name/id pattern). Used for universal search rows.
    pub fn from_listing(kind: CollectionKind, entry: &CollectionEntry) -> Self {
        let numeric_id = collection::id_from_url(&entry.url);
        let sprite_url = match kind {
            CollectionKind::Items => collection::item_sprite_url(&entry.name),
            CollectionKind::Pokemon => numeric_id
                .map(collection::pokemon_sprite_url)
                .unwrap_or_else(|| SPRITE_PLACEHOLDER.to_string()),
            CollectionKind::Cards | CollectionKind::Sets => SPRITE_PLACEHOLDER.to_string(),
        };
        Self {
            name: entry.name.clone(),
            url: entry.url.clone(),
            numeric_id,
            sprite_url,
            generation: numeric_id
                .filter(|_| kind == CollectionKind::Pokemon)
                .and_then(collection::generation_of),
            cost: None,
            category: None,
            effect_text: None,
            market_price: None,
            rarity: None,
        }
    }

    /// Stand-in for an entry whose detail fetch failed: placeholder
    /// sprite, no derived fields. The batch keeps going.
    pub fn fallback(kind: CollectionKind, entry: &CollectionEntry) -> Self {
        let mut enriched = Self::from_listing(kind, entry);
        enriched.sprite_url = SPRITE_PLACEHOLDER.to_string();
        enriched
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub active: bool,
    pub query: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum LoginField {
    Username,
    Password,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum AuthMode {
    Login,
    Register,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    pub authenticated: bool,
    pub username: String,
    pub password: String,
    pub field: LoginField,
    pub mode: AuthMode,
    pub submitting: bool,
    pub error: Option<String>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            authenticated: false,
            username: String::new(),
            password: String::new(),
            field: LoginField::Username,
            mode: AuthMode::Login,
            submitting: false,
            error: None,
        }
    }
}

impl AuthState {
    pub fn field_value_mut(&mut self) -> &mut String {
        match self.field {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn reset_form(&mut self) {
        self.username.clear();
        self.password.clear();
        self.field = LoginField::Username;
        self.submitting = false;
        self.error = None;
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub auth: AuthState,
    pub auth_url: String,

    pub collection: CollectionKind,
    pub pager: Pager,

    /// Raw entries of the current page, as listed.
    pub page_entries: Vec<CollectionEntry>,
    /// Enriched current page: Empty -> Loading -> Loaded/Failed.
    pub page: DataResource<Vec<EnrichedEntry>>,

    /// Universal matches feeding the grid while searching.
    pub search_results: Vec<EnrichedEntry>,
    pub search_loading: bool,
    /// Terminal error for a failed remote search, distinct from the
    /// page's own error state.
    pub search_error: Option<String>,
    pub search: SearchState,

    pub index: UniversalIndex,
    pub index_loading: HashSet<CollectionKind>,

    pub favorites: HashMap<CollectionKind, FavoritesStore>,

    pub criteria: FilterCriteria,
    /// The filtered, sorted list the grid renders. Derived; rebuilt by
    /// the reducer whenever any of its inputs change.
    pub visible: Vec<EnrichedEntry>,
    pub selected_index: usize,

    /// Guards against stale in-flight responses: results tagged with an
    /// older sequence number are dropped.
    pub request_seq: u64,

    pub message: Option<String>,
    pub message_ticks: u16,
    pub tick: u64,
}

impl AppState {
    pub fn new(auth_url: String, data_dir: PathBuf) -> Self {
        let favorites = ALL_KINDS
            .into_iter()
            .map(|kind| (kind, FavoritesStore::open(data_dir.join(favorites_file(kind)))))
            .collect();
        Self {
            terminal_size: (80, 24),
            auth: AuthState::default(),
            auth_url,
            collection: CollectionKind::Pokemon,
            pager: Pager::new(CollectionKind::Pokemon.page_size()),
            page_entries: Vec::new(),
            page: DataResource::Empty,
            search_results: Vec::new(),
            search_loading: false,
            search_error: None,
            search: SearchState::default(),
            index: UniversalIndex::default(),
            index_loading: HashSet::new(),
            favorites,
            criteria: FilterCriteria::default(),
            visible: Vec::new(),
            selected_index: 0,
            request_seq: 0,
            message: None,
            message_ticks: 0,
            tick: 0,
        }
    }

    pub fn favorite_names(&self) -> BTreeSet<String> {
        self.favorites
            .get(&self.collection)
            .map(|store| store.list().clone())
            .unwrap_or_default()
    }

    pub fn is_favorite(&self, name: &str) -> bool {
        self.favorites
            .get(&self.collection)
            .map(|store| store.is_favorite(name))
            .unwrap_or(false)
    }

    /// Recompute the displayed list from the current sources and clamp
    /// the selection into it.
    pub fn rebuild_visible(&mut self) {
        let page_entries = self.page.data().map(Vec::as_slice).unwrap_or(&[]);
        let favorites = self.favorite_names();
        self.visible = filter::apply(
            page_entries,
            &self.search_results,
            &self.criteria,
            &favorites,
        );
        if self.selected_index >= self.visible.len() {
            self.selected_index = 0;
        }
    }

    pub fn selected_entry(&self) -> Option<&EnrichedEntry> {
        self.visible.get(self.selected_index)
    }

    pub fn set_selected_index(&mut self, index: usize) -> bool {
        if self.visible.is_empty() {
            self.selected_index = 0;
            return false;
        }
        let bounded = index.min(self.visible.len() - 1);
        if bounded != self.selected_index {
            self.selected_index = bounded;
            return true;
        }
        false
    }

    /// Whether anything feeding the current view is still in flight.
    pub fn view_loading(&self) -> bool {
        if self.criteria.mode.is_searching() {
            self.search_loading
        } else {
            self.page.is_loading()
        }
    }

    pub fn set_notice(&mut self, message: String) {
        self.message = Some(message);
        self.message_ticks = NOTICE_TICKS;
    }
}

impl Default for AppState {
    fn default() -> Self {
        let data_dir = dirs_next::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pokegrid");
        Self::new(DEFAULT_AUTH_URL.to_string(), data_dir)
    }
}

fn favorites_file(kind: CollectionKind) -> &'static str {
    match kind {
        CollectionKind::Pokemon => "favorites.json",
        CollectionKind::Items => "item_favorites.json",
        CollectionKind::Cards => "card_favorites.json",
        CollectionKind::Sets => "set_favorites.json",
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        vec![
            DebugSection::new("View")
                .entry("collection", ron_string(&self.collection.label()))
                .entry("page", ron_string(&self.pager.current_page()))
                .entry("total_pages", ron_string(&self.pager.total_pages()))
                .entry("visible", ron_string(&self.visible.len()))
                .entry("selected", ron_string(&self.selected_index)),
            DebugSection::new("Filters")
                .entry("mode", ron_string(&self.criteria.mode))
                .entry("category", ron_string(&self.criteria.category.label()))
                .entry("sort", ron_string(&self.criteria.sort.label()))
                .entry("search_active", ron_string(&self.search.active))
                .entry("search_query", ron_string(&self.search.query)),
            DebugSection::new("Status")
                .entry("authenticated", ron_string(&self.auth.authenticated))
                .entry("page_loading", ron_string(&self.page.is_loading()))
                .entry("search_loading", ron_string(&self.search_loading))
                .entry("request_seq", ron_string(&self.request_seq))
                .entry("message", ron_string(&self.message)),
        ]
    }
}
