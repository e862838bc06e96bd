use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::collection;
use crate::effect::Effect;
use crate::filter::{CategoryFilter, FilterCriteria, ViewMode};
use crate::pager::Pager;
use crate::state::{AppState, AuthMode, EnrichedEntry, LoginField, SearchState};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            // Nothing loads before authentication; a replayed session
            // that is already signed in resumes its collection.
            if state.auth.authenticated {
                return DispatchResult::changed_with_many(enter_collection(state));
            }
            DispatchResult::changed()
        }

        Action::AuthInput(ch) => {
            if state.auth.submitting {
                return DispatchResult::unchanged();
            }
            state.auth.field_value_mut().push(ch);
            state.auth.error = None;
            DispatchResult::changed()
        }

        Action::AuthBackspace => {
            if state.auth.submitting {
                return DispatchResult::unchanged();
            }
            if state.auth.field_value_mut().pop().is_none() {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::AuthFieldNext => {
            state.auth.field = match state.auth.field {
                LoginField::Username => LoginField::Password,
                LoginField::Password => LoginField::Username,
            };
            DispatchResult::changed()
        }

        Action::AuthModeToggle => {
            if state.auth.submitting {
                return DispatchResult::unchanged();
            }
            state.auth.mode = match state.auth.mode {
                AuthMode::Login => AuthMode::Register,
                AuthMode::Register => AuthMode::Login,
            };
            state.auth.error = None;
            DispatchResult::changed()
        }

        Action::AuthSubmit => {
            if state.auth.submitting {
                return DispatchResult::unchanged();
            }
            if state.auth.username.trim().is_empty() || state.auth.password.is_empty() {
                state.auth.error = Some("Username and password are required".to_string());
                return DispatchResult::changed();
            }
            state.auth.submitting = true;
            state.auth.error = None;
            let effect = match state.auth.mode {
                AuthMode::Login => Effect::Login {
                    base_url: state.auth_url.clone(),
                    username: state.auth.username.clone(),
                    password: state.auth.password.clone(),
                },
                AuthMode::Register => Effect::Register {
                    base_url: state.auth_url.clone(),
                    username: state.auth.username.clone(),
                    password: state.auth.password.clone(),
                },
            };
            DispatchResult::changed_with(effect)
        }

        Action::AuthDidSucceed { username } => {
            state.auth.reset_form();
            state.auth.authenticated = true;
            state.auth.username = username;
            DispatchResult::changed_with_many(enter_collection(state))
        }

        Action::AuthDidReject { message } => {
            state.auth.submitting = false;
            state.auth.error = Some(message);
            DispatchResult::changed()
        }

        Action::AuthDidError(error) => {
            state.auth.submitting = false;
            state.auth.error = Some(format!("Auth service error: {error}"));
            DispatchResult::changed()
        }

        Action::Logout => {
            if !state.auth.authenticated {
                return DispatchResult::unchanged();
            }
            state.auth = Default::default();
            // In-flight loads for the old session must not land.
            state.request_seq += 1;
            state.page = DataResource::Empty;
            state.page_entries.clear();
            state.search = SearchState::default();
            state.search_results.clear();
            state.search_loading = false;
            state.search_error = None;
            state.criteria = FilterCriteria::default();
            state.visible.clear();
            state.selected_index = 0;
            state.message = None;
            state.message_ticks = 0;
            // Favorites stay on disk and in memory across sessions.
            DispatchResult::changed()
        }

        Action::PageDidLoad {
            seq,
            entries,
            total_count,
        } => {
            if seq != state.request_seq || !state.auth.authenticated {
                return DispatchResult::unchanged();
            }
            state.pager.set_total_count(total_count);
            state.page_entries = entries.clone();
            // The page stays Loading until enrichment resolves.
            DispatchResult::changed_with(Effect::EnrichPage {
                seq,
                kind: state.collection,
                entries,
            })
        }

        Action::PageDidError { seq, error } => {
            if seq != state.request_seq || !state.auth.authenticated {
                return DispatchResult::unchanged();
            }
            state.page = DataResource::Failed(error);
            state.rebuild_visible();
            DispatchResult::changed()
        }

        Action::PageDidEnrich {
            seq,
            entries,
            failures,
        } => {
            if seq != state.request_seq || !state.auth.authenticated {
                return DispatchResult::unchanged();
            }
            state.page = DataResource::Loaded(entries);
            if failures > 0 {
                state.set_notice(format!("{failures} entries failed to enrich"));
            }
            state.rebuild_visible();
            DispatchResult::changed()
        }

        Action::PageNext => move_page(state, 1),
        Action::PagePrev => move_page(state, -1),

        Action::JumpToGeneration(gen) => {
            if !state.auth.authenticated || !state.collection.supports_generations() {
                return DispatchResult::unchanged();
            }
            let Some(first_id) = collection::generation_first_id(gen) else {
                return DispatchResult::unchanged();
            };
            let was_searching = exit_search(state);
            if state.pager.jump_to_containing(first_id) {
                let effect = start_page_load(state);
                return DispatchResult::changed_with(effect);
            }
            if was_searching {
                state.rebuild_visible();
                return DispatchResult::changed();
            }
            DispatchResult::unchanged()
        }

        Action::IndexDidLoad { kind, entries } => {
            state.index_loading.remove(&kind);
            state.index.insert(kind, entries);
            if state.collection == kind {
                if let ViewMode::Searching(query) = state.criteria.mode.clone() {
                    state.search_results = local_matches(state, &query);
                    state.search_loading = false;
                    state.rebuild_visible();
                }
            }
            DispatchResult::changed()
        }

        Action::IndexDidError { kind, error } => {
            state.index_loading.remove(&kind);
            if state.collection == kind && state.criteria.mode.is_searching() {
                state.search_loading = false;
                state.rebuild_visible();
            }
            state.set_notice(format!("{} index error: {error}", kind.label()));
            DispatchResult::changed()
        }

        Action::CollectionNext => switch_collection(state, 1),
        Action::CollectionPrev => switch_collection(state, -1),

        Action::SearchStart => {
            if !state.auth.authenticated || state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.active = true;
            state.search.query.clear();
            DispatchResult::changed()
        }

        Action::SearchInput(ch) => {
            if !state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.query.push(ch);
            DispatchResult::changed()
        }

        Action::SearchBackspace => {
            if !state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.query.pop();
            DispatchResult::changed()
        }

        Action::SearchCancel => {
            if exit_search(state) {
                state.rebuild_visible();
                return DispatchResult::changed();
            }
            DispatchResult::unchanged()
        }

        Action::SearchSubmit => {
            if !state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            let query = state.search.query.trim().to_lowercase();
            if query.is_empty() {
                exit_search(state);
                state.rebuild_visible();
                return DispatchResult::changed();
            }
            state.criteria.mode = ViewMode::Searching(query.clone());
            state.selected_index = 0;
            state.search_error = None;
            if !state.collection.supports_index() {
                state.request_seq += 1;
                state.search_loading = true;
                state.search_results.clear();
                state.rebuild_visible();
                return DispatchResult::changed_with(Effect::SearchCards {
                    seq: state.request_seq,
                    query,
                });
            }
            state.search_results = local_matches(state, &query);
            state.search_loading = state.index_loading.contains(&state.collection);
            state.rebuild_visible();
            DispatchResult::changed()
        }

        Action::CardSearchDidLoad { seq, entries } => {
            if seq != state.request_seq || !state.criteria.mode.is_searching() {
                return DispatchResult::unchanged();
            }
            state.search_loading = false;
            state.search_results = entries;
            state.rebuild_visible();
            DispatchResult::changed()
        }

        Action::CardSearchDidError { seq, error } => {
            if seq != state.request_seq || !state.criteria.mode.is_searching() {
                return DispatchResult::unchanged();
            }
            state.search_loading = false;
            state.search_results.clear();
            state.search_error = Some(error);
            state.rebuild_visible();
            DispatchResult::changed()
        }

        Action::FilterNext => cycle_category(state, 1),
        Action::FilterPrev => cycle_category(state, -1),

        Action::SortNext => {
            if !state.auth.authenticated {
                return DispatchResult::unchanged();
            }
            state.criteria.sort = state.criteria.sort.next();
            state.rebuild_visible();
            DispatchResult::changed()
        }

        Action::SelectionMove(delta) => {
            let mut index = state.selected_index as i16 + delta;
            if index < 0 {
                index = 0;
            }
            if !state.set_selected_index(index as usize) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::SelectionPage(delta) => {
            let page = list_page_size(state) as i16;
            let mut index = state.selected_index as i16 + delta * page;
            if index < 0 {
                index = 0;
            }
            if !state.set_selected_index(index as usize) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::Select(index) => {
            if !state.set_selected_index(index) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::ToggleFavorite => {
            if !state.auth.authenticated {
                return DispatchResult::unchanged();
            }
            let Some(name) = state.selected_entry().map(|entry| entry.name.clone()) else {
                return DispatchResult::unchanged();
            };
            let kind = state.collection;
            let Some(store) = state.favorites.get_mut(&kind) else {
                return DispatchResult::unchanged();
            };
            match store.toggle(&name) {
                Ok(_) => {
                    // Under the favorites filter the entry may have
                    // just left the visible list.
                    state.rebuild_visible();
                    DispatchResult::changed()
                }
                Err(error) => {
                    state.set_notice(error.to_string());
                    DispatchResult::changed()
                }
            }
        }

        Action::UiTerminalResize(width, height) => {
            if state.terminal_size != (width, height) {
                state.terminal_size = (width, height);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Tick => {
            state.tick = state.tick.wrapping_add(1);
            if state.message_ticks > 0 {
                state.message_ticks -= 1;
                if state.message_ticks == 0 {
                    state.message = None;
                    return DispatchResult::changed();
                }
            }
            DispatchResult::unchanged()
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

/// Leave search mode if it was engaged. Returns whether anything about
/// the search overlay or mode changed.
fn exit_search(state: &mut AppState) -> bool {
    let mut changed = state.search.active || !state.search.query.is_empty();
    state.search.active = false;
    state.search.query.clear();
    if state.criteria.mode.is_searching() {
        state.criteria.mode = ViewMode::Paginated;
        state.search_results.clear();
        state.search_loading = false;
        state.search_error = None;
        changed = true;
    }
    changed
}

/// Bump the request sequence and kick off a load of the pager's current
/// page. Every caller has already positioned the pager.
fn start_page_load(state: &mut AppState) -> Effect {
    state.request_seq += 1;
    state.page = DataResource::Loading;
    state.page_entries.clear();
    state.selected_index = 0;
    state.rebuild_visible();
    Effect::LoadPage {
        seq: state.request_seq,
        kind: state.collection,
        page: state.pager.current_page(),
        page_size: state.pager.page_size(),
    }
}

fn move_page(state: &mut AppState, step: i16) -> DispatchResult<Effect> {
    if !state.auth.authenticated {
        return DispatchResult::unchanged();
    }
    let was_searching = exit_search(state);
    let moved = if step > 0 {
        state.pager.next()
    } else {
        state.pager.prev()
    };
    if moved {
        let effect = start_page_load(state);
        return DispatchResult::changed_with(effect);
    }
    if was_searching {
        state.rebuild_visible();
        return DispatchResult::changed();
    }
    DispatchResult::unchanged()
}

fn switch_collection(state: &mut AppState, step: i16) -> DispatchResult<Effect> {
    if !state.auth.authenticated {
        return DispatchResult::unchanged();
    }
    state.collection = if step > 0 {
        state.collection.next()
    } else {
        state.collection.prev()
    };
    DispatchResult::changed_with_many(enter_collection(state))
}

/// Reset the view for the current collection and load its first page,
/// plus the universal index if this kind has one and it is not already
/// loaded or in flight.
fn enter_collection(state: &mut AppState) -> Vec<Effect> {
    state.pager = Pager::new(state.collection.page_size());
    state.criteria = FilterCriteria::default();
    state.search = SearchState::default();
    state.search_results.clear();
    state.search_loading = false;
    state.search_error = None;
    state.page = DataResource::Loading;
    state.page_entries.clear();
    state.visible.clear();
    state.selected_index = 0;
    state.request_seq += 1;

    let mut effects = vec![Effect::LoadPage {
        seq: state.request_seq,
        kind: state.collection,
        page: 1,
        page_size: state.pager.page_size(),
    }];
    let kind = state.collection;
    if kind.supports_index() && !state.index.is_loaded(kind) && !state.index_loading.contains(&kind)
    {
        state.index_loading.insert(kind);
        effects.push(Effect::LoadIndex { kind });
    }
    effects
}

fn local_matches(state: &AppState, query: &str) -> Vec<EnrichedEntry> {
    state
        .index
        .search(state.collection, query)
        .iter()
        .map(|entry| EnrichedEntry::from_listing(state.collection, entry))
        .collect()
}

fn cycle_category(state: &mut AppState, step: i16) -> DispatchResult<Effect> {
    if !state.auth.authenticated {
        return DispatchResult::unchanged();
    }
    let filters = category_cycle(state);
    let len = filters.len() as i16;
    let current = filters
        .iter()
        .position(|filter| *filter == state.criteria.category)
        .unwrap_or(0) as i16;
    let mut next = current + step;
    if next < 0 {
        next = len - 1;
    } else if next >= len {
        next = 0;
    }
    let next_filter = filters[next as usize].clone();
    if next_filter == state.criteria.category {
        return DispatchResult::unchanged();
    }
    state.criteria.category = next_filter;
    state.selected_index = 0;
    // Category changes restart paginated browsing from the first page.
    if !state.criteria.mode.is_searching() && state.pager.jump_to_containing(1) {
        let effect = start_page_load(state);
        return DispatchResult::changed_with(effect);
    }
    state.rebuild_visible();
    DispatchResult::changed()
}

fn category_cycle(state: &AppState) -> Vec<CategoryFilter> {
    let mut filters = vec![CategoryFilter::All, CategoryFilter::Favorites];
    if state.collection.supports_generations() {
        filters.extend((1..=collection::GENERATION_COUNT).map(CategoryFilter::Generation));
    }
    filters
}

fn list_page_size(state: &AppState) -> usize {
    state.terminal_size.1.saturating_sub(8).max(1) as usize
}
