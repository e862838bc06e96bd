//! Render and keyboard tests for the grid UI.

use std::path::PathBuf;

use tui_dispatch::testing::*;
use tui_dispatch::{DataResource, NumericComponentId};
use tui_dispatch_components::SelectList;

use pokegrid::action::Action;
use pokegrid::collection::CollectionKind;
use pokegrid::filter::{CategoryFilter, ViewMode};
use pokegrid::state::{AppState, AuthMode, CollectionEntry, EnrichedEntry};
use pokegrid::ui;

fn scratch_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "pokegrid-render-{tag}-{}-{:?}",
        std::process::id(),
        std::thread::current().id()
    ))
}

fn base_state(tag: &str) -> AppState {
    AppState::new("http://localhost:5000".to_string(), scratch_dir(tag))
}

fn signed_in_state(tag: &str) -> AppState {
    let mut state = base_state(tag);
    state.auth.authenticated = true;
    state.auth.username = "ash".to_string();
    state
}

fn enriched(name: &str, id: u32) -> EnrichedEntry {
    EnrichedEntry::from_listing(
        CollectionKind::Pokemon,
        &CollectionEntry {
            name: name.to_string(),
            url: format!("https://pokeapi.co/api/v2/pokemon/{id}/"),
        },
    )
}

#[test]
fn test_render_login_prompt() {
    let mut render = RenderHarness::new(80, 24);
    let state = base_state("login");

    let output = render.render_to_string_plain(|frame| {
        ui::render_login(frame, frame.area(), &state);
    });

    assert!(output.contains("POKEGRID"));
    assert!(output.contains("SIGN IN"));
    assert!(output.contains("Username"));
    assert!(output.contains("Password"));
}

#[test]
fn test_render_register_mode() {
    let mut render = RenderHarness::new(80, 24);
    let mut state = base_state("register");
    state.auth.mode = AuthMode::Register;

    let output = render.render_to_string_plain(|frame| {
        ui::render_login(frame, frame.area(), &state);
    });

    assert!(output.contains("CREATE ACCOUNT"));
}

#[test]
fn test_render_login_error_and_masking() {
    let mut render = RenderHarness::new(80, 24);
    let mut state = base_state("loginerr");
    state.auth.username = "ash".to_string();
    state.auth.password = "secret".to_string();
    state.auth.error = Some("Invalid username or password".to_string());

    let output = render.render_to_string_plain(|frame| {
        ui::render_login(frame, frame.area(), &state);
    });

    assert!(output.contains("Invalid username or password"));
    assert!(output.contains("ash"));
    assert!(!output.contains("secret"), "password must be masked");
    assert!(output.contains("******"));
}

#[test]
fn test_render_submitting_state() {
    let mut render = RenderHarness::new(80, 24);
    let mut state = base_state("submitting");
    state.auth.submitting = true;

    let output = render.render_to_string_plain(|frame| {
        ui::render_login(frame, frame.area(), &state);
    });

    assert!(output.contains("Submitting..."));
}

#[test]
fn test_render_loading_page() {
    let mut render = RenderHarness::new(80, 24);
    let mut list = SelectList::new();
    let mut state = signed_in_state("loading");
    state.page = DataResource::Loading;

    let output = render.render_to_string_plain(|frame| {
        ui::render_body(frame, frame.area(), &state, &mut list);
    });

    assert!(output.contains("Loading pokemon..."));
}

#[test]
fn test_render_page_error() {
    let mut render = RenderHarness::new(80, 24);
    let mut list = SelectList::new();
    let mut state = signed_in_state("pageerr");
    state.page = DataResource::Failed("upstream returned status 502".to_string());

    let output = render.render_to_string_plain(|frame| {
        ui::render_body(frame, frame.area(), &state, &mut list);
    });

    assert!(output.contains("Error: upstream returned status 502"));
}

#[test]
fn test_render_empty_page_and_empty_search_differ() {
    let mut list = SelectList::new();

    let mut state = signed_in_state("emptypage");
    state.page = DataResource::Loaded(Vec::new());
    state.rebuild_visible();
    let mut render = RenderHarness::new(80, 24);
    let page_output = render.render_to_string_plain(|frame| {
        ui::render_body(frame, frame.area(), &state, &mut list);
    });
    assert!(page_output.contains("Nothing on this page."));

    state.criteria.mode = ViewMode::Searching("zzz".to_string());
    state.rebuild_visible();
    let mut render = RenderHarness::new(80, 24);
    let search_output = render.render_to_string_plain(|frame| {
        ui::render_body(frame, frame.area(), &state, &mut list);
    });
    assert!(search_output.contains("No pokemon match your search."));
}

#[test]
fn test_render_empty_favorites_hint() {
    let mut render = RenderHarness::new(80, 24);
    let mut list = SelectList::new();
    let mut state = signed_in_state("nofavs");
    state.page = DataResource::Loaded(vec![enriched("pikachu", 25)]);
    state.criteria.category = CategoryFilter::Favorites;
    state.rebuild_visible();

    let output = render.render_to_string_plain(|frame| {
        ui::render_body(frame, frame.area(), &state, &mut list);
    });

    assert!(output.contains("No favorites yet."));
}

#[test]
fn test_render_grid_marks_favorites() {
    let mut render = RenderHarness::new(80, 24);
    let mut list = SelectList::new();
    let mut state = signed_in_state("favmark");
    state.page = DataResource::Loaded(vec![enriched("pikachu", 25), enriched("eevee", 133)]);
    state
        .favorites
        .get_mut(&CollectionKind::Pokemon)
        .unwrap()
        .toggle("pikachu")
        .unwrap();
    state.rebuild_visible();

    let output = render.render_to_string_plain(|frame| {
        ui::render_body(frame, frame.area(), &state, &mut list);
    });

    assert!(output.contains("* #0025 pikachu"));
    assert!(output.contains("#0133 eevee"));
    assert!(!output.contains("* #0133 eevee"));
    assert!(output.contains("Gen 1"));
}

#[test]
fn test_render_header_shows_view_state() {
    let mut render = RenderHarness::new(80, 24);
    let state = signed_in_state("header");

    let output = render.render_to_string_plain(|frame| {
        ui::render_header(frame, frame.area(), &state);
    });

    assert!(output.contains("POKEMON"));
    assert!(output.contains("PAGE 01/01"));
    assert!(output.contains("Filter: all"));
    assert!(output.contains("Sort: index"));
    assert!(output.contains("ash"));
}

#[test]
fn test_render_header_with_active_search() {
    let mut render = RenderHarness::new(80, 24);
    let mut state = signed_in_state("headersearch");
    state.search.active = true;
    state.search.query = "char".to_string();

    let output = render.render_to_string_plain(|frame| {
        ui::render_header(frame, frame.area(), &state);
    });

    assert!(output.contains("/char_"));
}

#[test]
fn test_list_keys_map_to_actions() {
    let mut harness = TestHarness::<AppState, Action>::default();
    let mut list = SelectList::new();

    let actions = harness.send_keys::<NumericComponentId, _, _>("f", |state, event| {
        ui::handle_list_event(&event.kind, state, &mut list)
            .actions
            .into_iter()
            .collect::<Vec<_>>()
    });
    actions.assert_count(1);
    actions.assert_first(Action::ToggleFavorite);

    let actions = harness.send_keys::<NumericComponentId, _, _>("]", |state, event| {
        ui::handle_list_event(&event.kind, state, &mut list)
            .actions
            .into_iter()
            .collect::<Vec<_>>()
    });
    actions.assert_first(Action::CollectionNext);

    let actions = harness.send_keys::<NumericComponentId, _, _>("s", |state, event| {
        ui::handle_list_event(&event.kind, state, &mut list)
            .actions
            .into_iter()
            .collect::<Vec<_>>()
    });
    actions.assert_first(Action::SortNext);

    // Digit jumps only exist for the dex-ordered collection.
    let actions = harness.send_keys::<NumericComponentId, _, _>("3", |state, event| {
        ui::handle_list_event(&event.kind, state, &mut list)
            .actions
            .into_iter()
            .collect::<Vec<_>>()
    });
    actions.assert_first(Action::JumpToGeneration(3));
}

#[test]
fn test_search_overlay_keys() {
    let mut harness = TestHarness::<AppState, Action>::default();

    let actions = harness.send_keys::<NumericComponentId, _, _>("c h a r", |state, event| {
        ui::handle_search_event(&event.kind, state)
            .actions
            .into_iter()
            .collect::<Vec<_>>()
    });
    actions.assert_count(4);
    actions.assert_first(Action::SearchInput('c'));
}

#[test]
fn test_login_keys_feed_the_form() {
    let mut harness = TestHarness::<AppState, Action>::default();

    let actions = harness.send_keys::<NumericComponentId, _, _>("a s h", |state, event| {
        ui::handle_login_event(&event.kind, state)
            .actions
            .into_iter()
            .collect::<Vec<_>>()
    });
    actions.assert_count(3);
    actions.assert_first(Action::AuthInput('a'));
}
