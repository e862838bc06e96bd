//! Pokegrid - a terminal browser for Pokemon collections.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventKind,
    HandlerResponse, Keybindings, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

use pokegrid::action::Action;
use pokegrid::api;
use pokegrid::auth;
use pokegrid::effect::Effect;
use pokegrid::reducer::reducer;
use pokegrid::state::{AppState, DEFAULT_AUTH_URL};
use pokegrid::ui::{GridComponentId, GridContext, GridUi};

#[derive(Parser, Debug)]
#[command(name = "pokegrid")]
#[command(about = "Browse Pokemon, items, cards and sets from the terminal")]
struct Args {
    /// Base URL of the auth backend
    #[arg(long, default_value = DEFAULT_AUTH_URL)]
    auth_url: String,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let Args {
        auth_url,
        debug: debug_args,
    } = Args::parse();
    let debug = DebugSession::new(debug_args);

    let state = debug
        .load_state_or_else_async(move || async move {
            let data_dir = dirs_next::data_dir()
                .unwrap_or_else(|| std::path::PathBuf::from("."))
                .join("pokegrid");
            Ok::<AppState, io::Error>(AppState::new(auth_url, data_dir))
        })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions).await;

    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(GridUi::new()));
    let mut bus: EventBus<AppState, Action, GridComponentId, GridContext> = EventBus::new();
    let keybindings: Keybindings<GridContext> = Keybindings::new();

    let ui_login = Rc::clone(&ui);
    bus.register(GridComponentId::Login, move |event, state| {
        ui_login
            .borrow_mut()
            .handle_login_event(&event.kind, state)
    });

    let ui_list = Rc::clone(&ui);
    bus.register(GridComponentId::List, move |event, state| {
        ui_list.borrow_mut().handle_list_event(&event.kind, state)
    });

    let ui_search = Rc::clone(&ui);
    bus.register(GridComponentId::Search, move |event, state| {
        ui_search
            .borrow_mut()
            .handle_search_event(&event.kind, state)
    });

    bus.register_global(|event, state| match event.kind {
        EventKind::Resize(width, height) => {
            HandlerResponse::action(Action::UiTerminalResize(width, height)).with_render()
        }
        EventKind::Key(key) => {
            let browsing = state.auth.authenticated && !state.search.active;
            match key.code {
                crossterm::event::KeyCode::Char('q') if browsing => {
                    HandlerResponse::action(Action::Quit)
                }
                crossterm::event::KeyCode::Char('z') if browsing => {
                    HandlerResponse::action(Action::Logout)
                }
                crossterm::event::KeyCode::Char('/') if browsing => {
                    HandlerResponse::action(Action::SearchStart)
                }
                _ => HandlerResponse::ignored(),
            }
        }
        _ => HandlerResponse::ignored(),
    });

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }
                runtime
                    .subscriptions()
                    .interval("tick", Duration::from_millis(250), || Action::Tick);
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            handle_effect,
        )
        .await
}

fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>) {
    match effect {
        Effect::LoadPage {
            seq,
            kind,
            page,
            page_size,
        } => {
            ctx.tasks().spawn(TaskKey::new("page"), async move {
                match api::fetch_page(kind, page, page_size).await {
                    Ok(page) => Action::PageDidLoad {
                        seq,
                        entries: page.entries,
                        total_count: page.total_count,
                    },
                    Err(error) => Action::PageDidError {
                        seq,
                        error: error.to_string(),
                    },
                }
            });
        }
        Effect::EnrichPage { seq, kind, entries } => {
            ctx.tasks().spawn(TaskKey::new("enrich"), async move {
                let (entries, failures) = api::enrich_entries(kind, entries).await;
                Action::PageDidEnrich {
                    seq,
                    entries,
                    failures,
                }
            });
        }
        Effect::LoadIndex { kind } => {
            let key = format!("index_{}", kind.slug());
            ctx.tasks().spawn(TaskKey::new(key), async move {
                match api::load_index(kind).await {
                    Ok(entries) => Action::IndexDidLoad { kind, entries },
                    Err(error) => Action::IndexDidError {
                        kind,
                        error: error.to_string(),
                    },
                }
            });
        }
        Effect::SearchCards { seq, query } => {
            ctx.tasks().spawn(TaskKey::new("card_search"), async move {
                match api::search_cards(&query).await {
                    Ok(entries) => Action::CardSearchDidLoad { seq, entries },
                    Err(error) => Action::CardSearchDidError {
                        seq,
                        error: error.to_string(),
                    },
                }
            });
        }
        Effect::Login {
            base_url,
            username,
            password,
        } => {
            ctx.tasks().spawn(TaskKey::new("auth"), async move {
                match auth::login(&base_url, &username, &password).await {
                    Ok(result) => match result.rejection_message() {
                        None => Action::AuthDidSucceed { username },
                        Some(message) => Action::AuthDidReject {
                            message: message.to_string(),
                        },
                    },
                    Err(error) => Action::AuthDidError(error.to_string()),
                }
            });
        }
        Effect::Register {
            base_url,
            username,
            password,
        } => {
            ctx.tasks().spawn(TaskKey::new("auth"), async move {
                match auth::register(&base_url, &username, &password).await {
                    Ok(result) => match result.rejection_message() {
                        None => Action::AuthDidSucceed { username },
                        Some(message) => Action::AuthDidReject {
                            message: message.to_string(),
                        },
                    },
                    Err(error) => Action::AuthDidError(error.to_string()),
                }
            });
        }
    }
}
