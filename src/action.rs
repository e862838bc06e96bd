use serde::{Deserialize, Serialize};

use crate::collection::CollectionKind;
use crate::state::{CollectionEntry, EnrichedEntry};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,

    AuthInput(char),
    AuthBackspace,
    AuthFieldNext,
    AuthModeToggle,
    AuthSubmit,
    AuthDidSucceed { username: String },
    AuthDidReject { message: String },
    AuthDidError(String),
    Logout,

    PageDidLoad { seq: u64, entries: Vec<CollectionEntry>, total_count: u64 },
    PageDidError { seq: u64, error: String },
    PageDidEnrich { seq: u64, entries: Vec<EnrichedEntry>, failures: usize },
    PageNext,
    PagePrev,
    JumpToGeneration(u8),

    IndexDidLoad { kind: CollectionKind, entries: Vec<CollectionEntry> },
    IndexDidError { kind: CollectionKind, error: String },

    CollectionNext,
    CollectionPrev,

    SearchStart,
    SearchInput(char),
    SearchBackspace,
    SearchSubmit,
    SearchCancel,
    CardSearchDidLoad { seq: u64, entries: Vec<EnrichedEntry> },
    CardSearchDidError { seq: u64, error: String },

    FilterNext,
    FilterPrev,
    SortNext,

    SelectionMove(i16),
    SelectionPage(i16),
    Select(usize),
    ToggleFavorite,

    UiTerminalResize(u16, u16),
    Tick,
    Quit,
}
