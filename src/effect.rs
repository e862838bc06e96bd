use crate::collection::CollectionKind;
use crate::state::CollectionEntry;

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    LoadPage {
        seq: u64,
        kind: CollectionKind,
        page: u32,
        page_size: u32,
    },
    EnrichPage {
        seq: u64,
        kind: CollectionKind,
        entries: Vec<CollectionEntry>,
    },
    LoadIndex {
        kind: CollectionKind,
    },
    SearchCards {
        seq: u64,
        query: String,
    },
    Login {
        base_url: String,
        username: String,
        password: String,
    },
    Register {
        base_url: String,
        username: String,
        password: String,
    },
}
