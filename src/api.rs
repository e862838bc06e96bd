//! Remote collection client and enrichment resolver.
//!
//! Every listing endpoint is normalized here into the one
//! `CollectionPage` contract; callers never see the upstream shape
//! differences (`count`/`results` vs `totalCount`/`data`). Single
//! attempt per call; retry policy, if any, belongs to the caller.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::collection::{self, CollectionKind};
use crate::state::{CollectionEntry, EnrichedEntry};

const POKEAPI_BASE: &str = "https://pokeapi.co/api/v2";
const TCG_BASE: &str = "https://api.pokemontcg.io/v2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const ENRICH_CONCURRENCY: usize = 12;

/// Bulk listing cap for universal indexes; PokeAPI collections are in
/// the hundreds to low thousands.
const INDEX_LIMIT: u32 = 10_000;

#[derive(Debug)]
pub enum ApiError {
    /// Transport-level failure reaching the upstream.
    Network(reqwest::Error),
    /// Upstream reachable but answered with an error status.
    Upstream { status: u16 },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Network(err) => write!(f, "network error: {err}"),
            ApiError::Upstream { status } => write!(f, "upstream returned status {status}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// One normalized page of a collection listing.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectionPage {
    pub entries: Vec<CollectionEntry>,
    pub total_count: u64,
}

// PokeAPI listing shape: {count, results: [{name, url}]}.
#[derive(Debug, Deserialize)]
struct NamedListResponse {
    count: u64,
    results: Vec<NamedResource>,
}

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
    url: String,
}

// TCG listing shape: {data: [...], totalCount}.
#[derive(Debug, Deserialize)]
struct TcgListResponse<T> {
    data: Vec<T>,
    #[serde(rename = "totalCount")]
    total_count: u64,
}

#[derive(Debug, Deserialize)]
struct TcgEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct CardSummary {
    id: String,
    name: String,
    rarity: Option<String>,
    images: Option<CardImages>,
    cardmarket: Option<Cardmarket>,
}

#[derive(Debug, Deserialize)]
struct CardImages {
    small: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Cardmarket {
    prices: Option<CardmarketPrices>,
}

#[derive(Debug, Deserialize)]
struct CardmarketPrices {
    #[serde(rename = "trendPrice")]
    trend_price: Option<f64>,
    #[serde(rename = "averageSellPrice")]
    average_sell_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SetSummary {
    id: String,
    name: String,
    series: Option<String>,
    #[serde(rename = "releaseDate")]
    release_date: Option<String>,
    images: Option<SetImages>,
}

#[derive(Debug, Deserialize)]
struct SetImages {
    logo: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PokemonDetailResponse {
    id: u32,
    sprites: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ItemDetailResponse {
    id: u32,
    cost: Option<u32>,
    category: NamedResource,
    effect_entries: Vec<ItemEffectEntry>,
}

#[derive(Debug, Deserialize)]
struct ItemEffectEntry {
    short_effect: String,
    language: NamedResource,
}

/// Fetch one 1-indexed page of a collection, normalized.
pub async fn fetch_page(
    kind: CollectionKind,
    page: u32,
    page_size: u32,
) -> Result<CollectionPage, ApiError> {
    match kind {
        CollectionKind::Pokemon => fetch_named_page("pokemon", page, page_size).await,
        CollectionKind::Items => fetch_named_page("item", page, page_size).await,
        CollectionKind::Cards => fetch_card_page(page, page_size).await,
        CollectionKind::Sets => fetch_set_page(page, page_size).await,
    }
}

/// Full unpaginated listing for the universal index.
pub async fn load_index(kind: CollectionKind) -> Result<Vec<CollectionEntry>, ApiError> {
    let resource = match kind {
        CollectionKind::Pokemon => "pokemon",
        CollectionKind::Items => "item",
        CollectionKind::Sets => {
            let page = fetch_set_page(1, INDEX_LIMIT).await?;
            return Ok(page.entries);
        }
        // The card catalog is too large for a bulk listing; card search
        // is served remotely instead (search_cards).
        CollectionKind::Cards => return Ok(Vec::new()),
    };
    let url = format!("{POKEAPI_BASE}/{resource}?offset=0&limit={INDEX_LIMIT}");
    let response: NamedListResponse = fetch_json(&url).await?;
    Ok(normalize_named(response.results))
}

/// Server-side card search via the TCG free-text query syntax. Results
/// come back already enriched; the listing payload carries the detail
/// fields.
pub async fn search_cards(query: &str) -> Result<Vec<EnrichedEntry>, ApiError> {
    let q = format!("name:*{}*", query.trim());
    let url = format!(
        "{TCG_BASE}/cards?q={}&page=1&pageSize=100&orderBy=name",
        urlencoding::encode(&q)
    );
    let response: TcgListResponse<CardSummary> = fetch_json(&url).await?;
    Ok(response.data.iter().map(enriched_from_card).collect())
}

/// Resolve detail fields for a page of entries: one fetch per entry,
/// bounded fan-out, order preserved. A failed entry degrades to a
/// fallback record instead of failing the batch; the return reports how
/// many degraded.
pub async fn enrich_entries(
    kind: CollectionKind,
    entries: Vec<CollectionEntry>,
) -> (Vec<EnrichedEntry>, usize) {
    enrich_with(kind, entries, ENRICH_CONCURRENCY, move |entry| async move {
        enrich_one(kind, &entry).await
    })
    .await
}

/// Driver behind `enrich_entries`, generic over the per-entry fetch.
async fn enrich_with<F, Fut>(
    kind: CollectionKind,
    entries: Vec<CollectionEntry>,
    concurrency: usize,
    fetch: F,
) -> (Vec<EnrichedEntry>, usize)
where
    F: Fn(CollectionEntry) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<EnrichedEntry, ApiError>> + Send + 'static,
{
    if entries.is_empty() {
        return (Vec::new(), 0);
    }

    let semaphore = Arc::new(Semaphore::new(concurrency));
    let fetch = Arc::new(fetch);
    let mut join_set = JoinSet::new();
    for (slot, entry) in entries.iter().cloned().enumerate() {
        let semaphore = semaphore.clone();
        let fetch = fetch.clone();
        join_set.spawn(async move {
            let enriched = match semaphore.acquire_owned().await {
                Ok(_permit) => fetch(entry.clone()).await.ok(),
                Err(_) => None,
            };
            (slot, entry, enriched)
        });
    }

    // Each task writes its own slot, so completion order does not matter.
    let mut slots: Vec<Option<EnrichedEntry>> = vec![None; entries.len()];
    let mut failures = 0usize;
    while let Some(joined) = join_set.join_next().await {
        let Ok((slot, entry, enriched)) = joined else {
            failures += 1;
            continue;
        };
        slots[slot] = Some(match enriched {
            Some(enriched) => enriched,
            None => {
                failures += 1;
                EnrichedEntry::fallback(kind, &entry)
            }
        });
    }

    let enriched = slots
        .into_iter()
        .zip(entries.iter())
        .map(|(slot, entry)| slot.unwrap_or_else(|| EnrichedEntry::fallback(kind, entry)))
        .collect();
    (enriched, failures)
}

async fn enrich_one(
    kind: CollectionKind,
    entry: &CollectionEntry,
) -> Result<EnrichedEntry, ApiError> {
    match kind {
        CollectionKind::Pokemon => {
            let detail: PokemonDetailResponse = fetch_json(&entry.url).await?;
            let sprite = detail
                .sprites
                .pointer("/front_default")
                .and_then(|value| value.as_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| collection::pokemon_sprite_url(detail.id));
            Ok(EnrichedEntry {
                name: entry.name.clone(),
                url: entry.url.clone(),
                numeric_id: Some(detail.id),
                sprite_url: sprite,
                generation: collection::generation_of(detail.id),
                cost: None,
                category: None,
                effect_text: None,
                market_price: None,
                rarity: None,
            })
        }
        CollectionKind::Items => {
            let detail: ItemDetailResponse = fetch_json(&entry.url).await?;
            let effect = detail
                .effect_entries
                .iter()
                .find(|effect| effect.language.name == "en")
                .map(|effect| effect.short_effect.clone());
            Ok(EnrichedEntry {
                name: entry.name.clone(),
                url: entry.url.clone(),
                numeric_id: Some(detail.id),
                sprite_url: collection::item_sprite_url(&entry.name),
                generation: None,
                cost: detail.cost,
                category: Some(detail.category.name),
                effect_text: effect,
                market_price: None,
                rarity: None,
            })
        }
        CollectionKind::Cards => {
            let envelope: TcgEnvelope<CardSummary> = fetch_json(&entry.url).await?;
            Ok(enriched_from_card(&envelope.data))
        }
        CollectionKind::Sets => {
            let envelope: TcgEnvelope<SetSummary> = fetch_json(&entry.url).await?;
            Ok(enriched_from_set(&envelope.data))
        }
    }
}

async fn fetch_named_page(
    resource: &str,
    page: u32,
    page_size: u32,
) -> Result<CollectionPage, ApiError> {
    let offset = (page.saturating_sub(1)) as u64 * page_size as u64;
    let url = format!("{POKEAPI_BASE}/{resource}?offset={offset}&limit={page_size}");
    let response: NamedListResponse = fetch_json(&url).await?;
    Ok(CollectionPage {
        entries: normalize_named(response.results),
        total_count: response.count,
    })
}

async fn fetch_card_page(page: u32, page_size: u32) -> Result<CollectionPage, ApiError> {
    let url = format!("{TCG_BASE}/cards?page={page}&pageSize={page_size}&orderBy=name");
    let response: TcgListResponse<CardSummary> = fetch_json(&url).await?;
    let entries = response
        .data
        .iter()
        .map(|card| CollectionEntry {
            name: card.name.clone(),
            url: format!("{TCG_BASE}/cards/{}", card.id),
        })
        .collect();
    Ok(CollectionPage {
        entries,
        total_count: response.total_count,
    })
}

async fn fetch_set_page(page: u32, page_size: u32) -> Result<CollectionPage, ApiError> {
    let url = format!("{TCG_BASE}/sets?page={page}&pageSize={page_size}&orderBy=-releaseDate");
    let response: TcgListResponse<SetSummary> = fetch_json(&url).await?;
    let entries = response
        .data
        .iter()
        .map(|set| CollectionEntry {
            name: set.name.clone(),
            url: format!("{TCG_BASE}/sets/{}", set.id),
        })
        .collect();
    Ok(CollectionPage {
        entries,
        total_count: response.total_count,
    })
}

fn enriched_from_card(card: &CardSummary) -> EnrichedEntry {
    let prices = card.cardmarket.as_ref().and_then(|market| market.prices.as_ref());
    EnrichedEntry {
        name: card.name.clone(),
        url: format!("{TCG_BASE}/cards/{}", card.id),
        numeric_id: None,
        sprite_url: card
            .images
            .as_ref()
            .and_then(|images| images.small.clone())
            .unwrap_or_else(|| crate::state::SPRITE_PLACEHOLDER.to_string()),
        generation: None,
        cost: None,
        category: None,
        effect_text: None,
        market_price: prices
            .and_then(|prices| prices.trend_price.or(prices.average_sell_price)),
        rarity: card.rarity.clone(),
    }
}

fn enriched_from_set(set: &SetSummary) -> EnrichedEntry {
    EnrichedEntry {
        name: set.name.clone(),
        url: format!("{TCG_BASE}/sets/{}", set.id),
        numeric_id: None,
        sprite_url: set
            .images
            .as_ref()
            .and_then(|images| images.logo.clone())
            .unwrap_or_else(|| crate::state::SPRITE_PLACEHOLDER.to_string()),
        generation: None,
        cost: None,
        category: set.series.clone(),
        effect_text: set.release_date.clone(),
        market_price: None,
        rarity: None,
    }
}

fn normalize_named(results: Vec<NamedResource>) -> Vec<CollectionEntry> {
    results
        .into_iter()
        .map(|resource| CollectionEntry {
            name: resource.name,
            url: resource.url,
        })
        .collect()
}

async fn fetch_json<T: serde::de::DeserializeOwned>(url: &str) -> Result<T, ApiError> {
    let response = http_client()
        .get(url)
        .send()
        .await
        .map_err(ApiError::Network)?;
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Upstream {
            status: status.as_u16(),
        });
    }
    response.json().await.map_err(ApiError::Network)
}

pub(crate) fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default()
    })
}
