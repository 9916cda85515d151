/// Catalog sources: the iTunes Search API, or a local file.
///
/// Both produce a `Catalog` of albums and their songs. Shuffling and the
/// song limit are applied afterwards by `prepare`.
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use reqwest::Client;
use serde::Deserialize;
use songrank_core::{Collection, Item};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

pub const DEFAULT_ENDPOINT: &str = "https://itunes.apple.com";

/// Page size for each search request. The API caps results at this value.
const SEARCH_LIMIT: &str = "300";

/// Characters of an error response body kept in the error message.
const ERROR_BODY_CHARS: usize = 200;

/// Collection name for songs loaded without an album.
const SINGLES: &str = "Singles";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    result_count: usize,
    results: Vec<SearchResult>,
}

/// The fields we use from one search hit. Songs and albums share the shape.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub artist_name: Option<String>,
    pub collection_id: Option<i64>,
    pub collection_name: Option<String>,
    pub track_id: Option<i64>,
    pub track_name: Option<String>,
}

/// Albums and songs, in catalog order.
#[derive(Debug, Default, Deserialize)]
pub struct Catalog {
    pub collections: Vec<Collection>,
    pub items: Vec<Item>,
}

/// Fetch an artist's albums and songs.
pub async fn fetch_artist(client: &Client, endpoint: &str, artist: &str) -> Result<Catalog> {
    let songs = search(client, endpoint, artist, "song").await?;
    let albums = search(client, endpoint, artist, "album").await?;
    info!(
        songs = songs.result_count,
        albums = albums.result_count,
        artist,
        "catalog search complete"
    );
    Ok(build_catalog(artist, songs.results, albums.results))
}

async fn search(client: &Client, endpoint: &str, artist: &str, entity: &str) -> Result<SearchResponse> {
    let url = format!("{}/search", endpoint.trim_end_matches('/'));
    debug!(%url, entity, "searching catalog");

    let resp = client
        .get(&url)
        .query(&[("term", artist), ("entity", entity), ("limit", SEARCH_LIMIT)])
        .send()
        .await
        .with_context(|| format!("Catalog request to {url} failed"))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("Catalog returned {status}: {}", leading_chars(&body, ERROR_BODY_CHARS));
    }

    resp.json()
        .await
        .with_context(|| format!("Failed to parse {entity} search response"))
}

/// First `max` characters of `text`, never splitting a character.
fn leading_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Group song hits under the artist's album hits.
///
/// Albums credited to another artist are dropped (search is by term, so it
/// also matches features and covers). A song belongs to an album when the
/// collection names match. Repeated album or song ids keep their first
/// occurrence.
pub fn build_catalog(artist: &str, songs: Vec<SearchResult>, albums: Vec<SearchResult>) -> Catalog {
    let wanted = artist.trim().to_lowercase();
    let mut album_keys = HashSet::new();
    let collections: Vec<Collection> = albums
        .into_iter()
        .filter(|a| a.artist_name.as_deref().map(|n| n.trim().to_lowercase()) == Some(wanted.clone()))
        .filter_map(|a| Some(Collection::new(a.collection_id?, a.collection_name?)))
        .filter(|c| album_keys.insert(c.key))
        .collect();

    let mut song_keys = HashSet::new();
    let mut items = Vec::new();
    for album in &collections {
        for song in &songs {
            if song.collection_name.as_deref() != Some(album.name.as_str()) {
                continue;
            }
            let (Some(key), Some(name)) = (song.track_id, song.track_name.as_ref()) else {
                continue;
            };
            if song_keys.insert(key) {
                items.push(Item::new(key, name.clone(), album.key));
            }
        }
    }

    Catalog { collections, items }
}

/// Load a catalog from a local file.
///
/// Accepts a JSON catalog object (`{"collections": [...], "items": [...]}`),
/// a JSON array of song names, or plain text with one song per line written
/// as `Song` or `Song | Album`.
pub fn load_file(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
    parse_catalog_str(&content).with_context(|| format!("Invalid catalog file {}", path.display()))
}

pub fn parse_catalog_str(content: &str) -> Result<Catalog> {
    let trimmed = content.trim();
    if trimmed.starts_with('{') {
        return serde_json::from_str(trimmed).context("File looks like a JSON catalog but failed to parse");
    }
    let entries: Vec<(String, Option<String>)> = if trimmed.starts_with('[') {
        let names: Vec<String> =
            serde_json::from_str(trimmed).context("File looks like a JSON array but failed to parse")?;
        names.into_iter().map(|n| (n, None)).collect()
    } else {
        trimmed.lines().map(split_line).collect()
    };
    Ok(catalog_from_entries(entries))
}

fn split_line(line: &str) -> (String, Option<String>) {
    match line.split_once('|') {
        Some((song, album)) => (song.to_string(), Some(album.trim().to_string()).filter(|a| !a.is_empty())),
        None => (line.to_string(), None),
    }
}

/// Assign sequential keys: songs 1.. in order, albums 1.. by first mention.
fn catalog_from_entries(entries: Vec<(String, Option<String>)>) -> Catalog {
    let mut catalog = Catalog::default();
    for (song, album) in entries {
        let song = song.trim();
        if song.is_empty() {
            continue;
        }
        let album = album.as_deref().unwrap_or(SINGLES);
        let collection = match catalog.collections.iter().find(|c| c.name == album) {
            Some(c) => c.key,
            None => {
                let key = catalog.collections.len() as i64 + 1;
                catalog.collections.push(Collection::new(key, album));
                key
            }
        };
        let key = catalog.items.len() as i64 + 1;
        catalog.items.push(Item::new(key, song, collection));
    }
    catalog
}

/// How to order songs before ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shuffle {
    /// Keep catalog order.
    Off,
    /// Fresh random order each run.
    Random,
    /// Reproducible order.
    Seeded(u64),
}

/// Order and trim the catalog's songs for a ranking session.
pub fn prepare(items: Vec<Item>, shuffle: Shuffle, limit: Option<usize>) -> Vec<Item> {
    let mut items = items;
    match shuffle {
        Shuffle::Off => {}
        Shuffle::Random => items.shuffle(&mut rand::rng()),
        Shuffle::Seeded(seed) => items.shuffle(&mut StdRng::seed_from_u64(seed)),
    }
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    items
}
