/// Output formatting: terminal tables, JSON, and shareable text.
use anyhow::Result;
use serde::Serialize;
use songrank_core::{Collection, CollectionKey, CollectionRanking, Item};
use std::collections::HashMap;

#[derive(Serialize)]
struct JsonSong<'a> {
    rank: usize,
    name: &'a str,
    album: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonAlbum<'a> {
    rank: usize,
    name: &'a str,
    mean_rank: f64,
    songs_ranked: usize,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    songs: Vec<JsonSong<'a>>,
    albums: Vec<JsonAlbum<'a>>,
    total_songs: usize,
}

pub fn album_names(collections: &[Collection]) -> HashMap<CollectionKey, String> {
    collections.iter().map(|c| (c.key, c.name.clone())).collect()
}

/// Song and album tables for the terminal.
pub fn render_table(ranked: &[Item], albums: &[CollectionRanking], names: &HashMap<CollectionKey, String>) -> String {
    let mut out = String::new();

    let song_width = ranked.iter().map(|s| s.name.chars().count()).max().unwrap_or(4).max(4);
    out.push_str(&format!("  # | {:<song_width$} | Album\n", "Song"));
    out.push_str(&format!("----|-{}-|------\n", "-".repeat(song_width)));
    for (i, song) in ranked.iter().enumerate() {
        let album = names.get(&song.collection).map(String::as_str).unwrap_or("");
        out.push_str(&format!("{:>3} | {:<song_width$} | {}\n", i + 1, song.name, album));
    }

    if !albums.is_empty() {
        let album_width = albums
            .iter()
            .map(|a| a.collection.name.chars().count())
            .max()
            .unwrap_or(5)
            .max(5);
        out.push_str(&format!("\n  # | {:<album_width$} | Avg rank | Songs\n", "Album"));
        out.push_str(&format!("----|-{}-|----------|------\n", "-".repeat(album_width)));
        for (i, album) in albums.iter().enumerate() {
            out.push_str(&format!(
                "{:>3} | {:<album_width$} | {:>8.2} | {:>5}\n",
                i + 1,
                album.collection.name,
                album.mean_rank,
                album.placed,
            ));
        }
    }

    out.push_str(&format!("\n{} songs ranked across {} albums\n", ranked.len(), albums.len()));
    out
}

pub fn render_json(ranked: &[Item], albums: &[CollectionRanking], names: &HashMap<CollectionKey, String>) -> Result<String> {
    let output = JsonOutput {
        songs: ranked
            .iter()
            .enumerate()
            .map(|(i, s)| JsonSong {
                rank: i + 1,
                name: &s.name,
                album: names.get(&s.collection).map(String::as_str),
            })
            .collect(),
        albums: albums
            .iter()
            .enumerate()
            .map(|(i, a)| JsonAlbum {
                rank: i + 1,
                name: &a.collection.name,
                mean_rank: a.mean_rank,
                songs_ranked: a.placed,
            })
            .collect(),
        total_songs: ranked.len(),
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Plain-text rankings suitable for pasting into a message.
pub fn share_text(artist: &str, ranked: &[Item], albums: &[CollectionRanking]) -> String {
    let mut content = format!("My {artist} Song Rankings:\n\n");
    for (i, song) in ranked.iter().enumerate() {
        content.push_str(&format!("{}. {}\n", i + 1, song.name));
    }
    content.push_str("\nAlbum Rankings:\n");
    for (i, album) in albums.iter().enumerate() {
        content.push_str(&format!(
            "{}. {} (avg rank {:.2})\n",
            i + 1,
            album.collection.name,
            album.mean_rank
        ));
    }
    content
}
