//! Share text for album records: hashtags, captions and display dates.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::model::AlbumRecord;

static RNB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)r&b").expect("r&b pattern is valid"));
static AND_THE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)& the\b").expect("& the pattern is valid"));
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N} ]+").expect("non-word pattern is valid"));
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+|\s+").expect("token pattern is valid"));

const BASE_HASHTAGS: &[&str] = &["#NowPlayingQuest", "#NowPlaying", "#AlbumOfTheDay", "#Music"];

/// Where a caption will be posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    Bluesky,
    Reddit,
    #[default]
    Generic,
}

impl Platform {
    /// The platform's post length limit, in characters.
    #[must_use]
    pub const fn max_chars(self) -> Option<usize> {
        match self {
            Self::Bluesky | Self::Reddit => Some(300),
            Self::Generic => None,
        }
    }

    #[must_use]
    pub fn hashtags(self) -> Vec<String> {
        let mut tags: Vec<String> = BASE_HASHTAGS.iter().map(|t| (*t).to_string()).collect();
        if self == Self::Bluesky {
            tags.push("#MusicSky".to_string());
        }
        tags
    }

    /// Build the full caption for `album` on this platform.
    ///
    /// Reddit titles carry only the headline sentence. `max_chars`
    /// overrides the platform limit.
    #[must_use]
    pub fn caption(
        self,
        album: &AlbumRecord,
        date: NaiveDate,
        url: Option<&str>,
        max_chars: Option<usize>,
    ) -> String {
        let limit = max_chars.or(self.max_chars());
        let fits = |text: &str| limit.map_or(true, |max| text.chars().count() <= max);
        let date_text = format_date(date);

        if self == Self::Reddit {
            return caption(album, &date_text, None, &[], fits);
        }

        let mut hashtags = self.hashtags();
        hashtags.extend(album_hashtags(album));
        let listen = url.map(|u| format!("Listen now: {u}"));
        caption(album, &date_text, listen.as_deref(), &hashtags, fits)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bluesky => "bluesky",
            Self::Reddit => "reddit",
            Self::Generic => "generic",
        };
        f.write_str(name)
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bluesky" => Ok(Self::Bluesky),
            "reddit" => Ok(Self::Reddit),
            "generic" => Ok(Self::Generic),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

/// Turn free text into a CamelCase hashtag, or `None` if nothing is left.
///
/// Genres get `r&b` spelled as `RnB` first.
#[must_use]
pub fn to_hashtag(text: &str, is_genre: bool) -> Option<String> {
    let mut text = if is_genre {
        RNB.replace(text, "RnB").into_owned()
    } else {
        text.to_string()
    };

    text = text.replace('-', " ");
    text = AND_THE.replace_all(&text, "AndThe").into_owned();
    text = NON_WORD.replace_all(&text, "").into_owned();

    let tag: String = text.split_whitespace().map(capitalize).collect();
    if tag.is_empty() {
        None
    } else {
        Some(format!("#{tag}"))
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Hashtags for an album's genres, artist and title, without duplicates.
#[must_use]
pub fn album_hashtags(album: &AlbumRecord) -> Vec<String> {
    let genres = album.genres.iter().flatten().filter_map(|g| to_hashtag(g, true));
    let names = [&album.artist, &album.title]
        .into_iter()
        .filter_map(|s| to_hashtag(s, false));

    let mut tags: Vec<String> = Vec::new();
    for tag in genres.chain(names) {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// Compose a caption and drop trailing words until `fits` accepts it.
///
/// The headline is never reduced below its first word.
pub fn caption(
    album: &AlbumRecord,
    date_text: &str,
    listen: Option<&str>,
    hashtags: &[String],
    fits: impl Fn(&str) -> bool,
) -> String {
    let mut text = format!(
        "{} by {} ({}) is the daily album for {}.",
        album.title, album.artist, album.year, date_text
    );
    if let Some(listen) = listen {
        text.push_str("\n\n");
        text.push_str(listen);
    }
    if !hashtags.is_empty() {
        text.push_str("\n\n");
        text.push_str(&hashtags.join(" "));
    }

    let mut tokens: Vec<&str> = TOKEN.find_iter(&text).map(|m| m.as_str()).collect();
    let is_space = |t: &str| t.trim().is_empty();

    while !fits(&join_tokens(&tokens)) && tokens.len() > 1 {
        if let Some(last_word) = tokens.iter().rposition(|t| !is_space(t)) {
            tokens.remove(last_word);
        }
        while tokens.last().is_some_and(|t| is_space(t)) {
            tokens.pop();
        }
    }

    join_tokens(&tokens)
}

fn join_tokens(tokens: &[&str]) -> String {
    tokens.concat().trim().to_string()
}

/// Long-form display date: `2025-06-12` becomes `June 12, 2025`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}
