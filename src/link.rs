use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Hosting site a thread link points at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkSource {
    F95,
    Lewd,
    #[default]
    Other,
}

/// Raw user selection for one of the link-bearing fields: where the link
/// lives plus whatever the user typed (a bare thread id or a full URL).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    pub source: LinkSource,
    pub value: String,
}

fn thread_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(f95zone\.to|lewdcorner\.com)/threads/([^/#]+)(?:/post-\d+)?/?(#post-\d+)?")
            .unwrap()
    })
}

/// Canonicalize a pasted thread URL for the two known hosts.
///
/// Keeps `threads/<slug>/` and the `#post-<n>` fragment if one is present; the
/// intermediate `/post-<n>` path segment is always dropped. Anything that does
/// not match a known host comes back cleaned (angle brackets stripped) but
/// otherwise untouched, so this never fails and is safe to call on every edit.
pub fn normalize(raw: &str) -> String {
    if raw.trim().is_empty() {
        return raw.to_string();
    }

    // Users sometimes wrap links in <> by hand to suppress embeds; strip the
    // wrapping until stable so a double-wrapped link also comes out bare.
    let mut cleaned = raw.trim();
    loop {
        let next = cleaned
            .trim_start_matches('<')
            .trim_end_matches('>')
            .trim();
        if next == cleaned {
            break;
        }
        cleaned = next;
    }

    if let Some(caps) = thread_url_re().captures(cleaned) {
        let host = &caps[1];
        let slug = &caps[2];
        let fragment = caps.get(3).map(|m| m.as_str()).unwrap_or("");
        return format!("https://{host}/threads/{slug}/{fragment}");
    }

    cleaned.to_string()
}

/// Pull the numeric thread id out of a full site URL, for when a user pastes
/// a whole link into an id field. Non-matching input is returned trimmed.
pub fn extract_thread_id(raw: &str, source: LinkSource) -> String {
    static RE_F95: OnceLock<Regex> = OnceLock::new();
    static RE_LEWD: OnceLock<Regex> = OnceLock::new();

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let re = match source {
        LinkSource::F95 => {
            RE_F95.get_or_init(|| Regex::new(r"f95zone\.to/threads/(?:[^.]+\.)?(\d+)").unwrap())
        }
        LinkSource::Lewd => RE_LEWD
            .get_or_init(|| Regex::new(r"lewdcorner\.com/threads/(?:[^.]+\.)?(\d+)").unwrap()),
        LinkSource::Other => return trimmed.to_string(),
    };

    match re.captures(trimmed) {
        Some(caps) => caps[1].to_string(),
        None => trimmed.to_string(),
    }
}

/// Resolve a [`LinkConfig`] to the URL that goes into the rendered post.
///
/// A full URL on a foreign domain passes through regardless of the selected
/// source; a bare value is expanded to the canonical thread URL of the
/// selected host.
pub fn build_final_link(config: &LinkConfig) -> String {
    let value = config.value.trim();
    if value.is_empty() {
        return String::new();
    }

    let lower = value.to_ascii_lowercase();
    let is_foreign_url = lower.starts_with("http")
        && !lower.contains("f95zone.to")
        && !lower.contains("lewdcorner.com");
    if is_foreign_url {
        return value.to_string();
    }

    match config.source {
        LinkSource::F95 => format!("https://f95zone.to/threads/{value}/"),
        LinkSource::Lewd => format!("https://lewdcorner.com/threads/{value}/"),
        LinkSource::Other => value.to_string(),
    }
}
