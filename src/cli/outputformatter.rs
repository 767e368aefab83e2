//! Plain-text rendering for the interactive client: frames, the post table
//! and toasts.

use chrono::{DateTime, Utc};

use crate::api::Post;
use crate::feed::FeedState;
use crate::identity::Session;
use crate::notify::{Notification, ToastKind};
use crate::router::Navigation;

const MAX_CELL_WIDTH: usize = 60;
const EMPTY_FEED: &str = "No posts in this tab. Switch 👻";

pub fn render_navigation(nav: &Navigation) -> Vec<String> {
    let mut out = Vec::new();
    match &nav.redirected_from {
        Some(from) => out.push(format!("location: {} (redirected from {})", nav.location, from)),
        None => out.push(format!("location: {}", nav.location)),
    }
    out.push(nav.frame.to_string());
    out
}

pub fn render_session(session: &Session) -> String {
    match session {
        Session::Authenticated { identity } => {
            format!("session: authenticated as @{} ({})", identity.username, identity.display_name())
        }
        other => format!("session: {}", other.kind()),
    }
}

pub fn render_toast(n: &Notification) -> String {
    let tag = match n.kind {
        ToastKind::Success => "ok",
        ToastKind::Error => "error",
    };
    format!("[{}] {}", tag, n.message)
}

pub fn render_feed(state: &FeedState) -> Vec<String> {
    match state {
        FeedState::Idle => vec![],
        FeedState::Loading => vec!["loading posts...".to_string()],
        FeedState::Empty => vec![EMPTY_FEED.to_string()],
        FeedState::Failed(msg) => vec![format!("could not load posts: {}", msg)],
        FeedState::Loaded(posts) => render_posts(posts),
    }
}

/// Renders posts as an ASCII table: author, text, likes, age.
pub fn render_posts(posts: &[Post]) -> Vec<String> {
    render_posts_at(posts, Utc::now())
}

fn render_posts_at(posts: &[Post], now: DateTime<Utc>) -> Vec<String> {
    let cols: Vec<String> = ["author", "text", "likes", "posted"].iter().map(|s| s.to_string()).collect();
    let rows: Vec<Vec<String>> = posts
        .iter()
        .map(|p| {
            vec![
                format!("@{}", p.author_name()),
                p.text.clone().unwrap_or_default().replace('\n', " "),
                p.likes.len().to_string(),
                p.created_at.map(|t| format_age(now, t)).unwrap_or_default(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = cols.iter().map(|c| display_len(c)).collect();
    for r in &rows {
        for (i, cell) in r.iter().enumerate() {
            widths[i] = widths[i].max(display_len(cell).min(MAX_CELL_WIDTH));
        }
    }

    let sep = build_separator(&widths);
    let mut out = vec![sep.clone(), build_row(&cols, &widths), sep.clone()];
    out.extend(rows.iter().map(|r| build_row(r, &widths)));
    out.push(sep);
    out.push(format!("posts: {}", posts.len()));
    out
}

/// Short relative age in the style of feed timestamps: `now`, `5m`, `3h`, `2d`.
pub fn format_age(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    match secs {
        0..=59 => "now".to_string(),
        60..=3599 => format!("{}m", secs / 60),
        3600..=86_399 => format!("{}h", secs / 3600),
        _ => format!("{}d", secs / 86_400),
    }
}

fn display_len(s: &str) -> usize { s.chars().count() }

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::from("+");
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::from("|");
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let text = truncate(cell, *w);
        let pad = w.saturating_sub(display_len(&text));
        s.push(' ');
        if is_numeric_like(&text) {
            s.push_str(&" ".repeat(pad));
            s.push_str(&text);
        } else {
            s.push_str(&text);
            s.push_str(&" ".repeat(pad));
        }
        s.push_str(" |");
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    if display_len(s) <= max {
        return s.to_string();
    }
    if max <= 1 {
        return "…".to_string();
    }
    s.chars().take(max - 1).collect::<String>() + "…"
}

fn is_numeric_like(s: &str) -> bool {
    let st = s.trim();
    !st.is_empty() && st.chars().all(|c| c.is_ascii_digit())
}
