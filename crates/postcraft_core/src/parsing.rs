//! crates/postcraft_core/src/parsing.rs
//!
//! Turns raw completion text into `GeneratedContent`, plus the optional
//! pad-to-minimum stage that runs after parsing.

use std::collections::HashSet;
use std::sync::LazyLock;

use rand::seq::IndexedRandom;
use rand::Rng;
use regex::Regex;
use tracing::warn;

use crate::domain::{ContentType, GeneratedContent};

static THREAD_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+/\d+[:\s]*[^\n]+").expect("valid thread regex"));
static TWEET_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Tweet[:\s]*(.+)").expect("valid tweet regex"));
static LINKEDIN_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)LinkedIn[:\s]*(.+)").expect("valid linkedin regex"));
static HASHTAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[A-Za-z0-9_]+").expect("valid hashtag regex"));

const TWEET_MAX_CHARS: usize = 280;
const THREAD_MAX_TWEETS: usize = 7;

const SHORT_FILLERS: [&str; 10] = [
    "This insight could be a game-changer for your strategy.",
    "What are your thoughts on this approach?",
    "Share your experience in the comments below!",
    "This perspective might surprise you.",
    "Have you tried this method before?",
    "Let's discuss this further!",
    "This could be the breakthrough you've been looking for.",
    "What's your take on this?",
    "I'd love to hear your thoughts!",
    "This is worth exploring further.",
];

const LONG_FILLERS: [&str; 5] = [
    "This approach has proven successful for many professionals in the industry. The key is to implement it consistently and measure your results over time. What strategies have worked best for you in similar situations?",
    "I've seen this method transform businesses when applied correctly. The most important factor is understanding your audience and adapting the approach to their specific needs. How do you typically approach similar challenges?",
    "This perspective comes from years of experience in the field. The implementation requires careful planning and execution. What has been your experience with similar strategies?",
    "The results speak for themselves when this method is applied consistently. Success depends on proper execution and continuous improvement. What insights can you share from your own experience?",
    "This framework has helped many professionals achieve their goals. The key is to start with small steps and build momentum over time. What challenges have you faced with similar approaches?",
];

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn parse_thread(raw: &str) -> Vec<String> {
    let numbered: Vec<String> = THREAD_LINE
        .find_iter(raw)
        .map(|m| m.as_str().trim().to_string())
        .collect();
    if !numbered.is_empty() {
        return numbered;
    }

    raw.lines()
        .filter(|line| !line.trim().is_empty() && line.chars().count() > 10)
        .take(THREAD_MAX_TWEETS)
        .map(|line| line.trim().to_string())
        .collect()
}

fn parse_tweet(raw: &str) -> Option<String> {
    let labeled = TWEET_LABEL.captures(raw).and_then(|caps| {
        let span = caps.get(1)?.as_str();
        let span = match span.find("LinkedIn") {
            Some(end) => &span[..end],
            None => span,
        };
        Some(span.trim().to_string()).filter(|s| !s.is_empty())
    });
    if labeled.is_some() {
        return labeled;
    }

    let first_line = raw.lines().map(str::trim).find(|l| !l.is_empty())?;
    Some(truncate_chars(first_line, TWEET_MAX_CHARS))
}

fn parse_linkedin(raw: &str) -> Option<String> {
    let labeled = LINKEDIN_LABEL
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty());
    labeled.or_else(|| Some(raw.trim().to_string()).filter(|s| !s.is_empty()))
}

/// Collects `#word` tokens, deduplicated in first-seen order.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    HASHTAG
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|tag| seen.insert(*tag))
        .map(str::to_string)
        .collect()
}

/// Extracts the fields `content_type` asks for from raw completion text.
///
/// Never fails. When nothing can be extracted the result is empty and the
/// caller treats it as nothing to display.
pub fn parse_generated(raw: &str, content_type: ContentType) -> GeneratedContent {
    let mut content = GeneratedContent::default();

    if content_type.wants_thread() {
        let thread = parse_thread(raw);
        if !thread.is_empty() {
            content.twitter_thread = Some(thread);
        }
    }
    if content_type.wants_tweet() {
        content.tweet = parse_tweet(raw);
    }
    if content_type.wants_linkedin() {
        content.linkedin = parse_linkedin(raw);
    }

    content.hashtags = extract_hashtags(raw);
    content
}

//=========================================================================================
// Pad-to-minimum Stage
//=========================================================================================

/// Minimum lengths enforced by appending one filler sentence.
///
/// This is cosmetic padding. It can be switched off without touching parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddingPolicy {
    pub enabled: bool,
    pub tweet_min_chars: usize,
    pub linkedin_min_chars: usize,
    pub thread_tweet_min_chars: usize,
}

impl Default for PaddingPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            tweet_min_chars: 200,
            linkedin_min_chars: 500,
            thread_tweet_min_chars: 200,
        }
    }
}

impl PaddingPolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

fn pad(text: &str, min_chars: usize, pool: &[&str], rng: &mut impl Rng) -> String {
    let len = text.chars().count();
    if len >= min_chars {
        return text.to_string();
    }
    warn!(len, min_chars, "Content shorter than minimum, appending filler");
    match pool.choose(rng) {
        Some(filler) => format!("{} {}", text, filler),
        None => text.to_string(),
    }
}

/// Appends one filler sentence to every field under its minimum length.
pub fn pad_to_minimum(
    mut content: GeneratedContent,
    policy: &PaddingPolicy,
    rng: &mut impl Rng,
) -> GeneratedContent {
    if !policy.enabled {
        return content;
    }

    if let Some(tweet) = content.tweet.take() {
        content.tweet = Some(pad(&tweet, policy.tweet_min_chars, &SHORT_FILLERS, rng));
    }
    if let Some(post) = content.linkedin.take() {
        content.linkedin = Some(pad(&post, policy.linkedin_min_chars, &LONG_FILLERS, rng));
    }
    if let Some(thread) = content.twitter_thread.take() {
        content.twitter_thread = Some(
            thread
                .iter()
                .map(|t| pad(t, policy.thread_tweet_min_chars, &SHORT_FILLERS, rng))
                .collect(),
        );
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const BOTH_RAW: &str = "Tweet: Remote work saves commute time #RemoteWork #Productivity\n\nLinkedIn: Remote work has changed how teams collaborate. #RemoteWork #FutureOfWork";

    #[test]
    fn both_extracts_labeled_spans() {
        let parsed = parse_generated(BOTH_RAW, ContentType::Both);
        assert_eq!(
            parsed.tweet.as_deref(),
            Some("Remote work saves commute time #RemoteWork #Productivity")
        );
        assert_eq!(
            parsed.linkedin.as_deref(),
            Some("Remote work has changed how teams collaborate. #RemoteWork #FutureOfWork")
        );
        assert!(parsed.twitter_thread.is_none());
        assert_eq!(
            parsed.hashtags,
            vec!["#RemoteWork", "#Productivity", "#FutureOfWork"]
        );
    }

    #[test]
    fn tweet_only_populates_tweet_and_hashtags() {
        let parsed = parse_generated(BOTH_RAW, ContentType::Tweet);
        assert!(parsed.tweet.is_some());
        assert!(parsed.linkedin.is_none());
        assert!(parsed.twitter_thread.is_none());
    }

    #[test]
    fn tweet_fallback_takes_first_line_truncated() {
        let long_line = "a".repeat(400);
        let raw = format!("\n\n{}\nsecond line", long_line);
        let parsed = parse_generated(&raw, ContentType::Tweet);
        assert_eq!(parsed.tweet.unwrap().chars().count(), 280);
    }

    #[test]
    fn linkedin_fallback_is_whole_text() {
        let raw = "  Just a plain post with no labels.  ";
        let parsed = parse_generated(raw, ContentType::Linkedin);
        assert_eq!(
            parsed.linkedin.as_deref(),
            Some("Just a plain post with no labels.")
        );
        assert!(parsed.tweet.is_none());
    }

    #[test]
    fn thread_matches_numbered_lines() {
        let raw = "Here is your thread:\n1/3: Ownership is the core idea.\n2/3: Borrowing lets you share.\n3/3: Lifetimes tie it together. #rustlang";
        let parsed = parse_generated(raw, ContentType::TwitterThread);
        let thread = parsed.twitter_thread.unwrap();
        assert_eq!(thread.len(), 3);
        assert_eq!(thread[0], "1/3: Ownership is the core idea.");
        assert!(parsed.tweet.is_none());
        assert!(parsed.linkedin.is_none());
        assert_eq!(parsed.hashtags, vec!["#rustlang"]);
    }

    #[test]
    fn thread_fallback_takes_up_to_seven_long_lines() {
        let raw = (1..=9)
            .map(|i| format!("This is sentence number {}", i))
            .chain(std::iter::once("short".to_string()))
            .collect::<Vec<_>>()
            .join("\n");
        let thread = parse_generated(&raw, ContentType::TwitterThread)
            .twitter_thread
            .unwrap();
        assert_eq!(thread.len(), 7);
        assert!(thread.iter().all(|t| t.starts_with("This is sentence")));
    }

    #[test]
    fn parsing_never_panics_on_odd_input() {
        for raw in ["", "   ", "Tweet:", "LinkedIn:", "#", "1/", "Tweet: LinkedIn:"] {
            for ct in [
                ContentType::Tweet,
                ContentType::Linkedin,
                ContentType::TwitterThread,
                ContentType::Both,
            ] {
                let parsed = parse_generated(raw, ct);
                if !ct.wants_tweet() {
                    assert!(parsed.tweet.is_none());
                }
                if !ct.wants_linkedin() {
                    assert!(parsed.linkedin.is_none());
                }
                if !ct.wants_thread() {
                    assert!(parsed.twitter_thread.is_none());
                }
            }
        }
        assert!(parse_generated("", ContentType::Both).is_empty());
    }

    #[test]
    fn hashtag_extraction_is_idempotent() {
        let text = "#a #b #a #c #b";
        let first = extract_hashtags(text);
        assert_eq!(first, vec!["#a", "#b", "#c"]);
        assert_eq!(extract_hashtags(&first.join(" ")), first);
        assert_eq!(extract_hashtags(text), first);
    }

    #[test]
    fn padding_keeps_prefix_and_grows() {
        let mut rng = StdRng::seed_from_u64(7);
        let content = GeneratedContent {
            tweet: Some("Short tweet".to_string()),
            linkedin: Some("Short post".to_string()),
            twitter_thread: Some(vec!["1/2: tiny".to_string(), "x".repeat(250)]),
            hashtags: vec![],
        };
        let padded = pad_to_minimum(content.clone(), &PaddingPolicy::default(), &mut rng);

        let tweet = padded.tweet.unwrap();
        assert!(tweet.starts_with("Short tweet "));
        assert!(tweet.len() > "Short tweet".len());

        let post = padded.linkedin.unwrap();
        assert!(post.starts_with("Short post "));
        assert!(LONG_FILLERS.iter().any(|f| post.ends_with(f)));

        let thread = padded.twitter_thread.unwrap();
        assert!(thread[0].starts_with("1/2: tiny "));
        assert_eq!(thread[1], "x".repeat(250));
    }

    #[test]
    fn disabled_padding_is_a_no_op() {
        let mut rng = StdRng::seed_from_u64(1);
        let content = GeneratedContent {
            tweet: Some("Short".to_string()),
            ..Default::default()
        };
        let out = pad_to_minimum(content.clone(), &PaddingPolicy::disabled(), &mut rng);
        assert_eq!(out, content);
    }
}
