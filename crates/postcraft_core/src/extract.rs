//! crates/postcraft_core/src/extract.rs
//!
//! Source extraction: HTML reduction for articles, the URL-derived fallback
//! article, and video identifier parsing.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use url::{Host, Url};

use crate::domain::ArticleContent;

/// Article bodies are cut to this many characters.
pub const ARTICLE_MAX_CHARS: usize = 4000;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid extraction regex")
}

static TITLE_TAG: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)<title[^>]*>([^<]+)</title>"));
static OG_TITLE: LazyLock<Regex> =
    LazyLock::new(|| re(r#"(?i)<meta[^>]*property="og:title"[^>]*content="([^"]*)"[^>]*>"#));
static TWITTER_TITLE: LazyLock<Regex> =
    LazyLock::new(|| re(r#"(?i)<meta[^>]*name="twitter:title"[^>]*content="([^"]*)"[^>]*>"#));
static ARTICLE_TAG: LazyLock<Regex> = LazyLock::new(|| re(r"(?is)<article[^>]*>(.*?)</article>"));
static MAIN_TAG: LazyLock<Regex> = LazyLock::new(|| re(r"(?is)<main[^>]*>(.*?)</main>"));
static CONTENT_DIV: LazyLock<Regex> =
    LazyLock::new(|| re(r#"(?is)<div[^>]*class="[^"]*content[^"]*"[^>]*>(.*?)</div>"#));
static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| re(r"(?is)<script[^>]*>.*?</script>"));
static STYLE_BLOCK: LazyLock<Regex> = LazyLock::new(|| re(r"(?is)<style[^>]*>.*?</style>"));
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| re(r"<[^>]+>"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| re(r"\s+"));
static META_AUTHOR: LazyLock<Regex> =
    LazyLock::new(|| re(r#"(?i)<meta[^>]*name="author"[^>]*content="([^"]*)"[^>]*>"#));
static ARTICLE_AUTHOR: LazyLock<Regex> =
    LazyLock::new(|| re(r#"(?i)<meta[^>]*property="article:author"[^>]*content="([^"]*)"[^>]*>"#));
static PUBLISHED_TIME: LazyLock<Regex> = LazyLock::new(|| {
    re(r#"(?i)<meta[^>]*property="article:published_time"[^>]*content="([^"]*)"[^>]*>"#)
});
static META_DATE: LazyLock<Regex> =
    LazyLock::new(|| re(r#"(?i)<meta[^>]*name="date"[^>]*content="([^"]*)"[^>]*>"#));
static PAGE_EXTENSION: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)\.(html|php|asp)$"));

fn first_capture(html: &str, patterns: &[&Regex]) -> Option<String> {
    patterns
        .iter()
        .find_map(|p| p.captures(html).and_then(|c| c.get(1)))
        .map(|m| m.as_str().to_string())
}

fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

pub fn extract_title(html: &str) -> String {
    let title = first_capture(html, &[&TITLE_TAG, &OG_TITLE, &TWITTER_TITLE])
        .unwrap_or_else(|| "Untitled Article".to_string());
    decode_entities(&title).trim().to_string()
}

/// Reduces a page to its readable text, bounded to `ARTICLE_MAX_CHARS`.
pub fn extract_main_content(html: &str) -> String {
    let region = first_capture(html, &[&ARTICLE_TAG, &MAIN_TAG, &CONTENT_DIV])
        .unwrap_or_else(|| html.to_string());

    let text = SCRIPT_BLOCK.replace_all(&region, "");
    let text = STYLE_BLOCK.replace_all(&text, "");
    let text = ANY_TAG.replace_all(&text, " ");
    let text = WHITESPACE.replace_all(&text, " ");
    let text = text.trim();

    if text.chars().count() > ARTICLE_MAX_CHARS {
        let mut cut: String = text.chars().take(ARTICLE_MAX_CHARS).collect();
        cut.push_str("...");
        cut
    } else {
        text.to_string()
    }
}

pub fn extract_author(html: &str) -> Option<String> {
    first_capture(html, &[&META_AUTHOR, &ARTICLE_AUTHOR])
}

pub fn extract_publish_date(html: &str) -> Option<String> {
    first_capture(html, &[&PUBLISHED_TIME, &META_DATE])
}

/// Builds an `ArticleContent` from fetched HTML.
pub fn article_from_html(url: &str, html: &str) -> ArticleContent {
    ArticleContent {
        title: extract_title(html),
        content: extract_main_content(html),
        url: url.to_string(),
        author: extract_author(html),
        publish_date: extract_publish_date(html),
    }
}

fn title_case(slug: &str) -> String {
    let words = slug.replace(['-', '_'], " ");
    let words = PAGE_EXTENSION.replace(&words, "");
    words
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Synthesizes an article from the URL alone when every fetch strategy failed.
pub fn fallback_article(url: &Url, now: DateTime<Utc>) -> ArticleContent {
    let domain = url.host_str().unwrap_or("unknown source").to_string();
    let last_segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("article");

    let mut title = title_case(last_segment);
    if title.is_empty() {
        title = format!("Article from {}", domain);
    }

    let content = format!(
        "This article from {} discusses {}.\n\nTo get the full content, please visit the original article at: {}\n\nThe AI will generate social media content based on the article topic and domain context.",
        domain,
        title.to_lowercase(),
        url
    );

    ArticleContent {
        title,
        content,
        url: url.to_string(),
        author: None,
        publish_date: Some(now.to_rfc3339()),
    }
}

/// Parses a video id from `youtube.com/watch?v=ID` or `youtu.be/ID`.
///
/// Any other host, or a URL without an id, yields `None`.
pub fn extract_video_id(raw_url: &str) -> Option<String> {
    let url = Url::parse(raw_url.trim()).ok()?;
    let host = url.host_str()?;

    let id = if host == "youtube.com" || host.ends_with(".youtube.com") {
        url.query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
    } else if host == "youtu.be" || host == "www.youtu.be" {
        url.path_segments()
            .and_then(|mut segments| segments.next())
            .map(str::to_string)
    } else {
        None
    };

    id.filter(|id| !id.is_empty())
}

/// True for addresses routable on the public internet.
pub fn is_public_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_public_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_public_v4(v4),
            None => {
                let first = v6.segments()[0];
                !(v6.is_loopback()
                    || v6.is_unspecified()
                    || v6.is_multicast()
                    // fc00::/7 unique local, fe80::/10 link-local
                    || (first & 0xfe00) == 0xfc00
                    || (first & 0xffc0) == 0xfe80)
            }
        },
    }
}

fn is_public_v4(ip: Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    !(ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        || ip.is_multicast()
        || ip.is_documentation()
        || a == 0
        // 100.64.0.0/10 carrier-grade NAT
        || (a == 100 && (64..128).contains(&b)))
}

/// Rejects `localhost` names and non-public address literals.
///
/// Domain names are not resolved here; the fetcher checks what they resolve to.
pub fn is_public_host(url: &Url) -> bool {
    match url.host() {
        Some(Host::Ipv4(ip)) => is_public_v4(ip),
        Some(Host::Ipv6(ip)) => is_public_ip(IpAddr::V6(ip)),
        Some(Host::Domain(name)) => {
            let name = name.trim_end_matches('.').to_ascii_lowercase();
            name != "localhost" && !name.ends_with(".localhost")
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head>
        <title>Rust &amp; WebAssembly</title>
        <meta name="author" content="Ferris">
        <meta property="article:published_time" content="2025-03-01T10:00:00Z">
        <style>body { color: red; }</style>
        </head><body>
        <nav>Menu</nav>
        <article><h1>Rust &amp; Wasm</h1><script>track()</script>
        <p>Compile   Rust to
        WebAssembly.</p></article>
        </body></html>"#;

    #[test]
    fn reduces_article_region_to_text() {
        let article = article_from_html("https://blog.dev/rust-wasm", PAGE);
        assert_eq!(article.title, "Rust & WebAssembly");
        assert_eq!(article.content, "Rust &amp; Wasm Compile Rust to WebAssembly.");
        assert_eq!(article.author.as_deref(), Some("Ferris"));
        assert_eq!(article.publish_date.as_deref(), Some("2025-03-01T10:00:00Z"));
    }

    #[test]
    fn whole_page_is_used_without_known_containers() {
        let html = "<html><style>x{}</style><body><p>Hello</p> <p>world</p></body></html>";
        assert_eq!(extract_main_content(html), "Hello world");
        assert_eq!(extract_title(html), "Untitled Article");
    }

    #[test]
    fn long_bodies_are_truncated() {
        let html = format!("<main>{}</main>", "word ".repeat(2000));
        let text = extract_main_content(&html);
        assert_eq!(text.chars().count(), ARTICLE_MAX_CHARS + 3);
        assert!(text.ends_with("..."));
    }

    #[test]
    fn fallback_title_comes_from_last_segment() {
        let url = Url::parse("https://example.com/some-article").unwrap();
        let article = fallback_article(&url, Utc::now());
        assert_eq!(article.title, "Some Article");
        assert!(article.content.contains("example.com"));
        assert!(article.content.contains("some article"));

        let url = Url::parse("https://news.site/2025/03/big_launch.html/").unwrap();
        assert_eq!(fallback_article(&url, Utc::now()).title, "Big Launch");

        let url = Url::parse("https://news.site/").unwrap();
        assert_eq!(fallback_article(&url, Utc::now()).title, "Article");
    }

    #[test]
    fn video_ids_from_both_url_forms() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(extract_video_id("https://youtu.be/abc123"), Some("abc123".to_string()));
        assert_eq!(extract_video_id("https://vimeo.com/12345"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch"), None);
        assert_eq!(extract_video_id("not a url"), None);
    }

    #[test]
    fn internal_hosts_are_not_public() {
        for raw in [
            "http://127.0.0.1:8080/admin",
            "http://169.254.169.254/latest/meta-data/",
            "http://10.1.2.3/",
            "http://192.168.0.10/",
            "http://172.16.5.4/",
            "http://100.64.0.1/",
            "http://0.0.0.0/",
            "http://2130706433/",
            "http://[::1]/",
            "http://[fd00::1]/",
            "http://[fe80::1]/",
            "http://[::ffff:127.0.0.1]/",
            "http://localhost:3000/",
            "http://api.localhost/",
        ] {
            let url = Url::parse(raw).unwrap();
            assert!(!is_public_host(&url), "{raw} should be rejected");
        }
    }

    #[test]
    fn ordinary_hosts_are_public() {
        for raw in [
            "https://blog.rust-lang.org/",
            "http://93.184.216.34/",
            "http://[2606:4700::1111]/",
        ] {
            let url = Url::parse(raw).unwrap();
            assert!(is_public_host(&url), "{raw} should be allowed");
        }
    }

    #[test]
    fn look_alike_hosts_are_rejected() {
        assert_eq!(extract_video_id("https://youtube.com.evil.net/watch?v=abc"), None);
        assert_eq!(extract_video_id("https://notyoutube.com/watch?v=abc"), None);
        assert_eq!(extract_video_id("https://youtu.be.evil.net/abc"), None);
        assert_eq!(
            extract_video_id("https://m.youtube.com/watch?v=abc"),
            Some("abc".to_string())
        );
    }

    #[test]
    fn short_links_use_the_first_segment_only() {
        assert_eq!(
            extract_video_id("https://youtu.be/abc123/extra?t=5"),
            Some("abc123".to_string())
        );
        assert_eq!(extract_video_id("https://youtu.be/"), None);
    }
}
