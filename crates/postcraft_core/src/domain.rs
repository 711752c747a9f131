//! crates/postcraft_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! Request and result types derive serde so the web layer can expose them
//! directly; persistence records live in the adapters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

//=========================================================================================
// Content Generation
//=========================================================================================

/// The requested output shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    Tweet,
    Linkedin,
    TwitterThread,
    Both,
}

impl ContentType {
    pub fn wants_tweet(self) -> bool {
        matches!(self, ContentType::Tweet | ContentType::Both)
    }

    pub fn wants_linkedin(self) -> bool {
        matches!(self, ContentType::Linkedin | ContentType::Both)
    }

    pub fn wants_thread(self) -> bool {
        self == ContentType::TwitterThread
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Tweet => "tweet",
            ContentType::Linkedin => "linkedin",
            ContentType::TwitterThread => "twitter-thread",
            ContentType::Both => "both",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stylistic directive passed into prompt assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Professional,
    Casual,
    Engaging,
    Funny,
    Informative,
}

impl Tone {
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Engaging => "engaging",
            Tone::Funny => "funny",
            Tone::Informative => "informative",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single generation request, constructed per user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRequest {
    pub topic: String,
    pub content_type: ContentType,
    pub tone: Option<Tone>,
    pub target_audience: Option<String>,
    pub web_search_enabled: bool,
}

impl ContentRequest {
    /// Creates a request with no tone, no audience and web search enabled.
    pub fn new(topic: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            topic: topic.into(),
            content_type,
            tone: None,
            target_audience: None,
            web_search_enabled: true,
        }
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = Some(tone);
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.target_audience = Some(audience.into());
        self
    }

    pub fn with_web_search(mut self, enabled: bool) -> Self {
        self.web_search_enabled = enabled;
        self
    }
}

/// The parsed result of one generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tweet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_thread: Option<Vec<String>>,
    /// Deduplicated, in first-seen order.
    pub hashtags: Vec<String>,
}

impl GeneratedContent {
    /// True when there is nothing to display for the request.
    pub fn is_empty(&self) -> bool {
        self.tweet.as_deref().map_or(true, |t| t.trim().is_empty())
            && self.linkedin.as_deref().map_or(true, |l| l.trim().is_empty())
            && self.twitter_thread.as_ref().map_or(true, |t| t.is_empty())
    }
}

//=========================================================================================
// Search
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub link: String,
    pub published_date: Option<String>,
}

/// The ordered results of one search plus the query that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub total_results: usize,
}

impl SearchResponse {
    pub fn new(query: impl Into<String>, results: Vec<SearchResult>) -> Self {
        let total_results = results.len();
        Self {
            query: query.into(),
            results,
            total_results,
        }
    }
}

//=========================================================================================
// Source Extraction
//=========================================================================================

/// Text pulled from a web article, transient for one extraction round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleContent {
    pub title: String,
    pub content: String,
    pub url: String,
    pub author: Option<String>,
    pub publish_date: Option<String>,
}

/// Title and author as reported by an oEmbed provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub author_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub transcript: String,
    pub channel_name: String,
}

//=========================================================================================
// Trending
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingArticle {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, alias = "published_date")]
    pub published_date: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendingCategory {
    pub id: &'static str,
    pub label: &'static str,
}

pub const TRENDING_CATEGORIES: [TrendingCategory; 12] = [
    TrendingCategory { id: "business", label: "Business" },
    TrendingCategory { id: "tech", label: "Technology" },
    TrendingCategory { id: "ai", label: "AI & Machine Learning" },
    TrendingCategory { id: "product", label: "Product" },
    TrendingCategory { id: "marketing", label: "Marketing" },
    TrendingCategory { id: "politics", label: "Politics" },
    TrendingCategory { id: "movies", label: "Movies & Entertainment" },
    TrendingCategory { id: "entertainment", label: "Entertainment" },
    TrendingCategory { id: "finance", label: "Finance" },
    TrendingCategory { id: "sports", label: "Sports" },
    TrendingCategory { id: "health", label: "Health & Wellness" },
    TrendingCategory { id: "science", label: "Science" },
];

//=========================================================================================
// Prompt Library
//=========================================================================================

/// The network a library prompt targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Social {
    Linkedin,
    Twitter,
}

impl Social {
    pub fn as_str(self) -> &'static str {
        match self {
            Social::Linkedin => "linkedin",
            Social::Twitter => "twitter",
        }
    }

    /// The content type generated from a prompt targeting this network.
    pub fn content_type(self) -> ContentType {
        match self {
            Social::Linkedin => ContentType::Linkedin,
            Social::Twitter => ContentType::Tweet,
        }
    }
}

impl std::str::FromStr for Social {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linkedin" => Ok(Social::Linkedin),
            "twitter" => Ok(Social::Twitter),
            other => Err(format!("unknown social network '{}'", other)),
        }
    }
}

/// Placeholder a prompt body uses for the topic.
pub const TOPIC_PLACEHOLDER: &str = "[TOPIC]";

/// A reusable prompt template owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: i64,
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub social: Social,
    pub created_at: DateTime<Utc>,
}

impl Prompt {
    /// Returns the body with every placeholder replaced by `topic`, or the body
    /// untouched when no topic is given.
    pub fn render(&self, topic: Option<&str>) -> String {
        match topic.map(str::trim).filter(|t| !t.is_empty()) {
            Some(topic) => self.body.replace(TOPIC_PLACEHOLDER, topic),
            None => self.body.clone(),
        }
    }
}

/// A prompt that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewPrompt {
    pub title: String,
    pub body: String,
    pub social: Social,
}

impl NewPrompt {
    /// Trims both fields and rejects an empty title or body.
    pub fn validate(self) -> Result<Self, String> {
        let title = self.title.trim().to_string();
        let body = self.body.trim().to_string();
        if title.is_empty() {
            return Err("Prompt title must not be empty".to_string());
        }
        if body.is_empty() {
            return Err("Prompt text must not be empty".to_string());
        }
        Ok(Self {
            title,
            body,
            social: self.social,
        })
    }
}

//=========================================================================================
// Users
//=========================================================================================

// Represents a user - used throughout app
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

/// A change in the signed-in state of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthEvent {
    SignedIn { user: User },
    SignedOut {
        user_id: Uuid,
        /// The auth session that ended. Not sent to clients.
        #[serde(skip)]
        session_id: String,
    },
}

impl AuthEvent {
    pub fn user_id(&self) -> Uuid {
        match self {
            AuthEvent::SignedIn { user } => user.user_id,
            AuthEvent::SignedOut { user_id, .. } => *user_id,
        }
    }
}

//=========================================================================================
// Go-To-Market Plans
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GtmPlanRequest {
    pub product_name: String,
    pub product_description: String,
    pub target_audience: String,
    pub short_term_goal: String,
    pub channels_tried: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GtmPlan {
    pub positioning: Positioning,
    #[serde(default)]
    pub channels: Vec<ChannelStrategy>,
    #[serde(default)]
    pub content_calendar: Vec<CalendarEntry>,
    pub outreach_strategy: OutreachStrategy,
    #[serde(default)]
    pub kpis: Vec<Kpi>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Positioning {
    pub value_proposition: String,
    #[serde(default)]
    pub taglines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelStrategy {
    pub platform: String,
    pub strategy: String,
    pub why: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub day: u32,
    pub content: String,
    pub platform: String,
    pub cta: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutreachStrategy {
    #[serde(default)]
    pub dm_templates: Vec<String>,
    #[serde(default)]
    pub collaboration_angles: Vec<String>,
    #[serde(default)]
    pub influencer_outreach: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub metric: String,
    pub description: String,
    pub target: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(body: &str) -> Prompt {
        Prompt {
            id: 1,
            user_id: Uuid::nil(),
            title: "Weekly".to_string(),
            body: body.to_string(),
            social: Social::Linkedin,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn content_type_uses_kebab_case_on_the_wire() {
        let json = serde_json::to_string(&ContentType::TwitterThread).unwrap();
        assert_eq!(json, "\"twitter-thread\"");
        let parsed: ContentType = serde_json::from_str("\"both\"").unwrap();
        assert_eq!(parsed, ContentType::Both);
    }

    #[test]
    fn new_prompt_rejects_blank_fields() {
        let blank_title = NewPrompt {
            title: "   ".to_string(),
            body: "Write about [TOPIC]".to_string(),
            social: Social::Twitter,
        };
        assert!(blank_title.validate().is_err());

        let blank_body = NewPrompt {
            title: "Hooks".to_string(),
            body: "".to_string(),
            social: Social::Twitter,
        };
        assert!(blank_body.validate().is_err());

        let ok = NewPrompt {
            title: " Hooks ".to_string(),
            body: " Write about [TOPIC] ".to_string(),
            social: Social::Twitter,
        }
        .validate()
        .unwrap();
        assert_eq!(ok.title, "Hooks");
        assert_eq!(ok.body, "Write about [TOPIC]");
    }

    #[test]
    fn render_substitutes_topic_placeholder() {
        let p = prompt("Three lessons about [TOPIC] for [TOPIC] fans");
        assert_eq!(
            p.render(Some("rust")),
            "Three lessons about rust for rust fans"
        );
        assert_eq!(p.render(None), p.body);
        assert_eq!(p.render(Some("  ")), p.body);
    }

    #[test]
    fn social_maps_to_content_type() {
        assert_eq!(Social::Linkedin.content_type(), ContentType::Linkedin);
        assert_eq!(Social::Twitter.content_type(), ContentType::Tweet);
        assert_eq!("LinkedIn".parse::<Social>(), Ok(Social::Linkedin));
        assert!("mastodon".parse::<Social>().is_err());
    }

    #[test]
    fn generated_content_emptiness() {
        assert!(GeneratedContent::default().is_empty());
        let only_tags = GeneratedContent {
            hashtags: vec!["#ai".to_string()],
            ..Default::default()
        };
        assert!(only_tags.is_empty());
        let with_tweet = GeneratedContent {
            tweet: Some("hello".to_string()),
            ..Default::default()
        };
        assert!(!with_tweet.is_empty());
    }
}
