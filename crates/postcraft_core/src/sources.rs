//! crates/postcraft_core/src/sources.rs
//!
//! Source extraction adapters that turn an article or video URL into text the
//! generation pipeline can use as its topic.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use url::Url;

use crate::domain::{ArticleContent, VideoInfo};
use crate::extract::{article_from_html, extract_video_id, fallback_article, is_public_host};
use crate::pipeline::PipelineError;
use crate::ports::{PageFetcher, TranscriptService, VideoMetadataService};

//=========================================================================================
// Articles
//=========================================================================================

/// Tries each fetch strategy in order and stops at the first success.
///
/// When every strategy fails the article is synthesized from the URL, so
/// extraction of a well-formed URL always succeeds.
#[derive(Clone)]
pub struct ArticleExtractor {
    strategies: Vec<Arc<dyn PageFetcher>>,
    allow_private_hosts: bool,
}

impl ArticleExtractor {
    /// URLs pointing at `localhost` or a non-public address are rejected.
    pub fn new(strategies: Vec<Arc<dyn PageFetcher>>) -> Self {
        Self {
            strategies,
            allow_private_hosts: false,
        }
    }

    /// Lifts the public-host restriction, for pages served on the local network.
    pub fn allow_private_hosts(mut self) -> Self {
        self.allow_private_hosts = true;
        self
    }

    pub async fn extract(&self, raw_url: &str) -> Result<ArticleContent, PipelineError> {
        let url = Url::parse(raw_url.trim()).map_err(|_| PipelineError::InvalidArticleUrl)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PipelineError::InvalidArticleUrl);
        }
        if !self.allow_private_hosts && !is_public_host(&url) {
            warn!(url = %url, "Refusing article URL on a non-public host");
            return Err(PipelineError::InvalidArticleUrl);
        }

        for strategy in &self.strategies {
            match strategy.fetch(url.as_str()).await {
                Ok(html) => {
                    info!(strategy = strategy.name(), url = %url, "Fetched article HTML");
                    return Ok(article_from_html(url.as_str(), &html));
                }
                Err(e) => {
                    warn!(strategy = strategy.name(), error = %e, "Fetch strategy failed");
                }
            }
        }

        warn!(url = %url, "All fetch strategies failed, synthesizing article from URL");
        Ok(fallback_article(&url, Utc::now()))
    }
}

impl ArticleContent {
    /// The text handed to the generation pipeline as its topic.
    pub fn as_topic(&self) -> String {
        format!("Article: {}\n\nContent: {}", self.title, self.content)
    }
}

//=========================================================================================
// Videos
//=========================================================================================

const UNKNOWN_TITLE: &str = "YouTube Video";
const UNKNOWN_CHANNEL: &str = "Unknown Channel";
const UNKNOWN_TRANSCRIPT: &str = "This YouTube video contains valuable content that would be great for social media sharing. The video provides insights and information that can be summarized into engaging posts.";

#[derive(Clone)]
pub struct VideoExtractor {
    metadata: Arc<dyn VideoMetadataService>,
    transcripts: Arc<dyn TranscriptService>,
}

impl VideoExtractor {
    pub fn new(
        metadata: Arc<dyn VideoMetadataService>,
        transcripts: Arc<dyn TranscriptService>,
    ) -> Self {
        Self {
            metadata,
            transcripts,
        }
    }

    /// Fetches metadata and transcript together. Either one degrades to
    /// placeholder text on failure; only an unrecognised URL is an error.
    pub async fn extract(&self, raw_url: &str) -> Result<VideoInfo, PipelineError> {
        let video_id = extract_video_id(raw_url).ok_or(PipelineError::InvalidVideoUrl)?;

        let (metadata, transcript) = futures::join!(
            self.metadata.lookup(&video_id),
            self.transcripts.transcript(&video_id)
        );

        let (title, channel_name) = match metadata {
            Ok(meta) => (
                meta.title,
                meta.author_name.unwrap_or_else(|| UNKNOWN_CHANNEL.to_string()),
            ),
            Err(e) => {
                warn!(video_id = %video_id, error = %e, "Video metadata lookup failed");
                (UNKNOWN_TITLE.to_string(), UNKNOWN_CHANNEL.to_string())
            }
        };

        let transcript = transcript.unwrap_or_else(|e| {
            warn!(video_id = %video_id, error = %e, "Transcript unavailable");
            UNKNOWN_TRANSCRIPT.to_string()
        });

        Ok(VideoInfo {
            video_id,
            title,
            description: String::new(),
            transcript,
            channel_name,
        })
    }
}

impl VideoInfo {
    pub fn as_topic(&self) -> String {
        format!(
            "YouTube Video: {}\n\nDescription: {}\n\nTranscript: {}",
            self.title, self.description, self.transcript
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VideoMetadata;
    use crate::ports::{FetchError, PortError, PortResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Failing {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PageFetcher for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(FetchError::Status(403))
        }
    }

    struct Serving(&'static str);

    #[async_trait]
    impl PageFetcher for Serving {
        fn name(&self) -> &str {
            "serving"
        }

        async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
            Ok(self.0.to_string())
        }
    }

    struct Oembed(Option<&'static str>);

    #[async_trait]
    impl VideoMetadataService for Oembed {
        async fn lookup(&self, _video_id: &str) -> PortResult<VideoMetadata> {
            match self.0 {
                Some(title) => Ok(VideoMetadata {
                    title: title.to_string(),
                    author_name: Some("Rust Channel".to_string()),
                }),
                None => Err(PortError::NotFound("video".to_string())),
            }
        }
    }

    struct Transcripts;

    #[async_trait]
    impl TranscriptService for Transcripts {
        async fn transcript(&self, video_id: &str) -> PortResult<String> {
            Ok(format!("transcript for {}", video_id))
        }
    }

    #[tokio::test]
    async fn all_strategies_failing_synthesizes_from_url() {
        let first = Arc::new(Failing { calls: AtomicUsize::new(0) });
        let second = Arc::new(Failing { calls: AtomicUsize::new(0) });
        let extractor = ArticleExtractor::new(vec![
            first.clone() as Arc<dyn PageFetcher>,
            second.clone() as Arc<dyn PageFetcher>,
        ]);

        let article = extractor
            .extract("https://example.com/some-article")
            .await
            .unwrap();
        assert_eq!(article.title, "Some Article");
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stops_at_first_successful_strategy() {
        let later = Arc::new(Failing { calls: AtomicUsize::new(0) });
        let extractor = ArticleExtractor::new(vec![
            Arc::new(Failing { calls: AtomicUsize::new(0) }) as Arc<dyn PageFetcher>,
            Arc::new(Serving("<title>Found</title><main>Body text</main>")) as Arc<dyn PageFetcher>,
            later.clone() as Arc<dyn PageFetcher>,
        ]);
        let article = extractor.extract("https://blog.dev/post").await.unwrap();
        assert_eq!(article.title, "Found");
        assert_eq!(article.content, "Body text");
        assert_eq!(later.calls.load(Ordering::SeqCst), 0);
        assert!(article.as_topic().starts_with("Article: Found\n\nContent: Body text"));
    }

    #[tokio::test]
    async fn rejects_unparseable_article_urls() {
        let extractor = ArticleExtractor::new(vec![]);
        assert!(matches!(
            extractor.extract("not a url").await,
            Err(PipelineError::InvalidArticleUrl)
        ));
        assert!(matches!(
            extractor.extract("ftp://files.site/a").await,
            Err(PipelineError::InvalidArticleUrl)
        ));
    }

    #[tokio::test]
    async fn internal_article_hosts_are_refused_before_fetching() {
        let fetcher = Arc::new(Failing { calls: AtomicUsize::new(0) });
        let extractor = ArticleExtractor::new(vec![fetcher.clone() as Arc<dyn PageFetcher>]);

        for url in [
            "http://169.254.169.254/latest/meta-data/",
            "http://127.0.0.1:5432/",
            "http://localhost/admin",
            "http://[::1]/",
        ] {
            assert!(matches!(
                extractor.extract(url).await,
                Err(PipelineError::InvalidArticleUrl)
            ));
        }
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);

        let local = ArticleExtractor::new(vec![
            Arc::new(Serving("<title>Intranet</title>")) as Arc<dyn PageFetcher>,
        ])
        .allow_private_hosts();
        assert_eq!(local.extract("http://10.0.0.5/wiki").await.unwrap().title, "Intranet");
    }

    #[tokio::test]
    async fn video_extraction_combines_metadata_and_transcript() {
        let extractor = VideoExtractor::new(Arc::new(Oembed(Some("Ownership"))), Arc::new(Transcripts));
        let info = extractor.extract("https://youtu.be/abc123").await.unwrap();
        assert_eq!(info.video_id, "abc123");
        assert_eq!(info.title, "Ownership");
        assert_eq!(info.channel_name, "Rust Channel");
        assert_eq!(info.transcript, "transcript for abc123");
    }

    #[tokio::test]
    async fn video_metadata_failure_degrades_to_placeholders() {
        let extractor = VideoExtractor::new(Arc::new(Oembed(None)), Arc::new(Transcripts));
        let info = extractor
            .extract("https://www.youtube.com/watch?v=xyz")
            .await
            .unwrap();
        assert_eq!(info.title, UNKNOWN_TITLE);
        assert_eq!(info.channel_name, UNKNOWN_CHANNEL);
    }

    #[tokio::test]
    async fn invalid_video_url_is_an_error() {
        let extractor = VideoExtractor::new(Arc::new(Oembed(None)), Arc::new(Transcripts));
        assert!(matches!(
            extractor.extract("https://vimeo.com/1").await,
            Err(PipelineError::InvalidVideoUrl)
        ));
    }
}
