//! crates/postcraft_core/src/dashboard.rs
//!
//! The dashboard controller: which pipeline each tab drives, and the
//! per-tab result state the presentation layer renders.

use std::future::Future;
use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{
    AuthEvent, ContentRequest, ContentType, GeneratedContent, NewPrompt, Prompt, Social, Tone,
    TrendingArticle, User,
};
use crate::pipeline::{ContentPipeline, DEFAULT_AUDIENCE};
use crate::ports::{DatabaseService, PortError};
use crate::trending::TrendFeed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Generator,
    Trending,
    Summarizer,
    Video,
    Prompts,
}

/// The lifecycle of one tab's request.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskState<T> {
    Idle,
    Pending,
    Success(T),
    Failed(String),
}

impl<T> TaskState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskState::Pending)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            TaskState::Success(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DashboardError {
    #[error("A request is already running on the {0:?} tab")]
    Busy(Tab),
    #[error("{0}")]
    EmptyInput(&'static str),
    #[error("Please sign in to continue")]
    NotSignedIn,
    #[error("{0}")]
    Backend(String),
}

/// Everything the dashboard renders.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub active_tab: Tab,
    pub user: Option<User>,
    pub prompt_social: Social,
    pub generator: TaskState<GeneratedContent>,
    pub trending: TaskState<Vec<TrendingArticle>>,
    pub summarizer: TaskState<GeneratedContent>,
    pub video: TaskState<GeneratedContent>,
    pub prompts: TaskState<Vec<Prompt>>,
    pub prompt_output: TaskState<GeneratedContent>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            active_tab: Tab::Generator,
            user: None,
            prompt_social: Social::Linkedin,
            generator: TaskState::Idle,
            trending: TaskState::Idle,
            summarizer: TaskState::Idle,
            video: TaskState::Idle,
            prompts: TaskState::Idle,
            prompt_output: TaskState::Idle,
        }
    }
}

impl Dashboard {
    /// Switches tab and discards all generated content.
    pub fn switch_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
        self.generator = TaskState::Idle;
        self.summarizer = TaskState::Idle;
        self.video = TaskState::Idle;
        self.prompt_output = TaskState::Idle;
    }

    fn is_busy(&self, tab: Tab) -> bool {
        match tab {
            Tab::Generator => self.generator.is_pending(),
            Tab::Trending => self.trending.is_pending(),
            Tab::Summarizer => self.summarizer.is_pending(),
            Tab::Video => self.video.is_pending(),
            Tab::Prompts => self.prompts.is_pending() || self.prompt_output.is_pending(),
        }
    }

    fn user_id(&self) -> Result<Uuid, DashboardError> {
        self.user
            .as_ref()
            .map(|u| u.user_id)
            .ok_or(DashboardError::NotSignedIn)
    }
}

fn require(input: &str, message: &'static str) -> Result<(), DashboardError> {
    if input.trim().is_empty() {
        Err(DashboardError::EmptyInput(message))
    } else {
        Ok(())
    }
}

fn backend(e: PortError) -> DashboardError {
    error!(error = %e, "Row store call failed");
    DashboardError::Backend("Something went wrong. Please try again.".to_string())
}

/// The tab states that hold generated posts. Trending results live in their
/// own `TaskState<Vec<TrendingArticle>>` and never pass through here.
#[derive(Debug, Clone, Copy)]
enum Output {
    Generator,
    Summarizer,
    Video,
    PromptOutput,
}

impl Output {
    fn tab(self) -> Tab {
        match self {
            Output::Generator => Tab::Generator,
            Output::Summarizer => Tab::Summarizer,
            Output::Video => Tab::Video,
            Output::PromptOutput => Tab::Prompts,
        }
    }
}

pub struct DashboardController {
    pipeline: ContentPipeline,
    trends: TrendFeed,
    db: Arc<dyn DatabaseService>,
    state: Dashboard,
}

impl DashboardController {
    pub fn new(pipeline: ContentPipeline, trends: TrendFeed, db: Arc<dyn DatabaseService>) -> Self {
        Self {
            pipeline,
            trends,
            db,
            state: Dashboard::default(),
        }
    }

    pub fn state(&self) -> &Dashboard {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut Dashboard {
        &mut self.state
    }

    /// Resolves the session's user while the auth-event subscription is set
    /// up, and returns the subscription.
    pub async fn mount<S, F>(&mut self, session_id: &str, subscribe: F) -> Result<S, DashboardError>
    where
        F: Future<Output = S>,
    {
        let db = self.db.clone();
        let check = async move {
            let user_id = db.validate_auth_session(session_id).await?;
            db.get_user_by_id(user_id).await
        };
        let (user, subscription) = futures::join!(check, subscribe);

        match user {
            Ok(user) => {
                info!(user_id = %user.user_id, "Dashboard mounted");
                self.state.user = Some(user);
                Ok(subscription)
            }
            Err(_) => {
                self.state.user = None;
                Err(DashboardError::NotSignedIn)
            }
        }
    }

    pub fn apply_auth_event(&mut self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn { user } => self.state.user = Some(user),
            AuthEvent::SignedOut { .. } => {
                self.state = Dashboard::default();
            }
        }
    }

    async fn run_generation<F>(
        &mut self,
        output: Output,
        job: F,
    ) -> Result<(), DashboardError>
    where
        F: Future<Output = Result<GeneratedContent, crate::pipeline::PipelineError>>,
    {
        *self.slot(output) = TaskState::Pending;
        let outcome = match job.await {
            Ok(content) => TaskState::Success(content),
            Err(e) => {
                error!(tab = ?output.tab(), error = %e, "Generation failed");
                TaskState::Failed(e.to_string())
            }
        };
        *self.slot(output) = outcome;
        Ok(())
    }

    fn slot(&mut self, output: Output) -> &mut TaskState<GeneratedContent> {
        match output {
            Output::Generator => &mut self.state.generator,
            Output::Summarizer => &mut self.state.summarizer,
            Output::Video => &mut self.state.video,
            Output::PromptOutput => &mut self.state.prompt_output,
        }
    }

    fn guard(&self, tab: Tab) -> Result<(), DashboardError> {
        if self.state.is_busy(tab) {
            return Err(DashboardError::Busy(tab));
        }
        Ok(())
    }

    pub async fn submit_generator(&mut self, request: ContentRequest) -> Result<(), DashboardError> {
        self.guard(Tab::Generator)?;
        require(&request.topic, "Please enter a topic")?;
        let pipeline = self.pipeline.clone();
        self.run_generation(Output::Generator, async move { pipeline.generate(&request).await })
            .await
    }

    pub async fn submit_trending(&mut self, topic: &str) -> Result<(), DashboardError> {
        self.guard(Tab::Trending)?;
        require(topic, "Please enter a topic")?;
        self.state.trending = TaskState::Pending;
        let articles = self.trends.fetch(topic.trim()).await;
        self.state.trending = TaskState::Success(articles);
        Ok(())
    }

    pub async fn submit_article(
        &mut self,
        url: &str,
        content_type: ContentType,
        tone: Tone,
    ) -> Result<(), DashboardError> {
        self.guard(Tab::Summarizer)?;
        require(url, "Please enter an article URL")?;
        let pipeline = self.pipeline.clone();
        let url = url.to_string();
        self.run_generation(Output::Summarizer, async move {
            pipeline.generate_from_article(&url, content_type, tone).await
        })
        .await
    }

    pub async fn submit_video(
        &mut self,
        url: &str,
        content_type: ContentType,
        tone: Tone,
    ) -> Result<(), DashboardError> {
        self.guard(Tab::Video)?;
        require(url, "Please enter a YouTube URL")?;
        let pipeline = self.pipeline.clone();
        let url = url.to_string();
        self.run_generation(Output::Video, async move {
            pipeline.generate_from_video(&url, content_type, tone).await
        })
        .await
    }

    //=====================================================================================
    // Prompt library
    //=====================================================================================

    pub async fn load_prompts(&mut self, social: Social) -> Result<(), DashboardError> {
        self.guard(Tab::Prompts)?;
        let user_id = self.state.user_id()?;
        self.state.prompt_social = social;
        self.state.prompts = TaskState::Pending;
        match self.db.list_prompts(user_id, social).await {
            Ok(prompts) => {
                self.state.prompts = TaskState::Success(prompts);
                Ok(())
            }
            Err(e) => {
                let err = backend(e);
                self.state.prompts = TaskState::Failed(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn add_prompt(&mut self, prompt: NewPrompt) -> Result<Prompt, DashboardError> {
        self.guard(Tab::Prompts)?;
        let prompt = prompt
            .validate()
            .map_err(|_| DashboardError::EmptyInput("Please fill in both title and prompt"))?;
        let user_id = self.state.user_id()?;

        let saved = self.db.insert_prompt(user_id, &prompt).await.map_err(backend)?;
        if saved.social == self.state.prompt_social {
            if let TaskState::Success(list) = &mut self.state.prompts {
                list.insert(0, saved.clone());
            }
        }
        Ok(saved)
    }

    pub async fn edit_prompt(
        &mut self,
        prompt_id: i64,
        title: &str,
        body: &str,
    ) -> Result<Prompt, DashboardError> {
        self.guard(Tab::Prompts)?;
        require(title, "Please fill in both title and prompt")?;
        require(body, "Please fill in both title and prompt")?;
        let user_id = self.state.user_id()?;

        let updated = self
            .db
            .update_prompt(user_id, prompt_id, title.trim(), body.trim())
            .await
            .map_err(backend)?;
        if let TaskState::Success(list) = &mut self.state.prompts {
            if let Some(entry) = list.iter_mut().find(|p| p.id == prompt_id) {
                *entry = updated.clone();
            }
        }
        Ok(updated)
    }

    pub async fn delete_prompt(&mut self, prompt_id: i64) -> Result<(), DashboardError> {
        self.guard(Tab::Prompts)?;
        let user_id = self.state.user_id()?;
        self.db
            .delete_prompt(user_id, prompt_id)
            .await
            .map_err(backend)?;
        if let TaskState::Success(list) = &mut self.state.prompts {
            list.retain(|p| p.id != prompt_id);
        }
        Ok(())
    }

    /// Runs a saved prompt through the generator, substituting `topic`.
    pub async fn generate_from_prompt(
        &mut self,
        prompt_id: i64,
        topic: Option<&str>,
    ) -> Result<(), DashboardError> {
        self.guard(Tab::Prompts)?;
        let user_id = self.state.user_id()?;
        let prompt = self
            .db
            .get_prompt(user_id, prompt_id)
            .await
            .map_err(backend)?;

        let request = prompt_request(&prompt, topic);
        let pipeline = self.pipeline.clone();
        self.run_generation(Output::PromptOutput, async move { pipeline.generate(&request).await })
            .await
    }
}

/// The generation request a saved prompt stands for.
pub fn prompt_request(prompt: &Prompt, topic: Option<&str>) -> ContentRequest {
    ContentRequest::new(prompt.render(topic), prompt.social.content_type())
        .with_tone(Tone::Engaging)
        .with_audience(DEFAULT_AUDIENCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserCredentials;
    use crate::pipeline::test_support::{pipeline, ScriptedCompletion};
    use crate::pipeline::PipelineSettings;
    use crate::ports::PortResult;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        calls: AtomicUsize,
        prompts: Mutex<Vec<Prompt>>,
    }

    impl MemoryStore {
        fn touch(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn user() -> User {
        User {
            user_id: Uuid::nil(),
            email: "ferris@rust.dev".to_string(),
        }
    }

    #[async_trait]
    impl DatabaseService for MemoryStore {
        async fn create_user_with_email(&self, _email: &str, _hash: &str) -> PortResult<User> {
            self.touch();
            Ok(user())
        }
        async fn get_user_by_email(&self, _email: &str) -> PortResult<UserCredentials> {
            self.touch();
            Err(PortError::NotFound("user".to_string()))
        }
        async fn get_user_by_id(&self, _user_id: Uuid) -> PortResult<User> {
            self.touch();
            Ok(user())
        }
        async fn create_auth_session(
            &self,
            _session_id: &str,
            _user_id: Uuid,
            _expires_at: DateTime<Utc>,
        ) -> PortResult<()> {
            self.touch();
            Ok(())
        }
        async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
            self.touch();
            if session_id == "good" {
                Ok(Uuid::nil())
            } else {
                Err(PortError::Unauthorized)
            }
        }
        async fn delete_auth_session(&self, _session_id: &str) -> PortResult<Uuid> {
            self.touch();
            Ok(Uuid::nil())
        }
        async fn list_prompts(&self, _user_id: Uuid, social: Social) -> PortResult<Vec<Prompt>> {
            self.touch();
            Ok(self
                .prompts
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.social == social)
                .cloned()
                .collect())
        }
        async fn get_prompt(&self, _user_id: Uuid, prompt_id: i64) -> PortResult<Prompt> {
            self.touch();
            self.prompts
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == prompt_id)
                .cloned()
                .ok_or(PortError::NotFound("prompt".to_string()))
        }
        async fn insert_prompt(&self, user_id: Uuid, prompt: &NewPrompt) -> PortResult<Prompt> {
            self.touch();
            let mut prompts = self.prompts.lock().unwrap();
            let saved = Prompt {
                id: prompts.len() as i64 + 1,
                user_id,
                title: prompt.title.clone(),
                body: prompt.body.clone(),
                social: prompt.social,
                created_at: Utc::now(),
            };
            prompts.push(saved.clone());
            Ok(saved)
        }
        async fn update_prompt(
            &self,
            _user_id: Uuid,
            prompt_id: i64,
            title: &str,
            body: &str,
        ) -> PortResult<Prompt> {
            self.touch();
            let mut prompts = self.prompts.lock().unwrap();
            let entry = prompts
                .iter_mut()
                .find(|p| p.id == prompt_id)
                .ok_or(PortError::NotFound("prompt".to_string()))?;
            entry.title = title.to_string();
            entry.body = body.to_string();
            Ok(entry.clone())
        }
        async fn delete_prompt(&self, _user_id: Uuid, prompt_id: i64) -> PortResult<()> {
            self.touch();
            self.prompts.lock().unwrap().retain(|p| p.id != prompt_id);
            Ok(())
        }
    }

    fn build(reply: &str) -> (DashboardController, Arc<MemoryStore>, Arc<ScriptedCompletion>) {
        let completion = ScriptedCompletion::replying(reply);
        let store = Arc::new(MemoryStore::default());
        let settings = PipelineSettings {
            padding: crate::parsing::PaddingPolicy::disabled(),
            ..PipelineSettings::default()
        };
        let controller = DashboardController::new(
            pipeline(completion.clone(), settings),
            TrendFeed::new(None),
            store.clone(),
        );
        (controller, store, completion)
    }

    async fn signed_in(reply: &str) -> (DashboardController, Arc<MemoryStore>, Arc<ScriptedCompletion>) {
        let (mut controller, store, completion) = build(reply);
        controller.mount("good", async {}).await.unwrap();
        (controller, store, completion)
    }

    #[tokio::test]
    async fn mount_resolves_user_and_returns_subscription() {
        let (mut controller, _, _) = build("Tweet: hi");
        let subscription = controller.mount("good", async { 42 }).await.unwrap();
        assert_eq!(subscription, 42);
        assert_eq!(controller.state().user.as_ref().unwrap().email, "ferris@rust.dev");

        let (mut controller, _, _) = build("Tweet: hi");
        assert_eq!(
            controller.mount("stale", async {}).await,
            Err(DashboardError::NotSignedIn)
        );
        assert!(controller.state().user.is_none());
    }

    #[tokio::test]
    async fn generator_stores_success_and_switch_tab_clears_it() {
        let (mut controller, _, _) = signed_in("Tweet: Remote work rocks #remote").await;
        let request = ContentRequest::new("Remote work", ContentType::Tweet).with_web_search(false);
        controller.submit_generator(request).await.unwrap();
        let content = controller.state().generator.success().unwrap();
        assert_eq!(content.tweet.as_deref(), Some("Remote work rocks #remote"));

        controller.state_mut().switch_tab(Tab::Trending);
        assert_eq!(controller.state().generator, TaskState::Idle);
        assert_eq!(controller.state().active_tab, Tab::Trending);
    }

    #[tokio::test]
    async fn submit_while_pending_is_busy() {
        let (mut controller, _, completion) = signed_in("Tweet: hi").await;
        controller.state_mut().generator = TaskState::Pending;
        let request = ContentRequest::new("Remote work", ContentType::Tweet);
        assert_eq!(
            controller.submit_generator(request).await,
            Err(DashboardError::Busy(Tab::Generator))
        );
        assert_eq!(completion.calls(), 0);
    }

    #[tokio::test]
    async fn empty_inputs_are_rejected_before_any_call() {
        let (mut controller, _, completion) = signed_in("Tweet: hi").await;
        let request = ContentRequest::new("  ", ContentType::Tweet);
        assert!(matches!(
            controller.submit_generator(request).await,
            Err(DashboardError::EmptyInput(_))
        ));
        assert!(matches!(
            controller.submit_video("", ContentType::Tweet, Tone::Casual).await,
            Err(DashboardError::EmptyInput(_))
        ));
        assert_eq!(completion.calls(), 0);
        assert_eq!(controller.state().generator, TaskState::Idle);
    }

    #[tokio::test]
    async fn pipeline_failure_is_stored_as_failed() {
        let (mut controller, _, _) = signed_in("Tweet: hi").await;
        controller
            .submit_video("https://vimeo.com/9", ContentType::Tweet, Tone::Casual)
            .await
            .unwrap();
        assert!(matches!(controller.state().video, TaskState::Failed(ref m) if m.contains("YouTube")));
    }

    #[tokio::test]
    async fn trending_always_succeeds_with_fallback() {
        let (mut controller, _, _) = signed_in("Tweet: hi").await;
        controller.submit_trending("AI").await.unwrap();
        assert_eq!(controller.state().trending.success().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn trending_and_generator_states_are_independent() {
        let (mut controller, _, _) = signed_in("Tweet: Ship it #rust").await;
        controller.state_mut().trending = TaskState::Pending;
        let request = ContentRequest::new("Rust", ContentType::Tweet).with_web_search(false);
        controller.submit_generator(request).await.unwrap();
        assert!(controller.state().generator.success().is_some());
        assert_eq!(controller.state().trending, TaskState::Pending);

        controller.state_mut().trending = TaskState::Idle;
        controller.state_mut().generator = TaskState::Pending;
        controller.submit_trending("AI").await.unwrap();
        assert_eq!(controller.state().generator, TaskState::Pending);
        assert_eq!(controller.state().trending.success().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn add_prompt_with_empty_fields_never_reaches_the_store() {
        let (mut controller, store, _) = signed_in("Tweet: hi").await;
        let before = store.calls.load(Ordering::SeqCst);

        for (title, body) in [("", "Write about [TOPIC]"), ("Launch", "   ")] {
            let result = controller
                .add_prompt(NewPrompt {
                    title: title.to_string(),
                    body: body.to_string(),
                    social: Social::Twitter,
                })
                .await;
            assert!(matches!(result, Err(DashboardError::EmptyInput(_))));
        }
        assert_eq!(store.calls.load(Ordering::SeqCst), before);
    }

    #[tokio::test]
    async fn prompt_library_round_trip() {
        let (mut controller, _, completion) = signed_in("LinkedIn: A long reflective post").await;
        controller.load_prompts(Social::Linkedin).await.unwrap();

        let saved = controller
            .add_prompt(NewPrompt {
                title: "Lessons".to_string(),
                body: "Share three lessons about [TOPIC]".to_string(),
                social: Social::Linkedin,
            })
            .await
            .unwrap();
        assert_eq!(controller.state().prompts.success().unwrap().len(), 1);

        controller
            .edit_prompt(saved.id, "Lessons learned", "Share four lessons about [TOPIC]")
            .await
            .unwrap();
        assert_eq!(
            controller.state().prompts.success().unwrap()[0].title,
            "Lessons learned"
        );

        controller
            .generate_from_prompt(saved.id, Some("hiring"))
            .await
            .unwrap();
        let output = controller.state().prompt_output.success().unwrap();
        assert!(output.linkedin.is_some());
        assert!(output.tweet.is_none());
        assert!(completion.last_user_prompt().contains("Share four lessons about hiring"));

        controller.delete_prompt(saved.id).await.unwrap();
        assert!(controller.state().prompts.success().unwrap().is_empty());
    }

    #[tokio::test]
    async fn sign_out_resets_the_dashboard() {
        let (mut controller, _, _) = signed_in("Tweet: hi").await;
        controller.apply_auth_event(AuthEvent::SignedOut {
            user_id: Uuid::nil(),
            session_id: "s1".to_string(),
        });
        assert!(controller.state().user.is_none());
        assert_eq!(
            controller.load_prompts(Social::Twitter).await,
            Err(DashboardError::NotSignedIn)
        );
    }
}
