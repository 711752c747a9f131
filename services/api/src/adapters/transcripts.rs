//! services/api/src/adapters/transcripts.rs
//!
//! Placeholder `TranscriptService`. No transcript source is wired up yet, so
//! this returns a generic paragraph picked by the video id. Swap in a real
//! captions provider behind the same port when one is available.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use postcraft_core::ports::{PortResult, TranscriptService};
use tracing::warn;

const TEMPLATES: [&str; 3] = [
    "This video ({id}) walks through its subject step by step, with practical tips, real-world examples and clear takeaways viewers can act on.",
    "In this video ({id}) the speaker shares expert knowledge and experience, explaining the key ideas in detail and closing with actionable advice.",
    "This video ({id}) offers educational insights and case studies, highlighting the main lessons and why they matter to the audience.",
];

#[derive(Default)]
pub struct CannedTranscriptAdapter;

impl CannedTranscriptAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn template_for(video_id: &str) -> &'static str {
    let mut hasher = DefaultHasher::new();
    video_id.hash(&mut hasher);
    TEMPLATES[(hasher.finish() % TEMPLATES.len() as u64) as usize]
}

#[async_trait]
impl TranscriptService for CannedTranscriptAdapter {
    async fn transcript(&self, video_id: &str) -> PortResult<String> {
        warn!(video_id, "No transcript provider configured, using placeholder text");
        Ok(template_for(video_id).replace("{id}", video_id))
    }
}
