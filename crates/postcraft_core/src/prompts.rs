//! crates/postcraft_core/src/prompts.rs
//!
//! Prompt assembly for every completion call site. Pure string building.

use crate::domain::{ContentRequest, ContentType, GtmPlanRequest, Tone};
use crate::ports::PromptPair;

const GENERATION_SYSTEM_PROMPT: &str = r#"You are an expert social media content creator. Follow the user's instructions exactly as provided.

CRITICAL LENGTH REQUIREMENTS:
- Tweets: MUST be at least 200 characters (can be longer)
- LinkedIn posts: MUST be at least 500 characters (can be longer)
- Twitter threads: Each tweet in the thread should be at least 200 characters
- These are MINIMUM requirements - you can exceed these lengths

ACCURACY AND FACT-CHECKING (CRITICAL):
- ALWAYS use REAL, ACCURATE information from web search results when provided
- NEVER use placeholder URLs like "example.com" or made-up URLs
- ONLY include URLs that are REAL and from the search results
- Use SPECIFIC facts, details, features, dates, and information from search results
- If search results mention specific product features, pricing, release dates, etc., USE THEM
- DO NOT make up generic information - use the ACTUAL details from the search results
- If you don't have real information, use your knowledge base but indicate if information is from your training data

WEB SEARCH INFORMATION PRIORITY:
- Web search results are your PRIMARY source of truth when provided
- Extract and use SPECIFIC details: product names, features, pricing, dates, company names, URLs
- Incorporate exact facts and statistics from the search results
- Reference real URLs, official sources, and accurate information only
- If search results contain warnings about placeholder data, use your knowledge base instead

Always ensure your content meets these character minimums while following the user's specific instructions and using ACCURATE, REAL information from web searches when provided."#;

const HUMANIZE_SYSTEM_PROMPT: &str = r#"You are an expert at making AI-generated content sound more human and natural. Your task is to rewrite the given content to make it sound like it was written by a real person, not an AI.

HUMANIZATION GUIDELINES:
- Use more conversational, natural language
- Add personal touches and human emotions
- Use contractions (I'm, you're, don't, etc.)
- Make it sound like a real person sharing their thoughts
- Remove overly formal or robotic language
- Add personality and authenticity
- Keep the core message but make it more relatable
- Use more natural sentence structures
- Add human-like expressions and reactions

Make the content sound like it was written by a genuine, enthusiastic person who wants to share something valuable with their audience."#;

const GTM_SYSTEM_PROMPT: &str = r#"You are an expert Go-To-Market (GTM) strategist specializing in helping solopreneurs and founders launch their products successfully. Your task is to create a comprehensive, actionable GTM plan based on the product information provided.

The plan must be structured and include:
1. Positioning & Messaging: A clear value proposition and compelling taglines
2. GTM Channels: Specific platforms and strategies tailored to the product
3. Content Calendar: Daily/weekly posting ideas with CTAs for at least 7 days
4. Outreach Strategy: DM templates, collaboration ideas, and influencer outreach tactics
5. KPIs to Track: Key metrics that indicate traction and progress

Make the plan specific, actionable, and tailored to the product and target audience."#;

const GTM_JSON_SHAPE: &str = r#"Please provide a detailed GTM plan in JSON format with the following structure:
{
  "positioning": {
    "valueProposition": "A clear, compelling value proposition that explains what makes this product unique",
    "taglines": ["Tagline 1", "Tagline 2", "Tagline 3"]
  },
  "channels": [
    {
      "platform": "Platform name (e.g., Product Hunt, Twitter, Reddit, LinkedIn, SEO)",
      "strategy": "Specific strategy for this platform",
      "why": "Why this channel is relevant for this product"
    }
  ],
  "contentCalendar": [
    {
      "day": 1,
      "content": "Specific content idea for day 1",
      "platform": "Platform name",
      "cta": "Call-to-action for this content"
    }
  ],
  "outreachStrategy": {
    "dmTemplates": ["DM template 1", "DM template 2", "DM template 3"],
    "collaborationAngles": ["Collaboration idea 1", "Collaboration idea 2"],
    "influencerOutreach": ["Influencer outreach idea 1", "Influencer outreach idea 2"]
  },
  "kpis": [
    {
      "metric": "Metric name",
      "description": "What this metric measures",
      "target": "Target value or range"
    }
  ]
}

IMPORTANT:
- Provide content calendar for at least 7 days (ideally 14-30 days)
- Make all strategies specific to this product and audience
- Include actionable, concrete steps
- Ensure all information is relevant and realistic"#;

pub const TRENDING_SYSTEM_PROMPT: &str = "You are a news aggregator that finds the latest trending articles. Return a JSON response with an array of articles. Each article should have: title, summary, url, source, publishedDate, and category. Limit to 10 articles maximum.";

/// Style guidance for a tone.
pub fn tone_guidelines(tone: Tone) -> &'static str {
    match tone {
        Tone::Professional => "Use formal language, industry terminology, and authoritative tone. Perfect for business content.",
        Tone::Casual => "Use conversational language, contractions, and friendly tone. Great for personal brands.",
        Tone::Engaging => "Use compelling language, questions, and calls-to-action. Focus on interaction and engagement.",
        Tone::Funny => "Use humor, wit, and light-hearted language. Include jokes and entertaining elements.",
        Tone::Informative => "Use educational language, facts, and clear explanations. Focus on teaching and sharing knowledge.",
    }
}

pub fn content_type_description(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Tweet => "a single tweet",
        ContentType::Linkedin => "a LinkedIn post",
        ContentType::TwitterThread => "a Twitter thread (3-7 connected tweets)",
        ContentType::Both => "both a tweet and LinkedIn post",
    }
}

fn format_instructions(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Both => "\n\nIMPORTANT: Generate BOTH a tweet and a LinkedIn post. Format your response as follows:\nTweet: [your tweet content here]\nLinkedIn: [your LinkedIn post content here]",
        ContentType::TwitterThread => "\n\nIMPORTANT: Generate a Twitter thread with 3-7 connected tweets. Number each tweet (e.g., 1/7, 2/7, etc.).",
        ContentType::Tweet | ContentType::Linkedin => "",
    }
}

fn search_instruction(search_block: &str) -> String {
    if search_block.trim().is_empty() {
        return String::new();
    }
    format!(
        "\n\nCRITICAL WEB SEARCH DATA: I have searched the internet and found the latest information about this topic.

MANDATORY REQUIREMENTS:
1. Use the SPECIFIC facts, details, and information from the search results below
2. If URLs are provided in search results, use ONLY those REAL URLs - NEVER use placeholder URLs like example.com
3. Include exact product names, features, pricing, dates, or other specific details mentioned in the search results
4. Make your content accurate and factual based on the search results
5. If search results contain warnings about placeholder data, rely on your knowledge base for accurate information

Search Results:
{}",
        search_block
    )
}

/// Builds the system and user prompts for a post generation request.
///
/// `search_block` is the output of `format_search_block`, or empty.
pub fn build_prompts(request: &ContentRequest, search_block: &str) -> PromptPair {
    let tone_line = match request.tone {
        Some(tone) => format!("Tone: {} ({})", tone, tone_guidelines(tone)),
        None => String::new(),
    };
    let audience_line = match request.target_audience.as_deref() {
        Some(audience) if !audience.trim().is_empty() => {
            format!("Target audience: {}", audience.trim())
        }
        _ => String::new(),
    };

    let user = format!(
        "Generate {} based on this topic:\n\n{}\n\n{}\n{}{}{}",
        content_type_description(request.content_type),
        request.topic,
        tone_line,
        audience_line,
        format_instructions(request.content_type),
        search_instruction(search_block),
    );

    PromptPair {
        system: GENERATION_SYSTEM_PROMPT.to_string(),
        user,
    }
}

pub fn build_humanize_prompts(content: &str, content_type: ContentType) -> PromptPair {
    let user = format!(
        "Rewrite this {} to make it sound more human and natural:\n\n{}\n\nMake it sound like a real person wrote this, not an AI. Keep the same core message but make it more conversational and authentic.",
        content_type, content
    );
    PromptPair {
        system: HUMANIZE_SYSTEM_PROMPT.to_string(),
        user,
    }
}

pub fn build_gtm_prompts(request: &GtmPlanRequest) -> PromptPair {
    let channels = match request.channels_tried.as_deref() {
        Some(tried) if !tried.trim().is_empty() => format!("Channels Already Tried: {}", tried),
        _ => String::new(),
    };
    let user = format!(
        "Create a comprehensive Go-To-Market plan for this product:\n\nProduct Name: {}\nProduct Description: {}\nTarget Audience: {}\nShort-term Goal: {}\n{}\n\n{}",
        request.product_name,
        request.product_description,
        request.target_audience,
        request.short_term_goal,
        channels,
        GTM_JSON_SHAPE,
    );
    PromptPair {
        system: GTM_SYSTEM_PROMPT.to_string(),
        user,
    }
}

pub fn build_trending_prompts(topic: &str) -> PromptPair {
    PromptPair {
        system: TRENDING_SYSTEM_PROMPT.to_string(),
        user: format!(
            "Find the latest trending articles and news about {} from the past week. Include article titles, summaries, URLs, and publication dates. Focus on the most recent and popular content.",
            topic
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_requests_ask_for_labeled_sections() {
        let request = ContentRequest::new("Benefits of remote work", ContentType::Both)
            .with_tone(Tone::Engaging)
            .with_audience("general");
        let prompts = build_prompts(&request, "");
        assert!(prompts.user.starts_with("Generate both a tweet and LinkedIn post"));
        assert!(prompts.user.contains("Benefits of remote work"));
        assert!(prompts.user.contains("Tone: engaging"));
        assert!(prompts.user.contains("Target audience: general"));
        assert!(prompts.user.contains("Tweet: [your tweet content here]"));
        assert!(!prompts.user.contains("Search Results:"));
        assert!(prompts.system.contains("CRITICAL LENGTH REQUIREMENTS"));
    }

    #[test]
    fn thread_requests_ask_for_numbering() {
        let request = ContentRequest::new("Ownership in Rust", ContentType::TwitterThread);
        let prompts = build_prompts(&request, "");
        assert!(prompts.user.contains("Number each tweet"));
        assert!(!prompts.user.contains("Tone:"));
    }

    #[test]
    fn search_block_is_appended_when_present() {
        let request = ContentRequest::new("latest AI news", ContentType::Tweet);
        let prompts = build_prompts(&request, "[RESULT 1]\nTitle: x");
        assert!(prompts.user.contains("MANDATORY REQUIREMENTS"));
        assert!(prompts.user.ends_with("[RESULT 1]\nTitle: x"));
    }

    #[test]
    fn every_tone_has_its_own_guidance() {
        let lines: std::collections::HashSet<_> = [
            Tone::Professional,
            Tone::Casual,
            Tone::Engaging,
            Tone::Funny,
            Tone::Informative,
        ]
        .into_iter()
        .map(tone_guidelines)
        .collect();
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn missing_tone_leaves_no_tone_line() {
        let prompts = build_prompts(&ContentRequest::new("Rust", ContentType::Tweet), "");
        assert!(!prompts.user.contains("Tone:"));

        let prompts = build_prompts(
            &ContentRequest::new("Rust", ContentType::Tweet).with_tone(Tone::Funny),
            "",
        );
        assert!(prompts.user.contains(tone_guidelines(Tone::Funny)));
    }

    #[test]
    fn gtm_prompt_mentions_optional_channels_only_when_given() {
        let mut request = GtmPlanRequest {
            product_name: "Postcraft".to_string(),
            product_description: "Writes posts".to_string(),
            target_audience: "Founders".to_string(),
            short_term_goal: "100 users".to_string(),
            channels_tried: None,
        };
        assert!(!build_gtm_prompts(&request).user.contains("Channels Already Tried"));
        request.channels_tried = Some("Reddit".to_string());
        assert!(build_gtm_prompts(&request)
            .user
            .contains("Channels Already Tried: Reddit"));
    }
}
