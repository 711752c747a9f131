//! crates/postcraft_core/src/plans.rs
//!
//! Decoding of generated go-to-market plans.

use crate::domain::GtmPlan;

/// Removes a surrounding ```json or bare ``` fence, if any.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let inner = if let Some((_, rest)) = trimmed.split_once("```json") {
        rest
    } else if let Some((_, rest)) = trimmed.split_once("```") {
        rest
    } else {
        return trimmed;
    };
    inner.split("```").next().unwrap_or(inner).trim()
}

pub fn parse_gtm_plan(raw: &str) -> Result<GtmPlan, serde_json::Error> {
    serde_json::from_str(strip_code_fence(raw))
}
