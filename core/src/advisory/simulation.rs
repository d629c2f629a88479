//! Local scoring heuristic.
//!
//! Pure and deterministic: the same record always yields the same report.
//! Scores land in `[10, 94]`.

use crate::record::ApplicationRecord;
use crate::record::Stage;

use super::AdvisoryReport;

/// Matched as substrings of the lowercased description + revenue model.
pub const KEYWORDS: [&str; 7] = ["revenue", "users", "patent", "team", "growth", "ai", "crypto"];

/// The heuristic never reports a perfect score.
pub const MAX_SCORE: u8 = 94;

const KEYWORD_POINTS: u8 = 5;
const LENGTH_BONUS: u8 = 10;
const LENGTH_THRESHOLD: usize = 50;
const EXCERPT_CHARS: usize = 50;

fn stage_base(stage: &Stage) -> u8 {
    match stage {
        Stage::Scaling => 40,
        Stage::Revenue => 30,
        Stage::Mvp => 20,
        Stage::Draft | Stage::Other(_) => 10,
    }
}

/// Verdict band for a score.
pub fn verdict_for(score: u8) -> &'static str {
    match score {
        81.. => "TOP TIER CANDIDATE",
        61..=80 => "STRONG POTENTIAL",
        41..=60 => "WATCHLIST",
        _ => "HIGH RISK",
    }
}

pub fn simulate(record: &ApplicationRecord) -> AdvisoryReport {
    let text_blob = format!("{} {}", record.description, record.revenue_model()).to_lowercase();

    let mut score = stage_base(&record.stage);
    score += KEYWORDS
        .iter()
        .filter(|keyword| text_blob.contains(*keyword))
        .count() as u8
        * KEYWORD_POINTS;
    if record.description.chars().count() > LENGTH_THRESHOLD {
        score += LENGTH_BONUS;
    }
    let score = score.min(MAX_SCORE);

    let excerpt: String = record.description.chars().take(EXCERPT_CHARS).collect();
    let revenue_focus = if text_blob.contains("revenue") {
        " and revenue focus"
    } else {
        ""
    };
    let promise = if score > 60 { "good" } else { "early" };
    let summary = format!(
        "{business} is a {stage} stage project. The founder describes it as: \"{excerpt}...\". \
         Based on the {stage} status{revenue_focus}, it shows {promise} promise.",
        business = record.business_name().unwrap_or("This venture"),
        stage = record.stage,
    );

    AdvisoryReport {
        score,
        verdict: verdict_for(score).to_string(),
        summary: collapse_whitespace(&summary),
    }
}

/// Runs of whitespace become a single space; ends are trimmed.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
