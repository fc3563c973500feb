//! Results dashboard: presentation of an [`AnalysisResult`].
//!
//! Nothing here scores anything. The only derived number is the keyword-match
//! ratio; everything else is cosmetic classification of values the service sent.

use std::time::Duration;

use crate::models::analysis::{AnalysisResult, KeywordMatch};

pub mod render;

/// Number of ticks the score counter takes to reach its target.
pub const ANIMATION_STEPS: u32 = 30;
pub const ANIMATION_TICK: Duration = Duration::from_millis(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTier {
    Excellent,
    Good,
    Fair,
}

impl ScoreTier {
    pub fn label(self) -> &'static str {
        match self {
            ScoreTier::Excellent => "Excellent Match",
            ScoreTier::Good => "Good Match",
            ScoreTier::Fair => "Fair Match",
        }
    }
}

pub fn score_tier(score: u32) -> ScoreTier {
    if score >= 80 {
        ScoreTier::Excellent
    } else if score >= 60 {
        ScoreTier::Good
    } else {
        ScoreTier::Fair
    }
}

pub fn score_label(score: u32) -> &'static str {
    score_tier(score).label()
}

/// Rounds a service percentage for display, clamped to 0..=100.
pub fn display_percent(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u32
}

/// `round(matched / (matched + missing) * 100)`, or 0 when both lists are empty.
pub fn keyword_match_percent(keywords: &KeywordMatch) -> u32 {
    let matched = keywords.matched.len();
    let total = matched + keywords.missing.len();
    if total == 0 {
        return 0;
    }
    ((matched as f64 / total as f64) * 100.0).round() as u32
}

/// Counter shown inside the circular score indicator. Each tick adds
/// `ceil(target / 30)` until the target is reached; the last frame is always the target.
#[derive(Debug, Clone)]
pub struct ScoreAnimation {
    target: u32,
    step: u32,
    current: u32,
    finished: bool,
}

impl ScoreAnimation {
    pub fn new(target: u32) -> Self {
        Self {
            target,
            step: target.div_ceil(ANIMATION_STEPS),
            current: 0,
            finished: false,
        }
    }
}

impl Iterator for ScoreAnimation {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.finished {
            return None;
        }
        self.current += self.step;
        if self.current >= self.target {
            self.finished = true;
            Some(self.target)
        } else {
            Some(self.current)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBar {
    pub label: &'static str,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreCard {
    pub score: u32,
    pub tier: ScoreTier,
    pub bars: [ScoreBar; 3],
}

impl ScoreCard {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let score = display_percent(result.overall_match_percent);
        Self {
            score,
            tier: score_tier(score),
            bars: [
                ScoreBar {
                    label: "Skills Match",
                    percent: display_percent(result.skill_match_score_percent),
                },
                ScoreBar {
                    label: "Experience Match",
                    percent: display_percent(result.experience_match_score_percent),
                },
                ScoreBar {
                    label: "Keywords Match",
                    percent: keyword_match_percent(&result.keywords),
                },
            ],
        }
    }

    pub fn label(&self) -> &'static str {
        score_label(self.score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeStyle {
    Positive,
    Partial,
}

/// Picks the badge style for a section status by substring match.
pub fn section_badge(status: &str) -> BadgeStyle {
    let status = status.to_lowercase();
    if status.contains("strong") || status.contains("matches") {
        BadgeStyle::Positive
    } else if status.contains("partial") {
        BadgeStyle::Partial
    } else {
        BadgeStyle::Positive
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Skills,
    Experience,
    KeywordsAts,
    Breakdown,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Skills, Tab::Experience, Tab::KeywordsAts, Tab::Breakdown];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Skills => "Skills Match",
            Tab::Experience => "Experience",
            Tab::KeywordsAts => "Keywords & ATS",
            Tab::Breakdown => "Detailed Breakdown",
        }
    }
}

/// "5", "2.5": whole years without a decimal point.
pub fn format_years(years: f64) -> String {
    if years.fract() == 0.0 {
        format!("{years:.0}")
    } else {
        format!("{years:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::fixtures::sample_result;

    fn keywords(matched: &[&str], missing: &[&str]) -> KeywordMatch {
        KeywordMatch {
            matched: matched.iter().map(|s| s.to_string()).collect(),
            missing: missing.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_keyword_ratio_rounds() {
        assert_eq!(keyword_match_percent(&keywords(&["react", "sql"], &["docker"])), 67);
        assert_eq!(keyword_match_percent(&keywords(&["a"], &["b", "c"])), 33);
    }

    #[test]
    fn test_keyword_ratio_edges() {
        assert_eq!(keyword_match_percent(&keywords(&[], &[])), 0);
        assert_eq!(keyword_match_percent(&keywords(&["a"], &[])), 100);
        assert_eq!(keyword_match_percent(&keywords(&[], &["a"])), 0);
    }

    #[test]
    fn test_score_labels() {
        assert_eq!(score_label(45), "Fair Match");
        assert_eq!(score_label(65), "Good Match");
        assert_eq!(score_label(85), "Excellent Match");
    }

    #[test]
    fn test_score_label_boundaries() {
        assert_eq!(score_tier(59), ScoreTier::Fair);
        assert_eq!(score_tier(60), ScoreTier::Good);
        assert_eq!(score_tier(79), ScoreTier::Good);
        assert_eq!(score_tier(80), ScoreTier::Excellent);
    }

    #[test]
    fn test_display_percent_clamps_and_rounds() {
        assert_eq!(display_percent(66.67), 67);
        assert_eq!(display_percent(-3.0), 0);
        assert_eq!(display_percent(140.2), 100);
        assert_eq!(display_percent(f64::NAN), 0);
    }

    #[test]
    fn test_animation_steps_toward_target() {
        let frames: Vec<u32> = ScoreAnimation::new(45).collect();
        assert_eq!(frames.first(), Some(&2));
        assert_eq!(frames.last(), Some(&45));
        assert!(frames.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(frames.len(), 23);
    }

    #[test]
    fn test_animation_never_overshoots() {
        let frames: Vec<u32> = ScoreAnimation::new(100).collect();
        assert_eq!(frames.len(), 25);
        assert!(frames.iter().all(|&f| f <= 100));
        assert_eq!(frames.last(), Some(&100));
    }

    #[test]
    fn test_animation_of_zero_is_single_frame() {
        assert_eq!(ScoreAnimation::new(0).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_score_card_from_result() {
        let card = ScoreCard::from_result(&sample_result());
        assert_eq!(card.score, 72);
        assert_eq!(card.label(), "Good Match");
        assert_eq!(card.bars[0].percent, 81);
        assert_eq!(card.bars[1].percent, 67);
        assert_eq!(card.bars[2].label, "Keywords Match");
        assert_eq!(card.bars[2].percent, 67);
    }

    #[test]
    fn test_section_badges() {
        assert_eq!(section_badge("Strongly Matched"), BadgeStyle::Positive);
        assert_eq!(section_badge("Matches"), BadgeStyle::Positive);
        assert_eq!(section_badge("Partially Matched"), BadgeStyle::Partial);
        assert_eq!(section_badge("Partial Match"), BadgeStyle::Partial);
        assert_eq!(section_badge("Not Required"), BadgeStyle::Positive);
        assert_eq!(section_badge(""), BadgeStyle::Positive);
    }

    #[test]
    fn test_format_years() {
        assert_eq!(format_years(5.0), "5");
        assert_eq!(format_years(2.5), "2.5");
    }
}
