use std::fmt::Write as _;

use colored::{Color, Colorize};

use super::{display_percent, format_years, section_badge, BadgeStyle, ScoreCard, ScoreTier, Tab};
use crate::models::analysis::AnalysisResult;

const BAR_WIDTH: usize = 24;

/// Terminal rendering of the results dashboard.
pub struct ConsoleRenderer {
    use_colors: bool,
}

impl ConsoleRenderer {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.use_colors {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn tier_color(tier: ScoreTier) -> Color {
        match tier {
            ScoreTier::Excellent => Color::Green,
            ScoreTier::Good => Color::Yellow,
            ScoreTier::Fair => Color::Red,
        }
    }

    fn heading(&self, title: &str) -> String {
        let rule = "─".repeat(title.chars().count());
        format!("\n{}\n{}\n", self.bold(title), self.colorize(&rule, Color::BrightBlack))
    }

    fn bar(&self, percent: u32) -> String {
        let filled = (percent.min(100) as usize * BAR_WIDTH + 50) / 100;
        format!(
            "{}{}",
            self.colorize(&"█".repeat(filled), Color::Blue),
            self.colorize(&"░".repeat(BAR_WIDTH - filled), Color::BrightBlack)
        )
    }

    fn badge(&self, text: &str, style: BadgeStyle) -> String {
        let color = match style {
            BadgeStyle::Positive => Color::Green,
            BadgeStyle::Partial => Color::Yellow,
        };
        self.colorize(&format!("[{text}]"), color)
    }

    fn keyword_list(&self, words: &[String], color: Color) -> String {
        if words.is_empty() {
            return "  (none)\n".to_string();
        }
        let line = words
            .iter()
            .map(|w| self.colorize(w, color))
            .collect::<Vec<_>>()
            .join("  ");
        format!("  {line}\n")
    }

    /// One line of the animated counter, e.g. `Match score:  45%`.
    pub fn counter_line(&self, value: u32, tier: ScoreTier) -> String {
        format!(
            "Match score: {}",
            self.colorize(&format!("{value:>3}%"), Self::tier_color(tier))
        )
    }

    /// Banner separating dashboards when one resume is matched against several jobs.
    pub fn job_heading(&self, source: &str) -> String {
        self.colorize(&format!("══ {source} ══"), Color::Cyan)
    }

    pub fn render_score_card(&self, card: &ScoreCard) -> String {
        let mut out = self.heading("Match Score");
        let _ = writeln!(
            out,
            "{}  {}",
            self.counter_line(card.score, card.tier),
            self.colorize(card.label(), Self::tier_color(card.tier))
        );
        for bar in &card.bars {
            let _ = writeln!(out, "  {:<18}{} {:>3}%", bar.label, self.bar(bar.percent), bar.percent);
        }
        out
    }

    pub fn render_tab(&self, tab: Tab, result: &AnalysisResult) -> String {
        let mut out = self.heading(tab.label());
        match tab {
            Tab::Skills => {
                out.push_str("Matched skills\n");
                out.push_str(&self.keyword_list(&result.keywords.matched, Color::Green));
                out.push_str("Missing skills\n");
                out.push_str(&self.keyword_list(&result.keywords.missing, Color::Red));
            }
            Tab::Experience => {
                let _ = writeln!(
                    out,
                    "  Required:  {}+ years",
                    format_years(result.experience.required_years)
                );
                let _ = writeln!(
                    out,
                    "  Candidate: {} years",
                    format_years(result.experience.candidate_years)
                );
                if !result.relevant_experience_highlights.is_empty() {
                    out.push_str("Relevant highlights\n");
                    for highlight in &result.relevant_experience_highlights {
                        let _ = writeln!(out, "  • {highlight}");
                    }
                }
            }
            Tab::KeywordsAts => {
                let _ = writeln!(
                    out,
                    "  ATS score: {}% ({})",
                    display_percent(result.ats.score_percent),
                    result.ats.label
                );
                out.push_str("Top resume keywords\n");
                out.push_str(&self.keyword_list(&result.top_resume_keywords, Color::Cyan));
            }
            Tab::Breakdown => {
                for (section, status) in result.section_match_analysis.rows() {
                    let _ = writeln!(
                        out,
                        "  {:<16}{}",
                        section,
                        self.badge(status, section_badge(status))
                    );
                }
            }
        }
        out
    }

    pub fn render(&self, result: &AnalysisResult) -> String {
        let mut out = self.render_score_card(&ScoreCard::from_result(result));
        for tab in Tab::ALL {
            out.push_str(&self.render_tab(tab, result));
        }
        out
    }
}

pub fn render_dashboard(result: &AnalysisResult, use_colors: bool) -> String {
    ConsoleRenderer::new(use_colors).render(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::fixtures::sample_result;
    use crate::models::analysis::KeywordMatch;

    #[test]
    fn test_plain_dashboard_contains_every_tab() {
        let text = render_dashboard(&sample_result(), false);
        for tab in Tab::ALL {
            assert!(text.contains(tab.label()), "missing tab {}", tab.label());
        }
        assert!(text.contains("Good Match"));
        assert!(text.contains(" 72%"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_score_card_lists_three_bars() {
        let renderer = ConsoleRenderer::new(false);
        let card = ScoreCard::from_result(&sample_result());
        let text = renderer.render_score_card(&card);
        assert!(text.contains("Skills Match"));
        assert!(text.contains("Experience Match"));
        assert!(text.contains("Keywords Match"));
        assert!(text.contains(" 67%"));
    }

    #[test]
    fn test_experience_tab_formats_years() {
        let text = ConsoleRenderer::new(false).render_tab(Tab::Experience, &sample_result());
        assert!(text.contains("Required:  5+ years"));
        assert!(text.contains("Candidate: 6 years"));
        assert!(text.contains("• Led development of 3 full-stack applications"));
    }

    #[test]
    fn test_breakdown_tab_has_five_rows_with_badges() {
        let text = ConsoleRenderer::new(false).render_tab(Tab::Breakdown, &sample_result());
        let rows: Vec<&str> = text.lines().filter(|l| l.contains('[')).collect();
        assert_eq!(rows.len(), 5);
        assert!(rows[0].starts_with("  Education"));
        assert!(rows[1].contains("[Partially Matched]"));
        assert!(rows[4].starts_with("  Soft Skills"));
    }

    #[test]
    fn test_empty_keyword_lists_render_placeholder() {
        let mut result = sample_result();
        result.keywords = KeywordMatch::default();
        let text = ConsoleRenderer::new(false).render_tab(Tab::Skills, &result);
        assert_eq!(text.matches("(none)").count(), 2);
    }

    #[test]
    fn test_ats_score_is_clamped_like_other_percentages() {
        let renderer = ConsoleRenderer::new(false);
        let mut result = sample_result();

        result.ats.score_percent = 140.0;
        let text = renderer.render_tab(Tab::KeywordsAts, &result);
        assert!(text.contains("ATS score: 100% ("));

        result.ats.score_percent = f64::NAN;
        let text = renderer.render_tab(Tab::KeywordsAts, &result);
        assert!(text.contains("ATS score: 0% ("));

        result.ats.score_percent = 84.6;
        let text = renderer.render_tab(Tab::KeywordsAts, &result);
        assert!(text.contains("ATS score: 85% ("));
    }

    #[test]
    fn test_bar_width_is_constant() {
        let renderer = ConsoleRenderer::new(false);
        for percent in [0, 1, 50, 99, 100] {
            assert_eq!(renderer.bar(percent).chars().count(), BAR_WIDTH);
        }
    }
}
