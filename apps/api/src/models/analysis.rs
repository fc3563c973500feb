use serde::{Deserialize, Serialize};

/// Result returned by the external analysis service for one resume / job description pair.
/// Consumed read-only; the dashboard only derives a keyword-match ratio from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub overall_match_percent: f64,
    pub skill_match_score_percent: f64,
    pub experience_match_score_percent: f64,
    pub keywords: KeywordMatch,
    pub experience: ExperienceSummary,
    #[serde(default)]
    pub relevant_experience_highlights: Vec<String>,
    pub ats: AtsScore,
    /// Relevance-ordered, most relevant first.
    #[serde(default)]
    pub top_resume_keywords: Vec<String>,
    #[serde(default)]
    pub section_match_analysis: SectionMatchAnalysis,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordMatch {
    #[serde(default)]
    pub matched: Vec<String>,
    #[serde(default)]
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceSummary {
    pub required_years: f64,
    pub candidate_years: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsScore {
    pub score_percent: f64,
    pub label: String,
}

/// Free-text status per resume section, e.g. "Strongly Matched" or "Partially Matched".
/// Keys absent from the service response deserialize as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionMatchAnalysis {
    pub education: String,
    pub certifications: String,
    pub skills: String,
    pub experience: String,
    pub soft_skills: String,
}

impl SectionMatchAnalysis {
    /// The five sections in display order, paired with their human-readable names.
    pub fn rows(&self) -> [(&'static str, &str); 5] {
        [
            ("Education", self.education.as_str()),
            ("Certifications", self.certifications.as_str()),
            ("Skills", self.skills.as_str()),
            ("Experience", self.experience.as_str()),
            ("Soft Skills", self.soft_skills.as_str()),
        ]
    }
}
