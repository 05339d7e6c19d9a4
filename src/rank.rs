//! Keyword relevance ranking.

use std::collections::BTreeSet;

use regex::Regex;

use crate::config::RankOptions;
use crate::model::{RankedSection, Section, SubSection};

/// Lowercase keywords drawn from the persona and job descriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keywords(BTreeSet<String>);

impl Keywords {
    /// Union of the words of both descriptions, without stopwords and short
    /// words.
    pub fn extract(persona: &str, job: &str, options: &RankOptions) -> Self {
        let word = Regex::new(r"\w+").unwrap();
        let keywords = [persona, job]
            .iter()
            .flat_map(|text| word.find_iter(text))
            .map(|m| m.as_str().to_lowercase())
            .filter(|w| w.chars().count() >= options.min_keyword_chars)
            .filter(|w| !options.stopwords.iter().any(|s| s == w))
            .collect();
        Self(keywords)
    }

    /// Number of keywords.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no keywords.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if a keyword is present.
    pub fn contains(&self, keyword: &str) -> bool {
        self.0.contains(keyword)
    }

    /// Iterate over keywords in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Number of keywords present in `text`, adjusted for text length.
///
/// Each keyword counts once, however often it occurs.
pub fn score_section(text: &str, keywords: &Keywords, options: &RankOptions) -> f64 {
    let lower = text.to_lowercase();
    let hits = keywords.iter().filter(|k| lower.contains(k)).count() as f64;

    let chars = lower.chars().count();
    if chars < options.short_text_chars && hits > 0.0 {
        hits * options.short_text_factor
    } else if chars > options.long_text_chars {
        hits * options.long_text_factor
    } else {
        hits
    }
}

/// Short excerpt of a section: its first line with an ellipsis when the text
/// is long, otherwise the whole text.
pub fn refine_text(text: &str, options: &RankOptions) -> String {
    if text.chars().count() > options.excerpt_chars {
        let first = text.split('\n').next().unwrap_or_default();
        format!("{}{}", first, options.ellipsis)
    } else {
        text.to_string()
    }
}

/// Ranked sections and their excerpts, best first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    pub sections: Vec<RankedSection>,
    pub excerpts: Vec<SubSection>,
}

/// Score every section and keep the best `top_n` with a positive score.
///
/// Sorting is stable, so equal scores keep their encounter order.
pub fn rank_sections(
    mut sections: Vec<Section>,
    keywords: &Keywords,
    options: &RankOptions,
) -> Ranking {
    for section in &mut sections {
        section.relevance_score = score_section(&section.full_text, keywords, options);
        log::debug!(
            "Score {:.2} for '{}' ({} p.{})",
            section.relevance_score,
            section.section_title,
            section.document,
            section.page_number
        );
    }
    sections.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));

    let mut ranking = Ranking::default();
    for (i, section) in sections
        .into_iter()
        .filter(|s| s.relevance_score > 0.0)
        .take(options.top_n)
        .enumerate()
    {
        ranking.excerpts.push(SubSection {
            document: section.document.clone(),
            page_number: section.page_number,
            refined_text: refine_text(&section.full_text, options),
        });
        ranking.sections.push(RankedSection {
            document: section.document,
            page_number: section.page_number,
            section_title: section.section_title,
            importance_rank: i as u32 + 1,
        });
    }
    ranking
}
