//! Keyword-lexicon sentiment classification over a ticker's headlines.

use serde::{Deserialize, Serialize};

use crate::constants::sentiment::{
    BASE_CONFIDENCE, CONFIDENCE_PER_POINT, LABEL_THRESHOLD, MAX_CONFIDENCE,
};
use crate::models::{NewsItem, SentimentLabel, SentimentResult};

const DEFAULT_POSITIVE: &[&str] = &[
    "gain", "bullish", "upgrade", "beat", "surge", "rally", "record high", "growth",
    "outperform", "profit", "soar", "jump", "strong", "boost",
];

const DEFAULT_NEGATIVE: &[&str] = &[
    "loss", "bearish", "downgrade", "missed", "misses", "plunge", "decline", "lawsuit", "weak",
    "underperform", "slump", "tumble", "recall", "layoff",
];

const DEFAULT_CATALYSTS: &[(&str, &[&str])] = &[
    ("Earnings", &["earnings", "revenue", "eps", "quarterly results", "guidance"]),
    ("Analyst Action", &["upgrade", "downgrade", "price target", "initiates coverage"]),
    ("M&A", &["merger", "acquisition", "acquire", "buyout", "takeover"]),
    ("Regulatory", &["fda", "approval", "antitrust", "regulator"]),
    ("Product Launch", &["launch", "unveil"]),
    ("Capital Return", &["dividend", "buyback", "repurchase"]),
    ("Legal", &["lawsuit", "settlement", "investigation"]),
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalystRule {
    pub name: String,
    pub triggers: Vec<String>,
}

/// Term lists driving the analyzer. A term matches wherever it occurs in the
/// lower-cased headline text, so "gain" also hits "regained".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub catalysts: Vec<CatalystRule>,
}

impl Default for Lexicon {
    fn default() -> Self {
        let owned = |terms: &[&str]| terms.iter().map(|t| t.to_string()).collect::<Vec<_>>();
        Self {
            positive: owned(DEFAULT_POSITIVE),
            negative: owned(DEFAULT_NEGATIVE),
            catalysts: DEFAULT_CATALYSTS
                .iter()
                .map(|(name, triggers)| CatalystRule {
                    name: name.to_string(),
                    triggers: owned(triggers),
                })
                .collect(),
        }
    }
}

impl Lexicon {
    pub fn new(positive: &[&str], negative: &[&str]) -> Self {
        Self {
            positive: positive.iter().map(|t| t.to_string()).collect(),
            negative: negative.iter().map(|t| t.to_string()).collect(),
            catalysts: Vec::new(),
        }
    }

    pub fn with_catalyst(mut self, name: &str, triggers: &[&str]) -> Self {
        self.catalysts.push(CatalystRule {
            name: name.to_string(),
            triggers: triggers.iter().map(|t| t.to_string()).collect(),
        });
        self
    }

    /// Lower-case, trim, drop blanks and duplicates.
    fn normalized(self) -> Self {
        fn clean(terms: Vec<String>) -> Vec<String> {
            let mut out: Vec<String> = Vec::with_capacity(terms.len());
            for term in terms {
                let term = term.trim().to_lowercase();
                if !term.is_empty() && !out.contains(&term) {
                    out.push(term);
                }
            }
            out
        }

        Self {
            positive: clean(self.positive),
            negative: clean(self.negative),
            catalysts: self
                .catalysts
                .into_iter()
                .map(|rule| CatalystRule {
                    name: rule.name,
                    triggers: clean(rule.triggers),
                })
                .filter(|rule| !rule.triggers.is_empty())
                .collect(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SentimentAnalyzer {
    lexicon: Lexicon,
}

impl SentimentAnalyzer {
    pub fn new(lexicon: Lexicon) -> Self {
        Self {
            lexicon: lexicon.normalized(),
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Each lexicon term counts once per item whose title or summary contains it.
    pub fn analyze(&self, news: &[NewsItem]) -> SentimentResult {
        if news.is_empty() {
            return SentimentResult::neutral();
        }

        let mut score: i32 = 0;
        let mut keywords: Vec<String> = Vec::new();
        let mut catalyst_hits = vec![false; self.lexicon.catalysts.len()];

        for item in news {
            let text = format!("{} {}", item.title, item.summary).to_lowercase();

            for term in &self.lexicon.positive {
                if text.contains(term.as_str()) {
                    score += 1;
                    push_unique(&mut keywords, term);
                }
            }
            for term in &self.lexicon.negative {
                if text.contains(term.as_str()) {
                    score -= 1;
                    push_unique(&mut keywords, term);
                }
            }
            for (hit, rule) in catalyst_hits.iter_mut().zip(&self.lexicon.catalysts) {
                if !*hit && rule.triggers.iter().any(|t| text.contains(t.as_str())) {
                    *hit = true;
                }
            }
        }

        let catalysts = self
            .lexicon
            .catalysts
            .iter()
            .zip(&catalyst_hits)
            .filter(|(_, hit)| **hit)
            .map(|(rule, _)| rule.name.clone())
            .collect();

        SentimentResult {
            label: classify(score),
            score,
            confidence: confidence_for(score, news.len()),
            catalysts,
            keywords,
        }
    }
}

pub fn classify(score: i32) -> SentimentLabel {
    if score > LABEL_THRESHOLD {
        SentimentLabel::Bullish
    } else if score < -LABEL_THRESHOLD {
        SentimentLabel::Bearish
    } else {
        SentimentLabel::Neutral
    }
}

/// min(90, 50 + 15 * |score|), or 0 without news.
pub fn confidence_for(score: i32, news_count: usize) -> u8 {
    if news_count == 0 {
        return 0;
    }
    let raw = BASE_CONFIDENCE as u32 + CONFIDENCE_PER_POINT.saturating_mul(score.unsigned_abs());
    raw.min(MAX_CONFIDENCE as u32) as u8
}

fn push_unique(keywords: &mut Vec<String>, term: &str) {
    if !keywords.iter().any(|k| k == term) {
        keywords.push(term.to_string());
    }
}
