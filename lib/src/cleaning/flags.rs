//! Keyword-driven boolean flags.

use crate::cleaning::parse;
use crate::config::{CleaningConfig, KeywordRule};
use crate::dataset::RawListing;
use crate::error::PipelineError;
use regex::Regex;

/// Case-insensitive whole-word matcher over a keyword list.
///
/// Multi-word keywords match across any run of whitespace.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    pattern: Option<Regex>,
}

impl KeywordMatcher {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self, PipelineError> {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim())
            .filter(|k| !k.is_empty())
            .map(|k| {
                k.split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+")
            })
            .collect();

        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }
        let pattern = Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|")))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(text))
    }
}

/// Compiled [`KeywordRule`]: any include keyword and no exclude keyword.
#[derive(Debug, Clone)]
pub struct FlagRule {
    include: KeywordMatcher,
    exclude: KeywordMatcher,
}

impl FlagRule {
    pub fn compile(rule: &KeywordRule) -> Result<Self, PipelineError> {
        Ok(Self {
            include: KeywordMatcher::new(&rule.include)?,
            exclude: KeywordMatcher::new(&rule.exclude)?,
        })
    }

    pub fn detect(&self, text: &str) -> bool {
        self.include.is_match(text) && !self.exclude.is_match(text)
    }

    /// An explicit `true`/`false` cell wins over keyword detection.
    pub fn resolve(&self, explicit: Option<&str>, text: &str) -> bool {
        parse::boolean(explicit).unwrap_or_else(|| self.detect(text))
    }
}

/// Text-derived flags of one listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListingFlags {
    pub student_flag: bool,
    pub furnished: bool,
    pub pets_allowed: bool,
    pub parking_available: bool,
    pub utilities_included: bool,
}

/// All flag rules compiled once per cleaning run.
#[derive(Debug, Clone)]
pub struct FlagDetector {
    student: KeywordMatcher,
    furnished: FlagRule,
    pets_allowed: FlagRule,
    parking_available: FlagRule,
    utilities_included: FlagRule,
}

impl FlagDetector {
    pub fn from_config(config: &CleaningConfig) -> Result<Self, PipelineError> {
        Ok(Self {
            student: KeywordMatcher::new(&config.student_keywords)?,
            furnished: FlagRule::compile(&config.furnished)?,
            pets_allowed: FlagRule::compile(&config.pets_allowed)?,
            parking_available: FlagRule::compile(&config.parking_available)?,
            utilities_included: FlagRule::compile(&config.utilities_included)?,
        })
    }

    pub fn detect(&self, raw: &RawListing) -> ListingFlags {
        let text = raw.searchable_text();
        ListingFlags {
            student_flag: self.student.is_match(&text),
            furnished: self.furnished.resolve(raw.furnished.as_deref(), &text),
            pets_allowed: self.pets_allowed.resolve(raw.pets_allowed.as_deref(), &text),
            parking_available: self
                .parking_available
                .resolve(raw.parking_available.as_deref(), &text),
            utilities_included: self
                .utilities_included
                .resolve(raw.utilities_included.as_deref(), &text),
        }
    }
}
