//! Keyword rules for the debug channel.
//!
//! A keyword matches only as a standalone token: it must be preceded by the start of the
//! text or a non-word character, and followed by the end of the text or a non-word character.
//! Word characters are ASCII only (`[0-9A-Za-z_]`), so umlauts and other non-ASCII letters
//! act as separators. Matching is case-sensitive and the first matching rule wins.

use regex::Regex;

use crate::base::{replies, types::Res};

/// A single keyword and its canned reply.
#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub keyword: String,
    pub reply: String,
    regex: Regex,
}

impl KeywordRule {
    pub fn new(keyword: &str, reply: &str) -> Res<Self> {
        let regex = Regex::new(&format!(r"(?:^|[^0-9A-Za-z_]){}(?:$|[^0-9A-Za-z_])", regex::escape(keyword)))?;

        Ok(Self {
            keyword: keyword.to_string(),
            reply: reply.to_string(),
            regex,
        })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Ordered list of keyword rules.
#[derive(Debug, Clone)]
pub struct KeywordRules {
    rules: Vec<KeywordRule>,
}

impl KeywordRules {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    /// The bot's fixed rule set, in evaluation order.
    pub fn standard() -> Res<Self> {
        let rules = vec![
            KeywordRule::new("alive", replies::RUNNING_REPLY)?,
            KeywordRule::new("up", replies::RUNNING_REPLY)?,
            KeywordRule::new("running", replies::RUNNING_REPLY)?,
            KeywordRule::new("hello", replies::RUNNING_REPLY)?,
            KeywordRule::new("geilste", replies::GEILSTE_REPLY)?,
        ];

        Ok(Self::new(rules))
    }

    /// The first rule matching `text`, if any.
    pub fn find(&self, text: &str) -> Option<&KeywordRule> {
        self.rules.iter().find(|rule| rule.matches(text))
    }

    /// The reply of the first rule matching `text`, if any.
    pub fn reply_for(&self, text: &str) -> Option<&str> {
        self.find(text).map(|rule| rule.reply.as_str())
    }
}

// Tests.
