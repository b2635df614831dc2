//! Pattern registry: every textual shape a version number or a "last
//! updated" date can take in the scanned files.
//!
//! Each version rule captures the text before the version as group 1, the
//! version run itself as group 2 and, where the shape has one, the closing
//! literal as group 3. Replacement templates re-emit groups 1 and 3 verbatim,
//! so only the digits change.
//!
//! Rules are independent matchers. Several may match the same line (a
//! `// Version: 3.3` comment is also a `Version: 3.3` label); all of them
//! apply, and order only affects the order changes are reported in.

use regex::Regex;
use std::borrow::Cow;

use crate::config::PatternsConfig;
use crate::error::{Result, StamperError};

/// A full dotted version run. Greedy, so a match always extends to the end
/// of the digits; a shorter match would leave stale digits behind.
const VERSION_RUN: &str = r"[0-9]+(?:\.[0-9]+)*";

/// Built-in rules as (name, pattern with `{V}` standing for the version run, template)
const BUILTIN_RULES: &[(&str, &str, &str)] = &[
    ("comment", r"(//\s*Version:?\s*)({V})", "${1}{version}"),
    (
        "html-comment",
        r"(<!--\s*Version:?\s*)({V})(\s*-->)",
        "${1}{version}${3}",
    ),
    ("label", r"(Version:\s*)({V})", "${1}{version}"),
    ("json", r#"("version"\s*:\s*")({V})(")"#, "${1}{version}${3}"),
    (
        "js-constant",
        r#"(VERSION\s*:\s*["'])({V})(["'])"#,
        "${1}{version}${3}",
    ),
    (
        "cache-name",
        r#"(CACHE_NAME\s*[=:]\s*["'][^"']*?-v)({V})(["'])"#,
        "${1}{version}${3}",
    ),
    ("ui-bullet", r"(Version\s+)({V})(\s*[•·])", "${1}{version}${3}"),
    (
        "ui-ready",
        r"(Version\s+)({V})(\s+is\s+ready)",
        "${1}{version}${3}",
    ),
    ("query-string", r"(\?v=)({V})", "${1}{version}"),
    (
        "cache-const",
        r#"(const\s+\w*CACHE\w*\s*=\s*["'][^"']*?-v)({V})(["'])"#,
        "${1}{version}${3}",
    ),
    ("v-prefix", r"(v)({V})(\s*-)", "${1}{version}${3}"),
];

const DATE_BODY: &str = r"[A-Z][a-z]+\s+[0-9]{1,2},\s+[0-9]{4}";

const BUILTIN_DATES: &[(&str, &str)] = &[
    ("Last Updated", r"(Last Updated:?\s*)"),
    ("Last Modified", r"(Last Modified:?\s*)"),
];

/// A version pattern plus its replacement template
#[derive(Debug, Clone)]
pub struct PatternRule {
    name: String,
    regex: Regex,
    template: String,
}

impl PatternRule {
    /// Compile a rule. The pattern needs at least two capture groups and the
    /// template must contain the `{version}` placeholder.
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        template: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        let template = template.into();
        let regex = Regex::new(pattern)?;

        // captures_len counts the implicit whole-match group
        if regex.captures_len() < 3 {
            return Err(StamperError::config(format!(
                "pattern '{}' must capture the prefix and the version as groups 1 and 2",
                name
            )));
        }
        if !template.contains("{version}") {
            return Err(StamperError::config(format!(
                "template for pattern '{}' has no {{version}} placeholder",
                name
            )));
        }

        Ok(PatternRule {
            name,
            regex,
            template,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }

    fn replacement(&self, version: &str) -> String {
        self.template.replace("{version}", version)
    }

    /// Rewrites every match in `line` to carry `version`
    pub fn apply<'a>(&self, line: &'a str, version: &str) -> Cow<'a, str> {
        let replacement = self.replacement(version);
        self.regex.replace_all(line, replacement.as_str())
    }

    /// `(old, new)` text of each match in `line`, trimmed, for reporting
    pub fn previews(&self, line: &str, version: &str) -> Vec<(String, String)> {
        let replacement = self.replacement(version);
        self.regex
            .find_iter(line)
            .map(|m| {
                let old = m.as_str();
                let new = self.regex.replace(old, replacement.as_str());
                (old.trim().to_string(), new.trim().to_string())
            })
            .collect()
    }
}

/// A "Last Updated"-style date line
#[derive(Debug, Clone)]
pub struct DatePattern {
    label: String,
    regex: Regex,
}

impl DatePattern {
    pub fn new(label: impl Into<String>, prefix_pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("{}({})", prefix_pattern, DATE_BODY))?;
        Ok(DatePattern {
            label: label.into(),
            regex,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }

    /// Dates currently written on the line
    pub fn dates(&self, line: &str) -> Vec<String> {
        self.regex
            .captures_iter(line)
            .filter_map(|caps| caps.get(2).map(|m| m.as_str().to_string()))
            .collect()
    }

    pub fn apply<'a>(&self, line: &'a str, date: &str) -> Cow<'a, str> {
        // `$` in a rendered date would read as a group reference
        let replacement = format!("${{1}}{}", date.replace('$', "$$"));
        self.regex.replace_all(line, replacement.as_str())
    }
}

/// Ordered set of version rules and date patterns
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    version_rules: Vec<PatternRule>,
    date_patterns: Vec<DatePattern>,
}

impl PatternRegistry {
    /// The built-in rules only
    pub fn builtin() -> Result<Self> {
        let version_rules = BUILTIN_RULES
            .iter()
            .map(|(name, pattern, template)| {
                PatternRule::new(*name, &pattern.replace("{V}", VERSION_RUN), *template)
            })
            .collect::<Result<Vec<_>>>()?;

        let date_patterns = BUILTIN_DATES
            .iter()
            .map(|(label, prefix)| DatePattern::new(*label, prefix))
            .collect::<Result<Vec<_>>>()?;

        Ok(PatternRegistry {
            version_rules,
            date_patterns,
        })
    }

    /// Built-in rules followed by the project's extra patterns
    pub fn from_config(config: &PatternsConfig) -> Result<Self> {
        let mut registry = PatternRegistry::builtin()?;
        for extra in &config.extra {
            let rule = PatternRule::new(&extra.name, &extra.pattern, &extra.template)
                .map_err(|e| {
                    StamperError::config(format!("extra pattern '{}': {}", extra.name, e))
                })?;
            registry.version_rules.push(rule);
        }
        Ok(registry)
    }

    pub fn version_rules(&self) -> &[PatternRule] {
        &self.version_rules
    }

    pub fn date_patterns(&self) -> &[DatePattern] {
        &self.date_patterns
    }

    pub fn is_version_line(&self, line: &str) -> bool {
        self.version_rules.iter().any(|rule| rule.is_match(line))
    }

    pub fn is_date_line(&self, line: &str) -> bool {
        self.date_patterns.iter().any(|date| date.is_match(line))
    }

    /// A line is trivial when any version rule or date pattern accepts it
    pub fn is_trivial_line(&self, line: &str) -> bool {
        self.is_version_line(line) || self.is_date_line(line)
    }

    /// Names of the rules matching `line`, in registry order
    pub fn matching_rules<'a>(&'a self, line: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.version_rules
            .iter()
            .filter(move |rule| rule.is_match(line))
            .map(|rule| rule.name())
    }
}
