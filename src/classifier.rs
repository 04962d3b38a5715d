//! Ordered regex-rule classification engine.
//!
//! Loads a YAML rule file with three ordered rule lists (browser, OS,
//! device) and applies them first-match-wins per category. All patterns
//! are compiled once at load time; classification itself never fails and
//! holds no mutable state, so a `Classifier` can be shared across threads
//! without coordination.

use std::fs;
use std::path::Path;

use regex::{Captures, Regex, RegexBuilder};
use serde::Deserialize;

use crate::classification::Classification;
use crate::error::{DecoderError, DecoderResult};

/// On-disk shape of the rule file.
///
/// All three sections are optional; a missing section simply means that
/// category always classifies as unknown.
#[derive(Debug, Default, Deserialize)]
struct RuleFile {
    #[serde(default)]
    user_agent_parsers: Vec<BrowserRule>,
    #[serde(default)]
    os_parsers: Vec<OsRule>,
    #[serde(default)]
    device_parsers: Vec<DeviceRule>,
}

#[derive(Debug, Deserialize)]
struct BrowserRule {
    regex: String,
    #[serde(default)]
    family_replacement: Option<String>,
    #[serde(default)]
    v1_replacement: Option<String>,
    #[serde(default)]
    v2_replacement: Option<String>,
    #[serde(default)]
    v3_replacement: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OsRule {
    regex: String,
    #[serde(default)]
    os_replacement: Option<String>,
    #[serde(default)]
    os_v1_replacement: Option<String>,
    #[serde(default)]
    os_v2_replacement: Option<String>,
    #[serde(default)]
    os_v3_replacement: Option<String>,
    #[serde(default)]
    os_v4_replacement: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeviceRule {
    regex: String,
    #[serde(default)]
    device_replacement: Option<String>,
    /// `"i"` makes the pattern case-insensitive.
    #[serde(default)]
    regex_flag: Option<String>,
}

#[derive(Debug)]
struct CompiledBrowserRule {
    regex: Regex,
    family: Option<String>,
    v1: Option<String>,
    v2: Option<String>,
    v3: Option<String>,
}

#[derive(Debug)]
struct CompiledOsRule {
    regex: Regex,
    family: Option<String>,
    v1: Option<String>,
    v2: Option<String>,
    v3: Option<String>,
    v4: Option<String>,
}

#[derive(Debug)]
struct CompiledDeviceRule {
    regex: Regex,
    family: Option<String>,
}

/// Deterministic user-agent classifier.
///
/// Construction is fallible and happens once at startup; a missing or
/// malformed rule file is fatal. After construction the classifier is
/// read-only and the same input always yields the same output.
#[derive(Debug)]
pub struct Classifier {
    browser_rules: Vec<CompiledBrowserRule>,
    os_rules: Vec<CompiledOsRule>,
    device_rules: Vec<CompiledDeviceRule>,
}

impl Classifier {
    /// Load and compile a rule file from disk.
    pub fn from_file(path: &Path) -> DecoderResult<Self> {
        let text = fs::read_to_string(path).map_err(|err| {
            DecoderError::Init(format!(
                "could not open rule file '{}': {}",
                path.display(),
                err
            ))
        })?;
        Self::from_yaml(&text)
    }

    /// Compile rules from YAML text.
    ///
    /// # Example
    /// ```
    /// use ua_decoder::Classifier;
    ///
    /// let classifier = Classifier::from_yaml(
    ///     r#"
    /// user_agent_parsers:
    ///   - regex: '(Firefox)/(\d+)\.(\d+)'
    /// "#,
    /// )
    /// .unwrap();
    ///
    /// let c = classifier.classify("Mozilla/5.0 Firefox/102.0");
    /// assert_eq!(c.browser_family, "Firefox");
    /// assert_eq!(c.browser_major, "102");
    /// ```
    pub fn from_yaml(text: &str) -> DecoderResult<Self> {
        let file: RuleFile = serde_yaml::from_str(text)
            .map_err(|err| DecoderError::Init(format!("malformed rule file: {}", err)))?;

        let browser_rules = file
            .user_agent_parsers
            .into_iter()
            .map(|rule| {
                Ok(CompiledBrowserRule {
                    regex: compile(&rule.regex, false)?,
                    family: rule.family_replacement,
                    v1: rule.v1_replacement,
                    v2: rule.v2_replacement,
                    v3: rule.v3_replacement,
                })
            })
            .collect::<DecoderResult<Vec<_>>>()?;

        let os_rules = file
            .os_parsers
            .into_iter()
            .map(|rule| {
                Ok(CompiledOsRule {
                    regex: compile(&rule.regex, false)?,
                    family: rule.os_replacement,
                    v1: rule.os_v1_replacement,
                    v2: rule.os_v2_replacement,
                    v3: rule.os_v3_replacement,
                    v4: rule.os_v4_replacement,
                })
            })
            .collect::<DecoderResult<Vec<_>>>()?;

        let device_rules = file
            .device_parsers
            .into_iter()
            .map(|rule| {
                let case_insensitive = rule.regex_flag.as_deref() == Some("i");
                Ok(CompiledDeviceRule {
                    regex: compile(&rule.regex, case_insensitive)?,
                    family: rule.device_replacement,
                })
            })
            .collect::<DecoderResult<Vec<_>>>()?;

        Ok(Self {
            browser_rules,
            os_rules,
            device_rules,
        })
    }

    /// Classify a raw user-agent string.
    ///
    /// Rules are applied in file order; the first matching rule of each
    /// category wins. Input that matches nothing yields a classification
    /// whose sub-fields are all empty.
    pub fn classify(&self, raw: &str) -> Classification {
        let mut result = Classification::default();

        for rule in &self.browser_rules {
            if let Some(caps) = rule.regex.captures(raw) {
                result.browser_family = expand(&rule.family, &caps, 1);
                result.browser_major = expand(&rule.v1, &caps, 2);
                result.browser_minor = expand(&rule.v2, &caps, 3);
                result.browser_patch = expand(&rule.v3, &caps, 4);
                break;
            }
        }

        for rule in &self.os_rules {
            if let Some(caps) = rule.regex.captures(raw) {
                result.os_family = expand(&rule.family, &caps, 1);
                result.os_major = expand(&rule.v1, &caps, 2);
                result.os_minor = expand(&rule.v2, &caps, 3);
                result.os_patch = expand(&rule.v3, &caps, 4);
                result.os_patch_minor = expand(&rule.v4, &caps, 5);
                break;
            }
        }

        for rule in &self.device_rules {
            if let Some(caps) = rule.regex.captures(raw) {
                result.device_family = expand(&rule.family, &caps, 1);
                break;
            }
        }

        result
    }
}

fn compile(pattern: &str, case_insensitive: bool) -> DecoderResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|err| DecoderError::InvalidRule {
            pattern: pattern.to_string(),
            reason: err.to_string(),
        })
}

/// Resolve one sub-field from a replacement template or a capture group.
///
/// With a template, `$1`..`$9` are substituted from the captures and the
/// result is trimmed. Without one, the positional group is used verbatim;
/// a group that did not participate yields an empty string.
fn expand(template: &Option<String>, caps: &Captures<'_>, group: usize) -> String {
    match template {
        Some(template) => substitute(template, caps).trim().to_string(),
        None => caps
            .get(group)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
    }
}

fn substitute(template: &str, caps: &Captures<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek().and_then(|next| next.to_digit(10)) {
            Some(group) => {
                chars.next();
                if let Some(m) = caps.get(group as usize) {
                    out.push_str(m.as_str());
                }
            }
            None => out.push('$'),
        }
    }
    out
}
