use onig::{Regex, RegexOptions};
use serde::{Deserialize, Serialize, Serializer};
use std::{convert::TryFrom, fmt, ops::Deref, sync::Arc};

fn default_case_sensitive() -> bool {
    true
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct RegexFields {
    regex_str: String,
    #[serde(default)]
    full_match: bool,
    #[serde(default = "default_case_sensitive")]
    case_sensitive: bool,
}

impl TryFrom<RegexFields> for SerializeRegex {
    type Error = onig::Error;

    fn try_from(fields: RegexFields) -> Result<Self, onig::Error> {
        Ok(SerializeRegex {
            regex: Arc::new(SerializeRegex::compile(&fields)?),
            fields,
        })
    }
}

/// A compiled regex which remembers how it was built, so it can be serialized again.
/// Patterns use the Java regex dialect the rule data is written in.
#[derive(Deserialize, Clone)]
#[serde(try_from = "RegexFields")]
pub struct SerializeRegex {
    fields: RegexFields,
    regex: Arc<Regex>,
}

impl Serialize for SerializeRegex {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.fields.serialize(serializer)
    }
}

impl fmt::Debug for SerializeRegex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.as_str())
    }
}

impl SerializeRegex {
    /// Compiles `regex_str`. With `full_match` the regex only matches if it covers the whole input.
    pub fn new(
        regex_str: &str,
        full_match: bool,
        case_sensitive: bool,
    ) -> Result<Self, onig::Error> {
        SerializeRegex::try_from(RegexFields {
            regex_str: regex_str.to_string(),
            full_match,
            case_sensitive,
        })
    }

    fn compile(fields: &RegexFields) -> Result<Regex, onig::Error> {
        let mut case_sensitive = fields.case_sensitive;
        let mut pattern = fields.regex_str.clone();

        // inline flags as written in rule data
        for flag in &["(?iu)", "(?i)"] {
            if pattern.contains(flag) {
                case_sensitive = false;
                pattern = pattern.replace(flag, "");
            }
        }

        if fields.full_match {
            pattern = format!("\\A(?:{})\\z", pattern);
        }

        Regex::with_options(
            &pattern,
            if case_sensitive {
                RegexOptions::REGEX_OPTION_NONE
            } else {
                RegexOptions::REGEX_OPTION_IGNORECASE
            },
            onig::Syntax::java(),
        )
    }

    /// The pattern as it was given, without the anchors added for full matching.
    pub fn as_str(&self) -> &str {
        &self.fields.regex_str
    }
}

impl Deref for SerializeRegex {
    type Target = Regex;

    fn deref(&self) -> &Self::Target {
        &self.regex
    }
}
