//! Rule ids and categories, and [Selector]s over them.
//!
//! Ids and categories compare case-insensitively. A selector is written `"category"` to pick
//! every rule of a category or `"category/RULE_ID"` to pick one rule.

use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt, str::FromStr};
use unicase::UniCase;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("invalid selector \"{0}\": expected \"category\" or \"category/RULE_ID\"")]
    InvalidSelector(String),
}

/// The category a rule belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Category(UniCase<String>);

impl From<String> for Category {
    fn from(name: String) -> Self {
        Category(UniCase::new(name))
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.0.into_inner()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Category {
    pub fn new<S: Into<String>>(name: S) -> Self {
        name.into().into()
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Picks all rules of a category, or a single rule in it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Selector {
    category: Category,
    rule: Option<UniCase<String>>,
}

impl Selector {
    /// Whether the rule with `id` in `category` is picked.
    pub fn is_match(&self, category: &Category, id: &str) -> bool {
        if self.category != *category {
            return false;
        }
        match &self.rule {
            Some(rule) => *rule == UniCase::new(id),
            None => true,
        }
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn rule(&self) -> Option<&str> {
        self.rule.as_ref().map(|x| x.as_str())
    }
}

impl From<Category> for Selector {
    fn from(category: Category) -> Self {
        Selector {
            category,
            rule: None,
        }
    }
}

impl FromStr for Selector {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Error> {
        let mut parts = input.splitn(2, '/');
        let category = parts.next().unwrap_or_default();
        let rule = parts.next();

        let valid = !category.is_empty()
            && rule.map_or(true, |x| !x.is_empty() && !x.contains('/'));
        if !valid {
            return Err(Error::InvalidSelector(input.to_string()));
        }

        Ok(Selector {
            category: Category::new(category),
            rule: rule.map(|x| UniCase::new(x.to_string())),
        })
    }
}

impl TryFrom<&str> for Selector {
    type Error = Error;

    fn try_from(input: &str) -> Result<Self, Error> {
        input.parse()
    }
}

impl TryFrom<String> for Selector {
    type Error = Error;

    fn try_from(input: String) -> Result<Self, Error> {
        input.parse()
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        match selector.rule {
            Some(rule) => format!("{}/{}", selector.category, rule),
            None => selector.category.into(),
        }
    }
}
