//! Validation of new algorithm submissions.
//!
//! [`SubmissionForm`] mirrors the raw fields of the submission page;
//! [`SubmissionForm::validate`] turns it into a [`NewAlgorithm`] that the
//! backend accepts as a pending entry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Price suggested when an author first marks an algorithm as paid.
pub const DEFAULT_PAID_PRICE: u32 = 100;

/// Source language of a submission. Only C/C++ is offered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "cpp")]
    Cpp,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("cpp")
    }
}

/// Toolchain used to build a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Compiler {
    #[default]
    #[serde(rename = "g++")]
    Gpp,
    #[serde(rename = "gcc")]
    Gcc,
    #[serde(rename = "clang")]
    Clang,
    #[serde(rename = "clang++")]
    ClangPp,
}

impl Compiler {
    /// Wire spelling of the compiler.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gpp => "g++",
            Self::Gcc => "gcc",
            Self::Clang => "clang",
            Self::ClangPp => "clang++",
        }
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Compiler {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "g++" => Ok(Self::Gpp),
            "gcc" => Ok(Self::Gcc),
            "clang" => Ok(Self::Clang),
            "clang++" => Ok(Self::ClangPp),
            other => Err(CoreError::InvalidSubmission {
                field: "compiler",
                reason: format!("unsupported compiler '{other}'"),
            }),
        }
    }
}

/// Whether, and for how much, an algorithm is sold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Pricing {
    #[default]
    Free,
    Paid { price: u32 },
}

impl Pricing {
    #[must_use]
    pub const fn is_paid(self) -> bool {
        matches!(self, Self::Paid { .. })
    }

    /// The price, or `None` when free.
    #[must_use]
    pub const fn price(self) -> Option<u32> {
        match self {
            Self::Free => None,
            Self::Paid { price } => Some(price),
        }
    }
}

/// Raw submission form state, exactly as typed by the author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionForm {
    pub title: String,
    pub description: String,
    pub code: String,
    /// Comma-separated tag list.
    pub tags: String,
    pub is_paid: bool,
    /// Price as typed; ignored when `is_paid` is false.
    pub price: String,
    pub language: Language,
    pub compiler: String,
}

impl Default for SubmissionForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            code: String::new(),
            tags: String::new(),
            is_paid: false,
            price: DEFAULT_PAID_PRICE.to_string(),
            language: Language::Cpp,
            compiler: Compiler::default().as_str().to_owned(),
        }
    }
}

impl SubmissionForm {
    /// Flips the paid switch, resetting the price to the default for the new state.
    pub fn toggle_paid(&mut self) {
        self.is_paid = !self.is_paid;
        self.price = if self.is_paid { DEFAULT_PAID_PRICE.to_string() } else { "0".to_owned() };
    }

    /// Validates the form.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidSubmission`] naming the first offending field.
    pub fn validate(&self) -> Result<NewAlgorithm, CoreError> {
        let title = required("title", &self.title)?;
        let description = required("description", &self.description)?;
        if self.code.trim().is_empty() {
            return Err(CoreError::InvalidSubmission {
                field: "code",
                reason: "must not be empty".to_owned(),
            });
        }
        let compiler = self.compiler.trim().parse::<Compiler>()?;
        let pricing = if self.is_paid {
            let price = self.price.trim().parse::<u32>().map_err(|e| {
                CoreError::InvalidSubmission { field: "price", reason: e.to_string() }
            })?;
            if price == 0 {
                return Err(CoreError::InvalidSubmission {
                    field: "price",
                    reason: "paid algorithms need a positive price".to_owned(),
                });
            }
            Pricing::Paid { price }
        } else {
            Pricing::Free
        };

        Ok(NewAlgorithm {
            title,
            description,
            code: self.code.clone(),
            tags: parse_tags(&self.tags),
            pricing,
            language: self.language,
            compiler,
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidSubmission { field, reason: "must not be empty".to_owned() });
    }
    Ok(trimmed.to_owned())
}

/// Splits a comma-separated tag list, trimming each entry and dropping empties.
///
/// Order is preserved and duplicates are kept.
#[must_use]
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

/// A validated submission, ready to be sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAlgorithm {
    pub title: String,
    pub description: String,
    pub code: String,
    pub tags: Vec<String>,
    pub pricing: Pricing,
    pub language: Language,
    pub compiler: Compiler,
}

impl NewAlgorithm {
    /// Checks a submission that did not come through [`SubmissionForm`].
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidSubmission`] for a blank title,
    /// description or code, or a paid entry priced at zero.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (field, value) in [
            ("title", &self.title),
            ("description", &self.description),
            ("code", &self.code),
        ] {
            required(field, value)?;
        }
        if self.pricing == (Pricing::Paid { price: 0 }) {
            return Err(CoreError::InvalidSubmission {
                field: "price",
                reason: "paid algorithms need a positive price".to_owned(),
            });
        }
        Ok(())
    }
}
