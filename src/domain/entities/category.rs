//! Document categories for claim uploads.
//!
//! A [`Category`] is always folder-safe: the only way to build one from
//! free-form input is [`Category::parse`], which normalizes the label and
//! yields `None` for anything that normalizes to nothing. "No category" is
//! therefore `Option::None` everywhere, never an empty string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::common::errors::DomainError;

/// Folder-safe category label such as `death-certificate`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Normalizes a raw label into a category.
    ///
    /// Lowercases, maps spaces and underscores to hyphens, drops everything
    /// outside `[a-z0-9-]`, collapses hyphen runs and trims hyphens at both
    /// ends. Returns `None` when nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut normalized = String::with_capacity(raw.len());
        for c in raw.chars().flat_map(char::to_lowercase) {
            let c = match c {
                ' ' | '_' => '-',
                c => c,
            };
            if !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
                continue;
            }
            if c == '-' && normalized.ends_with('-') {
                continue;
            }
            normalized.push(c);
        }

        let trimmed = normalized.trim_matches('-');
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Category::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom("category must contain at least one letter or digit"))
    }
}

/// Reads an optional category, treating `null`, a missing key and `""` alike.
///
/// Records written before categories existed carry no key at all; some
/// writers stored an empty string instead.
pub fn deserialize_optional_category<'de, D>(deserializer: D) -> Result<Option<Category>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Category::parse))
}

/// Claim product lines, each with its own document checklist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimType {
    Life,
    Health,
    Car,
}

impl ClaimType {
    pub const ALL: [ClaimType; 3] = [ClaimType::Life, ClaimType::Health, ClaimType::Car];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::Life => "life",
            ClaimType::Health => "health",
            ClaimType::Car => "car",
        }
    }

    /// Display name to category id pairs for this claim type
    pub fn catalog(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            ClaimType::Life => LIFE_CATALOG,
            ClaimType::Health => HEALTH_CATALOG,
            ClaimType::Car => CAR_CATALOG,
        }
    }

    /// Category id for a document display name, e.g. "Death Certificate"
    pub fn category_id_for(&self, display_name: &str) -> Option<&'static str> {
        self.catalog()
            .iter()
            .find(|(name, _)| *name == display_name)
            .map(|(_, id)| *id)
    }

    /// First display name registered for a category id
    pub fn display_name_for(&self, category_id: &str) -> Option<&'static str> {
        self.catalog()
            .iter()
            .find(|(_, id)| *id == category_id)
            .map(|(name, _)| *name)
    }

    pub fn is_valid_category(&self, category_id: &str) -> bool {
        self.catalog().iter().any(|(_, id)| *id == category_id)
    }

    /// Sorted, deduplicated category ids
    pub fn categories(&self) -> Vec<&'static str> {
        let mut ids: Vec<&'static str> = self.catalog().iter().map(|(_, id)| *id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "life" => Ok(ClaimType::Life),
            "health" => Ok(ClaimType::Health),
            "car" => Ok(ClaimType::Car),
            other => Err(DomainError::validation_error(
                "ClaimType",
                format!("Unknown claim type: '{}'. Allowed types are: car, health, life", other),
            )),
        }
    }
}

const LIFE_CATALOG: &[(&str, &str)] = &[
    ("Death Certificate", "death-certificate"),
    ("Death Claim Form", "claim-form"),
    ("Original Policy Document", "policy-document"),
    ("Claimant ID Proof", "claimant-id"),
    ("Address Proof", "claimant-address"),
    ("Medical Records (if illness)", "medical-records"),
    ("FIR Copy (if accidental)", "fir-copy"),
    ("Post Mortem Report (if applicable)", "post-mortem"),
    ("Nominee Relationship Proof", "nominee-proof"),
    ("Cancelled Cheque/Bank Statement", "bank-details"),
];

// Cashless documents first, then reimbursement.
const HEALTH_CATALOG: &[(&str, &str)] = &[
    ("Pre-Authorization Form", "pre-auth"),
    ("Hospital ID Card", "hospital-id"),
    ("Policy Copy", "policy-copy"),
    ("Photo ID Proof", "id-proof"),
    ("Medical Reports/Prescription", "medical-reports"),
    ("Duly Filled Claim Form", "claim-form"),
    ("Hospital Bills & Receipts", "hospital-bills"),
    ("Discharge Summary", "discharge-summary"),
    ("Investigation Reports", "medical-reports"),
    ("Doctor's Prescription", "prescription"),
    ("Payment Receipts", "payment-receipts"),
    ("Cancelled Cheque", "cancelled-cheque"),
];

const CAR_CATALOG: &[(&str, &str)] = &[
    ("Duly Filled Claim Form", "claim-form"),
    ("Policy Copy", "policy-copy"),
    ("RC Book Copy", "rc-copy"),
    ("Driving License", "driving-license"),
    ("FIR Copy", "fir-copy"),
    ("Vehicle Damage Photos", "damage-photos"),
    ("Repair Estimate/Invoice", "repair-estimate"),
    ("Survey Report", "survey-report"),
    ("Third Party Documents", "third-party-docs"),
];
