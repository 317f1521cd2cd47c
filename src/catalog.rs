use regex::Regex;

use crate::error::CatalogError;

/// `Rs : 10,000,000` and friends. The digit group is captured.
pub const DEFAULT_AMOUNT_PATTERN: &str = r"Rs\.?\s*:\s*([0-9][0-9,]*(?:\.[0-9]+)?)";

/// How one prize category is recognized in a result document.
#[derive(Debug, Clone)]
pub struct CategoryDefinition {
    pub name: String,
    pub markers: Vec<String>,
    pub amount_pattern: Regex,
    pub has_series: bool,
}

impl CategoryDefinition {
    pub fn new(name: &str, markers: &[&str], has_series: bool) -> Result<Self, CatalogError> {
        if markers.iter().all(|m| m.is_empty()) {
            return Err(CatalogError::NoMarkers(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            markers: markers
                .iter()
                .filter(|m| !m.is_empty())
                .map(|m| m.to_string())
                .collect(),
            amount_pattern: compile_amount_pattern(name, DEFAULT_AMOUNT_PATTERN)?,
            has_series,
        })
    }

    /// Replaces the amount pattern. The first capture group must hold the
    /// digits.
    pub fn with_amount_pattern(mut self, pattern: &str) -> Result<Self, CatalogError> {
        self.amount_pattern = compile_amount_pattern(&self.name, pattern)?;
        Ok(self)
    }
}

fn compile_amount_pattern(name: &str, pattern: &str) -> Result<Regex, CatalogError> {
    let regex = Regex::new(pattern).map_err(|source| CatalogError::AmountPattern {
        name: name.to_string(),
        source,
    })?;
    // Group 0 is the whole match; the digits live in group 1.
    if regex.captures_len() < 2 {
        return Err(CatalogError::MissingAmountGroup(name.to_string()));
    }
    Ok(regex)
}

/// Ordered set of category definitions, highest payout rank first, plus the
/// footer phrases that end the prize listing.
#[derive(Debug, Clone)]
pub struct PrizeCatalog {
    pub categories: Vec<CategoryDefinition>,
    pub footers: Vec<String>,
}

impl PrizeCatalog {
    pub fn new(categories: Vec<CategoryDefinition>, footers: &[&str]) -> Self {
        Self {
            categories,
            footers: footers
                .iter()
                .filter(|f| !f.is_empty())
                .map(|f| f.to_string())
                .collect(),
        }
    }

    pub fn standard() -> Result<Self, CatalogError> {
        let categories = vec![
            CategoryDefinition::new("1st Prize", &["1st Prize", "First Prize"], true)?,
            CategoryDefinition::new("2nd Prize", &["2nd Prize", "Second Prize"], true)?,
            CategoryDefinition::new("3rd Prize", &["3rd Prize", "Third Prize"], true)?,
            CategoryDefinition::new("4th Prize", &["4th Prize", "Fourth Prize"], false)?,
            CategoryDefinition::new("5th Prize", &["5th Prize", "Fifth Prize"], false)?,
            CategoryDefinition::new(
                "Consolation",
                &["Consolation Prize", "Consolation"],
                false,
            )?,
        ];

        Ok(Self::new(
            categories,
            &["Total Prize", "Terms and Conditions", "Prizes must be claimed"],
        ))
    }

    pub fn rank_of(&self, name: &str) -> Option<u32> {
        self.categories
            .iter()
            .position(|c| c.name == name)
            .map(|i| i as u32)
    }
}
