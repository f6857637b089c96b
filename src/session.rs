//! Explicit session context for a wizard run
//!
//! Identifiers and product facts that guards and route templates depend on
//! are carried here and handed to each component at construction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::insured::{InsuredKind, InsuredSnapshot};

/// Lifecycle status of the product being configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Draft,
    Final,
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductStatus::Draft => write!(f, "draft"),
            ProductStatus::Final => write!(f, "final"),
        }
    }
}

impl FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(ProductStatus::Draft),
            "final" => Ok(ProductStatus::Final),
            other => Err(format!("Unknown product status: {}", other)),
        }
    }
}

/// Everything a wizard run knows about its product
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub product_id: String,

    /// ISO country code of the product, e.g. "US"
    pub country: String,

    #[serde(default)]
    pub product_status: ProductStatus,

    /// Kinds of insured entity the product covers
    #[serde(default)]
    pub insured_kinds: Vec<InsuredKind>,

    /// Additional named values available to route templates
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl SessionContext {
    pub fn new(product_id: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            country: country.into(),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: ProductStatus) -> Self {
        self.product_status = status;
        self
    }

    pub fn with_insured_kinds(mut self, kinds: impl IntoIterator<Item = InsuredKind>) -> Self {
        self.insured_kinds = kinds.into_iter().collect();
        self
    }

    /// Take the insured composition from a loaded snapshot
    pub fn with_snapshot(self, snapshot: &InsuredSnapshot) -> Self {
        self.with_insured_kinds(snapshot.kinds())
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn has_insured_kind(&self, kind: InsuredKind) -> bool {
        self.insured_kinds.contains(&kind)
    }

    pub fn is_country(&self, country: &str) -> bool {
        self.country.eq_ignore_ascii_case(country)
    }

    /// Value substituted for `{name}` in a route template
    pub fn placeholder(&self, name: &str) -> Option<String> {
        match name {
            "productId" => Some(self.product_id.clone()),
            "country" => Some(self.country.clone()),
            "status" => Some(self.product_status.to_string()),
            other => self.params.get(other).cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        let ctx = SessionContext::new("P-42", "US")
            .with_status(ProductStatus::Final)
            .with_param("insuredType", "MI");

        assert_eq!(ctx.placeholder("productId").as_deref(), Some("P-42"));
        assert_eq!(ctx.placeholder("status").as_deref(), Some("final"));
        assert_eq!(ctx.placeholder("insuredType").as_deref(), Some("MI"));
        assert_eq!(ctx.placeholder("missing"), None);
    }

    #[test]
    fn test_country_match_ignores_case() {
        let ctx = SessionContext::new("P-1", "us");
        assert!(ctx.is_country("US"));
        assert!(!ctx.is_country("CA"));
    }

    #[test]
    fn test_deserialize_defaults() {
        let ctx: SessionContext =
            serde_json::from_str(r#"{"productId": "P-7", "country": "DE"}"#).unwrap();
        assert_eq!(ctx.product_status, ProductStatus::Draft);
        assert!(ctx.insured_kinds.is_empty());
    }
}
