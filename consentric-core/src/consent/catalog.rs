//! Consent categories and the category-to-flags catalog
//!
//! A consent category is a named bundle of feature flags a person can grant
//! or revoke as a unit. Flags are the wrapped analytics service's atomic
//! trackable capabilities ("sessions", "clicks", ...) and are opaque to this
//! layer. The catalog is the ordered category→flags table, fixed at
//! construction; the `all` category is synthesized as the union of every
//! other category's flags.

use serde::{Deserialize, Serialize};

// ============================================
// Consent Categories
// ============================================

/// A named bundle of tracking capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentCategory {
    /// Baseline session and view accounting
    Minimal,
    /// Events, crash reports, performance traces
    Performance,
    /// Interaction tracking (scrolls, clicks, forms)
    Ux,
    /// Ratings and feedback widgets
    Feedback,
    /// Coarse location
    Location,
    /// Union of every other category
    All,
}

impl ConsentCategory {
    /// Every concrete category, in catalog order. Excludes [`ConsentCategory::All`].
    pub const CONCRETE: [ConsentCategory; 5] = [
        ConsentCategory::Minimal,
        ConsentCategory::Performance,
        ConsentCategory::Ux,
        ConsentCategory::Feedback,
        ConsentCategory::Location,
    ];

    /// Returns the identifier used in storage and on the service wire
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentCategory::Minimal => "minimal",
            ConsentCategory::Performance => "performance",
            ConsentCategory::Ux => "ux",
            ConsentCategory::Feedback => "feedback",
            ConsentCategory::Location => "location",
            ConsentCategory::All => "all",
        }
    }

    /// Returns the display name for this category
    pub fn display_name(&self) -> &'static str {
        match self {
            ConsentCategory::Minimal => "Minimal",
            ConsentCategory::Performance => "Performance",
            ConsentCategory::Ux => "User Experience",
            ConsentCategory::Feedback => "Feedback",
            ConsentCategory::Location => "Location",
            ConsentCategory::All => "Everything",
        }
    }

    /// True for the synthesized union category
    pub fn is_all(&self) -> bool {
        matches!(self, ConsentCategory::All)
    }
}

impl std::fmt::Display for ConsentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ConsentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minimal" => Ok(ConsentCategory::Minimal),
            "performance" => Ok(ConsentCategory::Performance),
            "ux" => Ok(ConsentCategory::Ux),
            "feedback" => Ok(ConsentCategory::Feedback),
            "location" => Ok(ConsentCategory::Location),
            "all" => Ok(ConsentCategory::All),
            _ => Err(format!("unknown consent category: {}", s)),
        }
    }
}

// ============================================
// Catalog
// ============================================

/// Ordered mapping from category to the feature flags it controls.
///
/// Immutable after construction. The `all` entry is always present and
/// always last; it is synthesized from the other entries, so any
/// caller-supplied `all` group is overwritten.
#[derive(Debug, Clone)]
pub struct ConsentCatalog {
    entries: Vec<(ConsentCategory, Vec<String>)>,
}

impl ConsentCatalog {
    /// Build a catalog from category→flags groups.
    ///
    /// Group order is preserved and becomes the reconciliation and
    /// persistence order. The `all` union preserves flag order of first
    /// appearance.
    pub fn new(groups: Vec<(ConsentCategory, Vec<String>)>) -> Self {
        let mut entries: Vec<(ConsentCategory, Vec<String>)> = groups
            .into_iter()
            .filter(|(category, _)| !category.is_all())
            .collect();

        let mut union: Vec<String> = Vec::new();
        for (_, flags) in &entries {
            for flag in flags {
                if !union.iter().any(|f| f == flag) {
                    union.push(flag.clone());
                }
            }
        }
        entries.push((ConsentCategory::All, union));

        Self { entries }
    }

    /// Categories in catalog order, `all` last
    pub fn categories(&self) -> impl Iterator<Item = ConsentCategory> + '_ {
        self.entries.iter().map(|(category, _)| *category)
    }

    /// Concrete categories in catalog order, `all` excluded
    pub fn concrete_categories(&self) -> impl Iterator<Item = ConsentCategory> + '_ {
        self.categories().filter(|category| !category.is_all())
    }

    /// Flags controlled by the given category, if it is in the catalog
    pub fn flags(&self, category: ConsentCategory) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == category)
            .map(|(_, flags)| flags.as_slice())
    }

    /// Whether the category is part of this catalog
    pub fn contains(&self, category: ConsentCategory) -> bool {
        self.entries.iter().any(|(entry, _)| *entry == category)
    }

    /// All (category, flags) entries in catalog order
    pub fn entries(&self) -> &[(ConsentCategory, Vec<String>)] {
        &self.entries
    }
}

impl Default for ConsentCatalog {
    /// The stock catalog: every concrete category with its standard flags
    fn default() -> Self {
        fn flags(names: &[&str]) -> Vec<String> {
            names.iter().map(|s| s.to_string()).collect()
        }

        Self::new(vec![
            (ConsentCategory::Minimal, flags(&["sessions", "views"])),
            (
                ConsentCategory::Performance,
                flags(&["events", "crashes", "apm"]),
            ),
            (
                ConsentCategory::Ux,
                flags(&["scrolls", "clicks", "forms"]),
            ),
            (
                ConsentCategory::Feedback,
                flags(&["star-rating", "feedback-widget"]),
            ),
            (ConsentCategory::Location, flags(&["location"])),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_category_round_trip() {
        for category in ConsentCategory::CONCRETE {
            assert_eq!(category.as_str().parse::<ConsentCategory>(), Ok(category));
        }
        assert_eq!("all".parse::<ConsentCategory>(), Ok(ConsentCategory::All));
        assert!("clicks".parse::<ConsentCategory>().is_err());
    }

    #[test]
    fn test_all_is_order_preserving_union() {
        let catalog = ConsentCatalog::new(vec![
            (ConsentCategory::Minimal, flags(&["sessions", "views"])),
            (ConsentCategory::Ux, flags(&["clicks", "views", "forms"])),
        ]);

        // First appearance wins: "views" shows up once, where Minimal put it
        assert_eq!(
            catalog.flags(ConsentCategory::All).unwrap(),
            &["sessions", "views", "clicks", "forms"]
        );
    }

    #[test]
    fn test_default_all_covers_every_flag() {
        let catalog = ConsentCatalog::default();
        let all = catalog.flags(ConsentCategory::All).unwrap();

        for category in catalog.concrete_categories() {
            for flag in catalog.flags(category).unwrap() {
                assert!(all.contains(flag), "all is missing {}", flag);
            }
        }
    }

    #[test]
    fn test_caller_supplied_all_is_overwritten() {
        let catalog = ConsentCatalog::new(vec![
            (ConsentCategory::All, flags(&["bogus"])),
            (ConsentCategory::Minimal, flags(&["sessions"])),
        ]);

        assert_eq!(catalog.flags(ConsentCategory::All).unwrap(), &["sessions"]);
        // `all` sits last regardless of where the caller put it
        assert_eq!(
            catalog.categories().last(),
            Some(ConsentCategory::All)
        );
    }

    #[test]
    fn test_catalog_order_is_group_order() {
        let catalog = ConsentCatalog::new(vec![
            (ConsentCategory::Location, flags(&["location"])),
            (ConsentCategory::Minimal, flags(&["sessions"])),
        ]);

        let order: Vec<ConsentCategory> = catalog.categories().collect();
        assert_eq!(
            order,
            vec![
                ConsentCategory::Location,
                ConsentCategory::Minimal,
                ConsentCategory::All
            ]
        );
    }

    #[test]
    fn test_missing_category_has_no_flags() {
        let catalog = ConsentCatalog::new(vec![(ConsentCategory::Minimal, flags(&["sessions"]))]);
        assert!(catalog.flags(ConsentCategory::Location).is_none());
        assert!(!catalog.contains(ConsentCategory::Location));
    }
}
