//! Title comparison strategies.
//!
//! Tie-break order between titles depends on the collation, so it is injected
//! into the planner instead of being hard-coded.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use icu_collator::{CollatorOptions, Strength};
use icu_locid::Locale;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Locale used when none is configured.
pub const DEFAULT_LOCALE: &str = "zh-CN";

/// Compares two normalized titles.
pub trait Collator: Send + Sync {
    fn compare(&self, a: &str, b: &str) -> Ordering;
}

/// Plain Unicode scalar value order.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodePointCollator;

impl Collator for CodePointCollator {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        a.cmp(b)
    }
}

/// Case-folded comparison, falling back to scalar order between case variants
/// so that the result is a total order.
#[derive(Debug, Default, Clone, Copy)]
pub struct CaseInsensitiveCollator;

impl Collator for CaseInsensitiveCollator {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        let folded_a = a.chars().flat_map(char::to_lowercase);
        let folded_b = b.chars().flat_map(char::to_lowercase);
        folded_a.cmp(folded_b).then_with(|| a.cmp(b))
    }
}

/// Unicode collation (UCA with CLDR tailorings) for a locale.
///
/// Tertiary strength: base letters first, then accents, then case. Titles the
/// collator considers equal are ordered by scalar value.
pub struct LocaleCollator {
    locale: Locale,
    inner: icu_collator::Collator,
}

impl LocaleCollator {
    /// Collator for a BCP 47 tag such as `zh-CN` or `de`.
    pub fn new(tag: &str) -> Result<Self, DomainError> {
        let locale: Locale = tag.trim().parse().map_err(|e| DomainError::InvalidLocale {
            locale: tag.to_string(),
            reason: format!("{e}"),
        })?;
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Tertiary);
        let inner = icu_collator::Collator::try_new(&(&locale).into(), options).map_err(|e| {
            DomainError::InvalidLocale {
                locale: tag.to_string(),
                reason: format!("{e}"),
            }
        })?;
        Ok(Self { locale, inner })
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }
}

impl Collator for LocaleCollator {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        self.inner.compare(a, b).then_with(|| a.cmp(b))
    }
}

impl fmt::Debug for LocaleCollator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocaleCollator")
            .field("locale", &self.locale.to_string())
            .finish()
    }
}

/// Configurable collation choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Collation {
    /// Locale rules, see `locale` in the settings
    #[default]
    Locale,
    CodePoint,
    CaseInsensitive,
}

impl Collation {
    /// Build the collator; `locale` is only used by [`Collation::Locale`].
    pub fn collator(self, locale: &str) -> Result<Arc<dyn Collator>, DomainError> {
        let collator: Arc<dyn Collator> = match self {
            Collation::Locale => Arc::new(LocaleCollator::new(locale)?),
            Collation::CodePoint => Arc::new(CodePointCollator),
            Collation::CaseInsensitive => Arc::new(CaseInsensitiveCollator),
        };
        Ok(collator)
    }
}

impl fmt::Display for Collation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collation::Locale => f.write_str("locale"),
            Collation::CodePoint => f.write_str("code-point"),
            Collation::CaseInsensitive => f.write_str("case-insensitive"),
        }
    }
}

impl FromStr for Collation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "locale" => Ok(Collation::Locale),
            "code-point" | "codepoint" => Ok(Collation::CodePoint),
            "case-insensitive" | "caseinsensitive" => Ok(Collation::CaseInsensitive),
            other => Err(format!(
                "unknown collation '{other}' (expected locale, code-point or case-insensitive)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_mixed_case_when_code_point_then_uppercase_first() {
        let c = CodePointCollator;
        assert_eq!(c.compare("Zeta", "alpha"), Ordering::Less);
    }

    #[test]
    fn given_mixed_case_when_case_insensitive_then_alphabetical() {
        let c = CaseInsensitiveCollator;
        assert_eq!(c.compare("Zeta", "alpha"), Ordering::Greater);
        assert_eq!(c.compare("alpha", "Beta"), Ordering::Less);
    }

    #[test]
    fn given_case_variants_when_case_insensitive_then_still_total() {
        let c = CaseInsensitiveCollator;
        assert_eq!(c.compare("Rust", "rust"), Ordering::Less);
        assert_eq!(c.compare("rust", "rust"), Ordering::Equal);
    }

    #[test]
    fn given_ascii_and_cjk_when_comparing_then_ascii_first() {
        for collation in [Collation::Locale, Collation::CodePoint, Collation::CaseInsensitive] {
            let collator = collation.collator(DEFAULT_LOCALE).unwrap();
            assert_eq!(collator.compare("AB", "中"), Ordering::Less);
        }
    }

    #[test]
    fn given_collation_names_when_parsing_then_roundtrips_display() {
        for c in [Collation::Locale, Collation::CodePoint, Collation::CaseInsensitive] {
            assert_eq!(c.to_string().parse::<Collation>(), Ok(c));
        }
        assert!("pinyin".parse::<Collation>().is_err());
    }

    fn sorted(collator: &dyn Collator, titles: &[&str]) -> Vec<String> {
        let mut titles: Vec<String> = titles.iter().map(|t| t.to_string()).collect();
        titles.sort_by(|a, b| collator.compare(a, b));
        titles
    }

    #[test]
    fn given_zh_locale_when_sorting_mixed_titles_then_pinyin_and_accent_aware() {
        let c = LocaleCollator::new("zh-CN").unwrap();
        assert_eq!(
            sorted(&c, &["中国", "阿里", "Rust", "rust", "éclair", "zoo"]),
            vec!["éclair", "rust", "Rust", "zoo", "阿里", "中国"]
        );
    }

    #[test]
    fn given_zh_locale_when_comparing_han_then_pinyin_not_code_point() {
        let c = LocaleCollator::new("zh-CN").unwrap();
        // U+963F (a) sorts before U+4E2D (zhong) by pinyin
        assert_eq!(c.compare("阿", "中"), Ordering::Less);
        assert_eq!(CodePointCollator.compare("阿", "中"), Ordering::Greater);
    }

    #[test]
    fn given_accented_latin_when_locale_collation_then_next_to_base_letter() {
        let c = LocaleCollator::new("de").unwrap();
        assert_eq!(c.compare("éclair", "zoo"), Ordering::Less);
        assert_eq!(c.compare("éclair", "eclair"), Ordering::Greater);
        assert_eq!(CaseInsensitiveCollator.compare("éclair", "zoo"), Ordering::Greater);
    }

    #[test]
    fn given_malformed_tag_when_building_locale_collator_then_invalid_locale() {
        let err = Collation::Locale.collator("not a locale!").err().unwrap();
        assert!(matches!(err, DomainError::InvalidLocale { .. }));
    }
}
