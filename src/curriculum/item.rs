//! Curriculum items and categories

use serde::{Deserialize, Serialize};

use crate::types::{Locale, LocalizedText};

/// Content category. Category keys double as module names in a rule set's
/// module ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Letters,
    Numbers,
    Colors,
    Animals,
    Fruits,
    Vehicles,
    Shapes,
    BodyParts,
    Emotions,
    Songs,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Category::Letters,
            Category::Numbers,
            Category::Colors,
            Category::Animals,
            Category::Fruits,
            Category::Vehicles,
            Category::Shapes,
            Category::BodyParts,
            Category::Emotions,
            Category::Songs,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            Category::Letters => "letters",
            Category::Numbers => "numbers",
            Category::Colors => "colors",
            Category::Animals => "animals",
            Category::Fruits => "fruits",
            Category::Vehicles => "vehicles",
            Category::Shapes => "shapes",
            Category::BodyParts => "body-parts",
            Category::Emotions => "emotions",
            Category::Songs => "songs",
        }
    }

    /// Parse a module/category key. `body_parts` and `Body-Parts` fold to
    /// `body-parts`; anything unknown is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase().replace(['_', ' '], "-");
        Category::all().iter().copied().find(|c| c.key() == key)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A teachable item. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurriculumItem {
    /// Unique key across the catalog
    pub id: String,
    /// Display name per locale
    pub name: LocalizedText,
    /// Primary glyph or art reference shown by visual steps
    pub glyph: String,
    pub category: Category,
    /// 1 (easiest) to 10
    pub difficulty: u8,
    /// Sound-effect tag played by audio steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound_effect: Option<String>,
    /// Contextual image shown by context steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_image: Option<String>,
    /// Letter name ("bee" for B); letters only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_name: Option<LocalizedText>,
    /// Phonetic sound ("buh" for B); letters only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<LocalizedText>,
}

impl CurriculumItem {
    pub fn new(
        id: impl Into<String>,
        category: Category,
        glyph: impl Into<String>,
        name: LocalizedText,
    ) -> Self {
        Self {
            id: id.into(),
            name,
            glyph: glyph.into(),
            category,
            difficulty: 1,
            sound_effect: None,
            context_image: None,
            letter_name: None,
            phonetic: None,
        }
    }

    pub fn with_difficulty(mut self, difficulty: u8) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_sound(mut self, tag: impl Into<String>) -> Self {
        self.sound_effect = Some(tag.into());
        self
    }

    pub fn with_context(mut self, image: impl Into<String>) -> Self {
        self.context_image = Some(image.into());
        self
    }

    pub fn with_letter(mut self, letter_name: LocalizedText, phonetic: LocalizedText) -> Self {
        self.letter_name = Some(letter_name);
        self.phonetic = Some(phonetic);
        self
    }

    /// Display name in a locale
    pub fn display_name(&self, locale: Locale) -> &str {
        self.name.get(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_folds_separators() {
        assert_eq!(Category::parse("body_parts"), Some(Category::BodyParts));
        assert_eq!(Category::parse("Body-Parts"), Some(Category::BodyParts));
        assert_eq!(Category::parse("songs"), Some(Category::Songs));
        assert_eq!(Category::parse("life-skills"), None);
    }

    #[test]
    fn test_category_serde_uses_kebab_keys() {
        let json = serde_json::to_string(&Category::BodyParts).unwrap();
        assert_eq!(json, "\"body-parts\"");
    }
}
