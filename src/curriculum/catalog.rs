//! Curriculum catalog - the read-only table of teachable items

use once_cell::sync::Lazy;
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

use super::item::{Category, CurriculumItem};
use crate::types::LocalizedText;

/// Problems found while loading a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate curriculum item id: {0}")]
    DuplicateId(String),

    #[error("item {id} has difficulty {difficulty}, expected 1..=10")]
    DifficultyOutOfRange { id: String, difficulty: u8 },

    #[error("curriculum catalog is empty")]
    Empty,

    #[error("malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Validated, immutable collection of curriculum items in load order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<CurriculumItem>,
}

static BUILTIN: Lazy<Catalog> = Lazy::new(|| Catalog {
    items: builtin_items(),
});

impl Catalog {
    /// The built-in catalog
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    /// Build a catalog, checking id uniqueness and difficulty range
    pub fn from_items(items: Vec<CurriculumItem>) -> Result<Self, CatalogError> {
        if items.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.id.as_str()) {
                return Err(CatalogError::DuplicateId(item.id.clone()));
            }
            if !(1..=10).contains(&item.difficulty) {
                return Err(CatalogError::DifficultyOutOfRange {
                    id: item.id.clone(),
                    difficulty: item.difficulty,
                });
            }
        }

        debug!("Loaded catalog with {} items", items.len());
        Ok(Self { items })
    }

    /// Parse a JSON array of items
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let items: Vec<CurriculumItem> = serde_json::from_str(json)?;
        Self::from_items(items)
    }

    pub fn items(&self) -> &[CurriculumItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CurriculumItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Items of one category, in catalog order
    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &CurriculumItem> {
        self.items.iter().filter(move |item| item.category == category)
    }

    /// Categories that have at least one item
    pub fn categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = self.items.iter().map(|i| i.category).collect();
        categories.sort();
        categories.dedup();
        categories
    }
}

fn t(en: &str, pt: &str) -> LocalizedText {
    LocalizedText::new(en, pt)
}

fn letter(ch: char, name: (&str, &str), letter_name: (&str, &str), sound: (&str, &str), difficulty: u8) -> CurriculumItem {
    CurriculumItem::new(
        format!("letter-{}", ch.to_ascii_lowercase()),
        Category::Letters,
        ch.to_string(),
        t(name.0, name.1),
    )
    .with_difficulty(difficulty)
    .with_context(format!("context/letter-{}.png", ch.to_ascii_lowercase()))
    .with_letter(t(letter_name.0, letter_name.1), t(sound.0, sound.1))
}

fn builtin_items() -> Vec<CurriculumItem> {
    vec![
        // Letters
        letter('A', ("A is for apple", "A de abelha"), ("ay", "á"), ("ah", "a"), 1),
        letter('B', ("B is for ball", "B de bola"), ("bee", "bê"), ("buh", "bâ"), 2),
        letter('C', ("C is for cat", "C de casa"), ("see", "cê"), ("kuh", "câ"), 2),
        letter('D', ("D is for dog", "D de dado"), ("dee", "dê"), ("duh", "dâ"), 3),
        letter('E', ("E is for egg", "E de elefante"), ("ee", "é"), ("eh", "é"), 3),
        letter('M', ("M is for moon", "M de macaco"), ("em", "eme"), ("mmm", "mmm"), 4),
        // Numbers
        CurriculumItem::new("number-1", Category::Numbers, "1", t("one", "um")),
        CurriculumItem::new("number-2", Category::Numbers, "2", t("two", "dois")).with_difficulty(2),
        CurriculumItem::new("number-3", Category::Numbers, "3", t("three", "três")).with_difficulty(2),
        CurriculumItem::new("number-4", Category::Numbers, "4", t("four", "quatro")).with_difficulty(3),
        CurriculumItem::new("number-5", Category::Numbers, "5", t("five", "cinco")).with_difficulty(3),
        // Colors
        CurriculumItem::new("color-red", Category::Colors, "🟥", t("red", "vermelho"))
            .with_context("context/red-apple.png"),
        CurriculumItem::new("color-blue", Category::Colors, "🟦", t("blue", "azul"))
            .with_context("context/blue-sky.png"),
        CurriculumItem::new("color-yellow", Category::Colors, "🟨", t("yellow", "amarelo"))
            .with_difficulty(2)
            .with_context("context/yellow-sun.png"),
        CurriculumItem::new("color-green", Category::Colors, "🟩", t("green", "verde"))
            .with_difficulty(2)
            .with_context("context/green-leaf.png"),
        // Animals
        CurriculumItem::new("animal-dog", Category::Animals, "🐶", t("dog", "cachorro"))
            .with_sound("bark")
            .with_context("context/dog-park.png"),
        CurriculumItem::new("animal-cat", Category::Animals, "🐱", t("cat", "gato"))
            .with_sound("meow")
            .with_context("context/cat-sofa.png"),
        CurriculumItem::new("animal-cow", Category::Animals, "🐮", t("cow", "vaca"))
            .with_difficulty(2)
            .with_sound("moo")
            .with_context("context/cow-farm.png"),
        CurriculumItem::new("animal-duck", Category::Animals, "🦆", t("duck", "pato"))
            .with_difficulty(2)
            .with_sound("quack")
            .with_context("context/duck-pond.png"),
        CurriculumItem::new("animal-lion", Category::Animals, "🦁", t("lion", "leão"))
            .with_difficulty(3)
            .with_sound("roar"),
        // Fruits
        CurriculumItem::new("fruit-apple", Category::Fruits, "🍎", t("apple", "maçã"))
            .with_sound("crunch")
            .with_context("context/apple-tree.png"),
        CurriculumItem::new("fruit-banana", Category::Fruits, "🍌", t("banana", "banana"))
            .with_context("context/banana-bunch.png"),
        CurriculumItem::new("fruit-grape", Category::Fruits, "🍇", t("grape", "uva")).with_difficulty(2),
        CurriculumItem::new("fruit-orange", Category::Fruits, "🍊", t("orange", "laranja")).with_difficulty(2),
        // Vehicles
        CurriculumItem::new("vehicle-car", Category::Vehicles, "🚗", t("car", "carro"))
            .with_sound("horn")
            .with_context("context/car-street.png"),
        CurriculumItem::new("vehicle-bus", Category::Vehicles, "🚌", t("bus", "ônibus"))
            .with_sound("horn"),
        CurriculumItem::new("vehicle-train", Category::Vehicles, "🚆", t("train", "trem"))
            .with_difficulty(2)
            .with_sound("choo-choo"),
        CurriculumItem::new("vehicle-plane", Category::Vehicles, "✈️", t("plane", "avião"))
            .with_difficulty(3)
            .with_sound("engine"),
        // Shapes
        CurriculumItem::new("shape-circle", Category::Shapes, "⚪", t("circle", "círculo")),
        CurriculumItem::new("shape-square", Category::Shapes, "⬜", t("square", "quadrado")),
        CurriculumItem::new("shape-triangle", Category::Shapes, "🔺", t("triangle", "triângulo")).with_difficulty(2),
        CurriculumItem::new("shape-star", Category::Shapes, "⭐", t("star", "estrela")).with_difficulty(3),
        // Body parts
        CurriculumItem::new("body-hand", Category::BodyParts, "✋", t("hand", "mão"))
            .with_context("context/washing-hands.png"),
        CurriculumItem::new("body-eye", Category::BodyParts, "👁️", t("eye", "olho")),
        CurriculumItem::new("body-nose", Category::BodyParts, "👃", t("nose", "nariz")),
        CurriculumItem::new("body-mouth", Category::BodyParts, "👄", t("mouth", "boca"))
            .with_difficulty(2)
            .with_context("context/brushing-teeth.png"),
        // Emotions
        CurriculumItem::new("emotion-happy", Category::Emotions, "😀", t("happy", "feliz"))
            .with_context("context/birthday-party.png"),
        CurriculumItem::new("emotion-sad", Category::Emotions, "😢", t("sad", "triste"))
            .with_difficulty(2)
            .with_context("context/lost-toy.png"),
        CurriculumItem::new("emotion-angry", Category::Emotions, "😠", t("angry", "bravo"))
            .with_difficulty(3),
        CurriculumItem::new("emotion-scared", Category::Emotions, "😨", t("scared", "assustado"))
            .with_difficulty(4),
        // Songs
        CurriculumItem::new("song-abc", Category::Songs, "🎵", t("the alphabet song", "a música do alfabeto"))
            .with_sound("music-abc"),
        CurriculumItem::new("song-twinkle", Category::Songs, "🌟", t("twinkle twinkle", "brilha brilha estrelinha"))
            .with_sound("music-twinkle"),
        CurriculumItem::new("song-farm", Category::Songs, "🚜", t("old macdonald", "seu lobato"))
            .with_difficulty(2)
            .with_sound("music-farm"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let builtin = Catalog::builtin();
        // Re-validate through the checked constructor
        let checked = Catalog::from_items(builtin.items().to_vec()).unwrap();
        assert_eq!(checked.len(), builtin.len());
    }

    #[test]
    fn test_builtin_covers_every_category() {
        let categories = Catalog::builtin().categories();
        assert_eq!(categories.len(), Category::all().len());
    }

    #[test]
    fn test_letters_carry_letter_fields() {
        for item in Catalog::builtin().by_category(Category::Letters) {
            assert!(item.letter_name.is_some(), "{} lacks letter name", item.id);
            assert!(item.phonetic.is_some(), "{} lacks phonetic", item.id);
        }
        assert!(Catalog::builtin().get("fruit-apple").unwrap().phonetic.is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let item = CurriculumItem::new("x", Category::Shapes, "x", t("x", "x"));
        let err = Catalog::from_items(vec![item.clone(), item]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(id) if id == "x"));
    }

    #[test]
    fn test_difficulty_range_enforced() {
        let item = CurriculumItem::new("x", Category::Shapes, "x", t("x", "x")).with_difficulty(11);
        assert!(matches!(
            Catalog::from_items(vec![item]),
            Err(CatalogError::DifficultyOutOfRange { difficulty: 11, .. })
        ));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(matches!(Catalog::from_items(vec![]), Err(CatalogError::Empty)));
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"id": "fruit-kiwi", "name": {"en": "kiwi", "pt": "kiwi"}, "glyph": "🥝",
             "category": "fruits", "difficulty": 2}
        ]"#;
        let catalog = Catalog::from_json_str(json).unwrap();
        let kiwi = catalog.get("fruit-kiwi").unwrap();
        assert_eq!(kiwi.category, Category::Fruits);
        assert!(kiwi.sound_effect.is_none());

        assert!(matches!(Catalog::from_json_str("{"), Err(CatalogError::Parse(_))));
    }
}
