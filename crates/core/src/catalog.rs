//! Card catalog - sprite address sets the player can choose from.

use serde::{Deserialize, Serialize};

use crate::config::LevelConfig;
use crate::error::LevelError;
use crate::rng::SimpleRng;
use crate::types::CardId;

/// One selectable theme: a name plus the front-face sprite addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardCategory {
    pub name: String,
    pub sprite_addresses: Vec<String>,
}

impl CardCategory {
    pub fn new<I, S>(name: impl Into<String>, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            sprite_addresses: addresses.into_iter().map(Into::into).collect(),
        }
    }
}

/// Categories plus the shared pool of card back designs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CardCatalog {
    pub categories: Vec<CardCategory>,
    pub back_side_addresses: Vec<String>,
}

/// Sprite addresses chosen for one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteAssignment {
    fronts: Vec<String>,
    back: Option<String>,
}

impl SpriteAssignment {
    /// Front address for a pairing id.
    pub fn front_for(&self, id: CardId) -> Option<&str> {
        if self.fronts.is_empty() {
            return None;
        }
        let index = id as usize % self.fronts.len();
        Some(self.fronts[index].as_str())
    }

    /// Back address shared by every card of the level.
    pub fn back(&self) -> Option<&str> {
        self.back.as_deref()
    }
}

impl CardCatalog {
    pub fn new(categories: Vec<CardCategory>, back_side_addresses: Vec<String>) -> Self {
        Self {
            categories,
            back_side_addresses,
        }
    }

    /// Small built-in catalog used by the headless runner and tests.
    pub fn builtin() -> Self {
        let category = |name: &str, items: &[&str]| {
            CardCategory::new(
                name,
                items.iter().map(|item| format!("Cards/{name}/{item}")),
            )
        };
        Self::new(
            vec![
                category(
                    "Animals",
                    &["cat", "dog", "fox", "owl", "bear", "frog", "lion", "panda", "tiger", "whale"],
                ),
                category(
                    "Fruits",
                    &["apple", "banana", "cherry", "grape", "kiwi", "lemon", "mango", "pear"],
                ),
                category(
                    "Vehicles",
                    &["bus", "car", "plane", "ship", "train", "bike", "truck", "rocket"],
                ),
            ],
            vec![
                "Cards/Backs/blue".to_string(),
                "Cards/Backs/green".to_string(),
                "Cards/Backs/red".to_string(),
            ],
        )
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn category(&self, index: usize) -> Option<&CardCategory> {
        self.categories.get(index)
    }

    /// Names for a category picker, in index order.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    /// Every address this catalog may hand out.
    pub fn all_addresses(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .flat_map(|c| c.sprite_addresses.iter())
            .chain(self.back_side_addresses.iter())
            .map(String::as_str)
    }

    /// Check the level's category against this catalog.
    pub fn validate(&self, config: &LevelConfig) -> Result<&CardCategory, LevelError> {
        let category = self
            .categories
            .get(config.category())
            .ok_or(LevelError::CategoryOutOfRange {
                index: config.category(),
                available: self.categories.len(),
            })?;
        if category.sprite_addresses.is_empty() {
            return Err(LevelError::EmptyCategory(category.name.clone()));
        }
        Ok(category)
    }

    /// Shuffle the category's fronts and pick one random back for a level.
    pub fn assign(
        &self,
        config: &LevelConfig,
        rng: &mut SimpleRng,
    ) -> Result<SpriteAssignment, LevelError> {
        let category = self.validate(config)?;
        let mut fronts = category.sprite_addresses.clone();
        rng.shuffle(&mut fronts);
        let back = if self.back_side_addresses.is_empty() {
            None
        } else {
            let index = rng.pick(self.back_side_addresses.len());
            Some(self.back_side_addresses[index].clone())
        };
        Ok(SpriteAssignment { fronts, back })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_category_is_rejected() {
        let catalog = CardCatalog::builtin();
        let config = LevelConfig::new(4, 9).unwrap();
        assert_eq!(
            catalog.validate(&config),
            Err(LevelError::CategoryOutOfRange {
                index: 9,
                available: 3
            })
        );
    }

    #[test]
    fn empty_category_is_rejected() {
        let catalog = CardCatalog::new(vec![CardCategory::new("Empty", Vec::<String>::new())], vec![]);
        let config = LevelConfig::new(4, 0).unwrap();
        assert_eq!(
            catalog.validate(&config),
            Err(LevelError::EmptyCategory("Empty".to_string()))
        );
    }

    #[test]
    fn fronts_wrap_around_when_pairs_exceed_sprites() {
        let catalog = CardCatalog::new(
            vec![CardCategory::new("Tiny", ["a", "b"])],
            vec!["back".to_string()],
        );
        let config = LevelConfig::new(8, 0).unwrap();
        let assignment = catalog.assign(&config, &mut SimpleRng::new(3)).unwrap();

        assert_eq!(assignment.front_for(0), assignment.front_for(2));
        assert_eq!(assignment.front_for(1), assignment.front_for(3));
        assert_ne!(assignment.front_for(0), assignment.front_for(1));
        assert_eq!(assignment.back(), Some("back"));
    }

    #[test]
    fn assignment_is_deterministic_per_seed() {
        let catalog = CardCatalog::builtin();
        let config = LevelConfig::new(16, 0).unwrap();
        let a = catalog.assign(&config, &mut SimpleRng::new(42)).unwrap();
        let b = catalog.assign(&config, &mut SimpleRng::new(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn no_back_designs_leaves_back_unset() {
        let catalog = CardCatalog::new(vec![CardCategory::new("X", ["a"])], vec![]);
        let config = LevelConfig::new(2, 0).unwrap();
        let assignment = catalog.assign(&config, &mut SimpleRng::new(1)).unwrap();
        assert_eq!(assignment.back(), None);
    }
}
