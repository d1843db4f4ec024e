//! Question selection for category-keyed sets.
//!
//! Every category is shuffled on its own with a uniform Fisher-Yates shuffle
//! and the categories are concatenated in document order. No question is
//! dropped.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};

use crate::model::Question;

/// A named group of questions inside a category-keyed set.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    pub questions: Vec<Question>,
}

/// Turns the categories of a raw set into one ordered question list.
pub trait SelectionPolicy: Send + Sync {
    fn name(&self) -> &str;

    /// Flatten `categories` into the list a session will present.
    fn select(&self, categories: Vec<Category>, rng: &mut dyn RngCore) -> Vec<Question>;
}

/// The rng a store hands to its policy: reproducible when `seed` is set.
pub fn selection_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Shuffle inside each category, keep category order, keep every question.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShuffleWithinCategories;

impl SelectionPolicy for ShuffleWithinCategories {
    fn name(&self) -> &str {
        "shuffle-within-categories"
    }

    fn select(&self, categories: Vec<Category>, rng: &mut dyn RngCore) -> Vec<Question> {
        let total = categories.iter().map(|c| c.questions.len()).sum();
        let mut selected = Vec::with_capacity(total);
        for mut category in categories {
            category.questions.shuffle(&mut *rng);
            selected.extend(category.questions);
        }
        selected
    }
}

/// Concatenate categories without reordering anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepOrder;

impl SelectionPolicy for KeepOrder {
    fn name(&self) -> &str {
        "keep-order"
    }

    fn select(&self, categories: Vec<Category>, _rng: &mut dyn RngCore) -> Vec<Question> {
        categories.into_iter().flat_map(|c| c.questions).collect()
    }
}
