//! Category selector - neglect-weighted choice of the next topic
//!
//! Categories unused for a while are favored. With the configured
//! probability a neglected category is drawn; otherwise the draw is
//! uniform over every category, recently used ones included.

use chrono::{DateTime, Duration, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::HashMap;
use tracing::debug;

use crate::types::Category;

/// Days without use after which a category counts as neglected
pub const DEFAULT_NEGLECT_DAYS: i64 = 7;

/// Chance of drawing from the neglected set when it is non-empty
pub const DEFAULT_NEGLECT_PROBABILITY: f64 = 0.7;

/// Two-tier category chooser
#[derive(Debug, Clone, Copy)]
pub struct CategorySelector {
    neglect_after: Duration,
    neglect_probability: f64,
}

impl Default for CategorySelector {
    fn default() -> Self {
        Self::new(DEFAULT_NEGLECT_DAYS, DEFAULT_NEGLECT_PROBABILITY)
    }
}

impl CategorySelector {
    pub fn new(neglect_days: i64, neglect_probability: f64) -> Self {
        Self {
            neglect_after: Duration::days(neglect_days.max(0)),
            neglect_probability: neglect_probability.clamp(0.0, 1.0),
        }
    }

    /// Whether `category` has gone unused long enough to be favored
    pub fn is_neglected(
        &self,
        category: Category,
        last_used: &HashMap<String, DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> bool {
        match last_used.get(category.as_str()) {
            None => true,
            Some(when) => now.signed_duration_since(*when) >= self.neglect_after,
        }
    }

    /// Choose the next category to prompt.
    ///
    /// Returns `None` only when `categories` is empty.
    pub fn select_category<R: Rng + ?Sized>(
        &self,
        last_used: &HashMap<String, DateTime<Utc>>,
        categories: &[Category],
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Option<Category> {
        let neglected: Vec<Category> = categories
            .iter()
            .copied()
            .filter(|c| self.is_neglected(*c, last_used, now))
            .collect();

        if !neglected.is_empty() && rng.random::<f64>() < self.neglect_probability {
            let choice = neglected.choose(rng).copied();
            debug!("Selected neglected category {:?} of {}", choice, neglected.len());
            return choice;
        }

        let choice = categories.choose(rng).copied();
        debug!("Selected category {:?} from full set", choice);
        choice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn used(now: DateTime<Utc>, entries: &[(Category, i64)]) -> HashMap<String, DateTime<Utc>> {
        entries
            .iter()
            .map(|(c, days_ago)| (c.as_str().to_string(), now - Duration::days(*days_ago)))
            .collect()
    }

    #[test]
    fn test_neglect_boundary() {
        let now = Utc::now();
        let selector = CategorySelector::default();
        let map = used(now, &[(Category::Person, 7), (Category::Place, 6)]);
        assert!(selector.is_neglected(Category::Person, &map, now));
        assert!(!selector.is_neglected(Category::Place, &map, now));
        assert!(selector.is_neglected(Category::Object, &map, now));
    }

    #[test]
    fn test_empty_categories() {
        let mut rng = StdRng::seed_from_u64(0);
        let selector = CategorySelector::default();
        assert_eq!(selector.select_category(&HashMap::new(), &[], Utc::now(), &mut rng), None);
    }

    #[test]
    fn test_one_neglected_of_five() {
        let now = Utc::now();
        let categories = [
            Category::Person,
            Category::Place,
            Category::Conversation,
            Category::Object,
            Category::Moment,
        ];
        let map = used(
            now,
            &[
                (Category::Person, 1),
                (Category::Place, 2),
                (Category::Conversation, 3),
                (Category::Object, 0),
            ],
        );
        let selector = CategorySelector::default();
        let mut rng = StdRng::seed_from_u64(42);

        let trials = 10_000;
        let hits = (0..trials)
            .filter(|_| {
                selector.select_category(&map, &categories, now, &mut rng) == Some(Category::Moment)
            })
            .count();

        // 0.7 + 0.3 / 5
        let rate = hits as f64 / trials as f64;
        assert!((rate - 0.76).abs() < 0.02, "neglected rate {}", rate);
    }

    #[test]
    fn test_all_recent_is_uniform() {
        let now = Utc::now();
        let categories = [Category::Person, Category::Place];
        let map = used(now, &[(Category::Person, 1), (Category::Place, 1)]);
        let selector = CategorySelector::default();
        let mut rng = StdRng::seed_from_u64(8);

        let trials = 10_000;
        let person = (0..trials)
            .filter(|_| {
                selector.select_category(&map, &categories, now, &mut rng) == Some(Category::Person)
            })
            .count();
        let rate = person as f64 / trials as f64;
        assert!((rate - 0.5).abs() < 0.03, "person rate {}", rate);
    }
}
