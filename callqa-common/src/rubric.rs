//! Static scoring rubric
//!
//! The rubric is immutable process-wide data, loaded once and read by
//! reference everywhere. Category order is the fixed evaluation order
//! used for scoring and for dashboard chart axes.

use crate::{Error, Result};
use once_cell::sync::Lazy;

/// Published grand maximum across all categories
pub const TOTAL_MAX_POINTS: u32 = 73;

/// Category name used by the compliance check in the scoring engine
pub const CRITICAL_PARAMETERS: &str = "Critical Parameters";

/// One evaluated question within a category
#[derive(Debug, Clone)]
pub struct RubricItem {
    /// Question text, as presented to the AI analysis service
    pub prompt: &'static str,
    /// Maximum sub-score for this item
    pub max_points: u32,
}

/// One weighted evaluation category
#[derive(Debug, Clone)]
pub struct RubricCategory {
    pub name: &'static str,
    /// Maximum points; always equals the sum of the item maxima
    pub max_points: u32,
    pub items: Vec<RubricItem>,
}

/// The full rubric: categories in fixed evaluation order
#[derive(Debug)]
pub struct Rubric {
    categories: Vec<RubricCategory>,
    total_max: u32,
}

static RUBRIC: Lazy<Rubric> = Lazy::new(Rubric::standard);

impl Rubric {
    /// Process-wide rubric singleton
    pub fn get() -> &'static Rubric {
        &RUBRIC
    }

    /// Categories in fixed evaluation order
    pub fn categories(&self) -> &[RubricCategory] {
        &self.categories
    }

    /// Look up a category by name
    pub fn category(&self, name: &str) -> Result<&RubricCategory> {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::UnknownCategory(name.to_string()))
    }

    /// Find an item by category name and question text
    pub fn item(&self, category: &str, prompt: &str) -> Result<&RubricItem> {
        let category = self.category(category)?;
        category
            .items
            .iter()
            .find(|i| i.prompt == prompt)
            .ok_or_else(|| Error::NotFound(format!("rubric item: {prompt:?}")))
    }

    /// Grand maximum across all categories
    pub fn total_max(&self) -> u32 {
        self.total_max
    }

    fn standard() -> Self {
        let categories = vec![
            category(
                "Call Opening",
                10,
                &[
                    ("Did agent probe customer name before continuing?", 3),
                    ("Did agent open call as per timelines and script?", 3),
                    ("Did agent give opening within 5 seconds?", 2),
                    ("Did agent greet according to language selection?", 2),
                ],
            ),
            category(
                "Soft Skills",
                16,
                &[
                    ("Did agent willingly help without making commitments?", 3),
                    ("Did agent use proper sentence structure and grammar?", 3),
                    ("Was agent confident during the call?", 3),
                    ("Did agent show empathy towards customer?", 4),
                    ("Did agent maintain professional tone throughout?", 3),
                ],
            ),
            category(
                "Probing & Understanding",
                10,
                &[
                    ("Did agent ask effective questions to understand needs?", 4),
                    ("Did agent understand customer concern at first instance?", 3),
                    ("Did agent ask pertinent diagnostic questions?", 3),
                ],
            ),
            category(
                "Problem Resolution",
                14,
                &[
                    ("Did agent provide accurate information?", 5),
                    ("Did agent offer appropriate solutions?", 5),
                    ("Did agent handle objections effectively?", 4),
                ],
            ),
            category(
                "Call Closing",
                8,
                &[
                    ("Did agent follow correct closing format?", 3),
                    ("Did agent summarize the call properly?", 3),
                    ("Did agent ask for further assistance?", 2),
                ],
            ),
            category(
                CRITICAL_PARAMETERS,
                15,
                &[
                    ("Did agent NOT disconnect without warning?", 10),
                    ("Did agent use correct categorization?", 5),
                ],
            ),
        ];

        let total_max = categories.iter().map(|c| c.max_points).sum();
        assert_eq!(total_max, TOTAL_MAX_POINTS, "rubric total must stay fixed");

        Rubric {
            categories,
            total_max,
        }
    }
}

fn category(name: &'static str, max_points: u32, items: &[(&'static str, u32)]) -> RubricCategory {
    let items: Vec<RubricItem> = items
        .iter()
        .map(|(prompt, max_points)| RubricItem {
            prompt,
            max_points: *max_points,
        })
        .collect();

    let item_sum: u32 = items.iter().map(|i| i.max_points).sum();
    assert_eq!(item_sum, max_points, "item maxima must sum to {name} max");

    RubricCategory {
        name,
        max_points,
        items,
    }
}
