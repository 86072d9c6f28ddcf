//! Maps the integer confluence score to a trade category.

use crate::domain::Category;

/// Category for `score` and whether it is actionable at `threshold`.
pub fn classify(score: u8, threshold: u8) -> (Category, bool) {
    let category = match score {
        0 => Category::Rejected,
        1 => Category::NoEntry,
        2 => Category::WeakTrade,
        3 => Category::ValidTrade,
        4 => Category::StrongTrade,
        _ => Category::SuperTrade,
    };
    (category, score >= threshold && score > 0)
}
