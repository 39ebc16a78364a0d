//! Portion size estimation from a food label and detection confidence.

/// Category keyword lists with their base serving size in grams.
/// Anything that matches no list falls into the dairy-like "other" bucket.
const PROTEIN_WORDS: &[&str] = &["chicken", "beef", "fish", "meat", "pork"];
const VEGETABLE_WORDS: &[&str] = &["salad", "vegetable", "broccoli", "carrot"];
const GRAIN_WORDS: &[&str] = &["rice", "pasta", "bread", "potato"];
const FRUIT_WORDS: &[&str] = &["apple", "banana", "berry", "fruit"];

const PROTEIN_GRAMS: f64 = 150.0;
const VEGETABLE_GRAMS: f64 = 100.0;
const GRAIN_GRAMS: f64 = 150.0;
const FRUIT_GRAMS: f64 = 120.0;
const DEFAULT_GRAMS: f64 = 100.0;

/// Estimate the portion mass in grams for a detected food.
///
/// Confidence dampens the base amount: a low-confidence detection is assumed
/// partial or uncertain. The result is rounded to the nearest integer gram;
/// confidence 0 yields 0.
pub fn estimate_grams(food_name: &str, confidence: f64) -> f64 {
    let food_lower = food_name.to_lowercase();

    let base = if PROTEIN_WORDS.iter().any(|w| food_lower.contains(w)) {
        PROTEIN_GRAMS
    } else if VEGETABLE_WORDS.iter().any(|w| food_lower.contains(w)) {
        VEGETABLE_GRAMS
    } else if GRAIN_WORDS.iter().any(|w| food_lower.contains(w)) {
        GRAIN_GRAMS
    } else if FRUIT_WORDS.iter().any(|w| food_lower.contains(w)) {
        FRUIT_GRAMS
    } else {
        DEFAULT_GRAMS
    };

    (base * confidence).round()
}
