//! Derivation of macros, calories, and Daily Value percentages from
//! aggregated meal nutrition.

use crate::models::{
    FoodItem, MacroNutrients, MicroNutrients, NutrientVector, NutritionResult, DAILY_VALUES,
    DISCLAIMER,
};

/// Extract the macronutrient breakdown from the aggregate.
pub fn calculate_macros(total: &NutrientVector) -> MacroNutrients {
    MacroNutrients {
        protein: total.protein,
        carbohydrates: total.carbs,
        fat: total.fat,
        fiber: total.fiber,
    }
}

/// Total calories, rounded to the nearest integer.
///
/// The reported value wins when it is positive; otherwise calories are
/// derived from macros with the Atwater factors (4/4/9 kcal per gram).
pub fn calculate_calories(macros: &MacroNutrients, total: &NutrientVector) -> f64 {
    if total.calories > 0.0 {
        return total.calories.round();
    }

    (macros.protein * 4.0 + macros.carbohydrates * 4.0 + macros.fat * 9.0).round()
}

/// Daily Value percentages for the tracked micronutrients.
pub fn calculate_micronutrients(total: &NutrientVector) -> MicroNutrients {
    MicroNutrients {
        vitamin_a_dv: Some(dv_percentage(total.vitamin_a, DAILY_VALUES.vitamin_a)),
        vitamin_c_dv: Some(dv_percentage(total.vitamin_c, DAILY_VALUES.vitamin_c)),
        vitamin_b12_dv: Some(dv_percentage(total.vitamin_b12, DAILY_VALUES.vitamin_b12)),
        iron_dv: Some(dv_percentage(total.iron, DAILY_VALUES.iron)),
        magnesium_dv: Some(dv_percentage(total.magnesium, DAILY_VALUES.magnesium)),
        potassium_dv: Some(dv_percentage(total.potassium, DAILY_VALUES.potassium)),
    }
}

/// Percentage of a Daily Value, rounded to the nearest integer and capped at
/// 1000. An undefined reference (daily_value 0) yields 0.0 rather than a
/// division by zero.
fn dv_percentage(amount: f64, daily_value: f64) -> f64 {
    if daily_value == 0.0 {
        return 0.0;
    }

    ((amount / daily_value) * 100.0).round().min(1000.0)
}

/// Assemble the complete result from the aggregate and detection metadata.
pub fn create_result(
    total: &NutrientVector,
    detected_foods: Vec<FoodItem>,
    overall_confidence: f64,
) -> NutritionResult {
    let macros = calculate_macros(total);
    let total_calories = calculate_calories(&macros, total);
    let micros = calculate_micronutrients(total);

    NutritionResult {
        total_calories,
        macros,
        micros: Some(micros),
        detected_foods,
        overall_confidence,
        disclaimer: DISCLAIMER.to_string(),
    }
}
