use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Disclaimer attached to every analysis result.
pub const DISCLAIMER: &str =
    "This is an AI estimate. For medical nutrition advice, consult a healthcare professional.";

/// Daily Value reference amounts based on a 2000 calorie diet.
/// vitamin_a in mcg RAE, vitamin_c in mg, vitamin_b12 in mcg,
/// iron in mg, magnesium in mg, potassium in mg.
pub struct DailyValueTable {
    pub vitamin_a: f64,
    pub vitamin_c: f64,
    pub vitamin_b12: f64,
    pub iron: f64,
    pub magnesium: f64,
    pub potassium: f64,
}

pub const DAILY_VALUES: DailyValueTable = DailyValueTable {
    vitamin_a: 900.0,
    vitamin_c: 90.0,
    vitamin_b12: 2.4,
    iron: 18.0,
    magnesium: 420.0,
    potassium: 4700.0,
};

/// Individual food item detected in the image.
///
/// Produced by the recognizer and never mutated downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub confidence: f64,
}

impl FoodItem {
    /// Create a food item with a quantity in grams.
    ///
    /// Rejects non-positive quantities and confidences outside [0, 1] so
    /// downstream stages never see malformed items.
    pub fn new(
        name: impl Into<String>,
        quantity: f64,
        confidence: f64,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        if quantity <= 0.0 {
            return Err(ModelError::InvalidQuantity { name, quantity });
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ModelError::InvalidConfidence { name, confidence });
        }
        Ok(Self {
            name,
            quantity,
            unit: "g".to_string(),
            confidence,
        })
    }
}

/// Amounts for the fixed set of tracked nutrients.
///
/// Expressed per 100 grams until scaled to a portion, absolute afterwards.
/// Every field is always present; absent data is 0.0, never a missing key.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NutrientVector {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub calories: f64,
    pub vitamin_a: f64,
    pub vitamin_c: f64,
    pub vitamin_b12: f64,
    pub iron: f64,
    pub magnesium: f64,
    pub potassium: f64,
}

impl NutrientVector {
    pub const ZERO: NutrientVector = NutrientVector {
        protein: 0.0,
        carbs: 0.0,
        fat: 0.0,
        fiber: 0.0,
        calories: 0.0,
        vitamin_a: 0.0,
        vitamin_c: 0.0,
        vitamin_b12: 0.0,
        iron: 0.0,
        magnesium: 0.0,
        potassium: 0.0,
    };

    /// Multiply every field by `factor`, e.g. quantity / 100 for portion scaling.
    pub fn scale(&self, factor: f64) -> NutrientVector {
        NutrientVector {
            protein: self.protein * factor,
            carbs: self.carbs * factor,
            fat: self.fat * factor,
            fiber: self.fiber * factor,
            calories: self.calories * factor,
            vitamin_a: self.vitamin_a * factor,
            vitamin_c: self.vitamin_c * factor,
            vitamin_b12: self.vitamin_b12 * factor,
            iron: self.iron * factor,
            magnesium: self.magnesium * factor,
            potassium: self.potassium * factor,
        }
    }

    /// Field-wise sum with another vector.
    pub fn add(&self, other: &NutrientVector) -> NutrientVector {
        NutrientVector {
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            fat: self.fat + other.fat,
            fiber: self.fiber + other.fiber,
            calories: self.calories + other.calories,
            vitamin_a: self.vitamin_a + other.vitamin_a,
            vitamin_c: self.vitamin_c + other.vitamin_c,
            vitamin_b12: self.vitamin_b12 + other.vitamin_b12,
            iron: self.iron + other.iron,
            magnesium: self.magnesium + other.magnesium,
            potassium: self.potassium + other.potassium,
        }
    }
}

/// Macronutrient breakdown in grams.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroNutrients {
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
    pub fiber: f64,
}

/// Micronutrient breakdown as Daily Value percentages.
///
/// `None` means the percentage was not computed; present values are in
/// [0, 1000].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MicroNutrients {
    pub vitamin_a_dv: Option<f64>,
    pub vitamin_c_dv: Option<f64>,
    pub vitamin_b12_dv: Option<f64>,
    pub iron_dv: Option<f64>,
    pub magnesium_dv: Option<f64>,
    pub potassium_dv: Option<f64>,
}

impl MicroNutrients {
    pub fn has_vitamins(&self) -> bool {
        self.vitamin_a_dv.is_some() || self.vitamin_c_dv.is_some() || self.vitamin_b12_dv.is_some()
    }

    pub fn has_minerals(&self) -> bool {
        self.iron_dv.is_some() || self.magnesium_dv.is_some() || self.potassium_dv.is_some()
    }
}

/// Complete nutrition analysis result for one meal image.
///
/// Immutable once constructed; the terminal artifact of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionResult {
    pub total_calories: f64,
    pub macros: MacroNutrients,
    pub micros: Option<MicroNutrients>,
    pub detected_foods: Vec<FoodItem>,
    pub overall_confidence: f64,
    pub disclaimer: String,
}

impl NutritionResult {
    /// Confidence as an integer percentage for display.
    ///
    /// Truncates toward zero: 0.857 reads as 85%.
    pub fn confidence_percentage(&self) -> i32 {
        (self.overall_confidence * 100.0) as i32
    }
}
