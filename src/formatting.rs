//! User-facing message rendering for WhatsApp replies.

use crate::error::ErrorKind;
use crate::models::NutritionResult;

/// Render a nutrition analysis result into a WhatsApp message.
///
/// Vitamin and mineral blocks are omitted entirely when they have no
/// populated values; there are never empty section headers.
pub fn format_result(result: &NutritionResult) -> String {
    let mut parts = vec![
        "🍽 *Meal Analysis – SnapCalories*".to_string(),
        String::new(),
        format!("*Estimated Calories:* {:.0} kcal", result.total_calories),
        String::new(),
        "*Macros:*".to_string(),
        format!("• Protein: {:.1}g", result.macros.protein),
        format!("• Carbohydrates: {:.1}g", result.macros.carbohydrates),
        format!("• Fat: {:.1}g", result.macros.fat),
        format!("• Fiber: {:.1}g", result.macros.fiber),
    ];

    if let Some(micros) = &result.micros {
        if micros.has_vitamins() {
            parts.push(String::new());
            parts.push("*Vitamins:*".to_string());
            if let Some(dv) = micros.vitamin_a_dv {
                parts.push(format!("• Vitamin A: {:.0}% DV", dv));
            }
            if let Some(dv) = micros.vitamin_c_dv {
                parts.push(format!("• Vitamin C: {:.0}% DV", dv));
            }
            if let Some(dv) = micros.vitamin_b12_dv {
                parts.push(format!("• Vitamin B12: {:.0}% DV", dv));
            }
        }

        if micros.has_minerals() {
            parts.push(String::new());
            parts.push("*Minerals:*".to_string());
            if let Some(dv) = micros.iron_dv {
                parts.push(format!("• Iron: {:.0}% DV", dv));
            }
            if let Some(dv) = micros.magnesium_dv {
                parts.push(format!("• Magnesium: {:.0}% DV", dv));
            }
            if let Some(dv) = micros.potassium_dv {
                parts.push(format!("• Potassium: {:.0}% DV", dv));
            }
        }
    }

    parts.push(String::new());
    parts.push(format!("*Confidence:* {}%", result.confidence_percentage()));
    parts.push(String::new());
    parts.push(format!("_{}_", result.disclaimer));

    parts.join("\n")
}

/// Map an error category to its fixed user-facing message.
///
/// An optional details string is appended as a separate line.
pub fn format_error(kind: ErrorKind, details: Option<&str>) -> String {
    let base = match kind {
        ErrorKind::InvalidImage => {
            "❌ Sorry, I couldn't process that image. Please send a clear photo of your meal (JPG or PNG, under 10MB)."
        }
        ErrorKind::NoFoodDetected => {
            "🤔 I couldn't detect any food in this image. Please send a clearer photo of your meal."
        }
        ErrorKind::ApiError => {
            "⚠️ Something went wrong with the analysis. Please try again in a moment."
        }
        ErrorKind::Timeout => {
            "⏱ The analysis is taking too long. Please try again with a simpler meal photo."
        }
        ErrorKind::UnsupportedMessage => {
            "📝 Please send me a photo of your meal so I can analyze its nutrition!"
        }
        ErrorKind::RateLimit => {
            "⏸ You're sending photos too quickly! Please wait a moment and try again."
        }
        ErrorKind::Unknown => "❌ An error occurred. Please try again.",
    };

    match details {
        Some(details) if !details.is_empty() => format!("{}\n\nDetails: {}", base, details),
        _ => base.to_string(),
    }
}

/// Welcome message for first contact.
pub fn format_welcome() -> String {
    "👋 *Welcome to SnapCalories!*\n\
     \n\
     Send me a photo of your meal, and I'll instantly analyze its nutritional content.\n\
     \n\
     📸 *How to use:*\n\
     1. Take a clear photo of your meal\n\
     2. Send it to me\n\
     3. Get instant nutrition breakdown!\n\
     \n\
     🎯 I'll tell you:\n\
     • Calories and macros\n\
     • Vitamins and minerals\n\
     • Confidence score\n\
     \n\
     _Note: This is an AI estimate, not medical advice._\n\
     \n\
     Ready? Send your first meal photo! 🍽"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FoodItem, MacroNutrients, MicroNutrients, DISCLAIMER};

    fn sample_result(micros: Option<MicroNutrients>) -> NutritionResult {
        NutritionResult {
            total_calories: 645.0,
            macros: MacroNutrients {
                protein: 42.0,
                carbohydrates: 58.0,
                fat: 28.0,
                fiber: 9.0,
            },
            micros,
            detected_foods: vec![FoodItem::new("Grilled Chicken Breast", 132.0, 0.88).unwrap()],
            overall_confidence: 0.85,
            disclaimer: DISCLAIMER.to_string(),
        }
    }

    #[test]
    fn test_format_result_full() {
        let micros = MicroNutrients {
            vitamin_a_dv: Some(35.0),
            vitamin_c_dv: Some(42.0),
            vitamin_b12_dv: Some(50.0),
            iron_dv: Some(22.0),
            magnesium_dv: Some(19.0),
            potassium_dv: Some(25.0),
        };
        let message = format_result(&sample_result(Some(micros)));

        assert!(message.contains("*Estimated Calories:* 645 kcal"));
        assert!(message.contains("• Protein: 42.0g"));
        assert!(message.contains("• Fiber: 9.0g"));
        assert!(message.contains("*Vitamins:*"));
        assert!(message.contains("• Vitamin A: 35% DV"));
        assert!(message.contains("*Minerals:*"));
        assert!(message.contains("• Potassium: 25% DV"));
        assert!(message.contains("*Confidence:* 85%"));
        assert!(message.contains(DISCLAIMER));
    }

    #[test]
    fn test_format_result_without_micros() {
        let message = format_result(&sample_result(None));

        assert!(!message.contains("*Vitamins:*"));
        assert!(!message.contains("*Minerals:*"));
        assert!(message.contains("*Macros:*"));
        assert!(message.contains("*Confidence:* 85%"));
    }

    #[test]
    fn test_format_result_partial_micros() {
        // Only minerals populated: no vitamins header at all.
        let micros = MicroNutrients {
            iron_dv: Some(22.0),
            ..MicroNutrients::default()
        };
        let message = format_result(&sample_result(Some(micros)));

        assert!(!message.contains("*Vitamins:*"));
        assert!(message.contains("*Minerals:*"));
        assert!(message.contains("• Iron: 22% DV"));
        assert!(!message.contains("Magnesium"));
    }

    #[test]
    fn test_format_error_known_kinds() {
        assert!(format_error(ErrorKind::InvalidImage, None).contains("couldn't process"));
        assert!(format_error(ErrorKind::NoFoodDetected, None).contains("couldn't detect any food"));
        assert!(format_error(ErrorKind::ApiError, None).contains("went wrong"));
        assert!(format_error(ErrorKind::Timeout, None).contains("taking too long"));
        assert!(format_error(ErrorKind::UnsupportedMessage, None).contains("photo of your meal"));
        assert!(format_error(ErrorKind::RateLimit, None).contains("too quickly"));
        assert!(format_error(ErrorKind::Unknown, None).contains("An error occurred"));
    }

    #[test]
    fn test_format_error_with_details() {
        let message = format_error(ErrorKind::ApiError, Some("vision model offline"));
        assert!(message.ends_with("Details: vision model offline"));

        let without = format_error(ErrorKind::ApiError, Some(""));
        assert!(!without.contains("Details:"));
    }

    #[test]
    fn test_format_welcome() {
        let message = format_welcome();
        assert!(message.contains("*Welcome to SnapCalories!*"));
        assert!(message.contains("not medical advice"));
    }

}
