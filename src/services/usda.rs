use anyhow::Result;
use serde::Deserialize;

use crate::models::NutrientVector;

/// Opaque keyed-search capability for food composition data.
///
/// `Ok(Some(vector))` carries the best match per 100 grams; `Ok(None)` means
/// nothing matched. The first candidate the backend returns is always taken
/// as the best match, with no re-ranking here.
#[async_trait::async_trait]
pub trait CompositionLookup: Send + Sync {
    async fn search(&self, query: &str) -> Result<Option<NutrientVector>>;
}

/// USDA FoodData Central search client.
pub struct UsdaClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<UsdaFood>,
}

#[derive(Debug, Deserialize)]
struct UsdaFood {
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "foodNutrients", default)]
    food_nutrients: Vec<UsdaNutrient>,
}

#[derive(Debug, Deserialize)]
struct UsdaNutrient {
    #[serde(rename = "nutrientId")]
    nutrient_id: Option<u32>,
    #[serde(default)]
    value: f64,
}

impl UsdaClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Map USDA nutrient IDs onto the tracked nutrient fields, per 100g.
    fn extract_nutrients(food: &UsdaFood) -> NutrientVector {
        let mut nutrients = NutrientVector::ZERO;

        for nutrient in &food.food_nutrients {
            match nutrient.nutrient_id {
                Some(1003) => nutrients.protein = nutrient.value,
                Some(1005) => nutrients.carbs = nutrient.value,
                Some(1004) => nutrients.fat = nutrient.value,
                Some(1079) => nutrients.fiber = nutrient.value,
                Some(1008) => nutrients.calories = nutrient.value,
                Some(1106) => nutrients.vitamin_a = nutrient.value,
                Some(1162) => nutrients.vitamin_c = nutrient.value,
                Some(1178) => nutrients.vitamin_b12 = nutrient.value,
                Some(1089) => nutrients.iron = nutrient.value,
                Some(1090) => nutrients.magnesium = nutrient.value,
                Some(1092) => nutrients.potassium = nutrient.value,
                _ => {}
            }
        }

        nutrients
    }
}

#[async_trait::async_trait]
impl CompositionLookup for UsdaClient {
    async fn search(&self, query: &str) -> Result<Option<NutrientVector>> {
        let url = format!("{}/foods/search", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("query", query),
                ("pageSize", "5"),
                ("dataType", "Foundation"),
                ("dataType", "SR Legacy"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            anyhow::bail!("USDA API error ({}): {}", status, error_text);
        }

        let data: SearchResponse = response.json().await?;

        match data.foods.first() {
            Some(best_match) => {
                log::info!(
                    "🔍 Found match for '{}': {}",
                    query,
                    best_match.description.as_deref().unwrap_or("(no description)")
                );
                Ok(Some(Self::extract_nutrients(best_match)))
            }
            None => {
                log::warn!("🔍 No USDA data found for: {}", query);
                Ok(None)
            }
        }
    }
}
