use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::models::{FoodItem, NutrientVector};
use crate::services::usda::CompositionLookup;

/// Fallback composition per 100g for foods the lookup cannot resolve.
pub const DEFAULT_NUTRIENTS_PER_100G: NutrientVector = NutrientVector {
    protein: 15.0,
    carbs: 25.0,
    fat: 8.0,
    fiber: 3.0,
    calories: 200.0,
    vitamin_a: 50.0,
    vitamin_c: 10.0,
    vitamin_b12: 0.5,
    iron: 2.0,
    magnesium: 30.0,
    potassium: 200.0,
};

/// Resolves per-item nutrient composition and aggregates meal totals.
///
/// Lookup failures never propagate: the item falls back to
/// `DEFAULT_NUTRIENTS_PER_100G` and the degraded-lookup counter ticks, so the
/// meal-level aggregate always succeeds.
pub struct NutrientResolver {
    lookup: Arc<dyn CompositionLookup>,
    degraded_lookups: AtomicU64,
}

impl NutrientResolver {
    pub fn new(lookup: Arc<dyn CompositionLookup>) -> Self {
        Self {
            lookup,
            degraded_lookups: AtomicU64::new(0),
        }
    }

    /// Resolve one item's composition, scaled to its portion.
    pub async fn resolve(&self, item: &FoodItem) -> NutrientVector {
        let per_100g = match self.lookup.search(&item.name).await {
            Ok(Some(nutrients)) => nutrients,
            Ok(None) => {
                log::warn!("⚠️ No composition data for '{}', using defaults", item.name);
                self.degraded_lookups.fetch_add(1, Ordering::Relaxed);
                DEFAULT_NUTRIENTS_PER_100G
            }
            Err(e) => {
                log::warn!(
                    "⚠️ Composition lookup failed for '{}', using defaults: {}",
                    item.name,
                    e
                );
                self.degraded_lookups.fetch_add(1, Ordering::Relaxed);
                DEFAULT_NUTRIENTS_PER_100G
            }
        };

        per_100g.scale(item.quantity / 100.0)
    }

    /// Total nutrition across all items in a meal.
    ///
    /// Per-item lookups run concurrently; the sum waits for all of them.
    /// An empty item list yields the all-zero vector.
    pub async fn aggregate(&self, items: &[FoodItem]) -> NutrientVector {
        let resolved =
            futures::future::join_all(items.iter().map(|item| self.resolve(item))).await;

        let total = resolved
            .iter()
            .fold(NutrientVector::ZERO, |acc, nutrients| acc.add(nutrients));

        log::info!(
            "🧮 Meal total: {:.0} kcal, {:.1}g protein, {:.1}g carbs, {:.1}g fat",
            total.calories,
            total.protein,
            total.carbs,
            total.fat
        );
        total
    }

    /// How many lookups fell back to defaults since construction.
    pub fn degraded_lookup_count(&self) -> u64 {
        self.degraded_lookups.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    /// Lookup stub with a canned per-100g answer for every query.
    struct FixedLookup(Option<NutrientVector>);

    #[async_trait::async_trait]
    impl CompositionLookup for FixedLookup {
        async fn search(&self, _query: &str) -> Result<Option<NutrientVector>> {
            Ok(self.0)
        }
    }

    struct FailingLookup;

    #[async_trait::async_trait]
    impl CompositionLookup for FailingLookup {
        async fn search(&self, _query: &str) -> Result<Option<NutrientVector>> {
            anyhow::bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn test_resolve_scales_to_portion() {
        let per_100g = NutrientVector {
            protein: 31.0,
            fat: 3.6,
            calories: 165.0,
            ..NutrientVector::ZERO
        };
        let resolver = NutrientResolver::new(Arc::new(FixedLookup(Some(per_100g))));

        let item = FoodItem::new("Grilled Chicken Breast", 150.0, 0.9).unwrap();
        let scaled = resolver.resolve(&item).await;

        assert_eq!(scaled.protein, 46.5);
        assert_eq!(scaled.calories, 247.5);
        assert_eq!(resolver.degraded_lookup_count(), 0);
    }

    #[tokio::test]
    async fn test_resolve_not_found_falls_back_to_defaults() {
        let resolver = NutrientResolver::new(Arc::new(FixedLookup(None)));

        // 150g item against the 100g default vector: every field scales by 1.5
        let item = FoodItem::new("Mystery Stew", 150.0, 0.9).unwrap();
        let scaled = resolver.resolve(&item).await;

        assert_eq!(scaled.protein, 22.5);
        assert_eq!(scaled.carbs, 37.5);
        assert_eq!(scaled.fat, 12.0);
        assert_eq!(scaled.fiber, 4.5);
        assert_eq!(scaled.calories, 300.0);
        assert_eq!(scaled.vitamin_a, 75.0);
        assert_eq!(scaled.vitamin_c, 15.0);
        assert_eq!(scaled.vitamin_b12, 0.75);
        assert_eq!(scaled.iron, 3.0);
        assert_eq!(scaled.magnesium, 45.0);
        assert_eq!(scaled.potassium, 300.0);
        assert_eq!(resolver.degraded_lookup_count(), 1);
    }

    #[tokio::test]
    async fn test_lookup_errors_never_propagate() {
        let resolver = NutrientResolver::new(Arc::new(FailingLookup));

        let items = vec![
            FoodItem::new("Grilled Chicken Breast", 100.0, 0.9).unwrap(),
            FoodItem::new("Brown Rice", 100.0, 0.8).unwrap(),
        ];
        let total = resolver.aggregate(&items).await;

        // both items resolved from defaults, summed field-wise
        assert_eq!(total.protein, 30.0);
        assert_eq!(total.calories, 400.0);
        assert_eq!(resolver.degraded_lookup_count(), 2);
    }

    #[tokio::test]
    async fn test_aggregate_empty_is_zero() {
        let resolver = NutrientResolver::new(Arc::new(FailingLookup));
        let total = resolver.aggregate(&[]).await;
        assert_eq!(total, NutrientVector::ZERO);
        assert_eq!(resolver.degraded_lookup_count(), 0);
    }
}
