//! Spoonacular payloads and their mapping into [`Recipe`]

use chrono::Utc;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use crate::types::{Author, Difficulty, Ingredient, NutritionInfo, Recipe};

/// Prep time used when the API reports none
pub const DEFAULT_PREP_MINUTES: u32 = 15;
/// Cook time used when the API reports none
pub const DEFAULT_COOK_MINUTES: u32 = 30;

/// Entry of `GET /recipes/findByIngredients`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeMatch {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub used_ingredient_count: u32,
    #[serde(default)]
    pub missed_ingredient_count: u32,
}

/// Body of `GET /recipes/{id}/information`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeInformation {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub image: Option<String>,
    /// Spoonacular reports -1 or null when unknown
    #[serde(default)]
    pub preparation_minutes: Option<f64>,
    #[serde(default)]
    pub cooking_minutes: Option<f64>,
    #[serde(default)]
    pub ready_in_minutes: Option<u32>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub extended_ingredients: Vec<ExtendedIngredient>,
    #[serde(default)]
    pub analyzed_instructions: Vec<AnalyzedInstruction>,
    #[serde(default)]
    pub cuisines: Vec<String>,
    #[serde(default)]
    pub dish_types: Vec<String>,
    #[serde(default)]
    pub vegetarian: bool,
    #[serde(default)]
    pub vegan: bool,
    #[serde(default)]
    pub nutrition: Option<Nutrition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtendedIngredient {
    #[serde(default)]
    pub original: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzedInstruction {
    #[serde(default)]
    pub steps: Vec<InstructionStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstructionStep {
    pub step: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Nutrition {
    #[serde(default)]
    pub nutrients: Vec<Nutrient>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Nutrient {
    pub name: String,
    pub amount: f64,
}

fn html_tags() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"))
}

/// First sentence of an HTML summary, tags stripped
pub fn summarize(summary_html: &str) -> String {
    let text = html_tags().replace_all(summary_html, "");
    let first = text.split('.').next().unwrap_or("").trim();
    format!("{}.", first)
}

fn minutes_or(value: Option<f64>, default: u32) -> u32 {
    match value {
        Some(m) if m > 0.0 => m.round() as u32,
        _ => default,
    }
}

fn nutrient(nutrition: Option<&Nutrition>, name: &str) -> u32 {
    nutrition
        .and_then(|n| n.nutrients.iter().find(|x| x.name == name))
        .map(|x| x.amount.round().max(0.0) as u32)
        .unwrap_or(0)
}

impl RecipeInformation {
    /// Build the finished recipe record
    pub fn into_recipe(self) -> Recipe {
        let nutrition = NutritionInfo {
            calories: nutrient(self.nutrition.as_ref(), "Calories"),
            protein: nutrient(self.nutrition.as_ref(), "Protein"),
            carbs: nutrient(self.nutrition.as_ref(), "Carbohydrates"),
            fat: nutrient(self.nutrition.as_ref(), "Fat"),
            fiber: nutrient(self.nutrition.as_ref(), "Fiber"),
        };

        let difficulty = self
            .difficulty
            .as_deref()
            .and_then(Difficulty::parse)
            .unwrap_or_else(|| Difficulty::from_ready_minutes(self.ready_in_minutes.unwrap_or(0)));

        let mut tags: Vec<String> = self
            .cuisines
            .into_iter()
            .chain(self.dish_types)
            .filter(|t| !t.is_empty())
            .collect();
        if self.vegetarian {
            tags.push("Vegetarian".to_string());
        }
        if self.vegan {
            tags.push("Vegan".to_string());
        }

        let instructions = self
            .analyzed_instructions
            .into_iter()
            .next()
            .map(|block| block.steps.into_iter().map(|s| s.step).collect())
            .unwrap_or_default();

        let ingredients = self
            .extended_ingredients
            .into_iter()
            .map(|i| Ingredient {
                name: i.original,
                amount: i.amount,
                unit: i.unit,
            })
            .collect();

        let now = Utc::now();
        Recipe {
            id: self.id.to_string(),
            title: self.title,
            description: summarize(&self.summary),
            image: self.image.unwrap_or_default(),
            prep_time: minutes_or(self.preparation_minutes, DEFAULT_PREP_MINUTES),
            cook_time: minutes_or(self.cooking_minutes, DEFAULT_COOK_MINUTES),
            servings: self.servings.unwrap_or(1),
            difficulty,
            ingredients,
            instructions,
            tags,
            nutrition,
            author: Author::spoonacular(),
            created_at: now,
            updated_at: now,
        }
    }
}
