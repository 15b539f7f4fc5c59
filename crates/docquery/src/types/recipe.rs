//! Finished recipe record handed to renderers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recipe difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Estimate from total ready time
    pub fn from_ready_minutes(minutes: u32) -> Self {
        if minutes <= 30 {
            Self::Easy
        } else if minutes <= 60 {
            Self::Medium
        } else {
            Self::Hard
        }
    }

    /// Parse a provider-supplied label, case-insensitive
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ingredient line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Original ingredient text, e.g. "2 cups flour"
    pub name: String,
    pub amount: f64,
    pub unit: String,
}

/// Nutrition per serving, rounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionInfo {
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
    pub fiber: u32,
}

/// Recipe source attribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
}

impl Author {
    /// Fixed attribution for recipes fetched from Spoonacular
    pub fn spoonacular() -> Self {
        Self {
            id: "spoonacular".to_string(),
            name: "Spoonacular".to_string(),
            email: String::new(),
            avatar: "https://spoonacular.com/favicon.ico".to_string(),
        }
    }
}

/// A complete recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    /// Minutes
    pub prep_time: u32,
    /// Minutes
    pub cook_time: u32,
    pub servings: u32,
    pub difficulty: Difficulty,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    pub tags: Vec<String>,
    pub nutrition: NutritionInfo,
    pub author: Author,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Prep plus cook time in minutes
    pub fn total_time(&self) -> u32 {
        self.prep_time.saturating_add(self.cook_time)
    }
}
