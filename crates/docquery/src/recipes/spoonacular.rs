//! Spoonacular API client

use reqwest::Client;
use std::time::Duration;

use crate::config::RecipeConfig;
use crate::error::{Error, Result};
use crate::types::Recipe;

use super::mapping::{RecipeInformation, RecipeMatch};
use super::IngredientList;

/// Spoonacular recipe client
pub struct SpoonacularClient {
    client: Client,
    config: RecipeConfig,
}

impl SpoonacularClient {
    /// Create a client from configuration
    pub fn new(config: &RecipeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("SPOONACULAR_API_KEY is not set".to_string()))
    }

    /// Search recipes that use the given ingredients, best match first
    pub async fn find_by_ingredients(
        &self,
        ingredients: &IngredientList,
        number: u32,
    ) -> Result<Vec<RecipeMatch>> {
        let url = self.url("/recipes/findByIngredients");
        let number = number.to_string();
        let ranking = self.config.ranking.to_string();
        let joined = ingredients.joined();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("ingredients", joined.as_str()),
                ("number", number.as_str()),
                ("ranking", ranking.as_str()),
                ("apiKey", self.api_key()?),
            ])
            .send()
            .await
            .map_err(|e| Error::recipe(format!("Search request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::recipe(format!(
                "Search failed: HTTP {} (check the API key)",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::recipe(format!("Failed to parse search response: {}", e)))
    }

    /// Full recipe details
    pub async fn information(&self, id: u64) -> Result<RecipeInformation> {
        let url = self.url(&format!("/recipes/{}/information", id));

        let response = self
            .client
            .get(&url)
            .query(&[("apiKey", self.api_key()?)])
            .send()
            .await
            .map_err(|e| Error::recipe(format!("Details request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::recipe(format!(
                "Failed to fetch recipe details: HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::recipe(format!("Failed to parse recipe details: {}", e)))
    }

    /// Suggest one recipe for the ingredients
    ///
    /// Returns `Ok(None)` when the search finds nothing. Fewer ingredients
    /// than `min_ingredients` is rejected before any request is made.
    pub async fn suggest(&self, ingredients: &IngredientList) -> Result<Option<Recipe>> {
        if ingredients.len() < self.config.min_ingredients {
            return Err(Error::recipe(format!(
                "Please add at least {} ingredients",
                self.config.min_ingredients
            )));
        }
        self.api_key()?;

        tracing::info!("Searching recipes for: {}", ingredients.joined());

        let Some(best) = self.find_by_ingredients(ingredients, 1).await?.into_iter().next() else {
            tracing::info!("No recipes found for the given ingredients");
            return Ok(None);
        };

        tracing::debug!(
            "Best match {} ({}), {} used / {} missing",
            best.title,
            best.id,
            best.used_ingredient_count,
            best.missed_ingredient_count
        );

        let details = self.information(best.id).await?;
        Ok(Some(details.into_recipe()))
    }
}
