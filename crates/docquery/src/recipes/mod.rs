//! Ingredient-based recipe suggestions
//!
//! A simple call-and-render flow: collect at least two ingredients, ask
//! Spoonacular for the best match, fetch its details and hand back a finished
//! [`Recipe`](crate::types::Recipe).

pub mod mapping;
pub mod spoonacular;

pub use spoonacular::SpoonacularClient;

/// Ingredients entered by the user, trimmed and non-empty
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientList {
    items: Vec<String>,
}

impl IngredientList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an ingredient; blank input is ignored
    pub fn add(&mut self, ingredient: &str) -> bool {
        let ingredient = ingredient.trim();
        if ingredient.is_empty() {
            return false;
        }
        self.items.push(ingredient.to_string());
        true
    }

    /// Remove the ingredient at `index`
    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    /// Comma-separated form used by the search endpoint
    pub fn joined(&self) -> String {
        self.items.join(",")
    }
}

impl<S: AsRef<str>> FromIterator<S> for IngredientList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = Self::new();
        for item in iter {
            list.add(item.as_ref());
        }
        list
    }
}
