//! Core types for the document client

pub mod document;
pub mod query;
pub mod recipe;
pub mod response;

pub use document::{UploadFile, UploadedDocument};
pub use query::{PopulateRequest, QueryExchange, QueryRequest};
pub use recipe::{Author, Difficulty, Ingredient, NutritionInfo, Recipe};
pub use response::{CheckUploadsResponse, QueryResponse, UploadResponse};
