//! Catalog product projection.
//!
//! The engine consumes a read-only snapshot of catalog products. Only `id`
//! and `specifications` are required; the remaining fields default so a
//! minimal document still deserializes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::spec::{normalize_specs, SpecEntry, Specification};

/// Product identifier from the catalog snapshot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct ProductId(u64);

impl ProductId {
    /// Create an ID from its numeric form.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the numeric value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A product as consumed by the search engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Product title.
    #[serde(default)]
    pub title: String,
    /// Full description.
    #[serde(default)]
    pub description: String,
    /// Price in the catalog currency.
    #[serde(default)]
    pub price: f64,
    /// Primary category.
    #[serde(default)]
    pub category: String,
    /// Brand name.
    #[serde(default)]
    pub brand: String,
    /// Average rating (0.0 - 5.0).
    #[serde(default)]
    pub rating: f64,
    /// Units in stock.
    #[serde(default)]
    pub stock: u32,
    /// Thumbnail URL.
    #[serde(default)]
    pub thumbnail: String,
    /// Raw specification entries, normalized on demand.
    #[serde(default)]
    pub specifications: Vec<SpecEntry>,
}

impl Product {
    /// Create a minimal product.
    pub fn new(id: impl Into<ProductId>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            description: String::new(),
            price: 0.0,
            category: String::new(),
            brand: String::new(),
            rating: 0.0,
            stock: 0,
            thumbnail: String::new(),
            specifications: Vec::new(),
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the price.
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the brand.
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    /// Set the rating.
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    /// Set the stock level.
    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }

    /// Append a specification.
    pub fn with_spec(mut self, spec: Specification) -> Self {
        self.specifications.push(SpecEntry::from(spec));
        self
    }

    /// Normalized specifications, malformed entries dropped.
    pub fn normalized_specs(&self) -> Vec<Specification> {
        normalize_specs(&self.specifications)
    }

    /// Whether the product has stock available.
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}
