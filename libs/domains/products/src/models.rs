use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Product entity - matches SQL schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    /// Stock keeping unit, not unique
    #[schema(example = 111)]
    pub sku: i64,
    #[schema(example = "Telefono")]
    pub name: String,
    pub quantity: i32,
    /// Two fractional digits
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 499.99)]
    pub price: Decimal,
    pub description: String,
    /// Path relative to the public directory, e.g. `images/0190….png`
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fully validated fields for a new product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub sku: i64,
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
    pub description: String,
}

/// Validated patch; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub sku: Option<i64>,
    pub name: Option<String>,
    pub quantity: Option<i32>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
}

/// `GET /products/search?name=&sku=`; an absent parameter matches everything.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Substring of the product name
    #[serde(default)]
    pub name: String,
    /// Substring of the SKU's decimal representation
    #[serde(default)]
    pub sku: String,
}

impl Product {
    pub fn new(input: NewProduct, image: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            sku: input.sku,
            name: input.name,
            quantity: input.quantity,
            price: input.price.round_dp(2),
            description: input.description,
            image,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_changes(&mut self, changes: ProductChanges) {
        if let Some(sku) = changes.sku {
            self.sku = sku;
        }
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(quantity) = changes.quantity {
            self.quantity = quantity;
        }
        if let Some(price) = changes.price {
            self.price = price.round_dp(2);
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        self.updated_at = Utc::now();
    }

    /// Substring match on name and on the SKU rendered as text.
    pub fn matches(&self, query: &SearchQuery) -> bool {
        self.name.contains(&query.name) && self.sku.to_string().contains(&query.sku)
    }
}
