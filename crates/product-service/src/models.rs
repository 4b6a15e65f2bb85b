//! Product service models.

use chrono::{DateTime, Utc};
use common::Entity;
use serde::{Deserialize, Serialize};

/// Category assigned when a new product does not specify one.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub category: String,
    pub rating: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for Product {
    fn id(&self) -> &str {
        &self.id
    }
}

fn seed(id: &str, name: &str, price: f64, stock: i64, category: &str, rating: f64) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price,
        stock,
        category: category.to_string(),
        rating,
        created_at: None,
        updated_at: None,
    }
}

pub fn seed_products() -> Vec<Product> {
    vec![
        seed("1", "Laptop", 999.99, 10, "Electronics", 4.5),
        seed("2", "Smartphone", 499.99, 20, "Electronics", 4.2),
        seed("3", "Tablet", 299.99, 15, "Electronics", 4.0),
        seed("4", "Headphones", 99.99, 30, "Audio", 4.7),
        seed("5", "Smartwatch", 199.99, 12, "Wearables", 4.1),
    ]
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
    pub category: Option<String>,
}

impl ProductRequest {
    /// Reason the values cannot be stored, if any. Absent fields are fine.
    pub fn invalid_reason(&self) -> Option<&'static str> {
        if self.price.is_some_and(|price| !price.is_finite() || price <= 0.0) {
            return Some("Price must be a positive number");
        }
        if self.stock.is_some_and(|stock| stock < 0) {
            return Some("Stock cannot be negative");
        }
        None
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockUpdateRequest {
    /// Signed delta applied to the current stock.
    pub quantity: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub query: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl SearchParams {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(query) = self.query.as_deref().filter(|q| !q.is_empty()) {
            if !product.name.to_lowercase().contains(&query.to_lowercase()) {
                return false;
            }
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            if !product.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_range_is_inclusive() {
        let params = SearchParams {
            min_price: Some(199.99),
            max_price: Some(499.99),
            ..SearchParams::default()
        };
        let names: Vec<String> = seed_products()
            .into_iter()
            .filter(|p| params.matches(p))
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Smartphone", "Tablet", "Smartwatch"]);
    }

    #[test]
    fn test_query_and_category_ignore_case() {
        let params = SearchParams {
            query: Some("PHONE".to_string()),
            category: Some("audio".to_string()),
            ..SearchParams::default()
        };
        let names: Vec<String> = seed_products()
            .into_iter()
            .filter(|p| params.matches(p))
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Headphones"]);
    }

    #[test]
    fn test_invalid_reason() {
        let request = ProductRequest {
            price: Some(-1.0),
            ..ProductRequest::default()
        };
        assert_eq!(request.invalid_reason(), Some("Price must be a positive number"));

        let request = ProductRequest {
            stock: Some(-3),
            ..ProductRequest::default()
        };
        assert_eq!(request.invalid_reason(), Some("Stock cannot be negative"));

        assert_eq!(ProductRequest::default().invalid_reason(), None);
    }

    #[test]
    fn test_search_params_use_camel_case() {
        let params: SearchParams =
            serde_json::from_value(serde_json::json!({"minPrice": 10.0})).unwrap();
        assert_eq!(params.min_price, Some(10.0));
    }
}
