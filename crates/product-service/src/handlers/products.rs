//! Product handlers.

use crate::models::{
    Product, ProductRequest, SearchParams, StockUpdateRequest, DEFAULT_CATEGORY,
};
use crate::routes::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use common::ServiceError;
use logify::CurrentRequest;
use serde_json::json;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

const PRODUCT_NOT_FOUND: &str = "Product not found";
const INVALID_PRODUCT_DATA: &str = "Invalid product data";

fn not_found() -> ServiceError {
    ServiceError::NotFound(PRODUCT_NOT_FOUND.to_string())
}

#[instrument(skip_all, name = "products.list")]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
) -> Result<Json<Vec<Product>>, ServiceError> {
    state
        .logify
        .info("Fetching all products", json!({ "requestId": ctx.request_id() }));

    state.faults.internal("fetch products")?;

    Ok(Json(state.products.all()))
}

#[instrument(skip_all, name = "products.get", fields(product_id = %id))]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Path(id): Path<String>,
) -> Result<Json<Product>, ServiceError> {
    state.logify.info(
        "Fetching product",
        json!({ "requestId": ctx.request_id(), "productId": id }),
    );

    let product = state.products.get(&id).ok_or_else(|| {
        state.logify.warn(
            "Product not found",
            json!({ "requestId": ctx.request_id(), "productId": id }),
        );
        not_found()
    })?;
    Ok(Json(product))
}

#[instrument(skip_all, name = "products.search")]
pub async fn search_products(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Product>> {
    state.logify.info(
        "Searching products",
        json!({
            "requestId": ctx.request_id(),
            "query": params.query,
            "category": params.category,
            "minPrice": params.min_price,
            "maxPrice": params.max_price,
        }),
    );

    let results = state.products.filter(|product| params.matches(product));

    state.logify.info(
        "Search results",
        json!({ "requestId": ctx.request_id(), "resultCount": results.len() }),
    );
    Json(results)
}

#[instrument(skip_all, name = "products.create")]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Json(request): Json<ProductRequest>,
) -> Result<(StatusCode, Json<Product>), ServiceError> {
    state.logify.info(
        "Creating new product",
        json!({
            "requestId": ctx.request_id(),
            "name": request.name,
            "price": request.price,
            "stock": request.stock,
            "category": request.category,
        }),
    );

    let reject = |details: &str| {
        state.logify.warn(
            "Failed to create product",
            json!({
                "requestId": ctx.request_id(),
                "error": "Validation error",
                "details": details,
            }),
        );
        ServiceError::BadRequest(INVALID_PRODUCT_DATA.to_string())
    };

    let name = match request.name.as_deref().filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => return Err(reject("Name is required")),
    };
    let Some(price) = request.price else {
        return Err(reject("Price must be a positive number"));
    };
    if let Some(details) = request.invalid_reason() {
        return Err(reject(details));
    }
    if state.faults.reject(INVALID_PRODUCT_DATA).is_err() {
        return Err(reject("Price must be a positive number"));
    }

    let product = state.products.insert(Product {
        id: Uuid::new_v4().to_string(),
        name,
        price,
        stock: request.stock.unwrap_or(0),
        category: request
            .category
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        rating: 0.0,
        created_at: Some(Utc::now()),
        updated_at: None,
    });

    state.logify.info(
        "Product created successfully",
        json!({ "requestId": ctx.request_id(), "productId": product.id }),
    );
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip_all, name = "products.update", fields(product_id = %id))]
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Path(id): Path<String>,
    Json(request): Json<ProductRequest>,
) -> Result<Json<Product>, ServiceError> {
    state.logify.info(
        "Updating product",
        json!({ "requestId": ctx.request_id(), "productId": id, "updates": request }),
    );

    if let Some(details) = request.invalid_reason() {
        state.logify.warn(
            "Invalid product update",
            json!({ "requestId": ctx.request_id(), "productId": id, "details": details }),
        );
        return Err(ServiceError::BadRequest(INVALID_PRODUCT_DATA.to_string()));
    }

    let updated = state.products.update(&id, |product| {
        if let Some(name) = request.name.as_deref().filter(|n| !n.is_empty()) {
            product.name = name.to_string();
        }
        if let Some(price) = request.price {
            product.price = price;
        }
        if let Some(stock) = request.stock {
            product.stock = stock;
        }
        if let Some(category) = request.category.as_deref().filter(|c| !c.is_empty()) {
            product.category = category.to_string();
        }
        product.updated_at = Some(Utc::now());
    });

    let Some(product) = updated else {
        state.logify.warn(
            "Product not found for update",
            json!({ "requestId": ctx.request_id(), "productId": id }),
        );
        return Err(not_found());
    };

    state.logify.info(
        "Product updated successfully",
        json!({ "requestId": ctx.request_id(), "productId": id }),
    );
    Ok(Json(product))
}

#[instrument(skip_all, name = "products.delete", fields(product_id = %id))]
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Path(id): Path<String>,
) -> Result<Json<Product>, ServiceError> {
    state.logify.info(
        "Deleting product",
        json!({ "requestId": ctx.request_id(), "productId": id }),
    );

    let Some(product) = state.products.remove(&id) else {
        state.logify.warn(
            "Product not found for deletion",
            json!({ "requestId": ctx.request_id(), "productId": id }),
        );
        return Err(not_found());
    };

    state.logify.info(
        "Product deleted successfully",
        json!({ "requestId": ctx.request_id(), "productId": id }),
    );
    Ok(Json(product))
}

/// Apply a signed delta to the stock. The stock never goes below zero.
#[instrument(skip_all, name = "products.adjust_stock", fields(product_id = %id))]
pub async fn adjust_stock(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Path(id): Path<String>,
    Json(request): Json<StockUpdateRequest>,
) -> Result<Json<Product>, ServiceError> {
    state.logify.info(
        "Updating product stock",
        json!({ "requestId": ctx.request_id(), "productId": id, "quantity": request.quantity }),
    );

    let Some(quantity) = request.quantity else {
        if state.products.get(&id).is_none() {
            state.logify.warn(
                "Product not found for stock update",
                json!({ "requestId": ctx.request_id(), "productId": id }),
            );
            return Err(not_found());
        }
        return Err(ServiceError::BadRequest("quantity is required".to_string()));
    };

    let outcome = state.products.try_update(&id, |product| {
        match product.stock.checked_add(quantity) {
            Some(stock) if stock >= 0 => Ok(Product {
                stock,
                ..product.clone()
            }),
            _ => Err(product.stock),
        }
    });

    match outcome {
        None => {
            state.logify.warn(
                "Product not found for stock update",
                json!({ "requestId": ctx.request_id(), "productId": id }),
            );
            Err(not_found())
        }
        Some(Err(current_stock)) => {
            state.logify.warn(
                "Invalid stock update",
                json!({
                    "requestId": ctx.request_id(),
                    "productId": id,
                    "currentStock": current_stock,
                    "requestedChange": quantity,
                }),
            );
            Err(ServiceError::BadRequest("Insufficient stock".to_string()))
        }
        Some(Ok(product)) => {
            state.logify.info(
                "Product stock updated successfully",
                json!({ "requestId": ctx.request_id(), "productId": id, "newStock": product.stock }),
            );
            Ok(Json(product))
        }
    }
}
