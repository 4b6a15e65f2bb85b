mod products;

pub use products::{
    adjust_stock, create_product, delete_product, get_product, list_products, search_products,
    update_product,
};
