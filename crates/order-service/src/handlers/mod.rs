mod orders;

pub use orders::{create_order, get_order, list_user_orders, update_order_status};
