mod payments;

pub use payments::{cancel_payment, create_payment, get_payment, list_order_payments};
