//! Per-service event simulators.
//!
//! Each simulator picks an action, decorates it with labels drawn from
//! fixed pools, and sometimes turns it into a failure with an
//! action-specific status code and error message.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::event::{Labels, LogEvent};

const COUNTRIES: &[&str] = &["PL", "US", "DE", "FR", "UK", "JP"];
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (iPhone; CPU iPhone OS 15_0 like Mac OS X)",
    "Mozilla/5.0 (Linux; Android 12; SM-G991B)",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64)",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 12_0)",
];

/// Source of synthetic events for one service.
pub trait ServiceSimulator: Send {
    fn service(&self) -> &'static str;

    fn next_event(&mut self, rng: &mut dyn RngCore) -> LogEvent;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SimulatedService {
    User,
    Order,
    Product,
    Payment,
}

impl SimulatedService {
    pub const ALL: [SimulatedService; 4] = [
        SimulatedService::User,
        SimulatedService::Order,
        SimulatedService::Product,
        SimulatedService::Payment,
    ];

    pub fn simulator(self) -> Box<dyn ServiceSimulator> {
        match self {
            SimulatedService::User => Box::new(UserSimulator::default()),
            SimulatedService::Order => Box::new(OrderSimulator),
            SimulatedService::Product => Box::new(ProductSimulator),
            SimulatedService::Payment => Box::new(PaymentSimulator),
        }
    }
}

fn pick(rng: &mut dyn RngCore, pool: &[&'static str]) -> &'static str {
    pool.choose(rng).copied().unwrap_or_default()
}

fn chance(rng: &mut dyn RngCore, probability: f64) -> bool {
    rng.gen_bool(probability)
}

/// One of a stable set of 1000 ids, e.g. `order_10042`.
fn known_id(rng: &mut dyn RngCore, prefix: &str, base: u32) -> String {
    format!("{prefix}_{}", base + rng.gen_range(0..1000))
}

/// A throwaway id from a much larger space.
fn random_id(rng: &mut dyn RngCore, prefix: &str) -> String {
    format!("{prefix}_{}", rng.gen_range(0..1_000_000))
}

fn duration_ms(rng: &mut dyn RngCore) -> u64 {
    rng.gen_range(200..1000)
}

fn set(labels: &mut Labels, key: &str, value: impl Into<String>) {
    labels.insert(key.to_string(), value.into());
}

/// Turns the event into a failure.
fn fail(labels: &mut Labels, status: &mut u16, code: u16, error: &str) {
    *status = code;
    set(labels, "error", error);
}

// ----------------------------------------------------------------------------
// Users
// ----------------------------------------------------------------------------

const USER_ACTIONS: &[&str] = &[
    "login",
    "logout",
    "register",
    "profile_update",
    "password_reset",
    "account_delete",
];

/// Remembers who logged in so that `account_delete` removes a real session.
#[derive(Debug, Default)]
pub struct UserSimulator {
    sessions: Vec<String>,
}

impl UserSimulator {
    pub fn sessions(&self) -> &[String] {
        &self.sessions
    }

    pub fn event_for(&mut self, action: &str, rng: &mut dyn RngCore) -> LogEvent {
        let mut status = 200;
        let mut labels = Labels::new();
        set(&mut labels, "action", action);
        set(&mut labels, "device", pick(rng, &["iOS", "Android", "Web", "Desktop"]));
        set(&mut labels, "country", pick(rng, COUNTRIES));
        set(&mut labels, "user_type", pick(rng, &["guest", "free", "premium", "admin"]));
        set(&mut labels, "user_agent", pick(rng, USER_AGENTS));

        match action {
            "login" => {
                let user_id = known_id(rng, "user", 10_000);
                if !self.sessions.contains(&user_id) {
                    self.sessions.push(user_id.clone());
                }
                set(&mut labels, "user_id", user_id);
                if chance(rng, 0.15) {
                    fail(&mut labels, &mut status, 401, "Invalid credentials");
                }
            }
            "register" if chance(rng, 0.10) => {
                fail(&mut labels, &mut status, 409, "Email already exists");
            }
            "password_reset" if chance(rng, 0.20) => {
                fail(&mut labels, &mut status, 400, "Password too weak");
            }
            "account_delete" if !self.sessions.is_empty() => {
                let index = rng.gen_range(0..self.sessions.len());
                let user_id = self.sessions.swap_remove(index);
                set(&mut labels, "user_id", user_id);
            }
            _ => {}
        }

        LogEvent::new(
            self.service(),
            format!("User action: {action}"),
            labels,
            duration_ms(rng),
            status,
        )
    }
}

impl ServiceSimulator for UserSimulator {
    fn service(&self) -> &'static str {
        "user-service"
    }

    fn next_event(&mut self, rng: &mut dyn RngCore) -> LogEvent {
        let action = pick(rng, USER_ACTIONS);
        self.event_for(action, rng)
    }
}

// ----------------------------------------------------------------------------
// Orders
// ----------------------------------------------------------------------------

const ORDER_ACTIONS: &[&str] = &[
    "order_placed",
    "order_updated",
    "order_shipped",
    "order_cancelled",
    "order_delivered",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct OrderSimulator;

impl OrderSimulator {
    pub fn event_for(&self, action: &str, rng: &mut dyn RngCore) -> LogEvent {
        let mut status = 200;
        let mut labels = Labels::new();
        set(&mut labels, "action", action);
        set(
            &mut labels,
            "order_status",
            pick(rng, &["pending", "shipped", "delivered", "cancelled", "returned"]),
        );
        set(&mut labels, "country", pick(rng, COUNTRIES));
        set(&mut labels, "shipment_method", pick(rng, &["standard", "express", "overnight"]));
        set(
            &mut labels,
            "shipping_address",
            pick(rng, &["123 Main St", "456 Elm St", "789 Oak Ave", "101 Pine Blvd"]),
        );
        set(&mut labels, "order_id", random_id(rng, "order"));
        set(&mut labels, "customer_id", random_id(rng, "customer"));
        set(&mut labels, "user_agent", pick(rng, USER_AGENTS));

        if ORDER_ACTIONS.contains(&action) {
            set(&mut labels, "order_id", known_id(rng, "order", 10_000));
        }
        match action {
            "order_placed" => {
                set(&mut labels, "status", "pending");
                if chance(rng, 0.10) {
                    fail(&mut labels, &mut status, 402, "Payment failed");
                }
            }
            "order_updated" if chance(rng, 0.20) => {
                fail(&mut labels, &mut status, 404, "Order not found");
            }
            "order_shipped" => {
                set(&mut labels, "status", "shipped");
                if chance(rng, 0.05) {
                    fail(&mut labels, &mut status, 400, "Item out of stock");
                }
            }
            "order_cancelled" => {
                set(&mut labels, "status", "cancelled");
                if chance(rng, 0.15) {
                    fail(&mut labels, &mut status, 404, "Invalid order ID");
                }
            }
            "order_delivered" => {
                set(&mut labels, "status", "delivered");
                if chance(rng, 0.10) {
                    fail(&mut labels, &mut status, 400, "Address not valid");
                }
            }
            _ => {}
        }

        LogEvent::new(
            self.service(),
            format!("Order action: {action}"),
            labels,
            duration_ms(rng),
            status,
        )
    }
}

impl ServiceSimulator for OrderSimulator {
    fn service(&self) -> &'static str {
        "order-service"
    }

    fn next_event(&mut self, rng: &mut dyn RngCore) -> LogEvent {
        let action = pick(rng, ORDER_ACTIONS);
        self.event_for(action, rng)
    }
}

// ----------------------------------------------------------------------------
// Products
// ----------------------------------------------------------------------------

const PRODUCT_ACTIONS: &[&str] = &[
    "product_added",
    "product_updated",
    "product_removed",
    "product_viewed",
    "product_out_of_stock",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct ProductSimulator;

impl ProductSimulator {
    pub fn event_for(&self, action: &str, rng: &mut dyn RngCore) -> LogEvent {
        let mut status = 200;
        let mut labels = Labels::new();
        set(&mut labels, "action", action);
        set(
            &mut labels,
            "category",
            pick(rng, &["electronics", "clothing", "home_appliances", "books", "toys"]),
        );
        set(&mut labels, "country", pick(rng, COUNTRIES));
        set(
            &mut labels,
            "availability",
            pick(rng, &["in_stock", "out_of_stock", "pre_order", "discontinued"]),
        );
        set(&mut labels, "product_id", random_id(rng, "product"));
        set(&mut labels, "customer_id", random_id(rng, "customer"));
        set(&mut labels, "user_agent", pick(rng, USER_AGENTS));

        if PRODUCT_ACTIONS.contains(&action) {
            set(&mut labels, "product_id", known_id(rng, "product", 10_000));
        }
        match action {
            "product_added" => set(&mut labels, "status", "in_stock"),
            "product_updated" if chance(rng, 0.10) => {
                fail(&mut labels, &mut status, 400, "Invalid product details");
            }
            "product_removed" if chance(rng, 0.20) => {
                fail(&mut labels, &mut status, 404, "Product not found");
            }
            "product_out_of_stock" => {
                set(&mut labels, "status", "out_of_stock");
                if chance(rng, 0.15) {
                    fail(&mut labels, &mut status, 500, "Insufficient stock");
                }
            }
            _ => {}
        }

        LogEvent::new(
            self.service(),
            format!("Product action: {action}"),
            labels,
            duration_ms(rng),
            status,
        )
    }
}

impl ServiceSimulator for ProductSimulator {
    fn service(&self) -> &'static str {
        "product-service"
    }

    fn next_event(&mut self, rng: &mut dyn RngCore) -> LogEvent {
        let action = pick(rng, PRODUCT_ACTIONS);
        self.event_for(action, rng)
    }
}

// ----------------------------------------------------------------------------
// Payments
// ----------------------------------------------------------------------------

const PAYMENT_ACTIONS: &[&str] = &[
    "payment_initiated",
    "payment_completed",
    "payment_failed",
    "payment_refunded",
    "payment_cancelled",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct PaymentSimulator;

impl PaymentSimulator {
    pub fn event_for(&self, action: &str, rng: &mut dyn RngCore) -> LogEvent {
        let mut status = 200;
        let mut labels = Labels::new();
        set(&mut labels, "action", action);
        set(
            &mut labels,
            "payment_method",
            pick(rng, &["credit_card", "paypal", "bank_transfer", "crypto"]),
        );
        set(&mut labels, "country", pick(rng, COUNTRIES));
        set(&mut labels, "currency", pick(rng, &["USD", "EUR", "PLN", "GBP", "JPY"]));
        set(&mut labels, "region", pick(rng, &["EU", "NA", "APAC"]));
        set(&mut labels, "transaction_id", random_id(rng, "txn"));
        set(&mut labels, "customer_id", random_id(rng, "customer"));
        set(&mut labels, "user_agent", pick(rng, USER_AGENTS));

        if action == "payment_initiated" {
            set(&mut labels, "customer_id", known_id(rng, "customer", 10_000));
        }
        if PAYMENT_ACTIONS.contains(&action) {
            set(&mut labels, "transaction_id", known_id(rng, "txn", 100_000));
        }
        match action {
            "payment_initiated" => set(&mut labels, "status", "pending"),
            "payment_completed" => {
                set(&mut labels, "status", "completed");
                if chance(rng, 0.05) {
                    fail(&mut labels, &mut status, 500, "Payment gateway timeout");
                }
            }
            "payment_failed" => {
                set(&mut labels, "status", "failed");
                if chance(rng, 0.10) {
                    fail(&mut labels, &mut status, 400, "Invalid payment method");
                } else {
                    fail(&mut labels, &mut status, 402, "Insufficient funds");
                }
            }
            "payment_refunded" => {
                set(&mut labels, "status", "refunded");
                if chance(rng, 0.20) {
                    fail(&mut labels, &mut status, 404, "Fraud detection triggered");
                }
            }
            "payment_cancelled" => {
                set(&mut labels, "status", "cancelled");
                if chance(rng, 0.15) {
                    fail(&mut labels, &mut status, 401, "Payment declined");
                }
            }
            _ => {}
        }

        LogEvent::new(
            self.service(),
            format!("Payment action: {action}"),
            labels,
            duration_ms(rng),
            status,
        )
    }
}

impl ServiceSimulator for PaymentSimulator {
    fn service(&self) -> &'static str {
        "payment-service"
    }

    fn next_event(&mut self, rng: &mut dyn RngCore) -> LogEvent {
        let action = pick(rng, PAYMENT_ACTIONS);
        self.event_for(action, rng)
    }
}
