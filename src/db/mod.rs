pub mod addresses;
pub mod cart;
pub mod checkout;
pub mod connection;
pub mod favorites;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod history;
pub mod models;
pub mod products;
pub mod redis;
pub mod reviews;
pub mod sku;

pub use connection::DbClient;
