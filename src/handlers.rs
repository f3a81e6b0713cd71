pub mod auth;
pub mod businesses;
pub mod financials;
pub mod genai;
pub mod health;
pub mod investments;
pub mod legals;
pub mod products;
pub mod users;
