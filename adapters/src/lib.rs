pub mod finnhub;
pub mod webhook;
