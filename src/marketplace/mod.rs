//! Marketplace domain: product registration flow and the product catalog

pub mod catalog;
pub mod registration;

pub use catalog::{Catalog, Product, SAMPLE_PRODUCTS};
pub use registration::{RegisteredProduct, RegistrationStep, Transition};
