pub mod product;

pub use product::{default_catalogue, Product};
