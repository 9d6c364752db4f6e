// mysite/src/models/mod.rs

//! Contains data structures representing database entities.

pub mod article;
pub mod group;
pub mod order;
pub mod product;
pub mod profile;
pub mod user;

pub use article::{Article, Author, Category, Tag};
pub use group::Group;
pub use order::Order;
pub use product::Product;
pub use profile::Profile;
pub use user::User;
