pub mod connection;
pub mod helpers;
mod migrations;
pub mod models;
mod repositories;

pub use connection::Database;
pub use models::{
    Collection, CollectionStatus, LoggedItem, LoggedItemInput, PriceTable, Profile, ProfileInput,
    QuantityUnit, RecyclablePrice, RecyclableType,
};
pub use repositories::collections::NewCollection;
