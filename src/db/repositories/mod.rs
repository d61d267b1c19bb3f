pub mod collections;
pub mod logged_items;
pub mod prices;
pub mod profiles;
