pub mod collection;
pub mod logged_item;
pub mod price;
pub mod profile;

pub use collection::{Collection, CollectionStatus};
pub use logged_item::{LoggedItem, LoggedItemInput, QuantityUnit, RecyclableType};
pub use price::{PriceTable, RecyclablePrice};
pub use profile::{Profile, ProfileInput};
