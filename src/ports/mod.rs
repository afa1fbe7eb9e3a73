#[allow(unused_imports)]
pub mod bike_store;
#[allow(unused_imports)]
pub mod booking_store;
#[allow(unused_imports)]
pub mod owner_directory;

#[allow(unused_imports)]
pub use bike_store::*;
#[allow(unused_imports)]
pub use booking_store::*;
#[allow(unused_imports)]
pub use owner_directory::*;
