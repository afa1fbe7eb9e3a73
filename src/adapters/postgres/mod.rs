pub mod bike_store;
pub mod booking_store;

#[allow(unused_imports)]
pub use bike_store::BikeStore;
#[allow(unused_imports)]
pub use booking_store::BookingStore;
