mod booking_service;
mod errors;

#[allow(unused_imports)]
pub use booking_service::{
    ServiceDependencies, create_booking, get_booking, list_customer_bookings, list_owner_bookings,
    transition_booking_status,
};
#[allow(unused_imports)]
pub use errors::{BookingApplicationError, Result};
