mod catalog_service;
mod errors;

#[allow(unused_imports)]
pub use catalog_service::{
    BikeListing, CatalogFilter, ServiceDependencies, get_bike, list_bikes, register_bike,
    remove_bike, update_bike,
};
#[allow(unused_imports)]
pub use errors::{CatalogApplicationError, Result};
