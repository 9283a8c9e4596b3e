mod domain_router;
mod location_router;

pub use domain_router::{DomainRouter, LookupMode};
pub use location_router::LocationRouter;
