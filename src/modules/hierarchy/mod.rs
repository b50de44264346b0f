pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::*;
pub use router::{init_regions_router, init_schools_router, init_sectors_router};
