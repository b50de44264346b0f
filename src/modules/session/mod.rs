pub mod controller;
pub mod router;
pub mod service;

pub use router::init_session_router;
pub use service::SessionCache;
