pub mod access;
pub mod approvals;
pub mod categories;
pub mod hierarchy;
pub mod session;
pub mod submissions;
