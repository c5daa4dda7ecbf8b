pub mod aggregate;
pub mod angles;
pub mod aspectarian;
pub mod aspectarian_errors;
pub mod aspects;
pub mod cache;
pub mod constants;
pub mod orb_policy;
pub mod paginate;
pub mod position;
pub mod ranking;
pub mod scan;
