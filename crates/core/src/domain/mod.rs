pub mod lead;
pub mod role;
