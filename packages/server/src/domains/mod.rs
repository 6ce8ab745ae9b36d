// Business domains
pub mod link_check;
