pub mod items;
pub mod profiles;
pub mod rules;
pub mod scans;
