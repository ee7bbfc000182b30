pub mod recommend;
pub mod reference;
pub mod stats;
