pub mod posting;
pub mod search;
