pub mod book;
pub mod edit;
pub mod scan;
pub mod transfer;
