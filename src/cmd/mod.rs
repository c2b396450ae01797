pub mod holidays;
pub mod init;
pub mod month;
pub mod root;
pub mod validate;
