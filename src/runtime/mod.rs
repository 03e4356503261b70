pub mod hooks;
pub mod requests;
