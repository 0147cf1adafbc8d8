pub mod booking;
pub mod catalog;
pub mod contact;
pub mod newsletter;
pub mod user;
