pub mod chat;
pub mod doctor;
pub mod enhance;
pub mod onboard;
