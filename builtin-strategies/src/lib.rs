pub mod accept_all;
pub mod concession;
pub mod scripted;

pub use accept_all::AcceptAll;
pub use concession::Concession;
pub use scripted::Scripted;
