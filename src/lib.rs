mod database {
    pub mod actions;
    pub mod connection;
    pub mod draft;
    pub mod error;
    pub mod form;
    pub mod schema;
}
mod authentication {
    pub mod middleware;
    pub mod permissions;
    pub mod session;
}
mod shopping_list {
    pub mod aggregate;
    pub mod document;
    pub mod pdf;
    pub mod text;
}
mod constants;
mod settings;

pub use authentication::*;
pub use constants::*;
pub use database::*;
pub use settings::*;
pub use shopping_list::*;
