mod ingredients;
mod lists;
mod recipes;
mod shopping;
mod subscriptions;
mod tags;
mod users;

pub use ingredients::*;
pub use lists::*;
pub use recipes::*;
pub use shopping::*;
pub use subscriptions::*;
pub use tags::*;
pub use users::*;
