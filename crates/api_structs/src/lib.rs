mod status;
mod subscription;
mod user;
mod workflow;

pub mod dtos {
    pub use crate::subscription::dtos::*;
    pub use crate::user::dtos::*;
    pub use crate::workflow::dtos::*;
}

pub use crate::status::api::*;
pub use crate::subscription::api::*;
pub use crate::user::api::*;
pub use crate::workflow::api::*;
