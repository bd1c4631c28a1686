// #![deny(unused_crate_dependencies)]

mod client_management;
mod data_provider;
mod gameplay;
mod generic;

pub use client_management::*;
pub use data_provider::*;
pub use gameplay::*;
pub use generic::*;
