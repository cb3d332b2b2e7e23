//! Access/refresh token models and the JWT payload inspector.

pub mod jwt;
pub mod token;

pub use jwt::*;
pub use token::{pair::*, secret::*};
