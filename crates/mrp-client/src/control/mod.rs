//! Resolvers and controllers built on top of a [`Transport`](crate::Transport)
//!
//! Handles: name resolution, image upload, preseed upload, machine state

pub mod resolver;
pub mod image;
pub mod preseed;
#[cfg(test)]
mod preseed_test;
pub mod state;
#[cfg(test)]
mod state_test;
