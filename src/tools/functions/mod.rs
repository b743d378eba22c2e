//! Tool function implementations organized by functionality

pub mod common;
pub mod inspect;
pub mod project;
pub mod release;
pub mod repository;
pub mod search;
pub mod wiki;
