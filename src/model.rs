/// Module that abstracts the persistence model.
pub mod entity;
pub mod migrations;
pub mod repository;
pub mod store;
