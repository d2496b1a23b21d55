pub mod db;
pub mod error;
pub mod mealdb;
pub mod models;
pub mod repository;
pub mod screen;
