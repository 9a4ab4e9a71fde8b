pub mod clear;
pub mod day;
pub mod delete;
pub mod month;
pub mod new;
pub mod show;
pub mod vote;
