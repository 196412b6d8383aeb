// src/handlers/mod.rs

pub mod attributes;
pub mod exam_configs;
pub mod history;
pub mod maintenance;
pub mod questions;
pub mod session;
pub mod study;
pub mod subjects;
pub mod transfer;
