// src/models/mod.rs

pub mod attributes;
pub mod exam_config;
pub mod exam_result;
pub mod question;
pub mod subject;
