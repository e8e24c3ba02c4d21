pub mod capture;
pub mod config;
mod env;
pub mod llm;
pub mod ocr;
