pub mod analyzer;
pub mod config;
pub mod crawler;
pub mod data_models;
pub mod error;
pub mod extractor;
pub mod frequency;
pub mod lexicon;
pub mod morphology;
pub mod notice;
pub mod pipeline;
pub mod search;
pub mod style;
