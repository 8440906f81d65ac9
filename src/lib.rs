pub mod agentic;
pub mod analyzer;
pub mod cli;
pub mod commands;
pub mod config;
pub mod generator;
pub mod hierarchy;
pub mod logging;
pub mod ontology;
pub mod oracle;
pub mod taxonomy;
pub mod validator;
