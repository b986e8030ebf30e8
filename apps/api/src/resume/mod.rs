//! Resume extraction: PDF upload in, structured resume JSON out.

pub mod extract;
pub mod generate;
pub mod handlers;
pub mod prompts;
