use anyhow::{Context, Result};
use clap::Parser;
use std::io;

use lmquery::api::DEFAULT_TEMPERATURE;

#[derive(Debug, Parser)]
#[clap(
    name = "lmquery",
    version = "0.1.0",
    about = "Query LM Studio for text completions. Reads from STDIN if PROMPT is omitted or '-'.",
    after_help = "Examples:\n  lmquery \"The capital of France is\"\n  lmquery \"Write a haiku about programming\" --temperature 0.9 --max-tokens 200\n\nServer settings come from LM_STUDIO_HOST, LM_STUDIO_PORT, LM_STUDIO_MODEL\nand the optional LM_STUDIO_MAX_TOKENS, read from the environment or a .env file."
)]
pub struct Config {
    #[clap(value_name = "PROMPT", help = "The text prompt to complete")]
    pub prompt: Option<String>,

    #[clap(
        long,
        value_name = "F64",
        help = "Sampling temperature",
        default_value_t = DEFAULT_TEMPERATURE
    )]
    pub temperature: f64,

    #[clap(
        short('n'),
        long,
        value_name = "INT",
        help = "Maximum tokens to generate (default: LM_STUDIO_MAX_TOKENS or 100)"
    )]
    pub max_tokens: Option<u32>,
}

impl Config {
    pub fn from_cli() -> Self {
        Config::parse()
    }

    /// The prompt from the command line, or all of STDIN when none was given.
    pub fn read_prompt(&self) -> Result<String> {
        match self.prompt.as_deref() {
            Some("-") | None => {
                io::read_to_string(io::stdin()).context("failed to read prompt from STDIN")
            }
            Some(p) => Ok(p.to_string()),
        }
    }
}
