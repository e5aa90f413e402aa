mod config;

use std::process::exit;

use lmquery::logging::init_logging;
use lmquery::report::render_completion;
use lmquery::{ApiClient, Error, Settings};

use config::Config;

fn fail(e: &Error) -> ! {
    eprintln!("Error: {}", e);
    if matches!(e, Error::MissingConfig(_)) {
        eprintln!("Please copy .env.example to .env and configure it.");
    }
    exit(1);
}

#[tokio::main]
async fn main() {
    init_logging();
    let config = Config::from_cli();

    let settings = Settings::from_env().unwrap_or_else(|e| fail(&e));
    let max_tokens = settings.resolve_max_tokens(config.max_tokens);

    let prompt = match config.read_prompt() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit(1);
        }
    };

    println!("Querying LM Studio with model: {}", settings.model);
    println!("Prompt: {}\n", prompt);

    let api_client = ApiClient::new(settings).unwrap_or_else(|e| fail(&e));
    match api_client
        .complete(&prompt, config.temperature, max_tokens)
        .await
    {
        Ok(completion) => print!("{}", render_completion(&completion, max_tokens)),
        Err(e) => fail(&e),
    }
}
