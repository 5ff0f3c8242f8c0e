use std::env;
use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use dotenv::dotenv;
use log::error;
use reqwest::Client;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use examwise_buddy::export::Exporter;
use examwise_buddy::session::{Conversation, GREETING};

const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:8080/api/chat";

// User-visible notices, mirrored from the chat screen.
const SEND_FAILURE_NOTICE: &str =
    "Desculpe, houve um erro ao processar sua mensagem. Tente novamente em alguns instantes.";
const INVALID_REPLY: &str = "Resposta inválida do servidor";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let relay_url = env::var("RELAY_URL").unwrap_or_else(|_| DEFAULT_RELAY_URL.to_string());
    let client = Client::new();
    let mut conversation = Conversation::new();
    let mut exporter = Exporter::new();

    println!("assistente: {GREETING}");
    println!("(/exportar salva a conversa em PDF, /sair encerra)");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/sair" => break,
            "/exportar" => {
                let cancel = CancellationToken::new();
                match exporter
                    .export(&conversation, Path::new("."), &cancel)
                    .await
                {
                    Ok(path) => println!("Conversa exportada para {}", path.display()),
                    Err(e) => println!("{e}"),
                }
            }
            message => {
                // The user's message stays in the transcript even when the
                // send fails; a failure only skips the reply.
                conversation.push_user(message);
                match send_message(&client, &relay_url, message).await {
                    Ok(reply) => {
                        println!("assistente: {reply}");
                        conversation.push_assistant(reply);
                    }
                    Err(e) => {
                        error!("Send failed: {e}");
                        println!("{SEND_FAILURE_NOTICE}");
                    }
                }
            }
        }
    }

    Ok(())
}

/// Posts one message to the relay and returns the assistant's reply.
async fn send_message(client: &Client, url: &str, message: &str) -> Result<String> {
    let body: Value = client
        .post(url)
        .json(&json!({ "message": message }))
        .send()
        .await?
        .json()
        .await?;

    if let Some(reply) = body.get("response").and_then(Value::as_str) {
        Ok(reply.to_string())
    } else if let Some(error) = body.get("error").and_then(Value::as_str) {
        Err(anyhow::anyhow!("{error}"))
    } else {
        Err(anyhow::anyhow!(INVALID_REPLY))
    }
}
