//! Interactive chat application for conversing with a local Ollama model.
//!
//! This binary provides a streaming REPL interface for chatting with models
//! served by Ollama.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! ollama-chat
//!
//! # Specify a model and temperature
//! ollama-chat --model llama3.2:3b --temperature 0.2
//!
//! # Talk to a server on another machine and resend the whole history
//! ollama-chat --host gpu-box:11434 --context full
//!
//! # Disable colors (useful for piping output)
//! ollama-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/clear` - Clear conversation history
//! - `/models` - List installed models
//! - `/switch [model]` - Switch to another model
//! - `/temp [value]` - Change the sampling temperature
//! - `/quit` - Exit the application

use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;

use ollama_chat::chat::{
    ChatArgs, ChatConfig, ChatSession, EditorPrompt, Flow, LinePrompt, ReadLine, handle_line,
    welcome_text,
};
use ollama_chat::{JsonLinesLogger, Ollama, PlainTextRenderer, Renderer};

/// Main entry point for the ollama-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("ollama-chat [OPTIONS]");
    let config = match ChatConfig::try_from(args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    };

    let mut client = match Ollama::new(config.host.clone()) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    };
    if let Some(path) = &config.log_file {
        client = client.with_logger(Arc::new(JsonLinesLogger::open(path)?));
    }

    // Flag for interrupt handling during streaming
    let interrupted = Arc::new(AtomicBool::new(false));
    let mut renderer =
        PlainTextRenderer::with_color(config.use_color).with_interrupt(interrupted.clone());

    let mut session = ChatSession::new(Arc::new(client.clone()), &config);
    if let Err(err) = session.check_connection().await {
        renderer.print_error(&format!(
            "Failed to connect to Ollama at {}: {err}\n\nMake sure Ollama is running:\n  ollama serve",
            client.base_url()
        ));
        process::exit(1);
    }

    // Set up Ctrl+C handler
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    let mut prompt = EditorPrompt::new()?;
    renderer.print_info(&welcome_text(session.model(), session.temperature()));

    loop {
        // Reset interrupt flag before each input
        interrupted.store(false, Ordering::Relaxed);

        match prompt.read_line("\n> ") {
            Ok(ReadLine::Line(line)) => {
                if !line.trim().is_empty() {
                    prompt.add_history(line.trim());
                }
                if handle_line(&mut session, &line, &mut prompt, &mut renderer).await == Flow::Quit
                {
                    println!("\nGoodbye!");
                    break;
                }
            }
            Ok(ReadLine::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                renderer.print_info("\nUse /quit to exit.");
            }
            Ok(ReadLine::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&err.to_string());
                break;
            }
        }
    }

    println!("\nChat session ended.");
    Ok(())
}
