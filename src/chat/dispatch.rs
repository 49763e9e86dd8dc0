//! Routes each input line to a chat turn or a command action.

use crate::chat::commands::{ChatCommand, Input, classify, help_text};
use crate::chat::prompt::{LinePrompt, ReadLine};
use crate::chat::session::ChatSession;
use crate::observability::{CHAT_COMMANDS, CHAT_VALIDATION_ERRORS};
use crate::{Error, Renderer, Temperature};

/// What the input loop should do after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Prompt for the next line.
    Continue,
    /// Leave the loop.
    Quit,
}

/// Handles one line of user input.
///
/// Blank lines do nothing.  Chat lines run one streaming turn.  Commands
/// mutate the session; every failure becomes a notice on `renderer` and
/// leaves the affected state unchanged.  Only `/quit` returns [`Flow::Quit`].
///
/// `prompt` is used for the follow-up questions of `/switch` and `/temp`
/// when they are given without an argument.
pub async fn handle_line<P>(
    session: &mut ChatSession,
    line: &str,
    prompt: &mut P,
    renderer: &mut dyn Renderer,
) -> Flow
where
    P: LinePrompt + ?Sized,
{
    match classify(line) {
        Input::Empty => Flow::Continue,
        Input::Chat(text) => {
            let outcome = session.send_streaming(&text, renderer).await;
            if outcome.error.as_ref().is_some_and(Error::is_connectivity) {
                renderer.print_info(OLLAMA_NOT_RUNNING);
            }
            Flow::Continue
        }
        Input::Command(command) => {
            CHAT_COMMANDS.click();
            run_command(session, command, prompt, renderer).await
        }
    }
}

const OLLAMA_NOT_RUNNING: &str = "Make sure Ollama is running:\n  ollama serve";
const NO_MODELS_FOUND: &str = "No models found.\n\nInstall a model using:\n  ollama pull llama3.2:3b";

async fn run_command<P>(
    session: &mut ChatSession,
    command: ChatCommand,
    prompt: &mut P,
    renderer: &mut dyn Renderer,
) -> Flow
where
    P: LinePrompt + ?Sized,
{
    match command {
        ChatCommand::Help => renderer.print_info(help_text()),
        ChatCommand::Clear => {
            session.clear();
            renderer.render_transcript(session.conversation().snapshot());
            renderer.print_info("Chat history cleared.");
        }
        ChatCommand::Models => show_models(session, renderer).await,
        ChatCommand::Switch(choice) => switch_model(session, choice, prompt, renderer).await,
        ChatCommand::Temperature(value) => change_temperature(session, value, prompt, renderer),
        ChatCommand::Quit => return Flow::Quit,
        ChatCommand::Unknown(name) => renderer.print_info(&format!(
            "Unknown command: /{name}\nType /help for available commands."
        )),
    }
    Flow::Continue
}

async fn show_models(session: &mut ChatSession, renderer: &mut dyn Renderer) {
    if let Err(err) = session.refresh_catalog().await {
        renderer.print_error(&format!("Could not fetch models: {err}"));
        if err.is_connectivity() {
            renderer.print_info(OLLAMA_NOT_RUNNING);
        }
        return;
    }
    let models = session.catalog();
    if models.is_empty() {
        renderer.print_info(NO_MODELS_FOUND);
        return;
    }
    let mut text = String::from("Available models:\n");
    for model in models {
        let marker = if model.as_str() == session.model() {
            " (current)"
        } else {
            ""
        };
        text.push_str(&format!("  • {model}{marker}\n"));
    }
    text.push_str(&format!("\nCurrent model: {}", session.model()));
    renderer.print_info(&text);
}

async fn switch_model<P>(
    session: &mut ChatSession,
    choice: Option<String>,
    prompt: &mut P,
    renderer: &mut dyn Renderer,
) where
    P: LinePrompt + ?Sized,
{
    if !refresh_for_switch(session, renderer).await {
        return;
    }

    let mut listing = String::from("Available models:\n");
    for (i, model) in session.catalog().iter().enumerate() {
        listing.push_str(&format!("  {}. {model}\n", i + 1));
    }
    renderer.print_info(listing.trim_end());

    let choice =
        choice.or_else(|| ask(&mut *prompt, &mut *renderer, "Enter model number or name: "));
    let Some(choice) = choice else {
        renderer.print_info("Model switch cancelled.");
        return;
    };
    match session.switch_model(&choice) {
        Ok(model) => renderer.print_info(&format!("Switched to model: {model}")),
        Err(err) => {
            CHAT_VALIDATION_ERRORS.click();
            renderer.print_error(&err.to_string());
        }
    }
}

/// Refreshes the catalog before a model switch.
///
/// Falls back to the last fetched catalog when the refresh fails.  Returns
/// false, after printing why, when there is nothing to choose from.
pub(crate) async fn refresh_for_switch(
    session: &mut ChatSession,
    renderer: &mut dyn Renderer,
) -> bool {
    if let Err(err) = session.refresh_catalog().await {
        if session.catalog().is_empty() {
            renderer.print_error(&format!("Could not fetch models: {err}"));
            if err.is_connectivity() {
                renderer.print_info(OLLAMA_NOT_RUNNING);
            }
            return false;
        }
        renderer.print_info("Could not refresh models; using the last fetched list.");
    }
    if session.catalog().is_empty() {
        renderer.print_info("No models available. Install a model first.");
        return false;
    }
    true
}

fn change_temperature<P>(
    session: &mut ChatSession,
    value: Option<String>,
    prompt: &mut P,
    renderer: &mut dyn Renderer,
) where
    P: LinePrompt + ?Sized,
{
    let value = value.or_else(|| {
        renderer.print_info(&format!("Current temperature: {}", session.temperature()));
        ask(&mut *prompt, &mut *renderer, "Enter new temperature (0.0-1.0): ")
    });
    let Some(value) = value else {
        renderer.print_info("Temperature change cancelled.");
        return;
    };
    match value.parse::<Temperature>() {
        Ok(temperature) => {
            session.set_temperature(temperature);
            renderer.print_info(&format!("Temperature set to: {temperature}"));
        }
        Err(err) => {
            CHAT_VALIDATION_ERRORS.click();
            renderer.print_error(&err.to_string());
        }
    }
}

/// Reads one follow-up line; `None` when cancelled or blank.
fn ask<P>(prompt: &mut P, renderer: &mut dyn Renderer, question: &str) -> Option<String>
where
    P: LinePrompt + ?Sized,
{
    match prompt.read_line(question) {
        Ok(ReadLine::Line(line)) => {
            let line = line.trim();
            (!line.is_empty()).then(|| line.to_string())
        }
        Ok(ReadLine::Interrupted | ReadLine::Eof) => None,
        Err(err) => {
            renderer.print_error(&err.to_string());
            None
        }
    }
}
