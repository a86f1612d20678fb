use anyhow::Result;
use parley_dispatch::{CatalogError, DispatchRequest, DispatchResult};
use parley_persist::AccessTier;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::state::AppState;

const PROBE_PROMPT: &str = "Hello! Please respond with a short greeting.";

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Models,
    Change(String),
    Suggest(String),
    Clear,
    Stats,
    Image { path: String, text: String },
    Probe { model: String, prompt: String },
    Help,
    Quit,
    Ask(String),
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        if !line.starts_with('/') {
            return Command::Ask(line.to_string());
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        match name {
            "/models" => Command::Models,
            "/change" if !rest.is_empty() => Command::Change(rest.to_string()),
            "/suggest" => Command::Suggest(rest.to_string()),
            "/clear" => Command::Clear,
            "/stats" => Command::Stats,
            "/image" => match rest.split_once(char::is_whitespace) {
                Some((path, text)) => Command::Image {
                    path: path.to_string(),
                    text: text.trim().to_string(),
                },
                None => Command::Unknown(line.to_string()),
            },
            "/probe" if !rest.is_empty() => {
                let (model, prompt) = match rest.split_once('|') {
                    Some((model, prompt)) => (model.trim(), prompt.trim()),
                    None => (rest, PROBE_PROMPT),
                };
                Command::Probe {
                    model: model.to_string(),
                    prompt: prompt.to_string(),
                }
            }
            "/help" => Command::Help,
            "/quit" | "/exit" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

/// Line-oriented stand-in for a chat front end
pub struct Console {
    state: AppState,
    user_id: String,
    username: String,
}

impl Console {
    pub fn new(state: AppState) -> Self {
        let user_id = state.config.console.user_id.clone();
        let username = state.config.console.username.clone();
        Self {
            state,
            user_id,
            username,
        }
    }

    pub fn as_user(mut self, user_id: impl Into<String>, username: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self.username = username.into();
        self
    }

    /// Read commands until EOF or `/quit`, writing each reply block
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        writer.write_all(b"> ").await?;
        writer.flush().await?;

        while let Some(line) = lines.next_line().await? {
            let command = Command::parse(&line);
            if command == Command::Quit {
                break;
            }

            for block in self.execute(command).await {
                writer.write_all(block.as_bytes()).await?;
                writer.write_all(b"\n\n").await?;
            }
            writer.write_all(b"> ").await?;
            writer.flush().await?;
        }

        Ok(())
    }

    /// Reply blocks for one command
    pub async fn execute(&self, command: Command) -> Vec<String> {
        match command {
            Command::Ask(text) => self.ask(DispatchRequest::new(&self.user_id, text)).await,
            Command::Image { path, text } => match tokio::fs::read(&path).await {
                Ok(image) => {
                    self.ask(DispatchRequest::new(&self.user_id, text).with_image(image))
                        .await
                }
                Err(e) => vec![format!("❌ Could not read image '{}': {}", path, e)],
            },
            Command::Models => vec![self.models().await],
            Command::Change(model) => vec![self.change(&model).await],
            Command::Suggest(fragment) => vec![self.suggest(&fragment).await],
            Command::Clear => vec![match self.state.coordinator.clear_history(&self.user_id).await {
                Ok(removed) => format!(
                    "🧹 Cleared {} messages from your conversation history.",
                    removed
                ),
                Err(e) => {
                    tracing::error!(user_id = %self.user_id, "Failed to clear history: {}", e);
                    "❌ An error occurred while clearing your history.".to_string()
                }
            }],
            Command::Stats => vec![match self.state.coordinator.history_stats(&self.user_id).await {
                Ok(stats) => format!(
                    "📊 {} messages in memory ({} from you, {} from the model).",
                    stats.total, stats.user_count, stats.assistant_count
                ),
                Err(e) => {
                    tracing::error!(user_id = %self.user_id, "Failed to read history stats: {}", e);
                    "❌ An error occurred while reading your history.".to_string()
                }
            }],
            Command::Probe { model, prompt } => {
                match self.state.coordinator.probe(&model, &prompt).await {
                    DispatchResult::Success { text, .. } => {
                        vec![format!("✅ **{}** responded:\n{}", model, text)]
                    }
                    other => vec![other.user_message()],
                }
            }
            Command::Help => vec![HELP.to_string()],
            Command::Empty | Command::Quit => Vec::new(),
            Command::Unknown(line) => vec![format!("❓ Unknown command: {}. Try /help.", line)],
        }
    }

    async fn ask(&self, request: DispatchRequest) -> Vec<String> {
        let request = request.with_requester(&self.username);
        let result = self.state.coordinator.dispatch(request).await;
        let answered = result.is_success();
        let mut blocks = result.into_chunks();

        if answered {
            if let Some(first) = blocks.first_mut() {
                *first = format!("🤖 **AI Response:**\n{}", first);
            }
        }
        blocks
    }

    async fn models(&self) -> String {
        let catalog = self.state.coordinator.catalog();

        let models = match catalog.available().await {
            Ok(models) => models,
            Err(e) => {
                tracing::error!("Failed to list models: {}", e);
                return "❌ An error occurred while loading models.".to_string();
            }
        };
        if models.is_empty() {
            return "❌ No active models available. Please add models to the configuration."
                .to_string();
        }

        let current = match catalog.current_selection(&self.user_id).await {
            Ok(Some(selection)) => selection.model_name,
            _ => "None".to_string(),
        };

        let list: Vec<String> = models
            .iter()
            .map(|m| format!("• {}{}", m.name, team_suffix(m.access_tier)))
            .collect();

        format!(
            "🤖 Available AI Models\n**Your current model:** {}\n\n**Available models:**\n{}\n\nUse /change to select a different model",
            current,
            list.join("\n")
        )
    }

    async fn change(&self, model: &str) -> String {
        match self.state.coordinator.catalog().select(&self.user_id, model).await {
            Ok(profile) => format!(
                "✅ Your preferred model has been changed to: **{}**{}",
                profile.name,
                team_suffix(profile.access_tier)
            ),
            Err(CatalogError::NotFound { name, available }) => {
                let names = if available.is_empty() {
                    "None".to_string()
                } else {
                    available.join(", ")
                };
                format!(
                    "❌ Model '{}' not found or not active.\n\nAvailable models: {}",
                    name, names
                )
            }
            Err(e) => {
                tracing::error!(user_id = %self.user_id, "Failed to change model: {}", e);
                "❌ An error occurred while changing your model.".to_string()
            }
        }
    }

    async fn suggest(&self, fragment: &str) -> String {
        match self.state.coordinator.catalog().suggest(fragment).await {
            Ok(names) if names.is_empty() => format!("No models match '{}'.", fragment),
            Ok(names) => names.join("\n"),
            Err(e) => {
                tracing::error!("Failed to suggest models: {}", e);
                "❌ An error occurred while loading models.".to_string()
            }
        }
    }
}

fn team_suffix(tier: AccessTier) -> &'static str {
    match tier {
        AccessTier::Public => "",
        AccessTier::Restricted => " (Team Only)",
    }
}

const HELP: &str = "Commands:
  /models                    list available models and your selection
  /change <model>            select a model
  /suggest <fragment>        find model names
  /clear                     forget your conversation history
  /stats                     show conversation history counts
  /image <path> <text>       ask about an image
  /probe <model> [| prompt]  send a one-off test prompt to a model
  /quit                      exit
Anything else is sent to your selected model.";
