use std::fs::{self, OpenOptions};
use std::io::IsTerminal;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{theme::ColorfulTheme, Select};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gitaguide::{
    ChatClient, Conversation, FilePreferences, Language, MemoryPreferences, Mood,
    PreferenceStore, Preferences, Role, Settings, Theme,
};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;

#[derive(Parser)]
#[command(name = "gitaguide")]
#[command(version, about = "Chat with a Bhagavad Gita guide from your terminal")]
struct Cli {
    /// Backend base URL (overrides GITAGUIDE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat screen (default)
    Chat {
        /// Don't persist theme or language changes
        #[arg(long)]
        ephemeral: bool,
    },
    /// Ask a single question and print the reply
    Ask {
        /// Your question
        question: String,
        /// How you are feeling, e.g. "anxious" or "seeking-purpose"
        #[arg(short, long, default_value = "Neutral")]
        mood: String,
        /// Reply language code (defaults to your saved preference)
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Show or change saved preferences
    Prefs {
        /// light or dark
        #[arg(long)]
        theme: Option<String>,
        /// en or hi
        #[arg(long)]
        language: Option<String>,
    },
    /// Check that the backend is reachable
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut settings = Settings::from_env();
    if let Some(url) = cli.api_url {
        settings.api_url = url;
    }

    init_logging(&settings)?;
    info!(api_url = %settings.api_url, "starting gitaguide v{}", env!("CARGO_PKG_VERSION"));

    match cli.command.unwrap_or(Commands::Chat { ephemeral: false }) {
        Commands::Chat { ephemeral } => run_chat(&settings, ephemeral).await?,
        Commands::Ask { question, mood, language } => {
            ask_once(&settings, &question, &mood, language.as_deref()).await?
        }
        Commands::Prefs { theme, language } => {
            edit_preferences(theme.as_deref(), language.as_deref())?
        }
        Commands::Health => check_health(&settings).await?,
    }

    Ok(())
}

/// Log to a file; the terminal belongs to the UI
fn init_logging(settings: &Settings) -> Result<()> {
    let Some(path) = &settings.log_file else {
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("could not open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

async fn run_chat(settings: &Settings, ephemeral: bool) -> Result<()> {
    let store: Box<dyn PreferenceStore> = if ephemeral {
        Box::new(MemoryPreferences::new())
    } else {
        Box::new(FilePreferences::open_default()?)
    };
    let gateway = Arc::new(ChatClient::new(&settings.api_url));
    let mut app = App::new(gateway, store);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::Events::new(Duration::from_millis(300));

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event).await?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    info!(messages = app.conversation.len(), "chat closed");
    result
}

async fn ask_once(
    settings: &Settings,
    question: &str,
    mood: &str,
    language: Option<&str>,
) -> Result<()> {
    let mood = Mood::from_str(mood).ok_or_else(|| {
        let names: Vec<&str> = Mood::all().iter().map(|m| m.as_str()).collect();
        anyhow!("Unknown mood '{}'. Choose one of: {}", mood, names.join(", "))
    })?;
    let language = match language {
        Some(code) => parse_language(code)?,
        None => {
            let store = FilePreferences::open_default()?;
            Preferences::load(&store).language
        }
    };

    let client = ChatClient::new(&settings.api_url);
    let mut conversation = Conversation::with_language(language);
    conversation.set_mood(mood);

    println!("🙏 Asking as {} ({})...\n", mood.as_str().magenta(), language.display_name());

    if conversation.exchange(&client, question).await.is_none() {
        return Err(anyhow!("Question is empty"));
    }

    for message in conversation.messages().iter().filter(|m| m.role() == Role::Assistant) {
        println!("{}", "GitaGuide:".bold().yellow());
        println!("{}", message.content);

        if let Some(verses) = &message.verses {
            println!("\n{}", "Sacred Verses:".bold().blue());
            for verse in verses {
                println!("• {}", verse.reference().bold());
                if let Some(shloka) = &verse.shloka {
                    println!("  {}", shloka.italic());
                }
                if let Some(transliteration) = &verse.transliteration {
                    println!("  {}", transliteration.dimmed());
                }
                let text = match (language, &verse.hindi_translation) {
                    (Language::Hindi, Some(hindi)) => hindi,
                    _ => &verse.text,
                };
                println!("  \"{}\"", text);
            }
        }
    }

    Ok(())
}

fn parse_language(code: &str) -> Result<Language> {
    Language::from_str(code).ok_or_else(|| anyhow!("Unknown language '{}'. Use en or hi", code))
}

fn parse_theme(name: &str) -> Result<Theme> {
    Theme::from_str(name).ok_or_else(|| anyhow!("Unknown theme '{}'. Use light or dark", name))
}

fn edit_preferences(theme: Option<&str>, language: Option<&str>) -> Result<()> {
    let mut store = FilePreferences::open_default()?;
    let mut prefs = Preferences::load(&store);

    if theme.is_none() && language.is_none() && std::io::stdin().is_terminal() {
        let themes = Theme::all();
        let theme_names: Vec<&str> = themes.iter().map(|t| t.as_str()).collect();
        let theme_idx = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Theme")
            .items(&theme_names)
            .default(themes.iter().position(|t| *t == prefs.theme).unwrap_or(0))
            .interact()?;

        let languages = Language::all();
        let language_names: Vec<&str> = languages.iter().map(|l| l.display_name()).collect();
        let language_idx = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Language")
            .items(&language_names)
            .default(languages.iter().position(|l| *l == prefs.language).unwrap_or(0))
            .interact()?;

        prefs.set_theme(&mut store, themes[theme_idx])?;
        prefs.set_language(&mut store, languages[language_idx])?;
    } else {
        if let Some(name) = theme {
            prefs.set_theme(&mut store, parse_theme(name)?)?;
        }
        if let Some(code) = language {
            prefs.set_language(&mut store, parse_language(code)?)?;
        }
    }

    println!("\n{}", "⚙️  Preferences".bold().blue());
    println!("{}", "=".repeat(30).dimmed());
    println!("  Theme:    {}", prefs.theme.as_str().green());
    println!(
        "  Language: {} ({})",
        prefs.language.display_name().green(),
        prefs.language.as_str()
    );
    println!("  {}", store.path().display().to_string().dimmed());

    Ok(())
}

async fn check_health(settings: &Settings) -> Result<()> {
    let client = ChatClient::new(&settings.api_url);

    match client.health().await {
        Ok(status) => {
            println!("{} {} ({})", "✅".green(), client.base_url().bold(), status);
        }
        Err(e) => {
            println!("{}: {}", "Backend unreachable".red(), e);
            println!("Set {} or pass {}", "GITAGUIDE_API_URL".bold(), "--api-url".bold());
            return Err(anyhow!("health check failed"));
        }
    }

    Ok(())
}
