use anyhow::Result;
use clap::Parser;
use pocketmind::cli::{Cli, Commands, IdeaCommands};
use pocketmind::records::ideas::filter_and_sort;
use pocketmind::records::{IdeaChanges, NewIdea};
use pocketmind::{utils, App, ConversationError, ConversationManager, Settings};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::new()?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    // Only questions need the key; history and ideas work offline
    let api_key = match cli.command {
        Commands::Ask { .. } | Commands::Chat { .. } => Settings::api_key()?,
        _ => Settings::api_key().unwrap_or_default(),
    };
    let app = App::open(&settings, api_key).await?;

    // Another process may be answering while history or ideas are browsed
    if matches!(cli.command, Commands::Ask { .. } | Commands::Chat { .. }) {
        let closed = app.conversation().recover_abandoned().await?;
        if closed > 0 {
            tracing::info!("Closed {} questions left unanswered by an earlier run", closed);
        }
    }

    match cli.command {
        Commands::Ask { question, topic } => handle_ask(&app, question, topic).await,
        Commands::Chat { topic } => handle_chat(&app, topic).await,
        Commands::History { full } => handle_history(&app, full).await,
        Commands::Delete { id } => handle_delete(&app, id).await,
        Commands::Clear => {
            app.conversation().clear_all().await?;
            utils::print_success("History cleared");
            Ok(())
        }
        Commands::Export { output } => handle_export(&app, output).await,
        Commands::Idea(command) => handle_idea(&app, command).await,
    }
}

async fn handle_ask(app: &App, question: String, topic: Option<String>) -> Result<()> {
    utils::print_info("Sending request...");

    match app.conversation().ask(&question, topic.as_deref()).await {
        Ok(entry) => {
            println!("\n{}", entry.answer());
            Ok(())
        }
        Err(ConversationError::EmptyQuestion) => {
            utils::print_error("Please type a question first");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn handle_chat(app: &App, topic: Option<String>) -> Result<()> {
    let conversation = app.conversation();

    utils::print_header("Ask AI");
    if let Some(topic) = &topic {
        utils::print_info(&format!("Topic: {}", topic));
    }
    utils::print_info("Type your questions (/help for commands, Ctrl+C to exit)\n");

    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin);

    loop {
        if let Some(failed) = conversation.last_failed_question().await? {
            utils::print_info(&format!("Last failed question: {} (/retry to ask again)", failed));
        }
        utils::print_prompt("You: ");
        let mut input = String::new();
        if reader.read_line(&mut input).await? == 0 {
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match input.split_once(' ').unwrap_or((input, "")) {
            ("/help", _) => {
                println!("Special commands:");
                println!("  /retry        - Ask the last failed question again");
                println!("  /list         - Show the history");
                println!("  /delete <id>  - Delete one question");
                println!("  /clear        - Clear the history");
                println!("  /help         - Show this help");
                println!("  Ctrl+C        - Exit\n");
            }
            ("/list", _) => print_history(conversation, true).await?,
            ("/clear", _) => {
                conversation.clear_all().await?;
                utils::print_success("History cleared\n");
            }
            ("/delete", id) => {
                if conversation.delete(id.trim()).await? {
                    utils::print_success("Deleted\n");
                } else {
                    utils::print_error("No such question\n");
                }
            }
            ("/retry", _) => match conversation.last_failed_question().await? {
                Some(question) => {
                    let result = conversation.retry(&question, topic.as_deref()).await;
                    print_answer(result);
                }
                None => utils::print_info("Nothing to retry\n"),
            },
            _ => {
                let result = conversation.ask(input, topic.as_deref()).await;
                print_answer(result);
            }
        }
    }

    Ok(())
}

fn print_answer(result: Result<pocketmind::Entry, ConversationError>) {
    match result {
        Ok(entry) => {
            utils::print_info("Assistant: ");
            println!("{}\n", entry.answer());
        }
        Err(e) => utils::print_error(&format!("{}\n", e)),
    }
}

async fn print_history(conversation: &ConversationManager, full: bool) -> Result<()> {
    let entries = conversation.entries().await?;
    if entries.is_empty() {
        utils::print_info("No questions yet");
        return Ok(());
    }

    for entry in &entries {
        if full {
            utils::print_entry(entry);
        } else {
            println!(
                "{}  [{}] {}  ({})",
                entry.id(),
                entry.topic(),
                entry.question(),
                entry.status()
            );
        }
    }
    Ok(())
}

async fn handle_history(app: &App, full: bool) -> Result<()> {
    utils::print_header("Ask AI History");
    print_history(app.conversation(), full).await
}

async fn handle_delete(app: &App, id: String) -> Result<()> {
    if app.conversation().delete(&id).await? {
        utils::print_success(&format!("Deleted {}", id));
    } else {
        utils::print_error(&format!("No active question with id {}", id));
    }
    Ok(())
}

async fn handle_export(app: &App, output: String) -> Result<()> {
    let entries = app.conversation().entries().await?;
    let html = pocketmind::export::render_html(&entries);
    tokio::fs::write(&output, html).await?;
    utils::print_success(&format!("Exported {} questions to {}", entries.len(), output));
    Ok(())
}

async fn handle_idea(app: &App, command: IdeaCommands) -> Result<()> {
    let ideas = app.ideas();

    match command {
        IdeaCommands::Add {
            title,
            purpose,
            description,
            category,
            tools,
        } => {
            let idea = ideas
                .add(NewIdea {
                    title,
                    purpose,
                    description,
                    category,
                    tools,
                })
                .await?;
            utils::print_success(&format!("Added idea {}", idea.id));
        }
        IdeaCommands::List { search, field, sort } => {
            let active = ideas.list_active().await?;
            let shown = filter_and_sort(&active, &search, field, sort);
            utils::print_header(&format!("Ideas ({})", shown.len()));
            for idea in &shown {
                utils::print_idea(idea);
            }
        }
        IdeaCommands::Show { id } => match ideas.get(&id).await? {
            Some(idea) => utils::print_idea(&idea),
            None => utils::print_error(&format!("No active idea with id {}", id)),
        },
        IdeaCommands::Edit {
            id,
            title,
            purpose,
            description,
            category,
            tools,
        } => {
            let changes = IdeaChanges {
                title,
                purpose,
                description,
                category,
                tools,
            };
            if changes.is_empty() {
                utils::print_info("Nothing to change");
                return Ok(());
            }
            match ideas.update(&id, changes).await? {
                Some(idea) => utils::print_idea(&idea),
                None => utils::print_error(&format!("No active idea with id {}", id)),
            }
        }
        IdeaCommands::Delete { id } => report(ideas.soft_delete(&id).await?, "Moved to trash", &id),
        IdeaCommands::Restore { id } => report(ideas.restore(&id).await?, "Restored", &id),
        IdeaCommands::Purge { id } => report(ideas.purge(&id).await?, "Permanently deleted", &id),
        IdeaCommands::Trash => {
            let deleted = ideas.list_deleted().await?;
            utils::print_header(&format!("Trash ({})", deleted.len()));
            for idea in &deleted {
                utils::print_idea(idea);
            }
        }
    }

    Ok(())
}

fn report(changed: bool, done: &str, id: &str) {
    if changed {
        utils::print_success(&format!("{} {}", done, id));
    } else {
        utils::print_error(&format!("Nothing to do for {}", id));
    }
}
