use crate::records::{FilterField, SortOrder};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pocketmind")]
#[command(
    author,
    version,
    about = "Ask AI questions and keep an ideas notebook",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a single question
    Ask {
        question: String,

        /// Topic the answer should be framed for
        #[arg(short = 't', long)]
        topic: Option<String>,
    },

    /// Start an interactive question session
    Chat {
        #[arg(short = 't', long)]
        topic: Option<String>,
    },

    /// Show past questions, most recent first
    History {
        /// Print entries in full instead of one line each
        #[arg(short, long)]
        full: bool,
    },

    /// Delete one question from the history
    Delete { id: String },

    /// Remove the whole question history
    Clear,

    /// Write the question history to an HTML file
    Export {
        #[arg(default_value = "ask-ai-export.html")]
        output: String,
    },

    /// Manage the ideas notebook
    #[command(subcommand)]
    Idea(IdeaCommands),
}

#[derive(Subcommand)]
pub enum IdeaCommands {
    /// Add a new idea
    Add {
        title: String,

        #[arg(short, long)]
        purpose: String,

        #[arg(short, long, default_value = "")]
        description: String,

        #[arg(short, long)]
        category: Option<String>,

        /// Tool used by the idea (repeatable)
        #[arg(long = "tool")]
        tools: Vec<String>,
    },

    /// List active ideas
    List {
        /// Case-insensitive text to look for
        #[arg(short, long, default_value = "")]
        search: String,

        #[arg(short, long, value_enum, default_value_t = FilterField::Title)]
        field: FilterField,

        #[arg(long, value_enum, default_value_t = SortOrder::Desc)]
        sort: SortOrder,
    },

    /// Show one active idea
    Show { id: String },

    /// Change fields of an active idea
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        purpose: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Empty string clears the category
        #[arg(long)]
        category: Option<String>,

        /// Replaces the tool list (repeatable)
        #[arg(long = "tool")]
        tools: Option<Vec<String>>,
    },

    /// Move an idea to the trash
    Delete { id: String },

    /// Bring an idea back from the trash
    Restore { id: String },

    /// Remove an idea permanently
    Purge { id: String },

    /// List ideas in the trash
    Trash,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_with_topic() {
        let cli = Cli::parse_from(["pocketmind", "ask", "What is Rust?", "-t", "Programming"]);
        match cli.command {
            Commands::Ask { question, topic } => {
                assert_eq!(question, "What is Rust?");
                assert_eq!(topic.as_deref(), Some("Programming"));
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_parse_idea_list_filters() {
        let cli = Cli::parse_from([
            "pocketmind", "idea", "list", "--search", "rust", "--field", "tools", "--sort", "asc",
        ]);
        match cli.command {
            Commands::Idea(IdeaCommands::List { search, field, sort }) => {
                assert_eq!(search, "rust");
                assert_eq!(field, FilterField::Tools);
                assert_eq!(sort, SortOrder::Asc);
            }
            _ => panic!("expected idea list"),
        }
    }
}
