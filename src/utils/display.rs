use crate::records::{Entry, EntryStatus, Idea};
use colored::*;

pub fn print_header(text: &str) {
    println!("\n{}", text.bright_cyan().bold());
    println!("{}", "=".repeat(text.chars().count()).bright_cyan());
}

pub fn print_success(text: &str) {
    println!("{}", text.green());
}

pub fn print_error(text: &str) {
    eprintln!("{}", text.red().bold());
}

pub fn print_info(text: &str) {
    println!("{}", text.blue());
}

pub fn print_prompt(text: &str) {
    print!("{}", text.yellow().bold());
}

pub fn print_entry(entry: &Entry) {
    let status = match entry.status() {
        EntryStatus::Pending => "pending".yellow(),
        EntryStatus::Completed => "completed".green(),
        EntryStatus::Error => "error".red(),
    };
    println!(
        "{} {} [{}] {}",
        entry.id().dimmed(),
        entry.created_at().format("%Y-%m-%d %H:%M").to_string().dimmed(),
        entry.topic().magenta(),
        status
    );
    println!("{} {}", "Q:".bold(), entry.question());
    if !entry.answer().is_empty() {
        println!("{} {}", "A:".bold(), entry.answer());
    }
    println!();
}

pub fn print_idea(idea: &Idea) {
    println!("{} {}", idea.title.bold(), idea.id.dimmed());
    println!("  {} {}", "Purpose:".blue(), idea.purpose);
    if !idea.description.is_empty() {
        println!("  {} {}", "Description:".blue(), idea.description);
    }
    if let Some(category) = &idea.category {
        println!("  {} {}", "Category:".blue(), category);
    }
    if !idea.tools.is_empty() {
        println!("  {} {}", "Tools:".blue(), idea.tools.join(", "));
    }
    if let Some(deleted_at) = idea.deleted_at {
        println!("  {} {}", "Deleted:".red(), deleted_at.format("%Y-%m-%d %H:%M"));
    }
}
