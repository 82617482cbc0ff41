use colored::Colorize;
use parley_core::{ConversationState, Message, Sender};

pub fn message(message: &Message, assistant: &str) {
    let stamp = format!("[{}]", message.time).dimmed();
    match message.sender {
        Sender::User => println!("{} {} {}", stamp, "you:".bright_green().bold(), message.text),
        Sender::Bot if message.is_loading => {
            println!("{} {} {}", stamp, format!("{}:", assistant).bright_blue().bold(), "…".dimmed())
        }
        Sender::Bot => println!(
            "{} {} {}",
            stamp,
            format!("{}:", assistant).bright_blue().bold(),
            message.text
        ),
    }
}

pub fn transcript(messages: &[Message], assistant: &str) {
    for entry in messages {
        message(entry, assistant);
    }
}

pub fn conversation_list(state: &ConversationState) {
    if state.conversations.is_empty() {
        println!("{}", "No conversations".dimmed());
        return;
    }

    for (index, conversation) in state.conversations.iter().enumerate() {
        let marker = if state.current_id.as_deref() == Some(conversation.id.as_str()) {
            "*".bright_yellow().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "{} {:>2}. {} {}",
            marker,
            index + 1,
            conversation.name,
            conversation.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed()
        );
    }
}

pub fn notice(text: &str) {
    println!("{}", text.bright_yellow());
}

pub fn error(text: &str) {
    eprintln!("{}", text.red());
}
