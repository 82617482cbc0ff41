use crate::message::{format_time, Message};
use crate::sanitize::to_plain_text;
use crate::wire::{parse_timestamp, ThreadHistory};

/// Interleave the backend's parallel `question`/`generation` arrays into a
/// transcript: user `i`, then bot `i` when present.
///
/// Entries are stamped with the history timestamp when the backend sends one
/// that parses; otherwise they get the current time.
pub fn reconstruct_history(history: &ThreadHistory) -> Vec<Message> {
    let stamp = history
        .timestamp
        .as_ref()
        .and_then(parse_timestamp)
        .map(|at| format_time(&at.with_timezone(&chrono::Local)));

    let turns = history.question.len().max(history.generation.len());
    let mut messages = Vec::with_capacity(turns * 2);

    for i in 0..turns {
        if let Some(question) = history.question.get(i) {
            messages.push(Message::user(question.clone()));
        }
        if let Some(generation) = history.generation.get(i) {
            messages.push(Message::bot(to_plain_text(generation)));
        }
    }

    if let Some(stamp) = stamp {
        for message in &mut messages {
            message.time = stamp.clone();
        }
    }

    messages
}
