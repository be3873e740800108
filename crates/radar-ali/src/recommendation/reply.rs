//! Parsing of free-text model replies into structured picks and suggestions.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// One solution chosen by the model, before validation against the candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPick {
    /// Bracketed id, or the text before `:` when the model skipped the brackets.
    pub reference: String,
    pub title: Option<String>,
    pub justification: String,
}

/// A new solution proposed by the curation prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolutionSuggestion {
    pub name: String,
    pub modality: String,
    pub justification: String,
}

const UNSPECIFIED_MODALITY: &str = "Não especificado";

fn numbered_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\d{1,2}\s*[.)\-]\s*(.*)$").expect("valid numbered regex"))
}

fn bracketed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[([^\]]+)\]\s*(.*)$").expect("valid bracket regex"))
}

fn suggestion_head() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\[?([^\]\(:]+?)\]?\s*\(([^)]*)\)\s*[:\-–]?\s*(.*)$")
            .expect("valid suggestion regex")
    })
}

/// Group reply lines into numbered entries: the entry's head plus its continuation text.
fn entries(reply: &str) -> Vec<(String, String)> {
    let mut entries: Vec<(String, String)> = Vec::new();

    for line in reply.lines() {
        let line = line.replace("**", "");
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(captures) = numbered_line().captures(line) {
            let head = captures.get(1).map_or("", |m| m.as_str()).trim().to_string();
            entries.push((head, String::new()));
        } else if let Some((_, continuation)) = entries.last_mut() {
            if !continuation.is_empty() {
                continuation.push(' ');
            }
            continuation.push_str(line);
        }
    }

    entries
}

fn join_text(first: &str, rest: &str) -> String {
    match (first.trim(), rest.trim()) {
        ("", rest) => rest.to_string(),
        (first, "") => first.to_string(),
        (first, rest) => format!("{first} {rest}"),
    }
}

fn strip_separator(value: &str) -> &str {
    value.trim().trim_start_matches([':', '-', '–']).trim()
}

/// Parse `1. [id] Title: justification` lines, tolerating missing brackets and wrapped lines.
pub fn parse_picks(reply: &str) -> Vec<ModelPick> {
    entries(reply)
        .into_iter()
        .filter_map(|(head, continuation)| {
            let (reference, title, justification) = match bracketed().captures(&head) {
                Some(captures) => {
                    let reference = captures.get(1).map_or("", |m| m.as_str()).trim();
                    let remainder = captures.get(2).map_or("", |m| m.as_str());
                    match remainder.split_once(':') {
                        Some((title, justification)) => (
                            reference.to_string(),
                            Some(title.trim().to_string()).filter(|title| !title.is_empty()),
                            justification.to_string(),
                        ),
                        None => (
                            reference.to_string(),
                            None,
                            strip_separator(remainder).to_string(),
                        ),
                    }
                }
                None => match head.split_once(':') {
                    Some((reference, justification)) => {
                        (reference.trim().to_string(), None, justification.to_string())
                    }
                    None => (head.trim().to_string(), None, String::new()),
                },
            };

            if reference.is_empty() {
                return None;
            }

            Some(ModelPick {
                reference,
                title,
                justification: join_text(&justification, &continuation),
            })
        })
        .collect()
}

/// Parse `1. [Name] (Modality): justification` suggestion lines.
pub fn parse_suggestions(reply: &str) -> Vec<SolutionSuggestion> {
    entries(reply)
        .into_iter()
        .filter_map(|(head, continuation)| {
            let (name, modality, justification) = match suggestion_head().captures(&head) {
                Some(captures) => (
                    captures.get(1).map_or("", |m| m.as_str()).to_string(),
                    captures.get(2).map_or("", |m| m.as_str()).to_string(),
                    captures.get(3).map_or("", |m| m.as_str()).to_string(),
                ),
                None => match head.split_once(':') {
                    Some((name, justification)) => (
                        name.to_string(),
                        UNSPECIFIED_MODALITY.to_string(),
                        justification.to_string(),
                    ),
                    None => (head.clone(), UNSPECIFIED_MODALITY.to_string(), String::new()),
                },
            };

            let name = name
                .trim()
                .trim_start_matches('[')
                .trim_end_matches(']')
                .trim()
                .to_string();
            if name.is_empty() {
                return None;
            }

            let modality = modality.trim();
            let modality = modality
                .strip_prefix("Modalidade:")
                .unwrap_or(modality)
                .trim()
                .to_string();

            Some(SolutionSuggestion {
                name,
                modality,
                justification: join_text(&justification, &continuation),
            })
        })
        .collect()
}
