//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Interactive prompts and user input handling

use std::collections::VecDeque;
use std::io::{self, BufRead, Read, Write};

use console::style;

use crate::error::Result;
use crate::llm::ModelInfo;

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_add_remote_hint, display_dashboard, display_error, display_push_failure,
    display_review, display_status, display_success, display_warning, Dashboard,
};

/// Source of interactive answers
///
/// The terminal implementation is [StdinPrompter]; tests drive the same code
/// with [ScriptedPrompter].
pub trait Prompter {
    /// Show `prompt` and read one line, trimmed
    fn ask(&mut self, prompt: &str) -> Result<String>;

    /// Show `prompt` and read everything up to end-of-input
    fn ask_block(&mut self, prompt: &str) -> Result<String>;
}

/// Prompts on stdout and reads answers from stdin
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        print!("{}", style(prompt).blue());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().lock().read_line(&mut input)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed").into());
        }
        Ok(input.trim().to_string())
    }

    fn ask_block(&mut self, prompt: &str) -> Result<String> {
        println!("{}", style(prompt).blue());
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().lock().read_to_string(&mut input)?;
        Ok(input)
    }
}

/// Replays a fixed list of answers; fails once they run out
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedPrompter {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Every prompt shown so far, in order
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("no scripted answer for prompt '{}'", prompt),
            )
            .into()
        })
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        Ok(self.next(prompt)?.trim().to_string())
    }

    fn ask_block(&mut self, prompt: &str) -> Result<String> {
        self.next(prompt)
    }
}

/// Prompts the user to pick a model.
///
/// Shows the quick choices (first one is the default) followed by a
/// "More models" entry that lists every model. Empty or invalid input selects
/// the first quick choice.
///
/// # Arguments
/// * `quick` - Preferred models, at least one
/// * `all` - Every available model
///
/// # Returns
/// * `Ok(Some(model))` - The selected model
/// * `Ok(None)` - If there is nothing to choose from
pub fn select_model<P: Prompter + ?Sized>(
    prompter: &mut P,
    quick: &[ModelInfo],
    all: &[ModelInfo],
) -> Result<Option<ModelInfo>> {
    let Some(default) = quick.first() else {
        return Ok(None);
    };

    println!("\n{}", style("AI model:").bold());
    for (i, model) in quick.iter().enumerate() {
        let marker = if i == 0 { " (default)" } else { "" };
        println!("  {}) {}{}", i + 1, model.label, marker);
    }
    let more = quick.len() + 1;
    println!("  {}) More models...", more);

    let choice = prompter.ask("Select model [default]: ")?;
    let index = choice.parse::<usize>().ok();

    if index == Some(more) {
        println!("\n{}", style("All models:").bold());
        for (i, model) in all.iter().enumerate() {
            println!("  {}) {}", i + 1, model.label);
        }
        let choice = prompter.ask("Select model: ")?;
        let picked = choice
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=all.len()).contains(n))
            .map(|n| all[n - 1].clone());
        return Ok(Some(picked.unwrap_or_else(|| default.clone())));
    }

    let picked = index
        .filter(|n| (1..=quick.len()).contains(n))
        .map(|n| quick[n - 1].clone());
    Ok(Some(picked.unwrap_or_else(|| default.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(id: &str) -> ModelInfo {
        ModelInfo {
            id: id.to_string(),
            label: format!("Provider: {}", id),
        }
    }

    #[test]
    fn test_scripted_prompter_replays_and_records() {
        let mut prompter = ScriptedPrompter::new(["  first  ", "second\n"]);
        assert_eq!(prompter.ask("A: ").unwrap(), "first");
        assert_eq!(prompter.ask_block("B:").unwrap(), "second\n");
        assert_eq!(prompter.prompts(), &["A: ".to_string(), "B:".to_string()]);
        assert!(prompter.ask("C: ").is_err());
    }

    #[test]
    fn test_select_model_default_on_enter() {
        let quick = vec![model("a"), model("b")];
        let mut prompter = ScriptedPrompter::new([""]);
        let picked = select_model(&mut prompter, &quick, &quick).unwrap();
        assert_eq!(picked, Some(model("a")));
    }

    #[test]
    fn test_select_model_second_quick_choice() {
        let quick = vec![model("a"), model("b")];
        let mut prompter = ScriptedPrompter::new(["2"]);
        let picked = select_model(&mut prompter, &quick, &quick).unwrap();
        assert_eq!(picked, Some(model("b")));
    }

    #[test]
    fn test_select_model_from_full_list() {
        let quick = vec![model("a"), model("b")];
        let all = vec![model("a"), model("b"), model("c")];
        let mut prompter = ScriptedPrompter::new(["3", "3"]);
        let picked = select_model(&mut prompter, &quick, &all).unwrap();
        assert_eq!(picked, Some(model("c")));
    }

    #[test]
    fn test_select_model_invalid_full_list_choice_uses_default() {
        let quick = vec![model("a")];
        let all = vec![model("a"), model("b")];
        let mut prompter = ScriptedPrompter::new(["2", "9"]);
        let picked = select_model(&mut prompter, &quick, &all).unwrap();
        assert_eq!(picked, Some(model("a")));
    }

    #[test]
    fn test_select_model_nothing_to_choose() {
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
        assert_eq!(select_model(&mut prompter, &[], &[]).unwrap(), None);
        assert!(prompter.prompts().is_empty());
    }
}
