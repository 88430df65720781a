//! Prompt abstraction
//!
//! The menu only talks to a [`Prompter`]. [`TerminalPrompter`] is the real
//! implementation; tests substitute a scripted one.

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};

use crate::error::Result;

/// Source of operator answers
pub trait Prompter {
    /// Pick one of `items`, returning its index
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<usize>;

    /// Free-text answer (may be empty)
    fn input(&mut self, prompt: &str) -> Result<String>;

    /// Numeric answer
    fn input_number(&mut self, prompt: &str) -> Result<f64>;
}

/// Labelled value offered in a selection list
#[derive(Debug, Clone, PartialEq)]
pub struct Choice<T> {
    pub label: String,
    pub value: T,
}

impl<T> Choice<T> {
    pub fn new(label: impl Into<String>, value: T) -> Self {
        Self { label: label.into(), value }
    }
}

/// Ask `prompter` to pick one of `choices` and return the chosen value
pub fn pick<P, T>(prompter: &mut P, prompt: &str, choices: &[Choice<T>]) -> Result<T>
where
    P: Prompter + ?Sized,
    T: Clone,
{
    let labels: Vec<String> = choices.iter().map(|c| c.label.clone()).collect();
    let index = prompter.select(prompt, &labels)?;
    choices.get(index).map(|c| c.value.clone()).ok_or_else(|| {
        crate::error::TrackerError::prompt_failed(format!(
            "Selection {index} is out of range for {} choices",
            choices.len()
        ))
    })
}

/// Interactive prompts on the controlling terminal
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    #[must_use]
    pub fn new() -> Self {
        Self { theme: ColorfulTheme::default() }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<usize> {
        let index = Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()?;
        Ok(index)
    }

    fn input(&mut self, prompt: &str) -> Result<String> {
        let answer = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(answer)
    }

    fn input_number(&mut self, prompt: &str) -> Result<f64> {
        // dialoguer re-asks until the answer parses
        let answer = Input::<f64>::with_theme(&self.theme).with_prompt(prompt).interact_text()?;
        Ok(answer)
    }
}
