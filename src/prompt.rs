use std::io::{self, Write};

use anyhow::{bail, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use crate::model::task::TaskDetail;

/// Asks whether a task should be copied. Implementations may block.
pub trait Confirm {
    fn confirm(&mut self, task: &TaskDetail, repo: &str) -> Result<bool>;
}

/// Single-keypress y/n prompt on the controlling terminal.
pub struct TerminalPrompt;

impl Confirm for TerminalPrompt {
    fn confirm(&mut self, task: &TaskDetail, repo: &str) -> Result<bool> {
        println!("Task title: {}", task.name);
        println!("URL: {}", task.url());
        let mut stdout = io::stdout();
        loop {
            write!(stdout, "Copy it to {repo}? [y/n] ")?;
            stdout.flush()?;
            let c = read_char()?;
            if let Some(answer) = parse_answer(c) {
                writeln!(stdout, "{c}")?;
                return Ok(answer);
            }
            writeln!(stdout)?;
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum KeyInput {
    Char(char),
    Interrupt,
    EndOfInput,
    Ignored,
}

fn classify(key: KeyEvent) -> KeyInput {
    if key.kind != KeyEventKind::Press {
        return KeyInput::Ignored;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => KeyInput::Interrupt,
            KeyCode::Char('d') => KeyInput::EndOfInput,
            _ => KeyInput::Ignored,
        };
    }
    match key.code {
        KeyCode::Char(c) => KeyInput::Char(c),
        _ => KeyInput::Ignored,
    }
}

fn parse_answer(c: char) -> Option<bool> {
    match c {
        'y' => Some(true),
        'n' => Some(false),
        _ => None,
    }
}

fn read_char() -> Result<char> {
    enable_raw_mode()?;
    let key = next_char();
    disable_raw_mode()?;
    key
}

fn next_char() -> Result<char> {
    loop {
        if let Event::Key(key) = event::read()? {
            match classify(key) {
                KeyInput::Char(c) => return Ok(c),
                KeyInput::Interrupt => bail!("interrupted"),
                KeyInput::EndOfInput => bail!("end of input"),
                KeyInput::Ignored => {}
            }
        }
    }
}
