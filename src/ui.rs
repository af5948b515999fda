use std::cell::RefCell;
use std::io::BufRead;

use anyhow::Result;
use colored::Colorize;

use util::Timer;

use crate::settings::Settings;

/// All interactions with the text UI should go through this struct.
pub struct Ui {
    /// -v setting, displays extra text info to user
    pub verbose: bool,
    /// -y setting, answers yes wherever the user would be prompted
    override_confirmation: bool,
    /// keeps track of time for the build
    timer: Timer,
    /// where answers to prompts come from (stdin, except in tests)
    input: RefCell<Box<dyn BufRead>>,
    /// buffer to hold strings internally when getting input
    strbuf: RefCell<String>,
}

impl Ui {
    /// Create a `Ui` that reads answers from stdin.
    pub fn new(settings: &Settings) -> Self {
        Self::with_input(settings, Box::new(std::io::stdin().lock()))
    }

    /// Create a `Ui` that reads answers from `input`.
    pub fn with_input(settings: &Settings, input: Box<dyn BufRead>) -> Self {
        Self {
            verbose: settings.verbose > 0,
            override_confirmation: settings.yes,
            timer: Timer::now(),
            input: RefCell::new(input),
            // Refcell so we can call confirm() w/o needing a unique reference:
            strbuf: RefCell::new(String::with_capacity(16)),
        }
    }

    /// Ask a yes/no question; anything but an answer starting with 'y' is no.
    pub fn confirm(&self, prompt: &str) -> Result<bool> {
        if self.override_confirmation {
            eprintln!("{} (y/N) {}", prompt, "y".bold());
            return Ok(true);
        }
        eprintln!("{} (y/N)", prompt);

        let mut strbuf = self.strbuf.borrow_mut();

        strbuf.clear();
        self.input.borrow_mut().read_line(&mut strbuf)?;
        match strbuf.trim_start().chars().next() {
            Some('y' | 'Y') => Ok(true),
            _ => Ok(false),
        }
    }

    /// Announce the start of a pipeline stage.
    pub fn stage(&self, msg: &str) {
        eprintln!("\n{}", msg.magenta());
    }

    pub fn success(&self, msg: &str) {
        eprintln!("{}.", msg.green());
    }

    /// Show a command line we are about to run.
    pub fn command(&self, line: &str) {
        eprintln!("{} {}", ">".green(), line.bold());
    }

    pub fn start_timer(&mut self) {
        if self.verbose {
            self.timer.reset();
        }
    }

    pub fn print_elapsed(&self, what: &str) {
        if self.verbose {
            eprintln!("{} took {}", what, self.timer.elapsed_display());
        }
    }

    pub fn verbose_msg(&self, msg: &str) {
        if self.verbose {
            eprintln!("{}", msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Args;
    use clap::Parser;
    use std::io::Cursor;

    fn ui(argv: &[&str], answers: &'static str) -> Ui {
        let mut full = vec!["gizmo"];
        full.extend_from_slice(argv);
        let settings: Settings = Args::try_parse_from(full).unwrap().try_into().unwrap();
        Ui::with_input(&settings, Box::new(Cursor::new(answers)))
    }

    #[test]
    fn test_confirm_reads_answers_in_order() {
        let ui = ui(&[], "y\nno\n  Yes\n");
        assert!(ui.confirm("first?").unwrap());
        assert!(!ui.confirm("second?").unwrap());
        assert!(ui.confirm("third?").unwrap());
        // end of input counts as no:
        assert!(!ui.confirm("fourth?").unwrap());
    }

    #[test]
    fn test_yes_flag_skips_input() {
        let ui = ui(&["-y"], "n\n");
        assert!(ui.confirm("submit?").unwrap());
    }
}
