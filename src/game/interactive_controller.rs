//! Interactive text controller for the human player
//!
//! Reads move choices line by line and answers a few informational commands
//! in between.

use crate::core::outcome::rules_lines;
use crate::core::Move;
use crate::game::controller::{PlayerController, RoundView};
use std::io::{self, BufRead, Write};

/// A controller that prompts a human player for moves
pub struct InteractiveController<R = io::StdinLock<'static>, W = io::Stdout> {
    input: R,
    output: W,
}

impl InteractiveController {
    /// Prompt on stdout, read from stdin
    pub fn new() -> Self {
        InteractiveController {
            input: io::stdin().lock(),
            output: io::stdout(),
        }
    }
}

impl Default for InteractiveController {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: BufRead, W: Write> InteractiveController<R, W> {
    /// Use arbitrary input and output streams
    pub fn with_io(input: R, output: W) -> Self {
        InteractiveController { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn display_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "\nChoose Your Weapon")?;
        for m in Move::ALL {
            writeln!(self.output, "  {}) {} {}", m.id(), m.emoji(), m.name())?;
        }
        Ok(())
    }

    fn display_help(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n=== Help ===")?;
        writeln!(self.output, "  1-5 or a name  - Throw that move (prefixes work: 'liz', 'sp')")?;
        writeln!(self.output, "  r              - Show the rules")?;
        writeln!(self.output, "  s              - Show your statistics")?;
        writeln!(self.output, "  q              - Quit")?;
        writeln!(self.output, "  ?              - Show this help menu")?;
        Ok(())
    }

    fn display_rules(&mut self) -> io::Result<()> {
        writeln!(self.output, "\nGame Rules:")?;
        for line in rules_lines() {
            writeln!(self.output, "  {line}")?;
        }
        Ok(())
    }

    fn display_stats(&mut self, view: &RoundView) -> io::Result<()> {
        let stats = view.stats();
        writeln!(
            self.output,
            "\nWins {} | Losses {} | Ties {} | Win Rate {:.1}% | Best Streak {}",
            stats.wins,
            stats.losses,
            stats.ties,
            stats.win_rate(),
            stats.best_streak
        )
    }

    /// Prompt until the player enters a move, quits, or input ends
    fn prompt(&mut self, view: &RoundView) -> io::Result<Option<Move>> {
        self.display_menu()?;
        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }

            match line.trim() {
                "" => continue,
                "q" | "quit" | "exit" => return Ok(None),
                "?" | "h" | "help" => self.display_help()?,
                "r" | "rules" => self.display_rules()?,
                "s" | "stats" => self.display_stats(view)?,
                other => match Move::parse_name(other) {
                    Ok(m) => return Ok(Some(m)),
                    Err(e) => writeln!(self.output, "{e}. Enter 1-5, a move name, or '?' for help.")?,
                },
            }
        }
    }
}

impl<R: BufRead, W: Write> PlayerController for InteractiveController<R, W> {
    fn name(&self) -> &str {
        "human"
    }

    fn choose_move(&mut self, view: &RoundView) -> Option<Move> {
        match self.prompt(view) {
            Ok(choice) => choice,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                None
            }
        }
    }
}
