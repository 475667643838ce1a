use crossterm::{
    cursor,
    event::{DisableFocusChange, EnableFocusChange},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use std::io::{self, Stdout};

/// The dashboard's hold on the terminal: raw mode, the alternate screen and
/// focus reporting, which drives the hidden/visible transitions. Dropping it
/// hands the terminal back.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    pub fn enter() -> anyhow::Result<Self> {
        let mut tui = Self {
            terminal: Terminal::new(CrosstermBackend::new(io::stdout()))?,
        };
        // From here on a failed step still restores through Drop.
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, EnableFocusChange)?;
        tui.terminal.hide_cursor()?;
        tui.terminal.clear()?;
        Ok(tui)
    }

    pub fn draw(&mut self, f: impl FnOnce(&mut Frame)) -> anyhow::Result<()> {
        self.terminal.draw(f)?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Undo everything `Tui::enter` set up. Harmless when nothing was.
fn restore_terminal() {
    let _ = execute!(
        io::stdout(),
        DisableFocusChange,
        LeaveAlternateScreen,
        cursor::Show
    );
    let _ = terminal::disable_raw_mode();
}

/// Restore the terminal before the default hook prints the panic.
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        original_hook(panic_info);
    }));
}
