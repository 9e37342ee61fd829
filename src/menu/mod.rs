//! # Configuration Menu
//!
//! Three-state interactive text menu over the operator serial line. The menu
//! is the only writer of calibration state: it toggles feature flags and
//! overwrites notch coordinates, persisting every change immediately.
//!
//! The menu is dormant until any byte arrives on the line. While a session
//! runs, controller forwarding is fully suspended; in particular the notch
//! value entry deliberately blocks awaiting input (with a bounded read
//! timeout applied only to the characters after the first).

use std::time::Duration;

use tracing::debug;

use crate::calibration::{CalibrationStore, Feature, Notch, NotchAxis};
use crate::error::Result;
use crate::serial::LineIo;
use crate::storage::Storage;

/// Menu state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Main,
    Mods,
    Notches,
}

/// What a received byte means in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Enter the mod-toggle menu.
    EnterMods,
    /// Enter the notch-edit menu.
    EnterNotches,
    /// Toggle one feature flag.
    Toggle(Feature),
    /// Edit one notch scalar (blocks for a value).
    Edit(Notch, NotchAxis),
    /// Return to the main menu.
    ExitToMain,
    /// Unrecognized byte: no transition, no output.
    Ignored,
}

/// Decodes one byte against the current state.
///
/// Pure transition function; the session applies the side effects.
#[must_use]
pub fn parse(state: MenuState, byte: u8) -> MenuAction {
    match state {
        MenuState::Main => match byte {
            b'0' => MenuAction::EnterMods,
            b'1' => MenuAction::EnterNotches,
            _ => MenuAction::Ignored,
        },
        MenuState::Mods => match byte {
            b'0' => MenuAction::Toggle(Feature::MaxVectors),
            b'1' => MenuAction::Toggle(Feature::PerfectAngles),
            b'2' => MenuAction::Toggle(Feature::ShieldDropExpand),
            b'3' => MenuAction::Toggle(Feature::DashBack),
            b'4' => MenuAction::Toggle(Feature::DolphinFix),
            b'5' => MenuAction::ExitToMain,
            _ => MenuAction::Ignored,
        },
        MenuState::Notches => match byte {
            b'0' => MenuAction::Edit(Notch::North, NotchAxis::X),
            b'1' => MenuAction::Edit(Notch::North, NotchAxis::Y),
            b'2' => MenuAction::Edit(Notch::South, NotchAxis::X),
            b'3' => MenuAction::Edit(Notch::South, NotchAxis::Y),
            b'4' => MenuAction::Edit(Notch::West, NotchAxis::X),
            b'5' => MenuAction::Edit(Notch::West, NotchAxis::Y),
            b'6' => MenuAction::Edit(Notch::East, NotchAxis::X),
            b'7' => MenuAction::Edit(Notch::East, NotchAxis::Y),
            b'8' => MenuAction::Edit(Notch::Southwest, NotchAxis::X),
            b'9' => MenuAction::Edit(Notch::Southwest, NotchAxis::Y),
            b'a' | b'A' => MenuAction::Edit(Notch::Southeast, NotchAxis::X),
            b'b' | b'B' => MenuAction::Edit(Notch::Southeast, NotchAxis::Y),
            b'c' | b'C' => MenuAction::ExitToMain,
            _ => MenuAction::Ignored,
        },
    }
}

/// One interactive menu session over the operator line.
pub struct MenuSession<'a, S: Storage, T: LineIo> {
    store: &'a mut CalibrationStore<S>,
    transport: &'a mut T,
    /// Read timeout for value characters after the first.
    value_timeout: Duration,
    state: MenuState,
}

impl<'a, S: Storage, T: LineIo> MenuSession<'a, S, T> {
    pub fn new(
        store: &'a mut CalibrationStore<S>,
        transport: &'a mut T,
        value_timeout: Duration,
    ) -> Self {
        Self {
            store,
            transport,
            value_timeout,
            state: MenuState::Main,
        }
    }

    /// Current state, for tests and diagnostics.
    #[must_use]
    pub fn state(&self) -> MenuState {
        self.state
    }

    /// Runs the session until the line closes.
    ///
    /// `wake_byte` is the byte that ended dormancy, if the caller already
    /// read it; it is applied as the first command after the main menu
    /// prints. There is no menu command back to dormant; a session ends
    /// only when the transport drops (the operator disconnecting the
    /// terminal), which surfaces as the read error this returns.
    ///
    /// # Errors
    ///
    /// Returns the transport error that ended the session.
    pub async fn run(&mut self, wake_byte: Option<u8>) -> Result<()> {
        self.print_main_menu().await?;
        if let Some(byte) = wake_byte {
            self.handle(byte).await?;
        }
        loop {
            let byte = self.transport.read_byte().await?;
            self.handle(byte).await?;
        }
    }

    /// Applies one received byte.
    pub async fn handle(&mut self, byte: u8) -> Result<()> {
        match parse(self.state, byte) {
            MenuAction::EnterMods => {
                self.state = MenuState::Mods;
                self.print_mod_menu().await
            }
            MenuAction::EnterNotches => {
                self.state = MenuState::Notches;
                self.print_notch_menu().await
            }
            MenuAction::Toggle(feature) => {
                self.store.toggle(feature)?;
                self.print_mod_menu().await
            }
            MenuAction::Edit(notch, axis) => {
                if let Some(value) = self.read_value().await? {
                    self.store.set_value(notch, axis, value)?;
                } else {
                    debug!("Notch value entry rejected; keeping old value");
                }
                self.print_notch_menu().await
            }
            MenuAction::ExitToMain => {
                self.state = MenuState::Main;
                self.print_main_menu().await
            }
            MenuAction::Ignored => Ok(()),
        }
    }

    /// Blocks for a decimal float on the line.
    ///
    /// Waits for the first byte indefinitely, then applies the bounded read
    /// timeout to each following character; the entry ends at a newline or
    /// when the timeout lapses. Returns None when the text does not parse.
    async fn read_value(&mut self) -> Result<Option<f32>> {
        self.transport
            .write_line("Please enter the notch value.")
            .await?;

        let first = self.transport.read_byte().await?;
        let mut text = String::new();
        if first != b'\r' && first != b'\n' {
            text.push(char::from(first));
            loop {
                match tokio::time::timeout(self.value_timeout, self.transport.read_byte()).await {
                    Ok(Ok(b'\r')) | Ok(Ok(b'\n')) | Err(_) => break,
                    Ok(Ok(byte)) => text.push(char::from(byte)),
                    // A line drop mid-entry ends the entry; the session's
                    // next read surfaces the same error.
                    Ok(Err(_)) => break,
                }
            }
        }

        Ok(text.trim().parse::<f32>().ok())
    }

    async fn print_main_menu(&mut self) -> Result<()> {
        self.transport.write_line("Config menu:").await?;
        self.transport.write_line("0: Enable/Disable Mods").await?;
        self.transport.write_line("1: Update notch values").await
    }

    async fn print_mod_menu(&mut self) -> Result<()> {
        self.transport.write_line("Toggle mods:").await?;
        for (i, feature) in Feature::ALL.iter().enumerate() {
            let status = if self.store.flags().is_enabled(*feature) {
                "Enabled"
            } else {
                "Disabled"
            };
            self.transport
                .write_line(&format!("{}: {} : {}", i, feature.name(), status))
                .await?;
        }
        self.transport.write_line("5: Exit").await
    }

    async fn print_notch_menu(&mut self) -> Result<()> {
        const KEYS: [(char, Notch, NotchAxis); 12] = [
            ('0', Notch::North, NotchAxis::X),
            ('1', Notch::North, NotchAxis::Y),
            ('2', Notch::South, NotchAxis::X),
            ('3', Notch::South, NotchAxis::Y),
            ('4', Notch::West, NotchAxis::X),
            ('5', Notch::West, NotchAxis::Y),
            ('6', Notch::East, NotchAxis::X),
            ('7', Notch::East, NotchAxis::Y),
            ('8', Notch::Southwest, NotchAxis::X),
            ('9', Notch::Southwest, NotchAxis::Y),
            ('A', Notch::Southeast, NotchAxis::X),
            ('B', Notch::Southeast, NotchAxis::Y),
        ];

        self.transport.write_line("Update notch values:").await?;
        for (key, notch, axis) in KEYS {
            let label = match axis {
                NotchAxis::X => "X",
                NotchAxis::Y => "Y",
            };
            let value = self.store.notches().value(notch, axis);
            self.transport
                .write_line(&format!("{}: {} {} : {}", key, notch.name(), label, value))
                .await?;
        }
        self.transport.write_line("C: Exit").await
    }
}
