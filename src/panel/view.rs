//! Panel drawing

use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::{self, Stylize},
    terminal::{self, ClearType},
};

use crate::{
    core::{
        command::DoorCommand,
        types::{AdvertiserState, AdvertiserStatus},
    },
    panel::{state::PanelState, HoldMode},
};

/// Redraw the whole panel
pub fn draw(out: &mut impl Write, state: &PanelState, hold_mode: HoldMode) -> io::Result<()> {
    queue!(
        out,
        terminal::Clear(ClearType::All),
        cursor::MoveTo(0, 0),
        style::Print("Door Remote".bold()),
        cursor::MoveTo(2, 2),
        style::Print(button_row(state)),
        cursor::MoveTo(2, 4),
        style::Print(wide_button(state)),
        cursor::MoveTo(0, 6),
        style::Print(gate_line(&state.status())),
        cursor::MoveTo(0, 7),
    )?;

    if let Some(notice) = state.notice() {
        queue!(out, style::Print(notice.to_string().red()))?;
    }

    queue!(
        out,
        cursor::MoveTo(0, 9),
        style::Print(mode_hint(hold_mode).dim()),
        cursor::MoveTo(0, 10),
        style::Print("o open  s stop  c close  space open & close  r retry  q quit".dim()),
    )?;

    out.flush()
}

fn label(command: DoorCommand) -> &'static str {
    match command {
        DoorCommand::Open => "open",
        DoorCommand::Stop => "stop",
        DoorCommand::Close => "close",
        DoorCommand::OpenAndClose => "open & close",
    }
}

fn button_row(state: &PanelState) -> String {
    format!(
        "{}   {}   {}",
        button(state, DoorCommand::Open),
        button(state, DoorCommand::Stop),
        button(state, DoorCommand::Close),
    )
}

fn button(state: &PanelState, command: DoorCommand) -> String {
    styled(state, command, format!("[ {} ]", label(command)))
}

fn wide_button(state: &PanelState) -> String {
    let command = DoorCommand::OpenAndClose;
    styled(state, command, format!("[      {}      ]", label(command)))
}

fn styled(state: &PanelState, command: DoorCommand, text: String) -> String {
    if state.pressed() == Some(command) {
        text.black().on_green().to_string()
    } else if state.is_enabled(command) {
        text.bold().to_string()
    } else {
        text.dim().to_string()
    }
}

fn gate_line(status: &AdvertiserStatus) -> String {
    if status.state == AdvertiserState::NoAdapter {
        return "no Bluetooth adapter".red().to_string();
    }

    let access = if status.permission_granted {
        "access granted".green()
    } else {
        "access missing".red()
    };
    let power = if status.adapter_enabled {
        "adapter on".green()
    } else {
        "adapter off".red()
    };
    format!("{access}   {power}")
}

fn mode_hint(hold_mode: HoldMode) -> &'static str {
    match hold_mode {
        HoldMode::Literal => "hold a key to broadcast, release to stop",
        HoldMode::Toggle => "press to broadcast, press again to stop",
    }
}
