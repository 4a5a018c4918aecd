//! Command list parsing, dispatch, and the diagnostic printers
//!
//! | command | operands               |
//! |---------|------------------------|
//! | `pfm`   |                        |
//! | `ppt`   | pid                    |
//! | `np`    | pid page_count         |
//! | `kp`    | pid                    |
//! | `sb`    | pid vaddr value        |
//! | `lb`    | pid vaddr              |

use std::io::{self, Write};
use std::str::FromStr;

use log::warn;

use crate::{
    error::{CommandError, MemoryError},
    machine::Machine,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    PrintFreeMap,
    PrintPageTable { pid: usize },
    NewProcess { pid: usize, page_count: usize },
    KillProcess { pid: usize },
    StoreByte { pid: usize, vaddr: usize, value: u8 },
    LoadByte { pid: usize, vaddr: usize },
}

struct Operands<'a, I> {
    command: &'static str,
    tokens: &'a mut I,
}

impl<I> Operands<'_, I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    fn next<T: FromStr>(&mut self, operand: &'static str) -> Result<T, CommandError> {
        let token = self.tokens.next().ok_or(CommandError::MissingOperand {
            command: self.command,
            operand,
        })?;
        let token = token.as_ref();
        token.parse().map_err(|_| CommandError::InvalidNumber {
            command: self.command,
            operand,
            value: token.to_string(),
        })
    }
}

/// Parses a whole command list up front; nothing runs if any token is bad.
pub fn parse<I, S>(tokens: I) -> Result<Vec<Command>, CommandError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tokens = tokens.into_iter();
    let mut commands = Vec::new();

    while let Some(token) = tokens.next() {
        let command = match token.as_ref() {
            "pfm" => Command::PrintFreeMap,
            "ppt" => {
                let mut ops = Operands { command: "ppt", tokens: &mut tokens };
                Command::PrintPageTable { pid: ops.next("pid")? }
            }
            "np" => {
                let mut ops = Operands { command: "np", tokens: &mut tokens };
                Command::NewProcess {
                    pid: ops.next("pid")?,
                    page_count: ops.next("page_count")?,
                }
            }
            "kp" => {
                let mut ops = Operands { command: "kp", tokens: &mut tokens };
                Command::KillProcess { pid: ops.next("pid")? }
            }
            "sb" => {
                let mut ops = Operands { command: "sb", tokens: &mut tokens };
                Command::StoreByte {
                    pid: ops.next("pid")?,
                    vaddr: ops.next("vaddr")?,
                    value: ops.next("value")?,
                }
            }
            "lb" => {
                let mut ops = Operands { command: "lb", tokens: &mut tokens };
                Command::LoadByte {
                    pid: ops.next("pid")?,
                    vaddr: ops.next("vaddr")?,
                }
            }
            other => return Err(CommandError::UnknownCommand(other.to_string())),
        };
        commands.push(command);
    }

    Ok(commands)
}

/// Runs commands in order. Command output goes to `out`; a failing command is
/// reported on `err` and the run moves on to the next one.
pub fn run(
    machine: &mut Machine,
    commands: &[Command],
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<()> {
    for &command in commands {
        execute(machine, command, out, err)?;
    }
    Ok(())
}

pub fn execute(
    machine: &mut Machine,
    command: Command,
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<()> {
    let result = match command {
        Command::PrintFreeMap => return print_page_free_map(machine, out),
        Command::PrintPageTable { pid } => return print_page_table(machine, pid, out),
        Command::NewProcess { pid, page_count } => machine.new_process(pid, page_count).map(drop),
        Command::KillProcess { pid } => machine.kill_process(pid).map(drop),
        Command::StoreByte { pid, vaddr, value } => match machine.store_value(pid, vaddr, value) {
            Ok(record) => return writeln!(out, "{}", record),
            Err(e) => Err(e),
        },
        Command::LoadByte { pid, vaddr } => match machine.load_value(pid, vaddr) {
            Ok(record) => return writeln!(out, "{}", record),
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(()) => Ok(()),
        Err(e @ MemoryError::OutOfMemory { .. }) => writeln!(out, "{}", e),
        Err(e) => writeln!(err, "error: {}", e),
    }
}

/// Prints the free page map, `#` for allocated and `.` for free frames.
pub fn print_page_free_map(machine: &Machine, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "--- PAGE FREE MAP ---")?;
    for row in machine.free_map().chunks(16) {
        let line: String = row.iter().map(|&used| if used { '#' } else { '.' }).collect();
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

/// Prints the virtual to physical page map of one process. A process without
/// a page table prints only the banner.
pub fn print_page_table(machine: &Machine, pid: usize, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "--- PROCESS {} PAGE TABLE ---", pid)?;
    match machine.page_table(pid) {
        Ok(entries) => {
            for (vpage, frame) in entries {
                writeln!(out, "{:02x} -> {}", vpage, frame)?;
            }
        }
        Err(e) => warn!("{}", e),
    }
    Ok(())
}
