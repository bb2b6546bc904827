use std::io::Write;
use std::num::NonZeroUsize;

use anyhow::{Context, Result};
use taskdeck_app::{CreateTaskInput, StoreBackend, TaskEdit, TaskService};
use taskdeck_core::{Task, parse_date};
use time::{Date, OffsetDateTime};

use crate::{Command, LogCommand};

pub fn run<B: StoreBackend>(
    command: Command,
    service: &mut TaskService<B>,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::New {
            name,
            description,
            priority,
        } => {
            let task = service.create(CreateTaskInput {
                name,
                description,
                priority,
            })?;
            writeln!(out, "created task: {} ({})", task.name(), task.priority())?;
        }
        Command::Ls { json } => handle_ls(service, json, out)?,
        Command::Show { name, json } => handle_show(service, &name, json, out)?,
        Command::Edit {
            name,
            rename,
            description,
            priority,
        } => {
            let output = service.edit(
                &name,
                TaskEdit {
                    new_name: rename,
                    description,
                    priority,
                },
            )?;
            writeln!(out, "updated task: {}", output.task.name())?;
            if let Some(displaced) = output.displaced {
                writeln!(out, "overwrote existing task: {}", displaced.name())?;
            }
        }
        Command::Rm { name } => {
            let removed = service.delete(&name)?;
            writeln!(
                out,
                "deleted task: {} ({} logs)",
                removed.name(),
                removed.logs().len()
            )?;
        }
        Command::Log { cmd } => handle_log(service, cmd, out)?,
    }
    Ok(())
}

fn handle_log<B: StoreBackend>(
    service: &mut TaskService<B>,
    command: LogCommand,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        LogCommand::Add { name, text, date } => {
            let date = match date {
                Some(raw) => parse_date(&raw)?,
                None => today(),
            };
            let index = service.add_log(&name, &text, date)?;
            writeln!(out, "added log #{} to {name}", index + 1)?;
        }
        LogCommand::Edit { name, index, text } => {
            let entry = service.edit_log(&name, position(index), &text)?;
            writeln!(out, "#{index}: {entry}")?;
        }
        LogCommand::Replace { name, index, entry } => {
            service.replace_log(&name, position(index), &entry)?;
            let task = service.get(&name)?;
            let current = task
                .logs()
                .get(position(index))
                .with_context(|| format!("log #{index} vanished from {name}"))?;
            writeln!(out, "#{index}: {current}")?;
        }
        LogCommand::Rm { name, index } => {
            let removed = service.delete_log(&name, position(index))?;
            writeln!(out, "removed #{index}: {removed}")?;
        }
    }
    Ok(())
}

fn handle_ls<B: StoreBackend>(service: &TaskService<B>, json: bool, out: &mut impl Write) -> Result<()> {
    let tasks = service.list();
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&tasks)?)?;
        return Ok(());
    }
    if tasks.is_empty() {
        writeln!(out, "no tasks")?;
    }
    for task in tasks {
        writeln!(out, "{} (Priority: {})", task.name(), task.priority())?;
    }
    Ok(())
}

fn handle_show<B: StoreBackend>(
    service: &TaskService<B>,
    name: &str,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let task = service.get(name)?;
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(task)?)?;
        return Ok(());
    }
    write_details(task, out)
}

fn write_details(task: &Task, out: &mut impl Write) -> Result<()> {
    writeln!(out, "Name:        {}", task.name())?;
    writeln!(out, "Description: {}", task.description())?;
    writeln!(out, "Priority:    {}", task.priority())?;
    writeln!(out, "Logs:")?;
    if task.logs().is_empty() {
        writeln!(out, "  (none)")?;
    }
    for (i, entry) in task.logs().iter().enumerate() {
        writeln!(out, "  {}. {entry}", i + 1)?;
    }
    Ok(())
}

const fn position(index: NonZeroUsize) -> usize {
    index.get() - 1
}

fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}
