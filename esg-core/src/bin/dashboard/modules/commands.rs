// esg-core/src/bin/dashboard/modules/commands.rs
// Operator commands read from stdin while the panels tick

use esg_core::data::Selection;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `select [panel] <entity> [| <metric>]`
    Select { panel: usize, selection: Selection },
    /// `close <panel>`
    Close { panel: usize },
    /// `options [entity]`
    Options { entity: Option<String> },
    /// `quit`
    Quit,
}

pub const USAGE: &str = "commands: select [panel] <entity> [| <metric>] | close <panel> | options [entity] | quit";

pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb.to_ascii_lowercase().as_str() {
        "select" => parse_select(rest),
        "close" => rest
            .parse::<usize>()
            .map(|panel| Command::Close { panel })
            .map_err(|_| format!("close needs a panel number, got '{}'", rest)),
        "options" => Ok(Command::Options {
            entity: (!rest.is_empty()).then(|| rest.to_string()),
        }),
        "quit" | "exit" => Ok(Command::Quit),
        "" => Err(USAGE.to_string()),
        other => Err(format!("unknown command '{}'; {}", other, USAGE)),
    }
}

fn parse_select(rest: &str) -> Result<Command, String> {
    // Leading number picks the panel; entity names may contain spaces.
    let (panel, rest) = match rest.split_once(char::is_whitespace) {
        Some((first, tail)) => match first.parse::<usize>() {
            Ok(panel) => (panel, tail.trim()),
            Err(_) => (0, rest),
        },
        None => (0, rest),
    };

    let (entity, metric) = match rest.split_once('|') {
        Some((entity, metric)) => (entity.trim(), Some(metric.trim())),
        None => (rest.trim(), None),
    };
    if entity.is_empty() {
        return Err("select needs an entity".to_string());
    }

    let selection = match metric {
        Some(metric) if !metric.is_empty() => Selection::per_metric(entity, metric),
        _ => Selection::legacy(entity),
    };
    Ok(Command::Select { panel, selection })
}
