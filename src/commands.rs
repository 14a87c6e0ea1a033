/// Available commands and autocomplete logic

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
  /// Whether the command expects an argument (`show <id>`)
  pub takes_arg: bool,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "list",
    aliases: &["l", "ls", "home"],
    description: "Browse the collection",
    takes_arg: false,
  },
  Command {
    name: "show",
    aliases: &["s", "open", "go"],
    description: "Open an item: show <id|path>",
    takes_arg: true,
  },
  Command {
    name: "refresh",
    aliases: &["r", "reload"],
    description: "Refetch the current view",
    takes_arg: false,
  },
  Command {
    name: "invalidate",
    aliases: &["inv", "clear"],
    description: "Drop cached results: invalidate [tag]",
    takes_arg: true,
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit dex9s",
    takes_arg: false,
  },
];

/// A resolved command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
  List,
  Show(String),
  Refresh,
  /// Without a tag, the whole cache is cleared
  Invalidate(Option<String>),
  Quit,
}

/// Get autocomplete suggestions for a given input
///
/// Only the first word is matched, so `show 25` still suggests `show`.
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input_lower = input
    .split_whitespace()
    .next()
    .unwrap_or("")
    .to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = Vec::new();

  for cmd in COMMANDS {
    // Exact match on name
    if cmd.name == input_lower {
      matches.push((cmd, 0)); // Highest priority
      continue;
    }

    // Exact match on alias
    if cmd.aliases.contains(&input_lower.as_str()) {
      matches.push((cmd, 1));
      continue;
    }

    // Prefix match on name
    if cmd.name.starts_with(&input_lower) {
      matches.push((cmd, 2));
      continue;
    }

    // Prefix match on alias
    if cmd.aliases.iter().any(|a| a.starts_with(&input_lower)) {
      matches.push((cmd, 3));
      continue;
    }

    // Fuzzy match (contains)
    if cmd.name.contains(&input_lower) {
      matches.push((cmd, 4));
      continue;
    }

    // Fuzzy match on alias
    if cmd.aliases.iter().any(|a| a.contains(&input_lower)) {
      matches.push((cmd, 5));
    }
  }

  // Sort by priority
  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

/// Turn a submitted command line into an invocation.
///
/// The command word may be any name, alias or prefix `get_suggestions`
/// resolves. Returns `None` for unknown commands and for `show` without an
/// argument.
pub fn parse(line: &str) -> Option<Invocation> {
  let mut parts = line.split_whitespace();
  let word = parts.next()?;
  let arg = parts.next().map(str::to_string);

  let cmd = get_suggestions(word).into_iter().next()?;
  match cmd.name {
    "list" => Some(Invocation::List),
    "show" => arg.map(Invocation::Show),
    "refresh" => Some(Invocation::Refresh),
    "invalidate" => Some(Invocation::Invalidate(arg)),
    "quit" => Some(Invocation::Quit),
    _ => None,
  }
}
