//! Command parsing for the engine's user-facing surface.
//!
//! Plain text in, structured [`Command`] out. Anything this module does not
//! recognise is simply not the engine's business (triggers, dice, and the
//! rest live with other collaborators).

/// A recognised command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/sortinghat` — list every house's members.
    SortList,
    /// `/sortinghat @name` — which house is this member in.
    SortLookup {
        /// Target display name, `@` stripped.
        name: String,
    },
    /// `/sortinghat @name <house>` — sort a member.
    SortAssign {
        /// Target display name, `@` stripped.
        name: String,
        /// Raw house input, validated by the handler.
        house_input: String,
    },
    /// `/sortinghat` with a shape we cannot read.
    SortUsage,
    /// `/points totals` — the standings board.
    PointsTotals,
    /// `/points @name <amount>` — administrator bulk award.
    PointsAward {
        /// Target display name, `@` stripped.
        name: String,
        /// Signed amount.
        amount: i64,
    },
    /// `/points` with a shape we cannot read.
    PointsUsage,
    /// `/activity` or `/activity full`.
    Activity {
        /// Whether to show everyone rather than just the quiet ones.
        full: bool,
    },
}

/// Parse one inbound line. Returns `None` for anything that is not one of
/// the engine's commands.
#[must_use]
pub fn parse(text: &str) -> Option<Command> {
    let mut words = text.split_whitespace();
    let head = words.next()?;
    if !head.starts_with('/') {
        return None;
    }
    // Platforms suffix commands with the bot's handle in group chats.
    let command = head.split('@').next().unwrap_or(head).to_lowercase();
    let args: Vec<&str> = words.collect();

    match command.as_str() {
        "/sortinghat" => Some(parse_sortinghat(&args)),
        "/points" => Some(parse_points(&args)),
        "/activity" => match args.as_slice() {
            [] => Some(Command::Activity { full: false }),
            ["full"] => Some(Command::Activity { full: true }),
            _ => Some(Command::Activity { full: false }),
        },
        _ => None,
    }
}

fn parse_sortinghat(args: &[&str]) -> Command {
    match args {
        [] => Command::SortList,
        [name] => Command::SortLookup {
            name: strip_handle(name),
        },
        [name, house] => Command::SortAssign {
            name: strip_handle(name),
            house_input: (*house).to_string(),
        },
        _ => Command::SortUsage,
    }
}

fn parse_points(args: &[&str]) -> Command {
    match args {
        ["totals"] => Command::PointsTotals,
        [name, amount] => match amount.parse::<i64>() {
            Ok(amount) => Command::PointsAward {
                name: strip_handle(name),
                amount,
            },
            Err(_) => Command::PointsUsage,
        },
        _ => Command::PointsUsage,
    }
}

fn strip_handle(name: &str) -> String {
    name.strip_prefix('@').unwrap_or(name).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sortinghat_arities() {
        assert_eq!(parse("/sortinghat"), Some(Command::SortList));
        assert_eq!(
            parse("/sortinghat @luna"),
            Some(Command::SortLookup { name: "luna".into() })
        );
        assert_eq!(
            parse("/sortinghat @luna ravenclaw"),
            Some(Command::SortAssign {
                name: "luna".into(),
                house_input: "ravenclaw".into()
            })
        );
        assert_eq!(parse("/sortinghat a b c"), Some(Command::SortUsage));
    }

    #[test]
    fn points_arities() {
        assert_eq!(parse("/points totals"), Some(Command::PointsTotals));
        assert_eq!(
            parse("/points @ron -5"),
            Some(Command::PointsAward { name: "ron".into(), amount: -5 })
        );
        assert_eq!(parse("/points"), Some(Command::PointsUsage));
        assert_eq!(parse("/points @ron lots"), Some(Command::PointsUsage));
    }

    #[test]
    fn activity_variants() {
        assert_eq!(parse("/activity"), Some(Command::Activity { full: false }));
        assert_eq!(parse("/activity full"), Some(Command::Activity { full: true }));
    }

    #[test]
    fn bot_handle_suffix_is_ignored() {
        assert_eq!(parse("/points@prefectbot totals"), Some(Command::PointsTotals));
    }

    #[test]
    fn foreign_text_is_not_ours() {
        assert_eq!(parse("hello there"), None);
        assert_eq!(parse("/roll 2d8"), None);
    }
}
