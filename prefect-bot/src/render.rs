//! Announcement text rendering.
//!
//! The engine decides, this module phrases. Every function here is a pure
//! string builder over structured engine results; nothing talks to the
//! platform.

use prefect_core::event::EventResult;
use prefect_core::house::House;
use prefect_core::types::UserId;

/// The sorting announcement for a freshly assigned house.
#[must_use]
pub fn sorting_verse(house: House) -> String {
    let verse = match house {
        House::Gryffindor => "Bold of heart and short of patience,\nthe lions will take you in!",
        House::Slytherin => "Ambition sharpened to a point,\nthe serpents approve.",
        House::Hufflepuff => "Steady hands and steadier loyalty,\nthe badgers have room by the fire.",
        House::Ravenclaw => "A mind that never stops asking,\nthe eagles expect great marks.",
        House::HouseElf => "Somebody has to tidy up after the rest of them.\nWelcome to the pantry.",
        House::Unaffiliated => "Unsorted, unclaimed, unbothered.",
    };
    format!(
        "{} {}! {}\n\n{}",
        house.emoji(),
        house.display_name(),
        house.emoji(),
        verse
    )
}

/// One-line answer to "which house is this member in".
#[must_use]
pub fn house_lookup_line(name: &str, house: Option<House>) -> String {
    match house {
        Some(house) => format!("{name} is a {}! {}", house.display_name(), house.emoji()),
        None => format!(
            "{name} has no house yet. Sort them with:\n/sortinghat @{name} <houseName>"
        ),
    }
}

/// The full house roster board.
#[must_use]
pub fn roster_board(groups: &[(House, Vec<String>)]) -> String {
    let mut board = String::new();
    for (house, names) in groups {
        let heading = match house {
            House::Unaffiliated => "FILTHY MUGGLES".to_string(),
            other => other.display_name().to_uppercase(),
        };
        board.push_str(&format!(
            "{} {} {}\n{}\n\n",
            house.emoji(),
            heading,
            house.emoji(),
            if names.is_empty() {
                "Nobody yet!".to_string()
            } else {
                names.join(", ")
            }
        ));
    }
    board.push_str("Not sorted? '/sortinghat @yourname <houseName>' fixes that.");
    board
}

/// Usage hint for the sorting command.
#[must_use]
pub fn sorting_usage() -> String {
    "Sort someone with:\n/sortinghat @username <houseName>\n\nHouse options are: Gryffindor, Slytherin, Hufflepuff, Ravenclaw, HouseElf".to_string()
}

/// A peer reaction that landed.
#[must_use]
pub fn reaction_applied(
    sender_name: &str,
    sender_house: House,
    receiver_name: &str,
    receiver_house: House,
    sign: i64,
    new_total: i64,
    boosted: bool,
) -> String {
    let verb = if sign > 0 { "awarded" } else { "deducted" };
    let boost_note = if boosted {
        "\nA Boost is in effect, so that counted double!"
    } else {
        ""
    };
    format!(
        "{sender_name} of {} has {verb} {receiver_name} of {} a House point!{boost_note}\nTheir new total for this Term is: {new_total}",
        sender_house.emoji(),
        receiver_house.emoji(),
    )
}

/// A positive peer reaction swallowed by a Block.
#[must_use]
pub fn reaction_blocked(receiver_name: &str, receiver_house: House) -> String {
    format!(
        "A Block hangs over {} {}! No points for {receiver_name} until it lifts.",
        house_label(receiver_house),
        receiver_house.emoji(),
    )
}

/// Notice for a reaction or award aimed at someone the roster does not know.
#[must_use]
pub fn member_not_found() -> String {
    "Did you Avada Kedavra someone?\n\nI don't know that member. Either they have never spoken here or you typo'd the name.".to_string()
}

/// Notice for a non-admin trying the bulk award.
#[must_use]
pub fn admin_only(name: &str) -> String {
    format!("Yer not a Wizard {name} ... or ... an Admin ...")
}

/// Notice for a bulk award outside the configured bound.
#[must_use]
pub fn award_bound_exceeded(bound: i64) -> String {
    format!(
        "Stupefy! Stop right there. The Ministry has capped awards at {bound} points either way."
    )
}

/// A successful administrator bulk award.
#[must_use]
pub fn bulk_award_line(name: &str, house: House, amount: i64, new_total: i64) -> String {
    let line = match amount.signum() {
        1 => format!("{name} of {} has been awarded {amount} House points!", house.emoji()),
        -1 => format!(
            "{name} of {} has been deducted {} House points!",
            house.emoji(),
            amount.abs()
        ),
        _ => format!(
            "{name} of {} has been um ... awarded no extra House points.",
            house.emoji()
        ),
    };
    format!("{line}\nTheir new total for this Term is: {new_total}")
}

/// Usage hint for the points command.
#[must_use]
pub fn points_usage() -> String {
    "Admin Only:\n/points @username <pointsTotal>\n\nAll Users:\n/points totals".to_string()
}

/// The standings board.
#[must_use]
pub fn standings_board(
    ranked: &[(House, i64)],
    wasted: i64,
    champions: &[(House, Option<(String, i64)>)],
    ends_in: &str,
) -> String {
    let mut board = String::from("🏰 House Points Totals 🏰\n");
    for (house, points) in ranked {
        board.push_str(&format!("{} : {points}\n", house.emoji()));
    }
    board.push_str(&format!("Points wasted by Filthy Muggles: {wasted}\n"));
    board.push_str("\n⚔️ Current House Champions ⚔️\n");
    for (house, champion) in champions {
        match champion {
            Some((name, points)) => {
                board.push_str(&format!("{}: {name} ({points})\n", house.emoji()));
            }
            None => board.push_str(&format!("{}: Nobody yet!\n", house.emoji())),
        }
    }
    board.push_str(&format!("\nThis term ends {ends_in}"));
    board
}

/// Notice when the term has no points at all yet.
#[must_use]
pub fn standings_empty() -> String {
    "It appears nobody has earned any points this term!".to_string()
}

/// The permanent, pinned end-of-term broadcast.
#[must_use]
pub fn rollover_broadcast(
    winner: Option<(House, i64, Option<(String, i64)>)>,
    ranked: &[(House, i64)],
    wasted: i64,
) -> String {
    let mut board = String::from("🏆 The Term has ended! 🏆\n\n");
    match winner {
        Some((house, points, champion)) => {
            board.push_str(&format!(
                "The House Cup goes to {} {} with {points} points!\n",
                house.display_name(),
                house.emoji()
            ));
            match champion {
                Some((name, champion_points)) => board.push_str(&format!(
                    "House Champion: {name} ({champion_points})\n\n"
                )),
                None => board.push_str("No champion stood at the end.\n\n"),
            }
        }
        None => board.push_str("Nobody earned a single point. The Cup stays in its cabinet.\n\n"),
    }
    board.push_str("Final standings:\n");
    for (house, points) in ranked {
        board.push_str(&format!("{} : {points}\n", house.emoji()));
    }
    board.push_str(&format!("Points wasted by Filthy Muggles: {wasted}\n"));
    board.push_str("\nA new term starts now. Every total is back to zero. Make it count!");
    board
}

/// The snitch release announcement.
#[must_use]
pub fn snitch_announcement(award: i64, phrase: &str) -> String {
    format!(
        "⚡ A Golden Snitch streaks through the chat! ⚡\n\nFirst to reply with exactly '{phrase}' takes {award} points. It escapes in 48 hours."
    )
}

/// The catch confirmation.
#[must_use]
pub fn snitch_caught(name: &str, award: i64, new_total: i64) -> String {
    format!(
        "🙌 {name} plucks the Snitch out of the air! {award} points!\nTheir new total for this Term is: {new_total}"
    )
}

/// The consolation for a correct-but-late catch.
#[must_use]
pub fn snitch_too_late(name: &str) -> String {
    format!("Too late {name}, the Snitch is already spoken for.")
}

/// Phrase a fired event for the chat. `None` means nothing to announce:
/// the snitch announcement is rendered separately and no-op events stay
/// quiet.
#[must_use]
pub fn event_text<F>(result: &EventResult, name_of: F) -> Option<String>
where
    F: Fn(UserId) -> String,
{
    match result {
        EventResult::SnitchAnnounced { .. } | EventResult::Nothing => None,
        EventResult::SpeakerDeducted { user, amount, new_total } => Some(format!(
            "🎲 Fate frowns on {}. {amount} points gone!\nTheir new total for this Term is: {new_total}",
            name_of(*user)
        )),
        EventResult::SpeakerAwarded { user, amount, new_total } => Some(format!(
            "🎲 Fate smiles on {}. Have {amount} points!\nTheir new total for this Term is: {new_total}",
            name_of(*user)
        )),
        EventResult::RandomAwarded { user, amount, new_total } => Some(format!(
            "🎲 The wheel spins and lands on {}. {amount} points out of nowhere!\nTheir new total for this Term is: {new_total}",
            name_of(*user)
        )),
        EventResult::GroupDeducted { amount, changes } => {
            let names: Vec<String> = changes.iter().map(|(u, _)| name_of(*u)).collect();
            Some(format!(
                "🎲 A draught of bad luck! {} each lose {amount} points.",
                names.join(", ")
            ))
        }
        EventResult::GroupAwarded { amount, changes } => {
            let names: Vec<String> = changes.iter().map(|(u, _)| name_of(*u)).collect();
            Some(format!(
                "🎲 Sudden generosity! {} each gain {amount} points.",
                names.join(", ")
            ))
        }
        EventResult::ModifierInstalled { modifier } => {
            let what = match modifier.kind {
                prefect_core::modifier::ModifierKind::Boost => format!(
                    "✨ A charm settles over {} {}. Points given to them count double for the next 4 hours!",
                    house_label(modifier.house),
                    modifier.house.emoji()
                ),
                prefect_core::modifier::ModifierKind::Block => format!(
                    "⛔ A hex falls on {} {}. They can earn nothing for the next 4 hours!",
                    house_label(modifier.house),
                    modifier.house.emoji()
                ),
            };
            Some(what)
        }
        EventResult::TopScorerZeroed { user, prior_total } => Some(format!(
            "💥 Hubris! {} sat atop the ladder with {prior_total} points. They now have none.",
            name_of(*user)
        )),
        EventResult::UnderdogRewarded { house, champion, amount, .. } => Some(format!(
            "🕯️ Pity for the cellar-dwellers of {} {}. Their champion {} pockets {amount} points.",
            house.display_name(),
            house.emoji(),
            name_of(*champion)
        )),
    }
}

/// The activity report.
#[must_use]
pub fn activity_board(lines: &[(String, String)], full: bool) -> String {
    let hint = if full {
        "To get the short chat activity list, use '/activity'"
    } else {
        "To get the full chat activity list, use '/activity full'"
    };
    let mut board = format!("Activity List:\n\n{hint}\n\n");
    for (ago, name) in lines {
        board.push_str(&format!("{ago} : {name}\n"));
    }
    board
}

/// Notice when everyone has been active recently.
#[must_use]
pub fn everyone_active() -> String {
    "It's a busy little group! Everybody has been active in the last 2 days. If you want the full chat list, use '/activity full'".to_string()
}

fn house_label(house: House) -> &'static str {
    match house {
        House::Unaffiliated => "the unsorted",
        other => other.display_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verse_names_the_house() {
        let text = sorting_verse(House::Ravenclaw);
        assert!(text.contains("Ravenclaw"));
        assert!(text.contains("🦅"));
    }

    #[test]
    fn reaction_lines_carry_both_houses_and_total() {
        let text = reaction_applied(
            "draco",
            House::Slytherin,
            "harry",
            House::Gryffindor,
            1,
            4,
            true,
        );
        assert!(text.contains("🐍"));
        assert!(text.contains("🦁"));
        assert!(text.contains("4"));
        assert!(text.contains("double"));
    }

    #[test]
    fn event_text_is_silent_for_snitch_and_noop() {
        let name = |_| "x".to_string();
        assert!(
            event_text(
                &EventResult::SnitchAnnounced {
                    award: 20,
                    expires_at: chrono::Utc::now()
                },
                name
            )
            .is_none()
        );
        assert!(event_text(&EventResult::Nothing, name).is_none());
    }

    #[test]
    fn group_event_lists_every_name() {
        use prefect_core::types::UserId;
        let text = event_text(
            &EventResult::GroupAwarded {
                amount: 5,
                changes: vec![(UserId(1), 5), (UserId(2), 5), (UserId(3), 5)],
            },
            |u| format!("user{}", u.0),
        )
        .expect("text");
        assert!(text.contains("user1"));
        assert!(text.contains("user2"));
        assert!(text.contains("user3"));
    }

    #[test]
    fn broadcast_handles_a_scoreless_term() {
        let text = rollover_broadcast(None, &[], 0);
        assert!(text.contains("Nobody earned a single point"));
    }
}
