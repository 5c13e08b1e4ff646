//! Board and journal rendering.
//!
//! The pure text parts (row alignment, option sorting, journal lines) are
//! separated from the serenity builder glue so they stay testable.

use crate::custom_id::{self, CustomId};
use serenity::builder::{
    CreateActionRow, CreateButton, CreateEmbed, CreateEmbedFooter, CreateSelectMenu,
    CreateSelectMenuKind, CreateSelectMenuOption,
};
use serenity::model::Timestamp;
use serenity::model::application::ButtonStyle;
use serenity::model::colour::Colour;
use tally_models::{JournalEntry, PlayerBalance};

/// Content of the message members react to for registration.
pub const REGISTRATION_PROMPT: &str = "Hier mal Emoji drauf!";

/// The registration emoji.
pub const REGISTRATION_EMOJI: &str = "💰";

const BOARD_TITLE: &str = ":moneybag: 10k in die Gildenbank!";
const BOARD_FIELD_NAME: &str = "Spieler";
const BOARD_FOOTER: &str = "/debt <Spieler> <Betrag>";
const BOARD_COLOUR: u32 = 0xF1C40F;
const SELECT_PLACEHOLDER: &str = "Select a player";
const PAID_LABEL: &str = "I paid!";

/// One line of the debt board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardRow {
    /// Player display name
    pub name: String,
    /// Current balance
    pub amount: i64,
}

/// One option of the debtor select menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectChoice {
    /// Option label, the player's display name
    pub label: String,
    /// Option value, the player's user id
    pub value: String,
}

/// Everything the board message shows, platform-free.
///
/// Rows keep the roster order (amount descending, then name); select
/// options are sorted by label.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardView {
    /// Board lines in display order
    pub rows: Vec<BoardRow>,
    /// Select menu options, sorted by label
    pub options: Vec<SelectChoice>,
}

impl BoardView {
    /// Build the view from a roster.
    pub fn from_roster(roster: &[PlayerBalance]) -> Self {
        let rows = roster
            .iter()
            .map(|entry| BoardRow {
                name: entry.name().to_string(),
                amount: entry.amount(),
            })
            .collect();
        let mut options: Vec<SelectChoice> = roster
            .iter()
            .map(|entry| SelectChoice {
                label: entry.name().to_string(),
                value: entry.player.discord_id.clone(),
            })
            .collect();
        options.sort_by(|a, b| a.label.cmp(&b.label));
        Self { rows, options }
    }
}

/// The aligned code block listing every row, or `None` for an empty board.
pub fn board_field(rows: &[BoardRow]) -> Option<String> {
    if rows.is_empty() {
        return None;
    }
    let width = rows.iter().map(|row| row.name.len()).max().unwrap_or(0);
    let mut field = String::from("```");
    for row in rows {
        let name = &row.name;
        let amount = row.amount;
        field.push_str(&format!("{name:<width$} {amount}\n"));
    }
    field.push_str("```");
    Some(field)
}

/// The board embed.
pub fn board_embed(view: &BoardView) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(BOARD_TITLE)
        .description(concat!("v", env!("CARGO_PKG_VERSION")))
        .colour(Colour::new(BOARD_COLOUR))
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new(BOARD_FOOTER));
    if let Some(field) = board_field(&view.rows) {
        embed = embed.field(BOARD_FIELD_NAME, field, false);
    }
    embed
}

/// The board components: the debtor select menu and the paid button.
/// An empty board carries no components.
pub fn board_components(view: &BoardView) -> Vec<CreateActionRow> {
    if view.options.is_empty() {
        return Vec::new();
    }
    let options = view
        .options
        .iter()
        .map(|choice| CreateSelectMenuOption::new(choice.label.clone(), choice.value.clone()))
        .collect();
    let select = CreateSelectMenu::new(
        custom_id::SELECT_DEBTOR,
        CreateSelectMenuKind::String { options },
    )
    .placeholder(SELECT_PLACEHOLDER);
    vec![
        CreateActionRow::SelectMenu(select),
        CreateActionRow::Buttons(vec![
            CreateButton::new(custom_id::PAID)
                .label(PAID_LABEL)
                .style(ButtonStyle::Primary),
        ]),
    ]
}

/// Cancel and confirm buttons for the ephemeral charge prompt.
pub fn confirm_components(user_id: &str, token: &str) -> Vec<CreateActionRow> {
    vec![CreateActionRow::Buttons(vec![
        CreateButton::new(CustomId::cancel(user_id, token).to_string())
            .label("Cancel")
            .style(ButtonStyle::Secondary),
        CreateButton::new(CustomId::confirm(user_id, token).to_string())
            .label("Confirm")
            .style(ButtonStyle::Danger),
    ])]
}

/// The aligned code block listing a journal window, newest entry first.
pub fn journal_block(entries: &[JournalEntry]) -> String {
    let width = entries
        .iter()
        .map(|entry| entry.amount.to_string().len())
        .max()
        .unwrap_or(0);
    let mut block = String::from("```");
    for entry in entries {
        let amount = entry.amount;
        let recorded = entry.recorded_at.format("%Y-%m-%d %H:%M:%S");
        block.push_str(&format!(
            "{amount:<width$} || {} || {recorded}\n",
            entry.description
        ));
    }
    block.push_str("```");
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tally_models::{Debt, Player};

    fn balance(id: i32, name: &str, amount: i64) -> PlayerBalance {
        PlayerBalance {
            player: Player {
                id,
                discord_id: format!("user-{id}"),
                discord_name: name.to_lowercase(),
                guild_id: "guild-1".to_string(),
                name: name.to_string(),
                created_at: Default::default(),
            },
            debt: Debt {
                id,
                player_id: id,
                amount,
                last_updated: Default::default(),
            },
        }
    }

    #[test]
    fn board_rows_are_padded_to_the_longest_name() {
        let rows = vec![
            BoardRow {
                name: "Torfstack".to_string(),
                amount: 70_000,
            },
            BoardRow {
                name: "Bo".to_string(),
                amount: 500,
            },
        ];

        let field = board_field(&rows).unwrap();

        assert_eq!(field, "```Torfstack 70000\nBo        500\n```");
    }

    #[test]
    fn empty_board_has_no_field_and_no_components() {
        assert_eq!(board_field(&[]), None);
        assert!(board_components(&BoardView::default()).is_empty());
    }

    #[test]
    fn options_are_sorted_by_label_while_rows_keep_roster_order() {
        let roster = vec![
            balance(1, "Zoe", 50_000),
            balance(2, "Anna", 20_000),
            balance(3, "Mia", 20_000),
        ];

        let view = BoardView::from_roster(&roster);

        let row_names: Vec<&str> = view.rows.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(row_names, vec!["Zoe", "Anna", "Mia"]);
        let labels: Vec<&str> = view.options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Anna", "Mia", "Zoe"]);
        assert_eq!(view.options[0].value, "user-2");
    }

    #[test]
    fn journal_lines_align_amounts_and_keep_descriptions() {
        let recorded = NaiveDate::from_ymd_opt(2024, 7, 14)
            .unwrap()
            .and_hms_opt(20, 15, 0)
            .unwrap();
        let entries = vec![
            JournalEntry {
                id: 2,
                player_id: 1,
                amount: 60_000,
                description: "Boss reset fail :(".to_string(),
                recorded_at: recorded,
            },
            JournalEntry {
                id: 1,
                player_id: 1,
                amount: 500,
                description: "Trash-AFK".to_string(),
                recorded_at: recorded,
            },
        ];

        let block = journal_block(&entries);

        assert_eq!(
            block,
            "```60000 || Boss reset fail :( || 2024-07-14 20:15:00\n\
             500   || Trash-AFK || 2024-07-14 20:15:00\n```"
        );
    }
}
