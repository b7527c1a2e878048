use time::OffsetDateTime;

use crate::{include_res, res};

use super::{is_mine, Round};

fn day(at: OffsetDateTime) -> String {
    at.date().to_string()
}

pub(crate) fn inbox_item(round: &Round) -> String {
    include_res!(str, "/pages/rounds/inbox_item.html")
        .replace("{id}", &round.id.to_string())
        .replace("{room_id}", &round.room_id.to_string())
        .replace("{created_at}", &day(round.created_at))
        .replace("{question_sender}", &res::escape(&round.question_sender))
        .replace("{question}", &res::markdown(&round.question_text))
}

pub(crate) fn sent_item(round: &Round) -> String {
    include_res!(str, "/pages/rounds/sent_item.html")
        .replace("{id}", &round.id.to_string())
        .replace("{question}", &res::markdown(&round.question_text))
}

/// Who asked and who answered, told from the viewer's side.
pub(crate) fn history_item(round: &Round, viewer: &str) -> String {
    let answer_sender = round.answer_sender.as_deref().unwrap_or_default();

    let (asked_label, answered_label) = if is_mine(&round.question_sender, viewer) {
        ("You asked".to_owned(), format!("{} answered", res::escape(answer_sender)))
    } else if is_mine(answer_sender, viewer) {
        (format!("{} asked", res::escape(&round.question_sender)), "You answered".to_owned())
    } else {
        (
            format!("{} asked", res::escape(&round.question_sender)),
            format!("{} answered", res::escape(answer_sender)),
        )
    };

    include_res!(str, "/pages/rounds/history_item.html")
        .replace("{id}", &round.id.to_string())
        .replace("{created_at}", &day(round.created_at))
        .replace("{answered_at}", &round.answered_at.map(day).unwrap_or_default())
        .replace("{asked_label}", &asked_label)
        .replace("{answered_label}", &answered_label)
        .replace("{question}", &res::markdown(&round.question_text))
        .replace("{answer}", &res::markdown(round.answer_text.as_deref().unwrap_or_default()))
}
