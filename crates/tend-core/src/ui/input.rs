//! Typed prompt helpers layered on the [`Ui`] capability set.
//!
//! Commands use these instead of raw `ask` calls so that prompts carry a
//! consistent type hint suffix and unparseable replies are re-prompted
//! rather than failing the whole command.

use chrono::{DateTime, TimeZone, Utc};

use crate::ui::{Ui, UiResult};

/// Requests confirmation of something.
///
/// Use this for deciding what to do, like whether to request additional
/// information from the user.
pub async fn yes_no(ui: &dyn Ui, text: &str) -> UiResult<bool> {
    let reply = ui.ask(&format!("{text} [y to confirm]")).await?;
    Ok(reply == "y")
}

/// Requests textual input.
pub async fn string_input(ui: &dyn Ui, text: &str) -> UiResult<String> {
    ui.ask(&format!("{text} [string]:")).await
}

/// Requests a list of comma-delimited strings.
///
/// If the reply contains double commas, those delimit instead, so values
/// may themselves contain single commas.
pub async fn string_list_input(ui: &dyn Ui, text: &str) -> UiResult<Vec<String>> {
    let reply = ui.ask(&format!("{text} [list,of,strings]")).await?;
    let delimiter = if reply.contains(",,") { ",," } else { "," };
    Ok(reply.split(delimiter).map(str::to_string).collect())
}

/// Requests a boolean, re-prompting until the reply parses.
///
/// If you are looking for a confirmation prompt, use [`yes_no`] instead.
pub async fn bool_input(ui: &dyn Ui, text: &str) -> UiResult<bool> {
    loop {
        let reply = ui.ask(&format!("{text} [boolean]:")).await?;
        match reply.as_str() {
            "yes" | "true" | "t" | "1" => return Ok(true),
            "no" | "false" | "f" | "0" => return Ok(false),
            _ => ui.output(
                "Invalid input, please try again. Valid boolean expressions include: true, false, 0, 1 etc.",
            ),
        }
    }
}

/// Requests a signed integer, re-prompting until the reply parses.
pub async fn int_input(ui: &dyn Ui, text: &str) -> UiResult<i64> {
    loop {
        let reply = ui.ask(&format!("{text} [integer]:")).await?;
        match reply.trim().parse::<i64>() {
            Ok(value) => return Ok(value),
            Err(_) => ui.output(
                "Invalid input, please try again. Valid integer expressions include: 1, 12, -300 etc.",
            ),
        }
    }
}

/// Requests a full date and time over a series of prompts.
///
/// Offers a use-the-current-time shortcut first, then collects the
/// calendar components one prompt at a time.
pub async fn date_input(ui: &dyn Ui, text: &str) -> UiResult<DateTime<Utc>> {
    ui.output(&format!("{text} [date]"));
    if yes_no(ui, "Would you like to use the current time?").await? {
        return Ok(Utc::now());
    }

    loop {
        let year = int_input(ui, "Year (e.g., 2016)").await?;
        let month = int_input(ui, "Month (e.g., 1 for January)").await?;
        let day = int_input(ui, "Day [e.g., 1]").await?;
        let hour = int_input(ui, "Hour [e.g., 13]").await?;
        let minute = int_input(ui, "Minute [e.g., 59]").await?;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        if let chrono::LocalResult::Single(when) = Utc.with_ymd_and_hms(
            year as i32,
            month as u32,
            day as u32,
            hour as u32,
            minute as u32,
            0,
        ) {
            return Ok(when);
        }
        ui.warn("That is not a real date, try again");
    }
}
