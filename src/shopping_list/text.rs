use std::fmt::Write;

use crate::constants::SHOPPING_LIST_TITLE;

use super::aggregate::ShoppingList;

pub fn render_text(list: &ShoppingList) -> String {
    let mut text = format!("{SHOPPING_LIST_TITLE}\n");
    for entry in &list.entries {
        // Writing into a String can not fail.
        let _ = writeln!(
            text,
            "- {} - {} {}",
            entry.name, entry.amount, entry.measurement_unit
        );
    }
    text
}
