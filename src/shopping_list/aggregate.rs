use std::collections::BTreeMap;

use serde::Serialize;

use crate::schema::CartLine;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingListEntry {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// Total amount of every distinct (ingredient name, unit) in a cart,
/// sorted by name and then unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShoppingList {
    pub entries: Vec<ShoppingListEntry>,
}

impl ShoppingList {
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = CartLine>,
    {
        let totals = lines.into_iter().fold(
            BTreeMap::<(String, String), i64>::new(),
            |mut totals, line| {
                *totals
                    .entry((line.name, line.measurement_unit))
                    .or_default() += i64::from(line.amount);
                totals
            },
        );

        let entries = totals
            .into_iter()
            .map(|((name, measurement_unit), amount)| ShoppingListEntry {
                name,
                measurement_unit,
                amount,
            })
            .collect();

        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
