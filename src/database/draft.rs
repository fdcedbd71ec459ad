use std::collections::HashSet;

use serde_json::Value;

use super::{
    error::ValidationError,
    form::{parse_integer, Form},
    schema::Id,
};
use crate::constants::RECIPE_NAME_MAX_LENGTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientAmount {
    pub id: Id,
    pub amount: i32,
}

/// Everything a caller submits to create or replace a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub image: Option<String>,
    pub tags: Vec<Id>,
    pub ingredients: Vec<IngredientAmount>,
}

impl RecipeDraft {
    /// Checks the draft before anything is written.
    ///
    /// A repeated ingredient is reported even when amounts are also invalid,
    /// then amounts, then the tag set, then the scalar fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::with_capacity(self.ingredients.len());
        for ingredient in &self.ingredients {
            if !seen.insert(ingredient.id) {
                return Err(ValidationError::DuplicateIngredient(ingredient.id));
            }
        }

        if self.ingredients.iter().any(|ingredient| ingredient.amount < 1) {
            return Err(ValidationError::InvalidQuantity);
        }

        if self.tags.is_empty() {
            return Err(ValidationError::TagsRequired);
        }

        if self.name.trim().is_empty() {
            return Err(ValidationError::field("name", "This field may not be blank."));
        }
        if self.name.chars().count() > RECIPE_NAME_MAX_LENGTH {
            return Err(ValidationError::field(
                "name",
                format!("Ensure this field has no more than {RECIPE_NAME_MAX_LENGTH} characters."),
            ));
        }
        if self.text.trim().is_empty() {
            return Err(ValidationError::field("text", "This field may not be blank."));
        }
        if self.cooking_time < 1 {
            return Err(ValidationError::field(
                "cooking_time",
                "Ensure this value is greater than or equal to 1.",
            ));
        }

        Ok(())
    }

    /// Tag ids in submission order with repeats dropped.
    pub fn unique_tags(&self) -> Vec<Id> {
        let mut seen = HashSet::with_capacity(self.tags.len());
        self.tags
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

impl TryFrom<Form> for RecipeDraft {
    type Error = ValidationError;

    fn try_from(form: Form) -> Result<Self, Self::Error> {
        let name = form.get_str("name")?;
        let text = form.get_str("text")?;
        let cooking_time = to_i32("cooking_time", form.get_number("cooking_time")?)?;
        let image = form.get_optional_str("image")?;

        let tags = form
            .get_list("tags")?
            .iter()
            .map(|value| {
                parse_integer(value)
                    .ok_or_else(|| ValidationError::field("tags", "Incorrect type. Expected pk value."))
                    .and_then(|id| to_i32("tags", id))
            })
            .collect::<Result<Vec<Id>, _>>()?;

        let ingredients = form
            .get_list("ingredients")?
            .iter()
            .map(ingredient_amount)
            .collect::<Result<Vec<IngredientAmount>, _>>()?;

        Ok(Self {
            name,
            text,
            cooking_time,
            image,
            tags,
            ingredients,
        })
    }
}

impl TryFrom<Value> for RecipeDraft {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Form::from_value(value)?.try_into()
    }
}

fn ingredient_amount(value: &Value) -> Result<IngredientAmount, ValidationError> {
    let invalid = || ValidationError::field("ingredients", "Each ingredient needs an id and an amount.");

    let object = value.as_object().ok_or_else(invalid)?;
    let id = object.get("id").and_then(parse_integer).ok_or_else(invalid)?;
    let amount = object.get("amount").and_then(parse_integer).ok_or_else(invalid)?;

    Ok(IngredientAmount {
        id: to_i32("ingredients", id)?,
        // Below i32::MIN still fails validation as a non-positive amount.
        amount: to_i32("ingredients", amount.max(i64::from(i32::MIN)))?,
    })
}

fn to_i32(field: &str, value: i64) -> Result<i32, ValidationError> {
    i32::try_from(value).map_err(|_| ValidationError::field(field, "Ensure this value fits in 32 bits."))
}
