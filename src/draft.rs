use crate::error::AppError;
use crate::types::{Ingredient, NewRecipePayload};

/// Prefix shared by every ingredient field of the submission form.
pub const INGREDIENT_FIELD_PREFIX: &str = "ingredient";

/// The submission form as typed by the user: named fields plus any number of
/// `ingredient*` fields holding `quantity,unit,description` text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeDraft {
    pub title: String,
    pub source_url: String,
    pub image: String,
    pub publisher: String,
    pub cooking_time: String,
    pub servings: String,
    /// `(field name, raw text)` in form order.
    pub ingredients: Vec<(String, String)>,
}

impl RecipeDraft {
    /// Build a draft from `(name, value)` pairs in form order. Unknown fields
    /// are ignored; blank ingredient fields are dropped.
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut draft = RecipeDraft::default();
        for (name, value) in fields {
            let name = name.as_ref().trim();
            let value: String = value.into();
            match name {
                "title" => draft.title = value,
                "sourceUrl" => draft.source_url = value,
                "image" => draft.image = value,
                "publisher" => draft.publisher = value,
                "cookingTime" => draft.cooking_time = value,
                "servings" => draft.servings = value,
                n if n.starts_with(INGREDIENT_FIELD_PREFIX) => {
                    if !value.trim().is_empty() {
                        draft.ingredients.push((n.to_string(), value));
                    }
                }
                other => tracing::debug!("ignoring unknown form field {other}"),
            }
        }
        draft
    }

    /// Validate every field and produce the body sent to the API.
    pub fn to_payload(&self) -> Result<NewRecipePayload, AppError> {
        let ingredients = self
            .ingredients
            .iter()
            .map(|(field, line)| parse_ingredient_line(field, line))
            .collect::<Result<Vec<_>, _>>()?;

        let servings = parse_whole(&self.servings, "servings")?;
        if servings == 0 {
            return Err(AppError::Format {
                field: "servings".into(),
                line: self.servings.clone(),
            });
        }

        Ok(NewRecipePayload {
            title: self.title.trim().to_string(),
            source_url: self.source_url.trim().to_string(),
            image_url: self.image.trim().to_string(),
            publisher: self.publisher.trim().to_string(),
            cooking_time: parse_whole(&self.cooking_time, "cookingTime")?,
            servings,
            ingredients,
        })
    }
}

fn parse_whole(raw: &str, field: &str) -> Result<u32, AppError> {
    raw.trim().parse::<u32>().map_err(|_| AppError::Format {
        field: field.to_string(),
        line: raw.to_string(),
    })
}

/// Parse one `quantity,unit,description` line. Exactly three comma-separated
/// tokens, each trimmed; a blank quantity means "no quantity".
pub fn parse_ingredient_line(field: &str, line: &str) -> Result<Ingredient, AppError> {
    let format_error = || AppError::Format {
        field: field.to_string(),
        line: line.to_string(),
    };

    let tokens: Vec<&str> = line.split(',').map(str::trim).collect();
    let &[quantity, unit, description] = tokens.as_slice() else {
        return Err(format_error());
    };

    let quantity = if quantity.is_empty() {
        None
    } else {
        let q: f64 = quantity.parse().map_err(|_| format_error())?;
        if !q.is_finite() {
            return Err(format_error());
        }
        Some(q)
    };

    Ok(Ingredient {
        quantity,
        unit: unit.to_string(),
        description: description.to_string(),
    })
}
