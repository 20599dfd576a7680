//! Payload validation
//!
//! Turns a raw `ItemInput` into a `NewItem` or `ItemPatch`, enforcing the
//! item contract. The store never re-validates what comes out of here.

use crate::item::{ItemInput, ItemPatch, NewItem};
use crate::{Error, Result};

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 50;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Validate a create payload. `name` is required.
pub fn validate_new(input: ItemInput) -> Result<NewItem> {
    let name = input.name.ok_or_else(|| invalid("\"name\" is required"))?;
    check_name(&name)?;
    check_optional_fields(&input.description, input.price, &input.category)?;

    Ok(NewItem {
        name,
        description: input.description,
        price: input.price,
        category: input.category,
    })
}

/// Validate an update payload. Every field is optional, present fields obey
/// the same rules as on create.
pub fn validate_patch(input: ItemInput) -> Result<ItemPatch> {
    if let Some(name) = &input.name {
        check_name(name)?;
    }
    check_optional_fields(&input.description, input.price, &input.category)?;

    Ok(ItemPatch {
        name: input.name,
        description: input.description,
        price: input.price,
        category: input.category,
    })
}

fn check_name(name: &str) -> Result<()> {
    let len = name.chars().count();
    if len == 0 {
        return Err(invalid("\"name\" is not allowed to be empty"));
    }
    if len < NAME_MIN_CHARS {
        return Err(invalid(format!(
            "\"name\" length must be at least {} characters long",
            NAME_MIN_CHARS
        )));
    }
    if len > NAME_MAX_CHARS {
        return Err(invalid(format!(
            "\"name\" length must be less than or equal to {} characters long",
            NAME_MAX_CHARS
        )));
    }
    Ok(())
}

fn check_optional_fields(
    description: &Option<String>,
    price: Option<f64>,
    category: &Option<String>,
) -> Result<()> {
    if let Some(description) = description {
        if description.is_empty() {
            return Err(invalid("\"description\" is not allowed to be empty"));
        }
        if description.chars().count() > DESCRIPTION_MAX_CHARS {
            return Err(invalid(format!(
                "\"description\" length must be less than or equal to {} characters long",
                DESCRIPTION_MAX_CHARS
            )));
        }
    }

    if let Some(price) = price {
        if !price.is_finite() {
            return Err(invalid("\"price\" must be a number"));
        }
        if price < 0.0 {
            return Err(invalid("\"price\" must be greater than or equal to 0"));
        }
    }

    if let Some(category) = category {
        if category.is_empty() {
            return Err(invalid("\"category\" is not allowed to be empty"));
        }
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> Error {
    Error::Validation(message.into())
}
