// SPDX-License-Identifier: MIT

//! Built-in validators for the catalog's constraint kinds
//!
//! All of them except `NotNull`, `NotEmpty` and `NotBlank` treat `null` as
//! valid; rejecting null is `NotNull`'s job.

use crate::host::decimal::Decimal;
use crate::host::registry::ValidatorRegistry;
use crate::host::validator::{ConstraintValidator, ValidationContext, ValidatorBinding};
use crate::host::{ActualConstraintSpec, ValueType};
use regex::Regex;
use serde_json::Value;

/// Register every built-in binding. Order within a kind is resolution order.
pub fn register_all(registry: &ValidatorRegistry) {
    registry.register(
        "Null",
        ValidatorBinding::new("NullValidator", ValueType::Any, || {
            Box::new(NullValidator { expect_null: true })
        }),
    );
    registry.register(
        "NotNull",
        ValidatorBinding::new("NotNullValidator", ValueType::Any, || {
            Box::new(NullValidator { expect_null: false })
        }),
    );
    registry.register(
        "AssertTrue",
        ValidatorBinding::new("AssertTrueValidator", ValueType::Boolean, || {
            Box::new(AssertValidator { expected: true })
        }),
    );
    registry.register(
        "AssertFalse",
        ValidatorBinding::new("AssertFalseValidator", ValueType::Boolean, || {
            Box::new(AssertValidator { expected: false })
        }),
    );

    for (kind, direction, decimal) in [
        ("Min", Direction::Min, false),
        ("Max", Direction::Max, false),
        ("DecimalMin", Direction::Min, true),
        ("DecimalMax", Direction::Max, true),
    ] {
        registry.register(
            kind,
            ValidatorBinding::new(format!("{}ValidatorForNumber", kind), ValueType::Number, move || {
                Box::new(BoundValidator::new(direction, decimal, false))
            }),
        );
        registry.register(
            kind,
            ValidatorBinding::new(format!("{}ValidatorForText", kind), ValueType::Text, move || {
                Box::new(BoundValidator::new(direction, decimal, true))
            }),
        );
    }

    for accepts in [ValueType::Text, ValueType::Sequence, ValueType::Map] {
        let suffix = accepts.to_string();
        registry.register(
            "Size",
            ValidatorBinding::new(format!("SizeValidatorFor{}", suffix), accepts.clone(), || {
                Box::new(SizeValidator::default())
            }),
        );
        registry.register(
            "NotEmpty",
            ValidatorBinding::new(format!("NotEmptyValidatorFor{}", suffix), accepts, || {
                Box::new(NotEmptyValidator)
            }),
        );
    }

    registry.register(
        "NotBlank",
        ValidatorBinding::new("NotBlankValidator", ValueType::Text, || {
            Box::new(NotBlankValidator)
        }),
    );
    registry.register(
        "Pattern",
        ValidatorBinding::new("PatternValidator", ValueType::Text, || {
            Box::new(PatternValidator { regex: None })
        }),
    );
    registry.register(
        "Isbn10",
        ValidatorBinding::new("Isbn10Validator", ValueType::Text, || Box::new(Isbn10Validator)),
    );
    registry.register(
        "Directory",
        ValidatorBinding::new("DirectoryValidator", ValueType::Path, || {
            Box::new(DirectoryValidator)
        }),
    );
}

struct NullValidator {
    expect_null: bool,
}

impl ConstraintValidator for NullValidator {
    fn initialize(&mut self, _constraint: &ActualConstraintSpec) -> Result<(), String> {
        Ok(())
    }

    fn is_valid(&self, value: &Value, _context: &mut ValidationContext) -> bool {
        value.is_null() == self.expect_null
    }
}

struct AssertValidator {
    expected: bool,
}

impl ConstraintValidator for AssertValidator {
    fn initialize(&mut self, _constraint: &ActualConstraintSpec) -> Result<(), String> {
        Ok(())
    }

    fn is_valid(&self, value: &Value, _context: &mut ValidationContext) -> bool {
        match value {
            Value::Null => true,
            other => other.as_bool() == Some(self.expected),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Min,
    Max,
}

/// Min, Max, DecimalMin and DecimalMax over numbers or numeric text
struct BoundValidator {
    direction: Direction,
    decimal: bool,
    text: bool,
    bound: Decimal,
    inclusive: bool,
}

impl BoundValidator {
    fn new(direction: Direction, decimal: bool, text: bool) -> Self {
        Self {
            direction,
            decimal,
            text,
            bound: Decimal::from(0),
            inclusive: true,
        }
    }
}

impl ConstraintValidator for BoundValidator {
    fn initialize(&mut self, constraint: &ActualConstraintSpec) -> Result<(), String> {
        if self.decimal {
            let raw = constraint
                .str_attribute("value")
                .ok_or("attribute \"value\" must be a string")?;
            self.bound = Decimal::parse(raw)
                .ok_or_else(|| format!("\"{}\" does not represent a valid decimal", raw))?;
            self.inclusive = constraint.bool_attribute("inclusive").unwrap_or(true);
        } else {
            let value = constraint
                .i64_attribute("value")
                .ok_or("attribute \"value\" must be an integer")?;
            self.bound = Decimal::from(value);
        }
        Ok(())
    }

    fn is_valid(&self, value: &Value, _context: &mut ValidationContext) -> bool {
        let number = match value {
            Value::Null => return true,
            Value::Number(n) if !self.text => Decimal::from_number(n),
            Value::String(s) if self.text => Decimal::parse(s),
            _ => None,
        };
        let Some(number) = number else {
            return false;
        };

        let ordering = number.cmp(&self.bound);
        match (self.direction, self.inclusive) {
            (Direction::Min, true) => ordering.is_ge(),
            (Direction::Min, false) => ordering.is_gt(),
            (Direction::Max, true) => ordering.is_le(),
            (Direction::Max, false) => ordering.is_lt(),
        }
    }
}

fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => Some(map.len()),
        _ => None,
    }
}

#[derive(Default)]
struct SizeValidator {
    min: usize,
    max: usize,
}

impl ConstraintValidator for SizeValidator {
    fn initialize(&mut self, constraint: &ActualConstraintSpec) -> Result<(), String> {
        let min = constraint.i64_attribute("min").unwrap_or(0);
        let max = constraint.i64_attribute("max").unwrap_or(i32::MAX as i64);
        if min < 0 {
            return Err("the min parameter cannot be negative".to_string());
        }
        if max < min {
            return Err("the length cannot be negative".to_string());
        }
        self.min = min as usize;
        self.max = max as usize;
        Ok(())
    }

    fn is_valid(&self, value: &Value, _context: &mut ValidationContext) -> bool {
        if value.is_null() {
            return true;
        }
        length_of(value)
            .map(|len| len >= self.min && len <= self.max)
            .unwrap_or(false)
    }
}

struct NotEmptyValidator;

impl ConstraintValidator for NotEmptyValidator {
    fn initialize(&mut self, _constraint: &ActualConstraintSpec) -> Result<(), String> {
        Ok(())
    }

    fn is_valid(&self, value: &Value, _context: &mut ValidationContext) -> bool {
        length_of(value).map(|len| len > 0).unwrap_or(false)
    }
}

struct NotBlankValidator;

impl ConstraintValidator for NotBlankValidator {
    fn initialize(&mut self, _constraint: &ActualConstraintSpec) -> Result<(), String> {
        Ok(())
    }

    fn is_valid(&self, value: &Value, _context: &mut ValidationContext) -> bool {
        value
            .as_str()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    }
}

struct PatternValidator {
    regex: Option<Regex>,
}

impl ConstraintValidator for PatternValidator {
    fn initialize(&mut self, constraint: &ActualConstraintSpec) -> Result<(), String> {
        let raw = constraint
            .str_attribute("regexp")
            .ok_or("attribute \"regexp\" must be a string")?;
        // Whole-value match
        let regex = Regex::new(&format!("^(?:{})$", raw))
            .map_err(|e| format!("invalid regular expression \"{}\": {}", raw, e))?;
        self.regex = Some(regex);
        Ok(())
    }

    fn is_valid(&self, value: &Value, _context: &mut ValidationContext) -> bool {
        match (value, &self.regex) {
            (Value::Null, _) => true,
            (Value::String(s), Some(regex)) => regex.is_match(s),
            _ => false,
        }
    }
}

struct Isbn10Validator;

impl Isbn10Validator {
    fn check_digit_ok(code: &str) -> bool {
        if code.chars().count() != 10 {
            return false;
        }
        let mut sum = 0u32;
        for (i, c) in code.chars().enumerate() {
            let digit = match c {
                'X' | 'x' if i == 9 => 10,
                c => match c.to_digit(10) {
                    Some(d) => d,
                    None => return false,
                },
            };
            sum += digit * (10 - i as u32);
        }
        sum % 11 == 0
    }
}

impl ConstraintValidator for Isbn10Validator {
    fn initialize(&mut self, _constraint: &ActualConstraintSpec) -> Result<(), String> {
        Ok(())
    }

    fn is_valid(&self, value: &Value, _context: &mut ValidationContext) -> bool {
        match value {
            Value::Null => true,
            Value::String(s) => Self::check_digit_ok(s),
            _ => false,
        }
    }
}

struct DirectoryValidator;

impl ConstraintValidator for DirectoryValidator {
    fn initialize(&mut self, _constraint: &ActualConstraintSpec) -> Result<(), String> {
        Ok(())
    }

    fn is_valid(&self, value: &Value, _context: &mut ValidationContext) -> bool {
        match value {
            Value::Null => true,
            Value::String(path) => std::path::Path::new(path).is_dir(),
            _ => false,
        }
    }
}
