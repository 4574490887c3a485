//! DBF `FieldValue` <-> `AttrValue`

use chrono::{Datelike, NaiveDate};
use shapefile::dbase::{self, FieldValue};

use crate::domain::{AttrValue, FieldType};

/// Attribute value of a DBF cell; empty cells become `Null`
#[allow(unreachable_patterns)]
pub fn to_attr(value: &FieldValue) -> AttrValue {
    match value {
        FieldValue::Character(Some(text)) => AttrValue::Text(text.clone()),
        FieldValue::Memo(text) => AttrValue::Text(text.clone()),
        FieldValue::Numeric(Some(n)) => AttrValue::Number(*n),
        FieldValue::Float(Some(f)) => AttrValue::Number(f64::from(*f)),
        FieldValue::Integer(i) => AttrValue::Number(f64::from(*i)),
        FieldValue::Double(d) | FieldValue::Currency(d) => AttrValue::Number(*d),
        FieldValue::Logical(Some(b)) => AttrValue::Bool(*b),
        FieldValue::Date(Some(date)) => from_dbase_date(date),
        // time of day is dropped
        FieldValue::DateTime(datetime) => from_dbase_date(&datetime.date()),
        _ => AttrValue::Null,
    }
}

fn from_dbase_date(date: &dbase::Date) -> AttrValue {
    NaiveDate::from_ymd_opt(date.year() as i32, date.month(), date.day())
        .map(AttrValue::Date)
        .unwrap_or(AttrValue::Null)
}

/// DBF cell for `value` in a column of type `ty`
///
/// Values that do not fit the column are written empty. Untyped columns are
/// treated as text.
pub fn to_field_value(value: &AttrValue, ty: Option<FieldType>) -> FieldValue {
    match ty {
        None | Some(FieldType::Text { .. }) => FieldValue::Character(value.render()),
        Some(FieldType::Number { .. }) => FieldValue::Numeric(value.as_number()),
        Some(FieldType::Bool) => FieldValue::Logical(match value {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }),
        Some(FieldType::Date) => FieldValue::Date(match value {
            AttrValue::Date(d) if d.year() >= 0 => {
                Some(dbase::Date::new(d.day(), d.month(), d.year() as u32))
            }
            _ => None,
        }),
    }
}
