//! Pure slot-type compatibility and dynamic-type resolution.
//!
//! Nothing in here mutates state; the lifecycle controller decides what to
//! do with the answers. Self-loops are rejected upstream and never reach
//! these functions.

use super::{DataType, SlotInfo};

/// Match category treated as STRING-compatible source code.
pub const CATEGORY_CODE: &str = "code";
/// Match category for enum-option selector slots.
pub const CATEGORY_ENUM_OPTION: &str = "enum-option";

/// Decides whether an output slot may connect to an input slot.
///
/// Rules in priority order:
/// 1. A WILDCARD side is compatible with anything except CONVERTIBLE_ANY
///    (the wildcard defers; a placeholder has nothing concrete to defer to).
/// 2. A CONVERTIBLE_ANY side is compatible with anything except WILDCARD,
///    including another CONVERTIBLE_ANY.
/// 3. Concrete comparison: any shared match category, exact type equality,
///    or an entry in the fixed widening table.
pub fn is_compatible(source: &SlotInfo, target: &SlotInfo) -> bool {
    let s = source.data_type;
    let t = target.data_type;

    if (s.is_wildcard() && !t.is_convertible()) || (t.is_wildcard() && !s.is_convertible()) {
        return true;
    }
    if (s.is_convertible() && !t.is_wildcard()) || (t.is_convertible() && !s.is_wildcard()) {
        return true;
    }

    concrete_compatible(source, target)
}

fn concrete_compatible(source: &SlotInfo, target: &SlotInfo) -> bool {
    if source
        .categories
        .iter()
        .any(|category| target.has_category(category))
    {
        return true;
    }
    if source.data_type == target.data_type {
        return true;
    }
    if widens(source.data_type, target.data_type) {
        return true;
    }
    // STRING slots interoperate with code- and enum-option-tagged slots in
    // both directions.
    if source.data_type == DataType::String
        && (target.has_category(CATEGORY_CODE) || target.has_category(CATEGORY_ENUM_OPTION))
    {
        return true;
    }
    if target.data_type == DataType::String
        && (source.has_category(CATEGORY_CODE) || source.has_category(CATEGORY_ENUM_OPTION))
    {
        return true;
    }
    false
}

/// The fixed widening table: integers flow into floats, and the three
/// scalar types flow into strings.
fn widens(source: DataType, target: DataType) -> bool {
    matches!(
        (source, target),
        (DataType::Integer, DataType::Float)
            | (DataType::Integer, DataType::String)
            | (DataType::Float, DataType::String)
            | (DataType::Boolean, DataType::String)
    )
}

/// Effective types of both endpoints once dynamic behavior is accounted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTypes {
    pub source_type: DataType,
    pub target_type: DataType,
}

/// Computes the effective type each side presents after connecting.
///
/// A CONVERTIBLE_ANY side adopts the concrete peer's type (this is what
/// propagation later writes back structurally). A WILDCARD side adopts the
/// peer's type for display and edge styling only; it never changes
/// structurally, which is why this function is pure and the propagation
/// step re-checks placeholder state itself.
pub fn resolve_dynamic_type(source: &SlotInfo, target: &SlotInfo) -> ResolvedTypes {
    let mut source_type = source.data_type;
    let mut target_type = target.data_type;

    if source_type.is_convertible() && !target_type.is_behavioral() {
        source_type = target_type;
    } else if target_type.is_convertible() && !source_type.is_behavioral() {
        target_type = source_type;
    }

    if source_type.is_wildcard() && !target_type.is_behavioral() {
        source_type = target_type;
    } else if target_type.is_wildcard() && !source_type.is_behavioral() {
        target_type = source_type;
    }

    ResolvedTypes {
        source_type,
        target_type,
    }
}
