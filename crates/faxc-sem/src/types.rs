//! The type lattice checked against the operator compatibility rules.
//!
//! `Ty` mirrors the fifteen basic type keywords the parser recognizes
//! (`faxc_par::BasicTypeName`) plus two checker-internal markers: `Array`
//! and `Tuple` cover the non-basic type annotations, and `Invalid` is the
//! result of an already-reported mismatch (propagated so one bad
//! expression doesn't cascade into unrelated errors).
//!
//! `integer` and `decimal` are accepted by the grammar as type keywords
//! but are treated as numeric synonyms of `Number` (see `DESIGN.md`).
//! `object` is treated as an opaque type compatible only with itself.

use faxc_par::BasicTypeName;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    Object,
    /// Function return type with no value ("none"/"void").
    None,
    Char,
    Character,
    String,
    Number,
    Bool,
    Tribool,
    Bit,
    Byte,
    Word,
    Dword,
    /// Array of some element type isn't tracked precisely by this checker;
    /// array-typed declarations are accepted structurally (spec leaves
    /// array element-type checking outside the operator table).
    Array,
    Tuple,
    /// The result of an already-reported error; compatible with nothing
    /// so it never triggers a second, misleading diagnostic.
    Invalid,
}

impl Ty {
    pub fn from_basic(name: BasicTypeName) -> Ty {
        match name {
            BasicTypeName::Object => Ty::Object,
            BasicTypeName::None | BasicTypeName::Void => Ty::None,
            BasicTypeName::Char => Ty::Char,
            BasicTypeName::Character => Ty::Character,
            BasicTypeName::String => Ty::String,
            BasicTypeName::Number | BasicTypeName::Integer | BasicTypeName::Decimal => Ty::Number,
            BasicTypeName::Bool => Ty::Bool,
            BasicTypeName::Tribool => Ty::Tribool,
            BasicTypeName::Bit => Ty::Bit,
            BasicTypeName::Byte => Ty::Byte,
            BasicTypeName::Word => Ty::Word,
            BasicTypeName::Dword => Ty::Dword,
        }
    }

    pub fn from_ast(ty: &faxc_par::Type) -> Ty {
        match ty {
            faxc_par::Type::Basic(name, _) => Ty::from_basic(*name),
            faxc_par::Type::Array(_) => Ty::Array,
            faxc_par::Type::Tuple(_) => Ty::Tuple,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Ty::Object => "object",
            Ty::None => "none",
            Ty::Char => "char",
            Ty::Character => "character",
            Ty::String => "string",
            Ty::Number => "number",
            Ty::Bool => "bool",
            Ty::Tribool => "tribool",
            Ty::Bit => "bit",
            Ty::Byte => "byte",
            Ty::Word => "word",
            Ty::Dword => "dword",
            Ty::Array => "array",
            Ty::Tuple => "tuple",
            Ty::Invalid => "<invalid>",
        }
    }
}

impl std::fmt::Display for Ty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// `is_numeric_type(T) = T ∈ {NUMBER}`.
pub fn is_numeric_type(t: Ty) -> bool {
    matches!(t, Ty::Number)
}

/// `is_numeric_convertible(T) = T ∈ {NUMBER, BYTE, WORD}`.
pub fn is_numeric_convertible(t: Ty) -> bool {
    matches!(t, Ty::Number | Ty::Byte | Ty::Word)
}

/// `is_bit_type(T) = T ∈ {BIT, BYTE, WORD, DWORD}`.
pub fn is_bit_type(t: Ty) -> bool {
    matches!(t, Ty::Bit | Ty::Byte | Ty::Word | Ty::Dword)
}

/// `is_ordered_type(T) = is_numeric_type(T) ∨ T ∈ {CHAR, CHARACTER, STRING}`.
pub fn is_ordered_type(t: Ty) -> bool {
    is_numeric_type(t) || matches!(t, Ty::Char | Ty::Character | Ty::String)
}

/// `is_string_convertible(T) = T ∈ {STRING, CHAR, CHARACTER, NUMBER, BOOL, BYTE, WORD}`.
pub fn is_string_convertible(t: Ty) -> bool {
    matches!(
        t,
        Ty::String | Ty::Char | Ty::Character | Ty::Number | Ty::Bool | Ty::Byte | Ty::Word
    )
}

/// `is_comparable_type(L,R) = L=R ∨ (numeric∧numeric) ∨ (L,R ∈ {CHAR,CHARACTER})`.
pub fn is_comparable_type(l: Ty, r: Ty) -> bool {
    l == r
        || (is_numeric_type(l) && is_numeric_type(r))
        || (matches!(l, Ty::Char | Ty::Character) && matches!(r, Ty::Char | Ty::Character))
}

/// `is_compatible_type(L,R) = L=R ∨ (numeric∧numeric)`.
///
/// This is the predicate direct-assignment contexts use; `CHAR`/`CHARACTER`
/// are *not* interchangeable here even though `can_implicit_convert` allows
/// it for initializers (see `DESIGN.md`).
pub fn is_compatible_type(l: Ty, r: Ty) -> bool {
    l == r || (is_numeric_type(l) && is_numeric_type(r))
}

/// `common_type(L,R)`: equal types return themselves; both
/// numeric-convertible promote to the widest of `{BYTE, WORD, NUMBER}`;
/// one string and the other string-convertible yields `STRING`; both char
/// kinds yield `CHARACTER`; otherwise `INVALID`.
pub fn common_type(l: Ty, r: Ty) -> Ty {
    if l == r {
        return l;
    }
    if is_numeric_convertible(l) && is_numeric_convertible(r) {
        return widest_numeric(l, r);
    }
    if (l == Ty::String && is_string_convertible(r)) || (r == Ty::String && is_string_convertible(l)) {
        return Ty::String;
    }
    if matches!(l, Ty::Char | Ty::Character) && matches!(r, Ty::Char | Ty::Character) {
        return Ty::Character;
    }
    Ty::Invalid
}

fn widest_numeric(l: Ty, r: Ty) -> Ty {
    fn rank(t: Ty) -> u8 {
        match t {
            Ty::Byte => 0,
            Ty::Word => 1,
            Ty::Number => 2,
            _ => unreachable!("widest_numeric called on non-numeric-convertible type"),
        }
    }
    if rank(l) >= rank(r) {
        l
    } else {
        r
    }
}

/// `can_implicit_convert(from, to)`: identity; `BYTE→NUMBER`;
/// `WORD→NUMBER`; `CHAR→CHARACTER`; `CHAR→STRING`; `CHARACTER→STRING`; any
/// string-convertible → `STRING`.
pub fn can_implicit_convert(from: Ty, to: Ty) -> bool {
    if from == to {
        return true;
    }
    match (from, to) {
        (Ty::Byte, Ty::Number) => true,
        (Ty::Word, Ty::Number) => true,
        (Ty::Char, Ty::Character) => true,
        (Ty::Char, Ty::String) => true,
        (Ty::Character, Ty::String) => true,
        (_, Ty::String) if is_string_convertible(from) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_type_promotes_to_widest_numeric() {
        assert_eq!(common_type(Ty::Byte, Ty::Word), Ty::Word);
        assert_eq!(common_type(Ty::Word, Ty::Number), Ty::Number);
        assert_eq!(common_type(Ty::Byte, Ty::Byte), Ty::Byte);
    }

    #[test]
    fn common_type_string_convertible() {
        assert_eq!(common_type(Ty::String, Ty::Number), Ty::String);
        assert_eq!(common_type(Ty::Bool, Ty::String), Ty::String);
    }

    #[test]
    fn common_type_char_character_mix() {
        assert_eq!(common_type(Ty::Char, Ty::Character), Ty::Character);
    }

    #[test]
    fn common_type_invalid_for_unrelated_types() {
        assert_eq!(common_type(Ty::Bool, Ty::Bit), Ty::Invalid);
    }

    #[test]
    fn compatible_type_rejects_char_character_mix() {
        // is_compatible_type(CHAR, CHARACTER) = false even though
        // can_implicit_convert(CHAR, CHARACTER) = true; see DESIGN.md.
        assert!(!is_compatible_type(Ty::Char, Ty::Character));
        assert!(can_implicit_convert(Ty::Char, Ty::Character));
    }

    #[test]
    fn bit_types_cover_byte_word_dword() {
        assert!(is_bit_type(Ty::Byte));
        assert!(is_bit_type(Ty::Word));
        assert!(is_bit_type(Ty::Dword));
        assert!(is_bit_type(Ty::Bit));
        assert!(!is_bit_type(Ty::Number));
    }
}
