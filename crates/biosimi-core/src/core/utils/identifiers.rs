use phf::{Set, phf_set};

static BUILTIN_FUNCTIONS: Set<&'static str> = phf_set! {
    "abs", "ceiling", "floor", "exp", "ln", "log", "log10", "pow", "power", "root", "sqrt",
    "sin", "cos", "tan", "sec", "csc", "cot", "sinh", "cosh", "tanh", "sech", "csch", "coth",
    "arcsin", "arccos", "arctan", "arcsec", "arccsc", "arccot",
    "arcsinh", "arccosh", "arctanh", "arcsech", "arccsch", "arccoth",
    "factorial", "piecewise", "min", "max", "rem", "quotient", "implies", "xor",
    "and", "or", "not", "eq", "neq", "gt", "lt", "geq", "leq",
    "plus", "times", "minus", "divide", "delay", "rateOf",
};

static BUILTIN_SYMBOLS: Set<&'static str> = phf_set! {
    "time", "t", "pi", "exponentiale", "avogadro", "true", "false",
    "INF", "inf", "infinity", "NaN", "nan", "notanumber",
};

const FALLBACK_IDENTIFIER: &str = "id";

pub fn is_builtin_function(name: &str) -> bool {
    BUILTIN_FUNCTIONS.contains(name)
}

pub fn is_builtin_symbol(name: &str) -> bool {
    BUILTIN_SYMBOLS.contains(name)
}

/// Checks the identifier grammar: a letter or underscore followed by letters,
/// digits and underscores.
pub fn is_valid_sid(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Converts free-form display text into a syntactically valid identifier.
///
/// Characters outside `[A-Za-z0-9_]` become `_`, a leading digit is guarded by
/// a `_` prefix and a single trailing `_` is dropped. Text that reduces to
/// nothing, or to a reserved math symbol, is mapped to a safe fallback.
pub fn name_to_sid(name: &str) -> String {
    let mut id = String::with_capacity(name.len() + 1);
    if name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        id.push('_');
    }
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            id.push(c);
        } else {
            id.push('_');
        }
    }
    if id.ends_with('_') {
        id.pop();
    }

    if id.is_empty() || !is_valid_sid(&id) {
        return FALLBACK_IDENTIFIER.to_string();
    }
    if is_builtin_symbol(&id) || is_builtin_function(&id) {
        id.push('_');
    }
    id
}
