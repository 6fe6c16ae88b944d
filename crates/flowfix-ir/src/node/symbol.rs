use crate::intern::InternKey;

/// Interned name of a method, local function, parameter or local.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Symbol(usize);

impl From<usize> for Symbol {
    fn from(id: usize) -> Self {
        Symbol(id)
    }
}

impl From<Symbol> for usize {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl InternKey for Symbol {}
