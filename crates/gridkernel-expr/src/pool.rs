//! Out-of-line string literal storage (spec §3, §5): "the parsed string
//! pool for a cell is owned by the parallel string map."

use gridkernel_common::{StringHandle, StringPool};

/// The concrete string pool a cell's string literals are interned into.
/// An absent/default pool behaves as "empty string" for every handle, per
/// spec §3's "absent entry ≡ empty string".
#[derive(Debug, Clone, Default)]
pub struct LiteralPool {
    literals: Vec<String>,
}

impl LiteralPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, text: String) -> StringHandle {
        let handle = self.literals.len() as StringHandle;
        self.literals.push(text);
        handle
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }
}

impl StringPool for LiteralPool {
    fn get(&self, handle: StringHandle) -> &str {
        self.literals
            .get(handle as usize)
            .map(|s| s.as_str())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_entry_is_empty_string() {
        let pool = LiteralPool::new();
        assert_eq!(pool.get(0), "");
    }

    #[test]
    fn interns_and_recalls() {
        let mut pool = LiteralPool::new();
        let h0 = pool.intern("hello".into());
        let h1 = pool.intern("world".into());
        assert_eq!(pool.get(h0), "hello");
        assert_eq!(pool.get(h1), "world");
    }
}
