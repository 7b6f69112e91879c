use std::fmt;
use std::sync::OnceLock;

/// Lazily computed text of a node value.
///
/// Attached to each node instance. Cloning yields an empty cache and the
/// cache never takes part in equality, so a rebuilt node can never observe
/// text computed for an older node.
#[derive(Default)]
pub(crate) struct DerivedText(OnceLock<Derived>);

struct Derived {
    text: String,
    len: usize,
}

impl DerivedText {
    fn get(&self, compute: impl FnOnce() -> String) -> &Derived {
        self.0.get_or_init(|| {
            let text = compute();
            let len = text.chars().count();
            Derived { text, len }
        })
    }

    pub(crate) fn text(&self, compute: impl FnOnce() -> String) -> &str {
        &self.get(compute).text
    }

    pub(crate) fn len(&self, compute: impl FnOnce() -> String) -> usize {
        self.get(compute).len
    }
}

impl Clone for DerivedText {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl PartialEq for DerivedText {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl fmt::Debug for DerivedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0.get().is_some() { "cached" } else { "empty" })
    }
}
