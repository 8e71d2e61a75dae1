/// Implemented by every model element that can refer to other elements by
/// identifier.
///
/// Implementations rewrite *references* only; the element's own declared
/// identifier is owned by the [`Model`](super::model::Model) and changed
/// separately so that a rename can be staged references-first.
pub trait SidReferences {
    /// Replaces references to `old_id` with `new_id` and returns the number of
    /// references rewritten.
    fn rename_sid_refs(&mut self, old_id: &str, new_id: &str) -> usize;

    fn references_sid(&self, id: &str) -> bool;
}

pub(crate) fn rename_optional(slot: &mut Option<String>, old_id: &str, new_id: &str) -> usize {
    match slot {
        Some(value) if value == old_id => {
            *value = new_id.to_string();
            1
        }
        _ => 0,
    }
}

pub(crate) fn rename_required(slot: &mut String, old_id: &str, new_id: &str) -> usize {
    if slot == old_id {
        *slot = new_id.to_string();
        1
    } else {
        0
    }
}
