//! In-place editing of parameter lists.

/// Remove parameter `index` (1-based) and one adjoining comma from `list`.
///
/// Only quoting is tracked, not array nesting: a comma inside `[...]` counts
/// as a parameter separator here, unlike in [`count`](super::params::count).
/// Callers must not rely on `index` lining up with the other queries when the
/// list contains arrays.
///
/// An out-of-range index leaves the list unchanged.
pub fn remove(list: &mut String, index: usize) {
    let mut quoted = false;
    let mut idx = 1;
    let mut prev = '\0';

    list.retain(|c| {
        let mut skip = false;
        if quoted {
            if c == '"' && prev != '\\' {
                quoted = false;
            }
        } else if c == ',' {
            // The first parameter has no comma before it; drop the one after.
            skip = idx == 1 && index == 1;
            idx += 1;
        } else if c == '"' {
            quoted = true;
        }
        prev = c;
        idx != index && !skip
    });
}
