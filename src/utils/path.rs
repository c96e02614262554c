use relative_path::RelativePathBuf;

use crate::globals::SLASH_SEPARATOR;

/// Join paths and retains trailing slash of the last element.
pub fn path_join(elements: &[&str]) -> String {
    if elements.is_empty() {
        return "".to_owned();
    }
    let mut p = RelativePathBuf::new();
    for e in elements {
        p.push(e);
    }
    let mut s = if elements[0].starts_with(SLASH_SEPARATOR) {
        // Retain prefix slash.
        SLASH_SEPARATOR.to_owned() + p.normalize().as_str()
    } else {
        p.normalize().to_string()
    };
    if elements[elements.len() - 1].ends_with(SLASH_SEPARATOR) && !s.ends_with(SLASH_SEPARATOR) {
        // Retain suffix slash.
        s.push_str(SLASH_SEPARATOR);
    }
    s
}
