use std::borrow::Cow;

/// Replace every literal occurrence of `from` in `body` with `to`.
///
/// No JavaScript parsing is involved: matches inside comments and string
/// literals are replaced like any other. The body is borrowed back
/// untouched when there is nothing to do.
pub fn rewrite_hosts<'a>(body: &'a str, from: &str, to: &str) -> Cow<'a, str> {
    if from.is_empty() || from == to || !body.contains(from) {
        return Cow::Borrowed(body);
    }

    Cow::Owned(body.replace(from, to))
}
