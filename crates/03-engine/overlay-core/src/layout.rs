//! Pushes host page content below the fixed banner.
//!
//! Every direct child of `<body>` that the overlay does not own gets a
//! `translateY` composed onto the transform it had before we first touched
//! it. The pre-existing transform is captured once into a marker attribute so
//! repeated shifts never compound.

/// Attribute holding an element's transform from before the first shift.
pub const ORIGINAL_TRANSFORM_ATTR: &str = "data-amberloader-original";

/// One direct child of the document body.
pub trait ShiftTarget {
    /// Whether this element is one of the overlay's own roots.
    fn is_owned(&self) -> bool;

    /// Previously captured transform (`""` when there was none).
    fn captured_transform(&self) -> Option<String>;

    /// Stores the captured transform on the element.
    fn capture_transform(&mut self, original: &str);

    /// Currently computed transform, `None` or `"none"` when untransformed.
    fn computed_transform(&self) -> Option<String>;

    /// Writes the inline transform.
    fn set_transform(&mut self, transform: &str);
}

/// Shifts every non-owned target down by `offset` pixels.
///
/// Returns how many targets were written.
pub fn shift_children<T, I>(children: I, offset: u32) -> usize
where
    T: ShiftTarget,
    I: IntoIterator<Item = T>,
{
    let mut shifted = 0;
    for mut child in children {
        if child.is_owned() {
            continue;
        }

        let original = match child.captured_transform() {
            Some(captured) => captured,
            None => {
                let computed = child
                    .computed_transform()
                    .filter(|t| !t.is_empty() && t != "none")
                    .unwrap_or_default();
                child.capture_transform(&computed);
                computed
            }
        };

        child.set_transform(&compose_transform(&original, offset));
        shifted += 1;
    }
    shifted
}

/// Composes `original` with a vertical offset.
///
/// A zero offset hands back the original unchanged (`"none"` when it was
/// empty); otherwise every `translateY(..)` term is replaced by ours.
pub fn compose_transform(original: &str, offset: u32) -> String {
    let original = original.trim();
    if offset == 0 {
        return if original.is_empty() {
            "none".to_owned()
        } else {
            original.to_owned()
        };
    }

    let mut composed = strip_translate_y(original);
    if !composed.is_empty() {
        composed.push(' ');
    }
    composed.push_str(&format!("translateY({offset}px)"));
    composed
}

fn strip_translate_y(transform: &str) -> String {
    const TERM: &str = "translateY(";
    let mut out = String::with_capacity(transform.len());
    let mut rest = transform;
    while let Some(start) = rest.find(TERM) {
        out.push_str(&rest[..start]);
        let after = &rest[start + TERM.len()..];
        rest = match after.find(')') {
            Some(end) => &after[end + 1..],
            None => "",
        };
    }
    out.push_str(rest);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
