/// Canonical form of a drug name for table lookups: trimmed and title-cased.
///
/// A letter is upper-cased when the character before it is not a letter and
/// lower-cased otherwise, so `"cyanocobalamin (vitamin b12)"` becomes
/// `"Cyanocobalamin (Vitamin B12)"`.
pub fn canonical_drug_name(name: &str) -> String {
    let mut canonical = String::with_capacity(name.len());
    let mut previous_is_letter = false;

    for ch in name.trim().chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                canonical.extend(ch.to_lowercase());
            } else {
                canonical.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            canonical.push(ch);
            previous_is_letter = false;
        }
    }

    canonical
}
