//! Comma handling for contact names.
//!
//! Group messages list their contacts comma-separated, which collides with
//! names like "Smith, MD". Commas that introduce a known suffix are removed
//! before splitting. The suffix table is a hardcoded heuristic tailored to
//! typical US contact lists, not a general name parser.

/// Suffix token and the comma-bearing spellings that are searched for.
const SUFFIX_VARIANTS: &[(&str, &[&str])] = &[
    ("MD", &[", MD", ",MD", ", M.D", ",M.D"]),
    ("DO", &[", DO", ",DO", ", D.O", ",D.O"]),
    ("NP", &[", NP", ",NP", ", N.P", ",N.P"]),
    ("RN", &[", RN", ",RN", ", R.N", ",R.N"]),
    ("JR", &[", JR", ",JR", ", J.R", ",J.R"]),
    ("SR", &[", SR", ",SR", ", S.R", ",S.R"]),
    ("II", &[", II", ",II"]),
    ("III", &[", III", ",III"]),
    ("INC", &[", INC", ",INC"]),
    ("LLP", &[", LLP", ",LLP", ", L.L.P", ",L.L.P"]),
    ("LLC", &[", LLC", ",LLC", ", L.L.C", ",L.L.C"]),
    ("LPN", &[", LPN", ",LPN", ", L.P.N", ",L.P.N"]),
    ("ACSW", &[", ACSW", ",ACSW", ", A.C.S.W", ",A.C.S.W"]),
    ("LCSW", &[", LCSW", ",LCSW", ", L.C.S.W", ",L.C.S.W"]),
    ("MA", &[", MA", ",MA", ", M.A", ",M.A"]),
    ("PHD", &[", PHD", ",PHD", ", PH.D", ",PH.D", ", P.H.D", ",P.H.D"]),
];

/// Tokens that are also common word prefixes ("Don", "Mark"); a match followed
/// by a letter is not a suffix.
const PREFIX_GUARDED: &[&str] = &["DO", "MA"];

/// Remove the comma in front of every recognized suffix, e.g. `"Jones, Jr, MD"` -> `"Jones Jr MD"`.
///
/// Repeats full passes over the suffix table until nothing changes. Each
/// change deletes one character, so the loop always terminates. Only the first
/// occurrence of each spelling is looked at per pass, so a guarded false
/// positive can hide a later genuine suffix of the same spelling.
pub fn strip_suffix_commas(name: &str) -> String {
    let mut contacts = name.to_string();
    while strip_pass(&mut contacts) {}
    contacts
}

fn strip_pass(contacts: &mut String) -> bool {
    let mut changed = false;

    for (token, variants) in SUFFIX_VARIANTS {
        // ASCII-only folding keeps byte offsets identical to `contacts`
        let folded = contacts.to_ascii_uppercase().replace('.', "");
        if !folded.contains(token) {
            continue;
        }

        for variant in *variants {
            let upper = contacts.to_ascii_uppercase();
            let Some(index) = upper.find(variant) else {
                continue;
            };

            if PREFIX_GUARDED.contains(token) && followed_by_letter(contacts, index + variant.len())
            {
                continue;
            }

            // drop only the comma, keep the space and the suffix
            contacts.remove(index);
            changed = true;
        }
    }

    changed
}

fn followed_by_letter(text: &str, offset: usize) -> bool {
    text.get(offset..)
        .and_then(|rest| rest.chars().next())
        .is_some_and(char::is_alphabetic)
}
