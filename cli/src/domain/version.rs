//! Package version ordering over loosely-structured directory names.
//!
//! Not semantic versioning: names are reduced to a numeric
//! (major, minor, patch) tuple and compared component-wise; full-tuple
//! ties break on the lexicographically greater *original* name, so date
//! stamps and pre-release suffixes order predictably (`-rc1` beats
//! `-beta` by string comparison alone).

/// Numeric reduction of a version directory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReleaseVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

/// Reduce a directory name to its numeric tuple.
///
/// A leading `GA` prefix is stripped, then the first maximal run of the
/// form `N(.N){0,2}` is taken; missing trailing components default to 0.
/// Names with no digits at all reduce to `0.0.0` and still participate in
/// selection.
#[must_use]
pub fn parse_version(name: &str) -> ReleaseVersion {
    let stripped = name.strip_prefix("GA").unwrap_or(name);

    let bytes = stripped.as_bytes();
    let Some(start) = bytes.iter().position(u8::is_ascii_digit) else {
        return ReleaseVersion { major: 0, minor: 0, patch: 0 };
    };

    let mut parts = [0u32; 3];
    let mut idx = 0;
    let mut i = start;
    loop {
        let run_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        // Oversized runs saturate rather than abort: these names come from
        // arbitrary directory listings.
        parts[idx] = stripped[run_start..i].parse().unwrap_or(u32::MAX);
        idx += 1;
        if idx == 3 || i >= bytes.len() || bytes[i] != b'.' {
            break;
        }
        i += 1;
        if i >= bytes.len() || !bytes[i].is_ascii_digit() {
            break;
        }
    }

    ReleaseVersion {
        major: parts[0],
        minor: parts[1],
        patch: parts[2],
    }
}

/// Select the "latest" name from `candidates`.
///
/// The first entry encountered with the highest numeric tuple wins; on a
/// full-tuple tie the lexicographically greater original name replaces the
/// incumbent. Returns an empty string for an empty candidate set.
#[must_use]
pub fn pick_latest<'a>(candidates: impl IntoIterator<Item = &'a str>) -> String {
    let mut best: Option<(&str, ReleaseVersion)> = None;
    for name in candidates {
        let v = parse_version(name);
        match &best {
            None => best = Some((name, v)),
            Some((bname, bv)) => {
                if v > *bv || (v == *bv && name > *bname) {
                    best = Some((name, v));
                }
            }
        }
    }
    best.map(|(name, _)| name.to_string()).unwrap_or_default()
}
