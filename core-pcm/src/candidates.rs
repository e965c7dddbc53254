//! # Candidate Enumeration
//!
//! The fixed, ordered set of format hypotheses tried against every input,
//! plus the file-name rules for inputs the explorer accepts.

use crate::format::{Candidate, Encoding, FormatDescriptor};

/// Encodings tried in both mono and stereo, in presentation order.
///
/// Big-endian 24-bit is decodable but not enumerated.
pub const INTERLEAVED_ENCODINGS: [Encoding; 8] = [
    Encoding::Unsigned8,
    Encoding::Signed16Le,
    Encoding::Signed16Be,
    Encoding::Signed24Le,
    Encoding::Signed32Le,
    Encoding::Float32Le,
    Encoding::MuLaw,
    Encoding::ALaw,
];

/// ADPCM encodings, enumerated mono only.
pub const ADPCM_ENCODINGS: [Encoding; 2] = [Encoding::OkiAdpcm, Encoding::G726Adpcm];

/// Number of candidates produced by [`enumerate_candidates`].
pub const CANDIDATE_COUNT: usize = INTERLEAVED_ENCODINGS.len() * 2 + ADPCM_ENCODINGS.len();

/// File suffixes accepted as raw input, lower case without the dot.
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["pcm", "raw", "vox", "g721", "g726", "adpcm"];

/// All candidates in fixed order: family order, then channel count ascending.
pub fn enumerate_candidates() -> Vec<Candidate> {
    let mut candidates = Vec::with_capacity(CANDIDATE_COUNT);
    for encoding in INTERLEAVED_ENCODINGS {
        candidates.push(Candidate::new(FormatDescriptor::mono(encoding)));
        candidates.push(Candidate::new(FormatDescriptor::stereo(encoding)));
    }
    for encoding in ADPCM_ENCODINGS {
        candidates.push(Candidate::new(FormatDescriptor::mono(encoding)));
    }
    candidates
}

/// The enumerated candidates, truncated to `limit` if given.
pub fn limited_candidates(limit: Option<usize>) -> Vec<Candidate> {
    let mut candidates = enumerate_candidates();
    if let Some(limit) = limit {
        candidates.truncate(limit);
    }
    candidates
}

/// Look up an enumerated candidate by identifier.
pub fn find_candidate(id: &str) -> Option<Candidate> {
    enumerate_candidates().into_iter().find(|c| c.id == id)
}

/// Returns `true` if `file_name` ends in an accepted suffix (case-insensitive).
pub fn is_supported_input(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(stem, ext)| {
            !stem.is_empty()
                && SUPPORTED_EXTENSIONS
                    .iter()
                    .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}
