use tracing::debug;

use crate::model::CredentialRecord;
use crate::origin::normalize_origin;

/// Records whose origin equals the requested origin after normalisation.
///
/// A malformed requested origin matches nothing; a malformed stored origin excludes only
/// that record.
pub fn find_matching(origin: &str, records: &[CredentialRecord]) -> Vec<CredentialRecord> {
    let wanted = match normalize_origin(origin) {
        Ok(wanted) => wanted,
        Err(err) => {
            debug!(target: "credential-matcher", %err, "requested origin rejected");
            return Vec::new();
        }
    };

    records
        .iter()
        .filter(|record| match normalize_origin(&record.origin) {
            Ok(candidate) => candidate == wanted,
            Err(err) => {
                debug!(target: "credential-matcher", %err, "skipping stored record");
                false
            }
        })
        .cloned()
        .collect()
}
