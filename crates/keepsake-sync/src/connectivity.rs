/// Pre-flight connectivity check, consulted before any network fetch. An
/// offline answer short-circuits the sync without contacting the network.
///
/// There is no portable OS-level "am I online" query, so the check is an
/// injection seam: the CLI assumes online and lets the fetch itself fail with
/// a connect error, while embedders with a platform signal implement this
/// against it. Tests inject an offline stub.
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Default check: always report online.
pub struct AssumeOnline;

impl Connectivity for AssumeOnline {
    fn is_online(&self) -> bool {
        true
    }
}
