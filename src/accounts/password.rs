/// Compares a supplied password against the stored credential.
///
/// Records currently hold the password as entered, so the only implementation
/// is a plain equality check. A hashing verifier can be dropped in here
/// without touching the login state machine.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, supplied: &str, stored: &str) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextVerifier;

impl CredentialVerifier for PlaintextVerifier {
    fn verify(&self, supplied: &str, stored: &str) -> bool {
        supplied == stored
    }
}
